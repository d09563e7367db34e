use std::{
  alloc::{GlobalAlloc, Layout},
  ptr::{self, NonNull},
};

use log::{debug, trace};
use spin::Mutex;

use crate::{
  ALIGNMENT, AllocError,
  align::checked_align,
  block::{Block, HEADER_SIZE},
  brk::HeapBreak,
  registry::Registry,
};

/// How an acquire was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Acquired {
  Reused,
  Carved,
}

/// What a release did to the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Released {
  Freed,
  Shrunk,
}

/// Snapshot of the blocks an allocator is tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
  /// Blocks linked into the registry, free or not.
  pub blocks: usize,
  pub free_blocks: usize,
  /// Requested bytes held by in-use blocks.
  pub used_bytes: usize,
  /// Requested bytes held by free blocks.
  pub free_bytes: usize,
}

struct State<H> {
  heap: H,
  registry: Registry,
}

// Blocks are only reachable through the registry, and the registry only through
// the allocator's lock.
unsafe impl<H: Send> Send for State<H> {}

impl<H: HeapBreak> State<H> {
  /// Grows the heap and writes a header for `size` bytes at the old top.
  fn carve(
    &mut self,
    size: usize,
  ) -> Result<Block, AllocError> {
    let extent = checked_align(size)
      .and_then(|payload| payload.checked_add(HEADER_SIZE))
      .ok_or(AllocError::ExhaustedAddressSpace)?;

    let pad = misalignment(self.heap.top()?);
    let request = extent
      .checked_add(pad)
      .and_then(|request| isize::try_from(request).ok())
      .ok_or(AllocError::ExhaustedAddressSpace)?;

    let start = self.heap.adjust(request)?;

    // Someone else moved the break between the query and the growth. If the
    // rollback fails as well, the `request` bytes stay leaked below the break.
    if misalignment(start) > pad {
      self.heap.adjust(-request)?;
      return Err(AllocError::ExhaustedAddressSpace);
    }

    let at = unsafe { start.add(misalignment(start)) };
    Ok(unsafe { Block::carve(at, size) })
  }

  /// Hands the block's memory back to the heap if it sits exactly at the top.
  fn shrink(
    &mut self,
    block: Block,
  ) -> bool {
    let Ok(top) = self.heap.top() else {
      return false;
    };

    if block.end() != top.as_ptr() {
      return false;
    }

    // An extent always came from a successful `isize` request.
    self.heap.adjust(-(block.extent() as isize)).is_ok()
  }
}

fn misalignment(
  address: NonNull<u8>,
) -> usize {
  (address.as_ptr() as usize).wrapping_neg() & (ALIGNMENT - 1)
}

/// First-fit allocator over a [`HeapBreak`], guarded by a single spin lock.
///
/// Freed blocks stay linked and are reused by later requests of equal or smaller
/// size; only the most recently carved block is returned to the heap, and only
/// while it is still sitting at the top.
pub struct BrkAllocator<H> {
  state: Mutex<State<H>>,
}

impl<H: HeapBreak> BrkAllocator<H> {
  pub const fn new(
    heap: H,
  ) -> Self {
    Self {
      state: Mutex::new(State {
        heap,
        registry: Registry::new(),
      }),
    }
  }

  /// Returns a pointer to at least `size` writable bytes, aligned to
  /// [`ALIGNMENT`].
  pub fn acquire(
    &self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    match self.acquire_quiet(size) {
      Ok((payload, how)) => {
        trace!("acquire({size}): {how:?} block at {payload:?}");
        Ok(payload)
      }
      Err(err) => {
        debug!("acquire({size}) failed: {err}");
        Err(err)
      }
    }
  }

  /// Gives a block back. `None` is ignored.
  ///
  /// Releasing a block that is already free leaves it free.
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by [`acquire`](Self::acquire) on this
  /// allocator, and the block must not have been handed back to the heap since.
  pub unsafe fn release(
    &self,
    payload: Option<NonNull<u8>>,
  ) {
    let Some(payload) = payload else {
      return;
    };

    let outcome = unsafe { self.release_quiet(payload) };
    trace!("release({payload:?}): {outcome:?}");
  }

  /// [`acquire`](Self::acquire) with a null pointer for failure.
  pub fn malloc(
    &self,
    size: usize,
  ) -> *mut u8 {
    self.acquire(size).map_or(ptr::null_mut(), NonNull::as_ptr)
  }

  /// [`release`](Self::release) taking a possibly-null pointer.
  ///
  /// # Safety
  ///
  /// Same contract as [`release`](Self::release).
  pub unsafe fn free(
    &self,
    address: *mut u8,
  ) {
    unsafe { self.release(NonNull::new(address)) }
  }

  pub fn stats(
    &self,
  ) -> HeapStats {
    let state = self.state.lock();

    state.registry.iter().fold(HeapStats::default(), |mut stats, block| {
      stats.blocks += 1;
      if block.is_free() {
        stats.free_blocks += 1;
        stats.free_bytes += block.size();
      } else {
        stats.used_bytes += block.size();
      }
      stats
    })
  }

  /// True when no block is linked, i.e. everything carved went back to the heap.
  pub fn is_empty(
    &self,
  ) -> bool {
    self.state.lock().registry.is_empty()
  }

  /// Current top of the underlying heap.
  pub fn heap_top(
    &self,
  ) -> Option<NonNull<u8>> {
    self.state.lock().heap.top().ok()
  }

  // The `_quiet` paths never log: they back `GlobalAlloc`, and a logger may
  // allocate.
  fn acquire_quiet(
    &self,
    size: usize,
  ) -> Result<(NonNull<u8>, Acquired), AllocError> {
    if size == 0 {
      return Err(AllocError::ZeroSizeRequest);
    }

    let mut state = self.state.lock();

    if let Some(block) = state.registry.find_first_fit(size) {
      block.set_free(false);
      return Ok((block.payload(), Acquired::Reused));
    }

    let block = state.carve(size)?;
    state.registry.append(block);

    Ok((block.payload(), Acquired::Carved))
  }

  unsafe fn release_quiet(
    &self,
    payload: NonNull<u8>,
  ) -> Released {
    let mut state = self.state.lock();
    let block = unsafe { Block::from_payload(payload) };

    if state.registry.tail() == Some(block) && state.shrink(block) {
      state.registry.unlink_tail();
      return Released::Shrunk;
    }

    block.set_free(true);
    Released::Freed
  }
}

unsafe impl<H: HeapBreak> GlobalAlloc for BrkAllocator<H> {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    if layout.align() > ALIGNMENT {
      return ptr::null_mut();
    }

    self.acquire_quiet(layout.size()).map_or(ptr::null_mut(), |(payload, _)| payload.as_ptr())
  }

  unsafe fn dealloc(
    &self,
    address: *mut u8,
    _layout: Layout,
  ) {
    if let Some(payload) = NonNull::new(address) {
      unsafe { self.release_quiet(payload) };
    }
  }
}
