//! Backends for the "move the heap top by N bytes" primitive.

use std::{
  alloc::{self, Layout},
  ptr::NonNull,
};

use libc::{c_void, intptr_t, sbrk};

use crate::{ALIGNMENT, BreakError};

/// A contiguous heap whose upper boundary can be moved.
///
/// `adjust(delta)` moves the break by `delta` bytes and returns the break as it was
/// before the move: for a positive delta that is the start of the freshly
/// available region, for zero it is the current top and nothing moves.
///
/// # Safety
///
/// Implementors must guarantee that after a successful positive adjustment the
/// `delta` bytes starting at the returned address are valid for reads and writes
/// and are not handed out to anyone else until the break moves back below them.
pub unsafe trait HeapBreak {
  fn adjust(
    &mut self,
    delta: isize,
  ) -> Result<NonNull<u8>, BreakError>;

  /// Current top of the heap.
  fn top(
    &mut self,
  ) -> Result<NonNull<u8>, BreakError> {
    self.adjust(0)
  }
}

/// The process program break, moved with `sbrk(2)`.
///
/// Anything else in the process that moves the break (the platform allocator,
/// another `Sbrk` user) shares the same boundary; the engine only ever shrinks
/// below a block it can see sitting at the top.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sbrk;

unsafe impl HeapBreak for Sbrk {
  fn adjust(
    &mut self,
    delta: isize,
  ) -> Result<NonNull<u8>, BreakError> {
    let previous = unsafe { sbrk(delta as intptr_t) };

    if previous == usize::MAX as *mut c_void {
      return Err(if delta < 0 { BreakError::Underflow } else { BreakError::Exhausted });
    }

    NonNull::new(previous.cast()).ok_or(BreakError::Exhausted)
  }
}

/// A fixed-capacity heap with program-break semantics, backed by one allocation
/// from the system allocator.
///
/// Useful for embedding the engine over a private region, and gives tests a
/// break nobody else touches.
#[derive(Debug)]
pub struct Arena {
  base: NonNull<u8>,
  layout: Layout,
  top: usize,
}

// The arena exclusively owns its buffer.
unsafe impl Send for Arena {}

impl Arena {
  /// Reserves `capacity` bytes, aligned to [`ALIGNMENT`].
  pub fn with_capacity(
    capacity: usize,
  ) -> Result<Self, BreakError> {
    let layout = Layout::from_size_align(capacity.max(ALIGNMENT), ALIGNMENT)
      .map_err(|_| BreakError::Exhausted)?;
    let base = NonNull::new(unsafe { alloc::alloc(layout) }).ok_or(BreakError::Exhausted)?;

    Ok(Self { base, layout, top: 0 })
  }

  pub fn capacity(
    &self,
  ) -> usize {
    self.layout.size()
  }

  /// Bytes currently below the break.
  pub fn used(
    &self,
  ) -> usize {
    self.top
  }
}

unsafe impl HeapBreak for Arena {
  fn adjust(
    &mut self,
    delta: isize,
  ) -> Result<NonNull<u8>, BreakError> {
    let previous = unsafe { self.base.add(self.top) };

    if delta >= 0 {
      let top = self.top.checked_add(delta.unsigned_abs()).ok_or(BreakError::Exhausted)?;
      if top > self.capacity() {
        return Err(BreakError::Exhausted);
      }
      self.top = top;
    } else {
      self.top = self.top.checked_sub(delta.unsigned_abs()).ok_or(BreakError::Underflow)?;
    }

    Ok(previous)
  }
}

impl Drop for Arena {
  fn drop(
    &mut self,
  ) {
    unsafe { alloc::dealloc(self.base.as_ptr(), self.layout) }
  }
}
