use std::{mem, ptr::NonNull};

use crate::align;

/// Metadata written in front of every payload.
///
/// `align(16)` pads the header out to the block alignment, so the payload that
/// follows it starts aligned as long as the header does.
#[repr(C, align(16))]
pub(crate) struct Header {
  size: usize,
  is_free: bool,
  next: Option<Block>,
}

impl Header {
  fn new(
    size: usize,
  ) -> Self {
    Self {
      size,
      is_free: false,
      next: None,
    }
  }
}

/// Bytes occupied by a header, padding included.
pub(crate) const HEADER_SIZE: usize = mem::size_of::<Header>();

/// Handle to a header living in heap memory.
///
/// A `Block` is only ever created for a header that was carved by the engine and
/// is still linked into a registry, which is what makes the accessors below safe
/// to call while the owning allocator's lock is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block(NonNull<Header>);

impl Block {
  /// Writes a fresh, in-use header at `at`.
  ///
  /// # Safety
  ///
  /// `at` must be aligned to [`ALIGNMENT`](crate::ALIGNMENT) and valid for writes
  /// of `HEADER_SIZE + align!(size)` bytes that nothing else refers to.
  pub(crate) unsafe fn carve(
    at: NonNull<u8>,
    size: usize,
  ) -> Self {
    let header = at.cast::<Header>();
    unsafe { header.write(Header::new(size)) };
    Self(header)
  }

  /// Recovers the block owning `payload`.
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by [`Block::payload`] on a live block.
  pub(crate) unsafe fn from_payload(
    payload: NonNull<u8>,
  ) -> Self {
    Self(unsafe { payload.sub(HEADER_SIZE) }.cast())
  }

  pub(crate) fn payload(
    self,
  ) -> NonNull<u8> {
    unsafe { self.0.cast::<u8>().add(HEADER_SIZE) }
  }

  pub(crate) fn size(
    self,
  ) -> usize {
    unsafe { (*self.0.as_ptr()).size }
  }

  pub(crate) fn is_free(
    self,
  ) -> bool {
    unsafe { (*self.0.as_ptr()).is_free }
  }

  pub(crate) fn set_free(
    self,
    is_free: bool,
  ) {
    unsafe { (*self.0.as_ptr()).is_free = is_free }
  }

  pub(crate) fn next(
    self,
  ) -> Option<Block> {
    unsafe { (*self.0.as_ptr()).next }
  }

  pub(crate) fn set_next(
    self,
    next: Option<Block>,
  ) {
    unsafe { (*self.0.as_ptr()).next = next }
  }

  /// Bytes this block took from the heap: header plus aligned payload.
  pub(crate) fn extent(
    self,
  ) -> usize {
    HEADER_SIZE + align!(self.size())
  }

  /// First address past the block's carved extent.
  pub(crate) fn end(
    self,
  ) -> *mut u8 {
    unsafe { self.payload().as_ptr().add(align!(self.size())) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ALIGNMENT;

  #[repr(C, align(16))]
  struct Scratch([u8; 256]);

  #[test]
  fn test_header_is_padded_to_alignment() {
    assert_eq!(HEADER_SIZE % ALIGNMENT, 0);
    assert_eq!(mem::align_of::<Header>(), ALIGNMENT);
  }

  #[test]
  fn test_carve_and_recover() {
    let mut scratch = Scratch([0; 256]);
    let base = NonNull::new(scratch.0.as_mut_ptr()).unwrap();

    unsafe {
      let block = Block::carve(base, 21);

      assert_eq!(block.size(), 21);
      assert!(!block.is_free());
      assert_eq!(block.next(), None);
      assert_eq!(block.extent(), HEADER_SIZE + 32);
      assert_eq!(block.payload().as_ptr(), base.as_ptr().add(HEADER_SIZE));
      assert_eq!(block.end(), base.as_ptr().add(HEADER_SIZE + 32));
      assert_eq!(block.payload().as_ptr() as usize % ALIGNMENT, 0);

      let recovered = Block::from_payload(block.payload());
      assert_eq!(recovered, block);

      recovered.set_free(true);
      assert!(block.is_free());
    }
  }
}
