//! Runs against the real program break. Kept in its own test binary, and as its
//! only test, so no other allocator in the process moves the break while
//! it runs.

use std::ptr::NonNull;

use brkalloc::BRK;

#[test_log::test]
fn test_alloc() {
  let allocator = &BRK;

  unsafe {
    let first_addr = brkalloc::acquire(8).unwrap().as_ptr() as *mut u64;

    *first_addr = 3u64;

    assert_eq!(*first_addr, 3);

    let size: usize = 6;

    let second_addr = allocator.malloc(size * 2) as *mut u16;

    for i in 0..size {
      *(second_addr.add(i)) = (i + 1) as u16;
    }

    assert_eq!(*first_addr, 3);

    for i in 0..size {
      assert_eq!((i + 1) as u16, *(second_addr.add(i)))
    }

    allocator.free(first_addr as *mut u8);

    let third_addr = allocator.malloc(4) as *mut u32;

    assert_eq!(first_addr as *mut u32, third_addr);

    brkalloc::release(NonNull::new(third_addr as *mut u8));
    brkalloc::release(NonNull::new(second_addr as *mut u8));
  }

  assert_eq!(allocator.acquire(0), Err(brkalloc::AllocError::ZeroSizeRequest));
}
