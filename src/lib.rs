//! # brkalloc - A First-Fit `malloc`/`free` on the Program Break
//!
//! This crate provides a small, thread-safe heap allocator that manages memory by
//! moving the program break with `sbrk(2)`.
//!
//! ## Overview
//!
//! Every block carved from the heap is prefixed with a header, and the headers are
//! chained into a singly linked list in the order the blocks were carved:
//!
//! ```text
//!   Heap Layout:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌────┬──────┬────┬──────┬────┬──────┐                              │
//!   │   │ H1 │  P1  │ H2 │  P2  │ H3 │  P3  │                              │
//!   │   └────┴──────┴────┴──────┴────┴──────┘                              │
//!   │     │  next     ▲ │  next     ▲       ▲                              │
//!   │     └───────────┘ └───────────┘       │                              │
//!   │   head                      tail   Program                           │
//!   │                                     Break                            │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **acquire** walks the list from the head and hands out the first free block
//!   that is large enough. If there is none, the break is moved up and a new block
//!   is appended at the tail.
//! - **release** marks the block free, unless it is the tail block sitting right
//!   under the break: then the block is unlinked and the break is moved back down.
//!
//! Blocks are never split or merged, and a reused block keeps the size it was
//! carved with.
//!
//! ## Crate Structure
//!
//! ```text
//!   brkalloc
//!   ├── align      - Alignment macro (align!)
//!   ├── block      - Block header and handle (internal)
//!   ├── brk        - HeapBreak trait, Sbrk and Arena backends
//!   ├── engine     - BrkAllocator: acquire / release under one lock
//!   ├── error      - AllocError, BreakError
//!   └── registry   - Carve-ordered block list (internal)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! fn main() {
//!     let payload = brkalloc::acquire(64).unwrap();
//!
//!     unsafe {
//!         payload.as_ptr().write_bytes(0, 64);
//!         brkalloc::release(Some(payload));
//!     }
//! }
//! ```
//!
//! A private allocator over its own region works the same way:
//!
//! ```rust
//! use brkalloc::{Arena, BrkAllocator};
//!
//! let allocator = BrkAllocator::new(Arena::with_capacity(4096).unwrap());
//!
//! let a = allocator.acquire(10).unwrap();
//! let _b = allocator.acquire(20).unwrap();
//! unsafe { allocator.release(Some(a)) };
//!
//! // First fit: `a`'s block comes first and is large enough.
//! assert_eq!(allocator.acquire(5).unwrap(), a);
//! ```
//!
//! `BrkAllocator` also implements [`GlobalAlloc`](std::alloc::GlobalAlloc), so it
//! can be installed with `#[global_allocator]`. Requests aligned to more than
//! [`ALIGNMENT`] bytes fail.
//!
//! ## Limitations
//!
//! - **No coalescing or splitting**: free neighbours stay separate blocks.
//! - **Only the tail shrinks**: freed interior blocks stay mapped for reuse.
//! - **Linear scans**: both the first-fit search and tail removal are O(n).
//! - **Shared break**: [`Sbrk`] assumes this allocator is the only code moving
//!   the break while its lock is held.
//! - **Unix-only**: `Sbrk` requires `libc` and `sbrk` (POSIX systems).
//!
//! ## Safety
//!
//! Releasing a pointer that did not come from `acquire` on the same allocator is
//! undefined behavior and is not detected.

use std::ptr::NonNull;

mod align;
mod block;
mod brk;
mod engine;
mod error;
mod registry;

pub use brk::{Arena, HeapBreak, Sbrk};
pub use engine::{BrkAllocator, HeapStats};
pub use error::{AllocError, BreakError};

/// Alignment of every header and payload, in bytes.
pub const ALIGNMENT: usize = 16;

/// Process-wide allocator over the program break.
pub static BRK: BrkAllocator<Sbrk> = BrkAllocator::new(Sbrk);

/// Acquires `size` bytes from [`BRK`].
pub fn acquire(
  size: usize,
) -> Result<NonNull<u8>, AllocError> {
  BRK.acquire(size)
}

/// Releases a block acquired from [`BRK`]. `None` is a no-op.
///
/// # Safety
///
/// See [`BrkAllocator::release`].
pub unsafe fn release(
  payload: Option<NonNull<u8>>,
) {
  unsafe { BRK.release(payload) }
}
