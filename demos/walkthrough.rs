use std::{io::Read, ptr::NonNull};

use brkalloc::BRK;

/// Waits until the user presses ENTER.
/// Useful when you want to inspect memory state with tools like `pmap`, `htop`,
/// `gdb`, or just visually track how allocations change the program break.
fn block_until_enter_pressed() {
  println!("\n>>> Press ENTER to continue...");
  let _ = std::io::stdin().bytes().next();
}

/// Prints the current program break as seen by the allocator.
fn print_program_break(
  label: &str,
) {
  println!(
    "[{}] PID = {}, program break = {:?}, {:?}",
    label,
    std::process::id(),
    BRK.heap_top(),
    BRK.stats(),
  );
}

fn print_alloc(
  size: usize,
  payload: NonNull<u8>,
) {
  println!(
    "Acquired {} bytes, address = {:?}, program break = {:?}",
    size,
    payload,
    BRK.heap_top()
  );
}

fn main() {
  env_logger::init();

  print_program_break("start");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 1) Two blocks, carved one after the other.
  // --------------------------------------------------------------------
  let a = BRK.acquire(10).expect("acquire(10)");
  println!("\n[1] acquire(10)");
  print_alloc(10, a);

  let b = BRK.acquire(20).expect("acquire(20)");
  println!("[1] acquire(20)");
  print_alloc(20, b);

  unsafe { a.as_ptr().write_bytes(0xAB, 10) };
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 2) Release the first block. It is not at the top of the heap, so it is
  //    only marked free and the break does not move.
  // --------------------------------------------------------------------
  unsafe { BRK.release(Some(a)) };
  println!("\n[2] release(a)");
  print_program_break("after release(a)");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 3) A smaller request is served by the first free block that fits.
  // --------------------------------------------------------------------
  let c = BRK.acquire(5).expect("acquire(5)");
  println!("\n[3] acquire(5)");
  print_alloc(5, c);
  println!(
    "[3] c == a? {}",
    if c == a {
      "Yes, it reused the freed block"
    } else {
      "No, it allocated somewhere else"
    }
  );
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 4) A large block moves the break up; releasing it moves it back.
  // --------------------------------------------------------------------
  print_program_break("before large acquire");

  let big = BRK.acquire(64 * 1024).expect("acquire(64 KiB)");
  println!("\n[4] acquire 64 KiB");
  print_alloc(64 * 1024, big);
  block_until_enter_pressed();

  unsafe { BRK.release(Some(big)) };
  print_program_break("after releasing the large block");
  block_until_enter_pressed();

  // --------------------------------------------------------------------
  // 5) Zero-size requests are always refused.
  // --------------------------------------------------------------------
  println!("\n[5] acquire(0) = {:?}", BRK.acquire(0));

  unsafe {
    BRK.release(Some(b));
    BRK.release(Some(c));
  }
  print_program_break("end");
}
