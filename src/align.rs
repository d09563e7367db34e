/// Rounds `value` up to the allocator's block alignment ([`ALIGNMENT`]), or to an
/// explicit power-of-two alignment when one is given.
///
/// # Examples
///
/// ```rust
/// use brkalloc::align;
///
/// assert_eq!(align!(1), 16);
/// assert_eq!(align!(16), 16);
/// assert_eq!(align!(13, 8), 16);
/// assert_eq!(align!(0), 0);
/// ```
///
/// [`ALIGNMENT`]: crate::ALIGNMENT
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align!($value, $crate::ALIGNMENT)
  };
  ($value:expr, $to:expr) => {
    ($value + $to - 1) & !($to - 1)
  };
}

/// Overflow-checked form of [`align!`], used where the value comes from a caller.
pub(crate) const fn checked_align(
  value: usize,
) -> Option<usize> {
  match value.checked_add(crate::ALIGNMENT - 1) {
    Some(bumped) => Some(bumped & !(crate::ALIGNMENT - 1)),
    None => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ALIGNMENT;

  #[test]
  fn test_align() {
    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ALIGNMENT * i + 1)..=(ALIGNMENT * (i + 1));

      let expected_alignment = ALIGNMENT * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
      }
    }
  }

  #[test]
  fn test_align_explicit() {
    assert_eq!(align!(13usize, 8), 16);
    assert_eq!(align!(9usize, 4), 12);
    assert_eq!(align!(64usize, 64), 64);
  }

  #[test]
  fn test_checked_align_overflow() {
    assert_eq!(checked_align(17), Some(32));
    assert_eq!(checked_align(usize::MAX), None);
    assert_eq!(checked_align(usize::MAX - ALIGNMENT + 1), Some(usize::MAX - ALIGNMENT + 1));
  }
}
