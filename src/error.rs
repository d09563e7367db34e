use std::fmt;

/// Reasons an allocation request can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
  /// A request for zero bytes. Always refused, whatever the heap state.
  ZeroSizeRequest,
  /// The heap could not be grown to carve a new block.
  ExhaustedAddressSpace,
}

impl fmt::Display for AllocError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      AllocError::ZeroSizeRequest => write!(f, "zero-size allocation request"),
      AllocError::ExhaustedAddressSpace => write!(f, "heap address space exhausted"),
    }
  }
}

impl std::error::Error for AllocError {}

/// Failures reported by a [`HeapBreak`](crate::HeapBreak) backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakError {
  /// The break cannot move up by the requested amount.
  Exhausted,
  /// The break cannot move below the start of the heap.
  Underflow,
}

impl fmt::Display for BreakError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    match self {
      BreakError::Exhausted => write!(f, "program break cannot be extended"),
      BreakError::Underflow => write!(f, "program break moved below heap start"),
    }
  }
}

impl std::error::Error for BreakError {}

impl From<BreakError> for AllocError {
  fn from(
    _: BreakError,
  ) -> Self {
    AllocError::ExhaustedAddressSpace
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_break_errors_surface_as_exhaustion() {
    assert_eq!(AllocError::from(BreakError::Exhausted), AllocError::ExhaustedAddressSpace);
    assert_eq!(AllocError::from(BreakError::Underflow), AllocError::ExhaustedAddressSpace);
  }

  #[test]
  fn test_display() {
    assert_eq!(AllocError::ZeroSizeRequest.to_string(), "zero-size allocation request");
    assert_eq!(BreakError::Exhausted.to_string(), "program break cannot be extended");
  }
}
