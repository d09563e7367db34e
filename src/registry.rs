use crate::block::Block;

/// Every block carved from the heap, in carve order.
///
/// The list is forward-only and threaded through the headers themselves; the
/// registry only remembers the two ends.
#[derive(Debug, Default)]
pub(crate) struct Registry {
  head: Option<Block>,
  tail: Option<Block>,
}

impl Registry {
  pub(crate) const fn new() -> Self {
    Self {
      head: None,
      tail: None,
    }
  }

  #[cfg(test)]
  pub(crate) fn head(
    &self,
  ) -> Option<Block> {
    self.head
  }

  pub(crate) fn tail(
    &self,
  ) -> Option<Block> {
    self.tail
  }

  pub(crate) fn is_empty(
    &self,
  ) -> bool {
    self.head.is_none()
  }

  /// First free block, in carve order, able to hold `size` bytes.
  pub(crate) fn find_first_fit(
    &self,
    size: usize,
  ) -> Option<Block> {
    self.iter().find(|block| block.is_free() && block.size() >= size)
  }

  /// Links a freshly carved block after the current tail.
  pub(crate) fn append(
    &mut self,
    block: Block,
  ) {
    block.set_next(None);

    match self.tail {
      Some(tail) => tail.set_next(Some(block)),
      None => self.head = Some(block),
    }
    self.tail = Some(block);
  }

  /// Detaches the tail block and returns it.
  ///
  /// Finding the new tail walks the whole list from the head.
  pub(crate) fn unlink_tail(
    &mut self,
  ) -> Option<Block> {
    let tail = self.tail?;

    if self.head == Some(tail) {
      self.head = None;
      self.tail = None;
      return Some(tail);
    }

    let mut current = self.head?;
    while let Some(next) = current.next() {
      if next == tail {
        break;
      }
      current = next;
    }

    current.set_next(None);
    self.tail = Some(current);
    Some(tail)
  }

  pub(crate) fn iter(
    &self,
  ) -> Iter {
    Iter { next: self.head }
  }
}

pub(crate) struct Iter {
  next: Option<Block>,
}

impl Iterator for Iter {
  type Item = Block;

  fn next(
    &mut self,
  ) -> Option<Block> {
    let current = self.next?;
    self.next = current.next();
    Some(current)
  }
}
