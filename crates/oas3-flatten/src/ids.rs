use std::num::NonZeroU64;

use crate::property::PropertyId;

/// Hands out fresh object identities.
///
/// Owned by whoever builds a property tree and threaded through the build
/// explicitly, so two documents parsed side by side never share a counter.
#[derive(Debug, Clone)]
pub struct IdAllocator {
  first: NonZeroU64,
  next: NonZeroU64,
}

impl IdAllocator {
  #[must_use]
  pub const fn new() -> Self {
    Self::starting_at(NonZeroU64::MIN)
  }

  #[must_use]
  pub const fn starting_at(first: NonZeroU64) -> Self {
    Self { first, next: first }
  }

  /// Returns the next identity and advances the counter.
  ///
  /// # Panics
  ///
  /// Panics once `u64::MAX` identities have been handed out.
  pub fn next_id(&mut self) -> PropertyId {
    let id = self.next;
    self.next = id.checked_add(1).expect("object identity space exhausted");
    PropertyId::from(id)
  }

  /// Number of identities handed out so far.
  #[must_use]
  pub const fn issued(&self) -> u64 {
    self.next.get() - self.first.get()
  }
}

impl Default for IdAllocator {
  fn default() -> Self {
    Self::new()
  }
}
