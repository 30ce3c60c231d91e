//! Cache keys for paginated reads.

use std::fmt;
use std::num::NonZeroU32;

/// Identifies one page of the employee listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageKey {
  page: u32,
  size: NonZeroU32,
}

impl PageKey {
  pub fn new(page: u32, size: NonZeroU32) -> Self {
    Self { page, size }
  }

  /// Zero-based page index
  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn size(&self) -> u32 {
    self.size.get()
  }

  /// Same page size, different page
  pub fn with_page(&self, page: u32) -> Self {
    Self {
      page,
      size: self.size,
    }
  }
}

impl fmt::Display for PageKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "page {} (size {})", self.page, self.size)
  }
}

/// Which cached pages an invalidation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invalidation {
  /// Every page with this index, regardless of page size
  Page(u32),
  All,
}

impl Invalidation {
  pub fn matches(&self, key: &PageKey) -> bool {
    match self {
      Invalidation::Page(page) => key.page() == *page,
      Invalidation::All => true,
    }
  }
}
