//! Page window and ordering for user listings.

/// Order over the normalized user name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Sort {
    #[default]
    Asc,
    Desc,
}

pub const MAX_PAGE_SIZE: u32 = 100;

/// One-based page of at most [`MAX_PAGE_SIZE`] rows.
///
/// Fields are private so every window is already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 25)
    }
}

impl PageRequest {
    /// Page numbers below 1 become 1; sizes are clamped to 1..=MAX_PAGE_SIZE.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(self) -> u32 {
        self.page
    }

    /// Rows to skip before this page.
    pub fn offset(self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    pub fn limit(self) -> u64 {
        u64::from(self.size)
    }
}
