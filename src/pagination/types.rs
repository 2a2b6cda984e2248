//! Pagination types
//!
//! Page-number pagination as used by the content API: `page` and
//! `per_page` query parameters, `pagination.total_pages` in the envelope.

use serde_json::Value;

/// Result of the next page computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// Fetch this page next
    Continue(u32),
    /// No more pages
    Done,
}

/// Read `pagination.total_pages` from an envelope
pub fn total_pages(body: &Value) -> Option<u32> {
    body.get("pagination")?
        .get("total_pages")?
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| n > 0)
}
