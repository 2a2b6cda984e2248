//! Page-number paginator

use super::types::{total_pages, NextPage};
use crate::types::QueryPairs;
use serde_json::Value;

/// Default page size
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Page-number paginator
///
/// Stops on an empty page or once the reported last page is reached. When
/// the envelope carries no `total_pages`, the current page is the last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNumberPaginator {
    /// Query parameter name for page number
    pub page_param: String,
    /// Query parameter name for page size
    pub page_size_param: String,
    /// Page size value
    pub page_size: u32,
}

impl Default for PageNumberPaginator {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

impl PageNumberPaginator {
    /// Create a paginator with the standard parameter names
    pub fn new(page_size: u32) -> Self {
        Self {
            page_param: "page".to_string(),
            page_size_param: "per_page".to_string(),
            page_size: page_size.max(1),
        }
    }

    /// Query pairs for `page`, appended after the unit's own parameters
    pub fn params(&self, base: &[(String, String)], page: u32) -> QueryPairs {
        let mut query = base.to_vec();
        query.push((self.page_param.clone(), page.to_string()));
        query.push((self.page_size_param.clone(), self.page_size.to_string()));
        query
    }

    /// Decide what follows `page`, which yielded `records_count` items
    pub fn next(&self, body: &Value, page: u32, records_count: usize) -> NextPage {
        if records_count == 0 {
            return NextPage::Done;
        }

        let last = total_pages(body).unwrap_or(page);
        if page >= last {
            NextPage::Done
        } else {
            NextPage::Continue(page + 1)
        }
    }
}
