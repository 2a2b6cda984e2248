//! Pagination module
//!
//! Page-number pagination driven by the envelope's reported page count.

mod paginator;
mod types;

pub use paginator::{PageNumberPaginator, DEFAULT_PER_PAGE};
pub use types::{total_pages, NextPage};
