//! Record decoding module
//!
//! Typed decoding of loosely shaped API items, with named fallback sources
//! for fields that different endpoints spell differently.
//!
//! # Overview
//!
//! - `fields` - dot-path lookup and first-non-null readers
//! - `rows` - typed record shapes written to the output logs
//! - `normalizers` - per-resource item to record conversion

mod fields;
pub mod normalizers;
mod rows;

pub use fields::{as_u64_lenient, cloned, first, first_string, first_u32, first_u64, lookup};
pub use normalizers::Normalizer;
pub use rows::{
    RecitationRow, ScopedPayload, VerseRow, VerseTextRow, VerseTimestampRow, WordRow,
    WordSegmentRow,
};
