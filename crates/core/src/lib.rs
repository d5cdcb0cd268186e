//! `coak-core`: pure domain logic for comment threads and moderation.
//!
//! Nothing in this crate performs I/O. The repository layer (`coak-db`) and
//! the thread session (`coak-thread`) build on these types and rules.

pub mod banned_words;
pub mod comment;
pub mod error;
pub mod namespace;
pub mod report;
pub mod types;
pub mod visibility;
