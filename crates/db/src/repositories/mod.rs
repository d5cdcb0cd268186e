//! Repository layer.
//!
//! Each repository wraps a shared gateway handle and exposes async
//! operations returning [`StoreError`](crate::StoreError).

pub mod banned_word_repo;
pub mod comment_repo;
pub mod report_repo;

pub use banned_word_repo::BannedWordRepo;
pub use comment_repo::{CommentRepo, Page};
pub use report_repo::ReportRepo;
