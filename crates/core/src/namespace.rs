//! Comment thread namespaces and document path layout.
//!
//! Video comments and announcement comments share one document shape and
//! one set of rules. They differ only in the root collection that owns the
//! thread and in the order the top-level page is fetched, so both are
//! described by a [`ThreadNamespace`] value rather than by separate types.
//!
//! Layout for a namespace rooted at `videos`:
//!
//! ```text
//! videos/{thread_id}/comments/{comment_id}
//! videos/{thread_id}/comments/{comment_id}/replies/{reply_id}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default root collection for video comment threads.
pub const DEFAULT_VIDEO_ROOT: &str = "videos";

/// Default root collection for announcement comment threads.
pub const DEFAULT_NOTICE_ROOT: &str = "notices";

/// Sub-collection holding a thread's top-level comments.
pub const COMMENTS_COLLECTION: &str = "comments";

/// Sub-collection holding a comment's replies.
pub const REPLIES_COLLECTION: &str = "replies";

/// Field every comment and reply query is ordered by.
pub const CREATED_AT_FIELD: &str = "createdAt";

// ---------------------------------------------------------------------------
// Sort direction
// ---------------------------------------------------------------------------

/// Ordering applied to a query's `order_by` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

// ---------------------------------------------------------------------------
// Content source
// ---------------------------------------------------------------------------

/// Which kind of document owns a comment thread.
///
/// The wire values (`video`, `notice`) are stored on reports and read by the
/// admin tooling, so they must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    Video,
    Notice,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Notice => "notice",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "video" => Ok(Self::Video),
            "notice" => Ok(Self::Notice),
            other => Err(CoreError::Validation(format!(
                "Invalid content source '{other}'. Must be one of: video, notice"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ThreadNamespace
// ---------------------------------------------------------------------------

/// Configuration that distinguishes one family of comment threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadNamespace {
    /// Which source this namespace serves; recorded on reports.
    pub source: ContentSource,
    /// Root collection that owns the threads (e.g. `videos`).
    pub root_collection: String,
    /// Order of the top-level comment page. Replies are always ascending.
    pub comment_order: SortDirection,
}

impl ThreadNamespace {
    /// Video threads: newest comments first.
    pub fn video(root_collection: impl Into<String>) -> Self {
        Self {
            source: ContentSource::Video,
            root_collection: root_collection.into(),
            comment_order: SortDirection::Descending,
        }
    }

    /// Announcement threads: oldest comments first.
    pub fn announcement(root_collection: impl Into<String>) -> Self {
        Self {
            source: ContentSource::Notice,
            root_collection: root_collection.into(),
            comment_order: SortDirection::Ascending,
        }
    }

    /// Collection path of a thread's top-level comments.
    pub fn comments_collection(&self, thread_id: &str) -> String {
        format!("{}/{thread_id}/{COMMENTS_COLLECTION}", self.root_collection)
    }

    /// Document path of one top-level comment.
    pub fn comment_path(&self, thread_id: &str, comment_id: &str) -> String {
        format!("{}/{comment_id}", self.comments_collection(thread_id))
    }

    /// Collection path of a comment's replies.
    pub fn replies_collection(&self, thread_id: &str, comment_id: &str) -> String {
        format!(
            "{}/{REPLIES_COLLECTION}",
            self.comment_path(thread_id, comment_id)
        )
    }

    /// Document path of one reply.
    pub fn reply_path(&self, thread_id: &str, comment_id: &str, reply_id: &str) -> String {
        format!("{}/{reply_id}", self.replies_collection(thread_id, comment_id))
    }
}

impl Default for ThreadNamespace {
    fn default() -> Self {
        Self::video(DEFAULT_VIDEO_ROOT)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_namespace_is_newest_first() {
        let ns = ThreadNamespace::video("videos");
        assert_eq!(ns.source, ContentSource::Video);
        assert_eq!(ns.comment_order, SortDirection::Descending);
    }

    #[test]
    fn announcement_namespace_is_oldest_first() {
        let ns = ThreadNamespace::announcement("notices");
        assert_eq!(ns.source, ContentSource::Notice);
        assert_eq!(ns.comment_order, SortDirection::Ascending);
    }

    #[test]
    fn paths_nest_replies_under_comment() {
        let ns = ThreadNamespace::video("videos");
        assert_eq!(ns.comments_collection("v1"), "videos/v1/comments");
        assert_eq!(ns.comment_path("v1", "c1"), "videos/v1/comments/c1");
        assert_eq!(
            ns.replies_collection("v1", "c1"),
            "videos/v1/comments/c1/replies"
        );
        assert_eq!(
            ns.reply_path("v1", "c1", "r1"),
            "videos/v1/comments/c1/replies/r1"
        );
    }

    #[test]
    fn content_source_wire_values() {
        assert_eq!(ContentSource::Video.as_str(), "video");
        assert_eq!(ContentSource::Notice.as_str(), "notice");
        assert_eq!(ContentSource::parse("notice").unwrap(), ContentSource::Notice);
        assert!(ContentSource::parse("announcement").is_err());
    }

    #[test]
    fn content_source_serializes_as_wire_value() {
        let json = serde_json::to_value(ContentSource::Notice).unwrap();
        assert_eq!(json, serde_json::json!("notice"));
    }
}
