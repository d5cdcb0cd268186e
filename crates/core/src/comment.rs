//! Comment and reply constants and content validation.
//!
//! Shared by the repository layer and the thread session for both video
//! and announcement threads.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of top-level comments fetched per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Maximum length of comment or reply content, in characters, after trimming.
pub const MAX_CONTENT_LENGTH: usize = 1000;

/// Text shown in place of content removed by moderation.
pub const HIDDEN_PLACEHOLDER: &str = "This comment was hidden by an administrator.";

/// Text shown in place of a secret comment the viewer may not read.
pub const SECRET_PLACEHOLDER: &str = "This is a secret comment.";

// ---------------------------------------------------------------------------
// Content validation
// ---------------------------------------------------------------------------

#[derive(Debug, Validate)]
struct ContentInput {
    #[validate(length(min = 1, max = 1000))]
    content: String,
}

/// Trim `raw` and validate it as comment or reply content.
///
/// Returns the trimmed text. Empty (after trimming) or over-long content is
/// rejected with [`CoreError::Validation`].
pub fn validate_content(raw: &str) -> Result<String, CoreError> {
    let content = raw.trim().to_string();
    if content.is_empty() {
        return Err(CoreError::Validation(
            "Comment content must not be empty".to_string(),
        ));
    }

    let input = ContentInput { content };
    input.validate().map_err(|_| {
        CoreError::Validation(format!(
            "Comment content exceeds maximum length of {MAX_CONTENT_LENGTH} characters"
        ))
    })?;

    Ok(input.content)
}

// ---------------------------------------------------------------------------
// Reply delete policy
// ---------------------------------------------------------------------------

/// What happens to a comment's replies when the comment is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyDeletePolicy {
    /// Only the comment document is removed; its replies stay in the store,
    /// unreachable from the thread but still fetchable by id.
    #[default]
    Orphan,
    /// Every reply document is removed before the comment itself.
    Cascade,
}

impl ReplyDeletePolicy {
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "orphan" => Ok(Self::Orphan),
            "cascade" => Ok(Self::Cascade),
            other => Err(CoreError::Validation(format!(
                "Invalid reply delete policy '{other}'. Must be one of: orphan, cascade"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_trimmed() {
        assert_eq!(validate_content("  hello \n").unwrap(), "hello");
    }

    #[test]
    fn empty_content_rejected() {
        assert!(validate_content("").is_err());
        assert!(validate_content("   \t\n").is_err());
    }

    #[test]
    fn content_at_limit_accepted() {
        let text = "가".repeat(MAX_CONTENT_LENGTH);
        assert!(validate_content(&text).is_ok());
    }

    #[test]
    fn content_over_limit_rejected() {
        let text = "a".repeat(MAX_CONTENT_LENGTH + 1);
        let err = validate_content(&text).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }

    #[test]
    fn reply_delete_policy_parse() {
        assert_eq!(ReplyDeletePolicy::parse("orphan").unwrap(), ReplyDeletePolicy::Orphan);
        assert_eq!(ReplyDeletePolicy::parse("cascade").unwrap(), ReplyDeletePolicy::Cascade);
        assert!(ReplyDeletePolicy::parse("purge").is_err());
        assert_eq!(ReplyDeletePolicy::default(), ReplyDeletePolicy::Orphan);
    }
}
