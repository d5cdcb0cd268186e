//! Report enums and submission validation.
//!
//! A report points at one comment or reply inside a video or announcement
//! thread. The admin list screen reads `type`, `source`, `reason`,
//! `parentCommentId` and `completed` by exact name and value, so the wire
//! strings defined here are part of the stored format.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Report target type
// ---------------------------------------------------------------------------

/// Whether a report targets a top-level comment or a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Comment,
    Reply,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::Reply => "reply",
        }
    }
}

// ---------------------------------------------------------------------------
// Report reason
// ---------------------------------------------------------------------------

/// The fixed set of reasons a user may pick when reporting content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Abuse,
    HateSpeech,
    SexualContent,
    Misinformation,
    Other,
}

/// All valid reason strings, in display order.
pub const VALID_REASONS: &[&str] = &[
    "spam",
    "abuse",
    "hate_speech",
    "sexual_content",
    "misinformation",
    "other",
];

impl ReportReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spam => "spam",
            Self::Abuse => "abuse",
            Self::HateSpeech => "hate_speech",
            Self::SexualContent => "sexual_content",
            Self::Misinformation => "misinformation",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "spam" => Ok(Self::Spam),
            "abuse" => Ok(Self::Abuse),
            "hate_speech" => Ok(Self::HateSpeech),
            "sexual_content" => Ok(Self::SexualContent),
            "misinformation" => Ok(Self::Misinformation),
            "other" => Ok(Self::Other),
            other => Err(CoreError::Validation(format!(
                "Invalid report reason '{other}'. Must be one of: {}",
                VALID_REASONS.join(", ")
            ))),
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spam => "Spam or advertising",
            Self::Abuse => "Abuse or harassment",
            Self::HateSpeech => "Hate speech",
            Self::SexualContent => "Sexual content",
            Self::Misinformation => "Misinformation",
            Self::Other => "Other",
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Require that the user picked a reason.
pub fn require_reason(reason: Option<ReportReason>) -> Result<ReportReason, CoreError> {
    reason.ok_or_else(|| CoreError::Validation("A report reason must be selected".to_string()))
}

/// Validate the target fields of a report.
///
/// `target_id` must be non-empty and reply reports must carry the id of the
/// owning comment. A parent id on a comment report is ignored.
pub fn validate_target(
    report_type: ReportType,
    target_id: &str,
    parent_comment_id: Option<&str>,
) -> Result<(), CoreError> {
    if target_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "A report must name the reported comment or reply".to_string(),
        ));
    }

    match (report_type, parent_comment_id) {
        (ReportType::Reply, None) => Err(CoreError::Validation(
            "A reply report must include the parent comment id".to_string(),
        )),
        (ReportType::Reply, Some(parent)) if parent.trim().is_empty() => Err(
            CoreError::Validation("A reply report must include the parent comment id".to_string()),
        ),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_valid_reason_parses() {
        for s in VALID_REASONS {
            let reason = ReportReason::parse(s).unwrap();
            assert_eq!(reason.as_str(), *s);
        }
    }

    #[test]
    fn unknown_reason_rejected() {
        let err = ReportReason::parse("boring").unwrap_err();
        assert!(err.to_string().contains("Invalid report reason"));
    }

    #[test]
    fn reason_serializes_as_wire_value() {
        let json = serde_json::to_value(ReportReason::HateSpeech).unwrap();
        assert_eq!(json, serde_json::json!("hate_speech"));
    }

    #[test]
    fn missing_reason_rejected() {
        assert!(require_reason(None).is_err());
        assert_eq!(require_reason(Some(ReportReason::Spam)).unwrap(), ReportReason::Spam);
    }

    #[test]
    fn comment_target_valid() {
        assert!(validate_target(ReportType::Comment, "c1", None).is_ok());
    }

    #[test]
    fn reply_target_requires_parent() {
        assert!(validate_target(ReportType::Reply, "r1", None).is_err());
        assert!(validate_target(ReportType::Reply, "r1", Some("")).is_err());
        assert!(validate_target(ReportType::Reply, "r1", Some("c1")).is_ok());
    }

    #[test]
    fn comment_target_tolerates_parent() {
        assert!(validate_target(ReportType::Comment, "c1", Some("c0")).is_ok());
    }

    #[test]
    fn empty_target_rejected() {
        assert!(validate_target(ReportType::Comment, "  ", None).is_err());
    }
}
