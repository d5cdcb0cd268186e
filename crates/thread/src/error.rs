use coak_core::error::CoreError;
use coak_db::StoreError;
use serde::Serialize;

/// Session-level error type.
///
/// Wraps [`CoreError`] for local validation and permission failures and
/// [`StoreError`] for gateway failures, and adds the two conditions that only
/// exist at the session boundary.
#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    /// A domain-level error from `coak_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A gateway or repository error from `coak_db`.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The text matched the banned-word list; nothing was sent to the store.
    #[error("Content contains banned word '{word}'")]
    BannedWordBlocked { word: String },

    /// Exactly one of the two report-resolution steps succeeded.
    #[error("Report {report_id} partially resolved (completed: {report_completed}, hidden: {content_hidden}): {message}")]
    PartialModerationFailure {
        report_id: String,
        report_completed: bool,
        content_hidden: bool,
        message: String,
    },
}

/// Convenience alias for session operations.
pub type ThreadResult<T> = Result<T, ThreadError>;

/// Coarse error classification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Forbidden,
    Backend,
    BannedWordBlocked,
    PartialModerationFailure,
}

impl ThreadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ThreadError::Core(core) => match core {
                CoreError::NotFound { .. } => ErrorKind::NotFound,
                CoreError::Validation(_) => ErrorKind::Validation,
                CoreError::Forbidden(_) => ErrorKind::Forbidden,
                CoreError::Internal(_) => ErrorKind::Backend,
            },
            ThreadError::Store(StoreError::NotFound { .. }) => ErrorKind::NotFound,
            ThreadError::Store(_) => ErrorKind::Backend,
            ThreadError::BannedWordBlocked { .. } => ErrorKind::BannedWordBlocked,
            ThreadError::PartialModerationFailure { .. } => ErrorKind::PartialModerationFailure,
        }
    }
}

/// A user-visible message produced from a failed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ThreadError> for Notice {
    fn from(err: &ThreadError) -> Self {
        let message = match err {
            ThreadError::Core(CoreError::NotFound { entity, .. }) => {
                format!("The {entity} no longer exists.")
            }
            ThreadError::Core(CoreError::Validation(msg))
            | ThreadError::Core(CoreError::Forbidden(msg)) => msg.clone(),
            ThreadError::Core(CoreError::Internal(_)) => "An internal error occurred.".to_string(),
            ThreadError::Store(StoreError::NotFound { .. }) => {
                "The item no longer exists.".to_string()
            }
            ThreadError::Store(StoreError::CounterUpdate { .. }) => {
                "Saved, but the reply count may be out of date.".to_string()
            }
            ThreadError::Store(_) => "Could not reach the server. Please try again.".to_string(),
            ThreadError::BannedWordBlocked { .. } => {
                "Your text contains a word that is not allowed.".to_string()
            }
            ThreadError::PartialModerationFailure {
                report_completed,
                content_hidden,
                ..
            } => match (*report_completed, *content_hidden) {
                (true, false) => {
                    "The report was closed but the content is still visible.".to_string()
                }
                _ => "The content was hidden but the report is still pending.".to_string(),
            },
        };

        Notice {
            kind: err.kind(),
            message,
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
    fn classifies_core_errors() {
        let err = ThreadError::from(CoreError::Validation("empty".into()));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = ThreadError::from(CoreError::Forbidden("nope".into()));
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = ThreadError::from(CoreError::NotFound {
            entity: "comment",
            id: "c1".into(),
        });
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn classifies_store_errors() {
        let err = ThreadError::from(StoreError::NotFound {
            path: "videos/v1/comments/c1".into(),
        });
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = ThreadError::from(StoreError::CounterUpdate {
            path: "videos/v1/comments/c1".into(),
            delta: 1,
            source: Box::new(StoreError::Backend("offline".into())),
        });
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[test]
    fn banned_word_notice_does_not_echo_the_word() {
        let err = ThreadError::BannedWordBlocked {
            word: "spam".into(),
        };
        let notice = Notice::from(&err);
        assert_eq!(notice.kind, ErrorKind::BannedWordBlocked);
        assert!(!notice.message.contains("spam"));
    }

    #[test]
    fn validation_notice_keeps_message() {
        let err = ThreadError::from(CoreError::Validation(
            "Comment content must not be empty".into(),
        ));
        assert_eq!(
            Notice::from(&err).message,
            "Comment content must not be empty"
        );
    }

    #[test]
    fn partial_failure_notice_names_the_missing_step() {
        let err = ThreadError::PartialModerationFailure {
            report_id: "r1".into(),
            report_completed: true,
            content_hidden: false,
            message: "offline".into(),
        };
        let notice = Notice::from(&err);
        assert_eq!(notice.kind, ErrorKind::PartialModerationFailure);
        assert!(notice.message.contains("still visible"));
    }
}
