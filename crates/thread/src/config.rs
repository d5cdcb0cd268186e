use std::str::FromStr;
use std::sync::Arc;

use coak_core::comment::{ReplyDeletePolicy, DEFAULT_PAGE_SIZE};
use coak_core::error::CoreError;
use coak_core::namespace::{ContentSource, ThreadNamespace, DEFAULT_NOTICE_ROOT, DEFAULT_VIDEO_ROOT};
use coak_db::repositories::banned_word_repo::{
    DEFAULT_BANNED_WORDS_MAX_BYTES, DEFAULT_BANNED_WORDS_PATH,
};
use coak_db::repositories::report_repo::DEFAULT_REPORTS_COLLECTION;
use coak_db::repositories::{BannedWordRepo, CommentRepo, ReportRepo};
use coak_db::{BlobStore, DocumentStore};

/// Thread-session configuration loaded from environment variables.
///
/// All fields default to the production layout of the document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Comments per page (default: `10`).
    pub page_size: usize,
    /// Root collection of video threads (default: `videos`).
    pub video_root: String,
    /// Root collection of announcement threads (default: `notices`).
    pub notice_root: String,
    /// Collection holding reports (default: `reports`).
    pub reports_collection: String,
    /// Blob path of the banned-word list.
    pub banned_words_path: String,
    /// Download limit for the banned-word list, in bytes.
    pub banned_words_max_bytes: usize,
    /// Whether deleting a comment also deletes its replies (default: orphan).
    pub reply_delete_policy: ReplyDeletePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            video_root: DEFAULT_VIDEO_ROOT.to_string(),
            notice_root: DEFAULT_NOTICE_ROOT.to_string(),
            reports_collection: DEFAULT_REPORTS_COLLECTION.to_string(),
            banned_words_path: DEFAULT_BANNED_WORDS_PATH.to_string(),
            banned_words_max_bytes: DEFAULT_BANNED_WORDS_MAX_BYTES,
            reply_delete_policy: ReplyDeletePolicy::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                        |
    /// |-------------------------------|--------------------------------|
    /// | `COAK_PAGE_SIZE`              | `10`                           |
    /// | `COAK_VIDEO_ROOT`             | `videos`                       |
    /// | `COAK_NOTICE_ROOT`            | `notices`                      |
    /// | `COAK_REPORTS_COLLECTION`     | `reports`                      |
    /// | `COAK_BANNED_WORDS_PATH`      | `moderation/banned_words.json` |
    /// | `COAK_BANNED_WORDS_MAX_BYTES` | `1048576`                      |
    /// | `COAK_REPLY_DELETE_POLICY`    | `orphan`                       |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let page_size: usize = parse_var(&lookup, "COAK_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 {
            return Err(CoreError::Validation(
                "COAK_PAGE_SIZE must be at least 1".to_string(),
            ));
        }

        let banned_words_max_bytes = parse_var(
            &lookup,
            "COAK_BANNED_WORDS_MAX_BYTES",
            defaults.banned_words_max_bytes,
        )?;

        let reply_delete_policy = match lookup("COAK_REPLY_DELETE_POLICY") {
            Some(raw) => ReplyDeletePolicy::parse(raw.trim())?,
            None => defaults.reply_delete_policy,
        };

        Ok(Self {
            page_size,
            video_root: lookup("COAK_VIDEO_ROOT").unwrap_or(defaults.video_root),
            notice_root: lookup("COAK_NOTICE_ROOT").unwrap_or(defaults.notice_root),
            reports_collection: lookup("COAK_REPORTS_COLLECTION")
                .unwrap_or(defaults.reports_collection),
            banned_words_path: lookup("COAK_BANNED_WORDS_PATH")
                .unwrap_or(defaults.banned_words_path),
            banned_words_max_bytes,
            reply_delete_policy,
        })
    }

    /// Namespace of `source` threads under this configuration.
    pub fn namespace(&self, source: ContentSource) -> ThreadNamespace {
        match source {
            ContentSource::Video => ThreadNamespace::video(self.video_root.clone()),
            ContentSource::Notice => ThreadNamespace::announcement(self.notice_root.clone()),
        }
    }

    /// Comment repository for `source` threads.
    pub fn comment_repo(&self, store: Arc<dyn DocumentStore>, source: ContentSource) -> CommentRepo {
        CommentRepo::new(store, self.namespace(source))
            .with_page_size(self.page_size)
            .with_delete_policy(self.reply_delete_policy)
    }

    pub fn report_repo(&self, store: Arc<dyn DocumentStore>) -> ReportRepo {
        ReportRepo::new(store, self.reports_collection.clone())
    }

    pub fn banned_word_repo(&self, blobs: Arc<dyn BlobStore>) -> BannedWordRepo {
        BannedWordRepo::new(
            blobs,
            self.banned_words_path.clone(),
            self.banned_words_max_bytes,
        )
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, CoreError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            CoreError::Validation(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
        None => Ok(default),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
