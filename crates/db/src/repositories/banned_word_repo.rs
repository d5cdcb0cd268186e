//! Loads the banned-word list from blob storage.

use std::sync::Arc;

use coak_core::banned_words::BannedWordList;

use crate::blob::BlobStore;
use crate::error::StoreError;

/// Default blob path of the banned-word list.
pub const DEFAULT_BANNED_WORDS_PATH: &str = "moderation/banned_words.json";

/// Default download limit for the banned-word list (1 MiB).
pub const DEFAULT_BANNED_WORDS_MAX_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct BannedWordRepo {
    blobs: Arc<dyn BlobStore>,
    path: String,
    max_bytes: usize,
}

impl BannedWordRepo {
    pub fn new(blobs: Arc<dyn BlobStore>, path: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            blobs,
            path: path.into(),
            max_bytes,
        }
    }

    /// Download and decode the `{ "words": [...] }` list.
    pub async fn fetch(&self) -> Result<BannedWordList, StoreError> {
        let bytes = self.blobs.fetch(&self.path, self.max_bytes).await?;
        let list = BannedWordList::from_json_bytes(&bytes).map_err(|e| StoreError::Decode {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %self.path, count = list.len(), "Loaded banned-word list");
        Ok(list)
    }
}
