/// Errors raised by the store gateways and the repositories built on them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {path}")]
    NotFound { path: String },

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Object {path} is {size} bytes, limit is {max}")]
    ObjectTooLarge {
        path: String,
        size: usize,
        max: usize,
    },

    /// The content write succeeded but the follow-up counter update did not,
    /// so the counter at `path` is off by `delta`.
    #[error("Counter update of {delta} on {path} failed: {source}")]
    CounterUpdate {
        path: String,
        delta: i64,
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// True when the target document (or blob) does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
