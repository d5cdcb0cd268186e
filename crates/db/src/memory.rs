//! In-memory store gateways.
//!
//! [`MemoryStore`] and [`MemoryBlobStore`] implement the gateway contracts
//! entirely in process. They back the integration tests and the
//! `coak-inspect` tool, and support injected failures plus a call counter so
//! callers can assert that an action never reached the store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::blob::BlobStore;
use crate::error::StoreError;
use crate::gateway::{compare_values, split_path, Document, DocumentStore, Fields, Query};
use coak_core::namespace::SortDirection;

// ---------------------------------------------------------------------------
// Failure injection
// ---------------------------------------------------------------------------

/// Store operation kinds, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Query,
    Set,
    Update,
    Delete,
    Increment,
}

#[derive(Debug)]
struct FailureRule {
    op: StoreOp,
    path_prefix: Option<String>,
    /// `None` fails forever; `Some(n)` fails the next `n` matching calls.
    remaining: Option<usize>,
}

impl FailureRule {
    fn matches(&self, op: StoreOp, path: &str) -> bool {
        self.op == op
            && self
                .path_prefix
                .as_deref()
                .map_or(true, |prefix| path.starts_with(prefix))
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Seed data for the in-memory gateways.
///
/// ```json
/// {
///   "documents": { "videos/v1/comments/c1": { "content": "hi", ... } },
///   "blobs": { "moderation/banned_words.json": { "words": ["spam"] } }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub documents: BTreeMap<String, Fields>,
    #[serde(default)]
    pub blobs: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Inner {
    /// collection path -> document id -> fields
    collections: HashMap<String, BTreeMap<String, Fields>>,
    failures: Vec<FailureRule>,
}

impl Inner {
    fn check_failure(&mut self, op: StoreOp, path: &str) -> Result<(), StoreError> {
        let Some(index) = self.failures.iter().position(|r| r.matches(op, path)) else {
            return Ok(());
        };

        let rule = &mut self.failures[index];
        if let Some(remaining) = rule.remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                self.failures.remove(index);
            }
        }

        Err(StoreError::Backend(format!(
            "injected {op:?} failure at '{path}'"
        )))
    }
}

/// Process-local [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `documents`, keyed by full path.
    pub fn from_documents(documents: BTreeMap<String, Fields>) -> Result<Self, StoreError> {
        let mut inner = Inner::default();
        for (path, fields) in documents {
            let (collection, id) = split_path(&path)?;
            inner
                .collections
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
        }
        Ok(Self {
            inner: Mutex::new(inner),
            calls: AtomicUsize::new(0),
        })
    }

    /// Fail every future `op` whose path starts with `path_prefix`.
    pub async fn fail_on(&self, op: StoreOp, path_prefix: Option<&str>) {
        self.push_rule(op, path_prefix, None).await;
    }

    /// Fail only the next matching `op`.
    pub async fn fail_once(&self, op: StoreOp, path_prefix: Option<&str>) {
        self.push_rule(op, path_prefix, Some(1)).await;
    }

    pub async fn clear_failures(&self) {
        self.inner.lock().await.failures.clear();
    }

    /// Total gateway calls made so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    /// Number of documents directly under `collection`.
    pub async fn document_count(&self, collection: &str) -> usize {
        self.inner
            .lock()
            .await
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    async fn push_rule(&self, op: StoreOp, path_prefix: Option<&str>, remaining: Option<usize>) {
        self.inner.lock().await.failures.push(FailureRule {
            op,
            path_prefix: path_prefix.map(str::to_string),
            remaining,
        });
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }
}

fn document(collection: &str, id: &str, fields: &Fields) -> Document {
    Document {
        id: id.to_string(),
        path: format!("{collection}/{id}"),
        fields: fields.clone(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        self.record_call();
        let mut inner = self.inner.lock().await;
        inner.check_failure(StoreOp::Get, path)?;

        let (collection, id) = split_path(path)?;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| document(collection, id, fields)))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.record_call();
        let mut inner = self.inner.lock().await;
        inner.check_failure(StoreOp::Query, collection)?;

        let Some(docs) = inner.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<(&String, &Fields, &Value)> = docs
            .iter()
            .filter_map(|(id, fields)| fields.get(&query.order_by).map(|v| (id, fields, v)))
            .collect();

        let ordering = |a_value: &Value, a_id: &str, b_value: &Value, b_id: &str| {
            let ord = compare_values(a_value, b_value).then_with(|| a_id.cmp(b_id));
            match query.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        };

        rows.sort_by(|a, b| ordering(a.2, a.0.as_str(), b.2, b.0.as_str()));

        let start = match &query.start_after {
            Some(cursor) => rows
                .iter()
                .position(|&(id, _, value)| {
                    ordering(value, id.as_str(), cursor.order_value(), cursor.document_id())
                        .is_gt()
                })
                .unwrap_or(rows.len()),
            None => 0,
        };

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(start)
            .take(limit)
            .map(|(id, fields, _)| document(collection, id, fields))
            .collect())
    }

    async fn set(&self, path: &str, data: Fields, merge: bool) -> Result<(), StoreError> {
        self.record_call();
        let mut inner = self.inner.lock().await;
        inner.check_failure(StoreOp::Set, path)?;

        let (collection, id) = split_path(path)?;
        let docs = inner.collections.entry(collection.to_string()).or_default();
        match docs.get_mut(id) {
            Some(existing) if merge => existing.extend(data),
            _ => {
                docs.insert(id.to_string(), data);
            }
        }
        Ok(())
    }

    async fn update(&self, path: &str, fields: Fields) -> Result<(), StoreError> {
        self.record_call();
        let mut inner = self.inner.lock().await;
        inner.check_failure(StoreOp::Update, path)?;

        let (collection, id) = split_path(path)?;
        let existing = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })?;
        existing.extend(fields);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<bool, StoreError> {
        self.record_call();
        let mut inner = self.inner.lock().await;
        inner.check_failure(StoreOp::Delete, path)?;

        let (collection, id) = split_path(path)?;
        let removed = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        Ok(removed)
    }

    async fn increment(&self, path: &str, field: &str, delta: i64) -> Result<(), StoreError> {
        self.record_call();
        let mut inner = self.inner.lock().await;
        inner.check_failure(StoreOp::Increment, path)?;

        let (collection, id) = split_path(path)?;
        let existing = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })?;

        let current = existing.get(field).and_then(Value::as_i64).unwrap_or(0);
        existing.insert(field.to_string(), Value::from(current + delta));
        Ok(())
    }

    fn new_id(&self, _collection: &str) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

// ---------------------------------------------------------------------------
// MemoryBlobStore
// ---------------------------------------------------------------------------

/// Process-local [`BlobStore`].
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    fail_fetch: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a blob store from JSON values, each stored as its serialized bytes.
    pub fn from_json(blobs: BTreeMap<String, Value>) -> Self {
        let objects = blobs
            .into_iter()
            .map(|(path, value)| (path, value.to_string().into_bytes()))
            .collect();
        Self {
            objects: Mutex::new(objects),
            ..Self::default()
        }
    }

    pub async fn put(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects.lock().await.insert(path.into(), bytes.into());
    }

    /// Make every subsequent fetch fail (or succeed again).
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn fetch(&self, path: &str, max_size_bytes: usize) -> Result<Vec<u8>, StoreError> {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.fail_fetch.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Backend(format!(
                "injected fetch failure at '{path}'"
            )));
        }

        let objects = self.objects.lock().await;
        let bytes = objects.get(path).ok_or_else(|| StoreError::NotFound {
            path: path.to_string(),
        })?;

        if bytes.len() > max_size_bytes {
            return Err(StoreError::ObjectTooLarge {
                path: path.to_string(),
                size: bytes.len(),
                max: max_size_bytes,
            });
        }

        Ok(bytes.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
