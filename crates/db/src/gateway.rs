//! Document store gateway contract.
//!
//! The hosted document database is an external collaborator. Everything the
//! repositories need from it is expressed by [`DocumentStore`]: keyed
//! reads and writes over a `collection/doc/collection/doc` path namespace,
//! ordered paginated queries, and an atomic counter increment.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use coak_core::namespace::SortDirection;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::StoreError;

/// Field map of one stored document.
pub type Fields = serde_json::Map<String, Value>;

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A document read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Last path segment.
    pub id: String,
    /// Full document path.
    pub path: String,
    pub fields: Fields,
}

impl Document {
    /// Deserialize the document's fields into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|e| {
            StoreError::Decode {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })
    }
}

/// Serialize `value` into a field map.
pub fn to_fields<T: serde::Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Backend(format!(
            "Expected a JSON object for document fields, got {other}"
        ))),
        Err(e) => Err(StoreError::Backend(format!("Failed to encode document: {e}"))),
    }
}

/// Split a document path into its parent collection path and document id.
pub fn split_path(path: &str) -> Result<(&str, &str), StoreError> {
    match path.rsplit_once('/') {
        Some((collection, id)) if !collection.is_empty() && !id.is_empty() => {
            Ok((collection, id))
        }
        _ => Err(StoreError::Backend(format!("Invalid document path '{path}'"))),
    }
}

// ---------------------------------------------------------------------------
// Cursor & Query
// ---------------------------------------------------------------------------

/// Opaque query position: "start after this document".
///
/// Captures the document's value for the query's order field plus its id,
/// which breaks ties between equal order values.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    order_value: Value,
    document_id: String,
}

impl Cursor {
    pub fn new(order_value: Value, document_id: impl Into<String>) -> Self {
        Self {
            order_value,
            document_id: document_id.into(),
        }
    }

    /// Cursor positioned at `doc` for a query ordered by `order_by`.
    pub fn at(doc: &Document, order_by: &str) -> Self {
        Self::new(
            doc.fields.get(order_by).cloned().unwrap_or(Value::Null),
            doc.id.clone(),
        )
    }

    pub fn order_value(&self) -> &Value {
        &self.order_value
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }
}

/// An ordered query over one collection, optionally limited and resumed
/// after a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub order_by: String,
    pub direction: SortDirection,
    pub limit: Option<usize>,
    pub start_after: Option<Cursor>,
}

impl Query {
    pub fn ordered_by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            order_by: field.into(),
            direction,
            limit: None,
            start_after: None,
        }
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, cursor: Option<Cursor>) -> Self {
        self.start_after = cursor;
        self
    }
}

/// Total order over field values used for `order_by`.
///
/// Values of different kinds order as null < bool < number < string <
/// anything else. Two strings that both parse as RFC 3339 timestamps are
/// compared as instants.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => {
            match (
                DateTime::<FixedOffset>::parse_from_rfc3339(x),
                DateTime::<FixedOffset>::parse_from_rfc3339(y),
            ) {
                (Ok(tx), Ok(ty)) => tx.cmp(&ty),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}

// ---------------------------------------------------------------------------
// DocumentStore
// ---------------------------------------------------------------------------

/// Generic CRUD and ordered-query access to the hosted document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read one document; `None` if it does not exist.
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError>;

    /// Run an ordered query over the direct children of `collection`.
    ///
    /// Documents lacking the `order_by` field are not returned.
    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Write a document. With `merge`, only the given fields are replaced.
    async fn set(&self, path: &str, data: Fields, merge: bool) -> Result<(), StoreError>;

    /// Partially update an existing document. Fails with
    /// [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, path: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document and report whether it existed. Deleting an absent
    /// document succeeds with `false`. Child collections are not touched.
    async fn delete(&self, path: &str) -> Result<bool, StoreError>;

    /// Atomically add `delta` to the integer `field` of an existing
    /// document (a missing field counts as zero).
    async fn increment(&self, path: &str, field: &str, delta: i64) -> Result<(), StoreError>;

    /// Allocate a fresh document id within `collection`.
    fn new_id(&self, collection: &str) -> String;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn split_path_separates_collection_and_id() {
        let (collection, id) = split_path("videos/v1/comments/c1").unwrap();
        assert_eq!(collection, "videos/v1/comments");
        assert_eq!(id, "c1");
    }

    #[test]
    fn split_path_rejects_bare_segment() {
        assert!(split_path("videos").is_err());
        assert!(split_path("videos/").is_err());
    }

    #[test]
    fn timestamps_compare_as_instants() {
        // Different fractional precision would mis-order lexicographically.
        let a = json!("2024-01-01T00:00:00.5Z");
        let b = json!("2024-01-01T00:00:00.25+00:00");
        assert_eq!(compare_values(&a, &b), Ordering::Greater);
    }

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(compare_values(&json!(9), &json!(10)), Ordering::Less);
    }

    #[test]
    fn mixed_kinds_use_rank() {
        assert_eq!(compare_values(&Value::Null, &json!(false)), Ordering::Less);
        assert_eq!(compare_values(&json!(1), &json!("a")), Ordering::Less);
    }

    #[test]
    fn cursor_captures_order_value() {
        let mut fields = Fields::new();
        fields.insert("createdAt".into(), json!("2024-01-01T00:00:00Z"));
        let doc = Document {
            id: "c1".into(),
            path: "videos/v1/comments/c1".into(),
            fields,
        };
        let cursor = Cursor::at(&doc, "createdAt");
        assert_eq!(cursor.document_id(), "c1");
        assert_eq!(cursor.order_value(), &json!("2024-01-01T00:00:00Z"));
    }
}
