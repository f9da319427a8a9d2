//! Document-store capability.
//!
//! The marketplace never talks to the backend SDK directly. Everything it
//! needs from the document database is expressed by [`DocumentStore`]:
//! get-by-id, equality query, add, set, field update, delete and batched
//! writes with a hard per-commit ceiling.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;

use crate::{MarketError, Result};

/// A stored document body.
pub type Document = Map<String, Value>;

/// Collections the marketplace touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Profiles,
    Workers,
    Services,
    Ads,
    WorkerReviews,
    ServiceReviews,
    AdReviews,
    Notifications,
    Chats,
    WorkerFavorites,
    ServiceFavorites,
    AdFavorites,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Profiles => "profiles",
            Collection::Workers => "workers",
            Collection::Services => "services",
            Collection::Ads => "ads",
            Collection::WorkerReviews => "workerReviews",
            Collection::ServiceReviews => "serviceReviews",
            Collection::AdReviews => "adReviews",
            Collection::Notifications => "notifications",
            Collection::Chats => "chats",
            Collection::WorkerFavorites => "workerFavorites",
            Collection::ServiceFavorites => "serviceFavorites",
            Collection::AdFavorites => "adFavorites",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One write inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Patch the named fields; dotted paths address nested fields
    Update {
        collection: Collection,
        id: String,
        fields: Vec<(String, Value)>,
    },
    /// Replace the whole document
    Set {
        collection: Collection,
        id: String,
        document: Document,
    },
    Delete { collection: Collection, id: String },
}

impl WriteOp {
    pub fn target(&self) -> (Collection, &str) {
        match self {
            WriteOp::Update { collection, id, .. } | WriteOp::Set { collection, id, .. } | WriteOp::Delete { collection, id } => {
                (*collection, id.as_str())
            }
        }
    }
}

/// An atomic group of writes, bounded by the store's per-commit ceiling.
#[derive(Debug, Clone)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
    limit: usize,
}

impl WriteBatch {
    /// Default hard ceiling of the backend.
    pub const MAX_OPS: usize = 500;

    pub fn new() -> Self {
        Self::with_limit(Self::MAX_OPS)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { ops: Vec::new(), limit }
    }

    fn push(&mut self, op: WriteOp) -> Result<()> {
        if self.ops.len() >= self.limit {
            return Err(MarketError::BatchTooLarge {
                ops: self.ops.len() + 1,
                limit: self.limit,
            });
        }
        self.ops.push(op);
        Ok(())
    }

    pub fn update(&mut self, collection: Collection, id: impl Into<String>, fields: Vec<(String, Value)>) -> Result<()> {
        self.push(WriteOp::Update {
            collection,
            id: id.into(),
            fields,
        })
    }

    pub fn set(&mut self, collection: Collection, id: impl Into<String>, document: Document) -> Result<()> {
        self.push(WriteOp::Set {
            collection,
            id: id.into(),
            document,
        })
    }

    pub fn delete(&mut self, collection: Collection, id: impl Into<String>) -> Result<()> {
        self.push(WriteOp::Delete { collection, id: id.into() })
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

impl Default for WriteBatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Asynchronous access to the document database.
///
/// Implementations must make [`DocumentStore::commit`] all-or-nothing.
pub trait DocumentStore: Send + Sync {
    fn get(&self, collection: Collection, id: &str) -> impl Future<Output = Result<Option<Document>>> + Send;

    /// Documents whose `field` equals `value`, with their ids.
    fn query_eq(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Vec<(String, Document)>>> + Send;

    /// Insert under a generated id and return it.
    fn add(&self, collection: Collection, document: Document) -> impl Future<Output = Result<String>> + Send;

    fn set(&self, collection: Collection, id: &str, document: Document) -> impl Future<Output = Result<()>> + Send;

    /// Patch fields of an existing document. Fails with `NotFound` if it is missing.
    fn update_fields(
        &self,
        collection: Collection,
        id: &str,
        fields: &[(String, Value)],
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete(&self, collection: Collection, id: &str) -> impl Future<Output = Result<()>> + Send;

    fn commit(&self, batch: WriteBatch) -> impl Future<Output = Result<()>> + Send;
}

/// Set `value` at a dotted `path` inside `document`, creating objects on the way.
pub fn set_path(document: &mut Document, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = document;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else { return };
        current = next;
    }
}

/// Read the value at a dotted `path`.
pub fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let value = document.get(head)?;
    match rest {
        None => Some(value),
        Some(rest) => get_path(value.as_object()?, rest),
    }
}

/// Serialize a value into a document body.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(MarketError::Validation(format!("expected an object, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_limit() {
        let mut batch = WriteBatch::with_limit(2);
        batch.delete(Collection::Ads, "a1").unwrap();
        batch.delete(Collection::Ads, "a2").unwrap();
        let err = batch.delete(Collection::Ads, "a3").unwrap_err();
        assert!(matches!(err, MarketError::BatchTooLarge { ops: 3, limit: 2 }));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_set_path_keeps_siblings() {
        let mut doc = json!({"author": {"uid": "u1", "photoURL": "old"}, "title": "Plumber"})
            .as_object()
            .cloned()
            .unwrap();
        set_path(&mut doc, "author.photoURL", json!("new"));
        assert_eq!(Value::Object(doc.clone()), json!({"author": {"uid": "u1", "photoURL": "new"}, "title": "Plumber"}));
        assert_eq!(get_path(&doc, "author.uid"), Some(&json!("u1")));
        assert_eq!(get_path(&doc, "author.missing"), None);
    }

    #[test]
    fn test_set_path_creates_parents() {
        let mut doc = Document::new();
        set_path(&mut doc, "a.b.c", json!(1));
        assert_eq!(Value::Object(doc), json!({"a": {"b": {"c": 1}}}));
    }

    #[test]
    fn test_collection_names() {
        assert_eq!(Collection::WorkerReviews.to_string(), "workerReviews");
        assert_eq!(Collection::AdFavorites.name(), "adFavorites");
    }
}
