//! In-process [`DocumentStore`].
//!
//! Backs the CLI and tests. Access rules are simulated with a deny list of
//! documents the current caller may not write.

use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::store::{Collection, Document, DocumentStore, WriteBatch, WriteOp, get_path, set_path};
use crate::{MarketError, Result};

type Key = (Collection, String);

#[derive(Debug, Default)]
struct State {
    documents: HashMap<Key, Document>,
    denied: HashSet<Key>,
    commits: usize,
}

/// Document store held in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every write to this document with `PermissionDenied`.
    pub fn deny_writes(&self, collection: Collection, id: &str) {
        if let Ok(mut state) = self.lock() {
            state.denied.insert((collection, id.to_string()));
        }
    }

    /// Lift a previous [`MemoryStore::deny_writes`].
    pub fn allow_writes(&self, collection: Collection, id: &str) {
        if let Ok(mut state) = self.lock() {
            state.denied.remove(&(collection, id.to_string()));
        }
    }

    /// Number of batches committed successfully.
    pub fn commit_count(&self) -> usize {
        self.lock().map(|state| state.commits).unwrap_or(0)
    }

    /// Insert a document directly, bypassing access rules.
    pub fn insert(&self, collection: Collection, id: &str, document: Document) {
        if let Ok(mut state) = self.lock() {
            state.documents.insert((collection, id.to_string()), document);
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| MarketError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl State {
    fn check_write(&self, collection: Collection, id: &str) -> Result<()> {
        if self.denied.contains(&(collection, id.to_string())) {
            return Err(MarketError::PermissionDenied(format!("{collection}/{id}")));
        }
        Ok(())
    }

    fn check_op(&self, op: &WriteOp) -> Result<()> {
        let (collection, id) = op.target();
        self.check_write(collection, id)?;
        let is_update = matches!(op, WriteOp::Update { .. });
        if is_update && !self.documents.contains_key(&(collection, id.to_string())) {
            return Err(MarketError::not_found(collection.name(), id));
        }
        Ok(())
    }

    fn apply(&mut self, op: WriteOp) {
        match op {
            WriteOp::Update { collection, id, fields } => {
                if let Some(doc) = self.documents.get_mut(&(collection, id)) {
                    for (path, value) in fields {
                        set_path(doc, &path, value);
                    }
                }
            }
            WriteOp::Set { collection, id, document } => {
                self.documents.insert((collection, id), document);
            }
            WriteOp::Delete { collection, id } => {
                self.documents.remove(&(collection, id));
            }
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        Ok(self.lock()?.documents.get(&(collection, id.to_string())).cloned())
    }

    async fn query_eq(&self, collection: Collection, field: &str, value: &Value) -> Result<Vec<(String, Document)>> {
        let state = self.lock()?;
        let mut matches: Vec<(String, Document)> = state
            .documents
            .iter()
            .filter(|((c, _), doc)| *c == collection && get_path(doc, field) == Some(value))
            .map(|((_, id), doc)| (id.clone(), doc.clone()))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(matches)
    }

    async fn add(&self, collection: Collection, document: Document) -> Result<String> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.lock()?.documents.insert((collection, id.clone()), document);
        Ok(id)
    }

    async fn set(&self, collection: Collection, id: &str, document: Document) -> Result<()> {
        let mut state = self.lock()?;
        state.check_write(collection, id)?;
        state.documents.insert((collection, id.to_string()), document);
        Ok(())
    }

    async fn update_fields(&self, collection: Collection, id: &str, fields: &[(String, Value)]) -> Result<()> {
        let op = WriteOp::Update {
            collection,
            id: id.to_string(),
            fields: fields.to_vec(),
        };
        let mut state = self.lock()?;
        state.check_op(&op)?;
        state.apply(op);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.check_write(collection, id)?;
        state.documents.remove(&(collection, id.to_string()));
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut state = self.lock()?;
        for op in batch.ops() {
            state.check_op(op)?;
        }
        for op in batch.into_ops() {
            state.apply(op);
        }
        state.commits += 1;
        Ok(())
    }
}
