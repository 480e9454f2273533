//! Document store backed by `sled`
//!
//! Records live in a single `documents` tree keyed by their logical path.
//! Values are JSON-encoded objects.

use async_trait::async_trait;
use serde_json::Value;
use sled::{Db, Tree};
use tracing::warn;

use super::{Document, DocumentStore, StoreError};

const DOCUMENTS_TREE: &str = "documents";

#[derive(Clone)]
pub struct SledStore {
    db: Db,
    documents: Tree,
}

impl SledStore {
    /// Open or create a sled database at `path`.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// A throwaway database that is deleted when dropped.
    pub fn temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        let documents = db.open_tree(DOCUMENTS_TREE)?;
        Ok(Self { db, documents })
    }

    /// Apply a merge to the record under `path` atomically.
    ///
    /// sled may call the closure more than once under contention, so it only
    /// reads its inputs and reports serialization failures through `failure`.
    fn merge_blocking(
        &self,
        path: &str,
        fields: &Document,
        stamp_field: &str,
    ) -> Result<Document, StoreError> {
        let mut failure = None;

        let merged = self.documents.update_and_fetch(path, |current| {
            let mut doc = match current.map(serde_json::from_slice::<Value>) {
                Some(Ok(Value::Object(existing))) => existing,
                Some(_) => {
                    warn!(path, "stored record is not a JSON object, replacing it");
                    Document::new()
                }
                None => Document::new(),
            };

            let previous_stamp = doc.get(stamp_field).and_then(Value::as_i64);
            let incoming_stamp = fields.get(stamp_field).and_then(Value::as_i64);

            for (key, value) in fields {
                doc.insert(key.clone(), value.clone());
            }

            if let (Some(prev), Some(next)) = (previous_stamp, incoming_stamp) {
                if next <= prev {
                    doc.insert(stamp_field.to_string(), Value::from(prev + 1));
                }
            }

            match serde_json::to_vec(&doc) {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    failure = Some(e);
                    current.map(|c| c.to_vec())
                }
            }
        })?;

        if let Some(e) = failure {
            return Err(StoreError::Serialization(e));
        }

        match merged {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Document::new()),
        }
    }

    fn get_blocking(&self, path: &str) -> Result<Option<Document>, StoreError> {
        match self.documents.get(path)? {
            Some(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
                Value::Object(doc) => Ok(Some(doc)),
                _ => Ok(None),
            },
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DocumentStore for SledStore {
    async fn merge(
        &self,
        path: &str,
        fields: Document,
        stamp_field: &str,
    ) -> Result<Document, StoreError> {
        let store = self.clone();
        let path = path.to_string();
        let stamp_field = stamp_field.to_string();

        let merged = tokio::task::spawn_blocking(move || {
            let doc = store.merge_blocking(&path, &fields, &stamp_field)?;
            store.db.flush()?;
            Ok::<_, StoreError>(doc)
        })
        .await
        .map_err(|_| StoreError::Closed)??;

        Ok(merged)
    }

    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        let store = self.clone();
        let path = path.to_string();

        tokio::task::spawn_blocking(move || store.get_blocking(&path))
            .await
            .map_err(|_| StoreError::Closed)?
    }
}

impl std::fmt::Debug for SledStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledStore")
            .field("db", &"sled::Db")
            .field("records", &self.documents.len())
            .finish()
    }
}
