//! The `persistence` module provides the document store telemetry is written to.
//!
//! A document is a flat JSON object stored under a logical path. The only
//! write is a field-level merge: fields in the update overwrite the stored
//! ones, everything else is left alone.
//!
//! `sled` backs the store as an embedded key-value database; the merge runs
//! inside sled's atomic read-modify-write, so concurrent writers touching
//! disjoint fields never lose each other's updates.

pub mod sled_store;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use sled_store::SledStore;

/// A stored record: field name to JSON value.
pub type Document = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store is closed")]
    Closed,
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Merge `fields` into the record at `path` and return the merged record.
    ///
    /// `stamp_field` names an integer field that must strictly increase on
    /// every write to the same path; a stamp that would not is bumped to
    /// one past the stored value.
    async fn merge(
        &self,
        path: &str,
        fields: Document,
        stamp_field: &str,
    ) -> Result<Document, StoreError>;

    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError>;
}

#[cfg(test)]
mod tests;
