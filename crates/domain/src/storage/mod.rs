//! Storage contracts implemented by the persistence crate.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{Document, ObjectId, Resource};
use crate::schema::SchemaError;

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

/// Per-collection document operations. Each call touches at most one
/// document atomically, except `replace_collection`, which is only used for
/// seeding.
#[async_trait]
pub trait DocumentStore<R: Resource>: Send + Sync {
    async fn find_document(&self, id: &ObjectId) -> StorageResult<Option<Document<R>>>;

    /// Returns `false` when no document with `id` existed.
    async fn delete_document(&self, id: &ObjectId) -> StorageResult<bool>;

    /// Validates `payload` against the schema of `R` and stores it under a
    /// freshly minted id.
    async fn insert_document(&self, payload: Value) -> StorageResult<Document<R>>;

    /// Applies `patch` to the stored fields, re-validating the merged record.
    /// Returns `None` when the document does not exist.
    async fn update_document(
        &self,
        id: &ObjectId,
        patch: Map<String, Value>,
    ) -> StorageResult<Option<Document<R>>>;

    /// Drops every document of the collection and inserts `documents` as-is.
    async fn replace_collection(&self, documents: Vec<Document<R>>) -> StorageResult<u64>;
}
