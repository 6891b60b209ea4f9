//! SeaORM-backed document store that satisfies the domain storage traits
//! while keeping the database backend swappable (SQLite by default,
//! PostgreSQL via feature flag).

mod builder;
mod document_store;
mod entity;
mod migration;

use std::sync::Arc;

use fitlog_domain::storage::{StorageError, StorageResult};
use sea_orm::{Database, DatabaseConnection};

pub use builder::StorageBuilder;
use migration::run_migrations;

/// Shared storage handle used by the HTTP API and the seeder.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStorage {
    /// Connects to the provided database URL and ensures the schema is present.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let db = Database::connect(database_url)
            .await
            .map_err(StorageError::from_source)?;
        run_migrations(&db).await?;
        Ok(Self::from_connection(db))
    }

    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    pub(crate) fn from_connection(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}
