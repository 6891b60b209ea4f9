//! Domain-level building blocks shared across the API, storage and seed
//! crates: resource models, request validators, schema enforcement, storage
//! contracts, configuration and telemetry.

pub mod config;
pub mod model;
pub mod schema;
pub mod services;
pub mod storage;
pub mod validation;

pub use model::{Document, Exercise, ObjectId, Resource, ResourceKind, User, Workout};
pub use schema::SchemaError;
pub use storage::{DocumentStore, StorageError, StorageResult};
pub use validation::{is_valid_id, is_valid_update};
