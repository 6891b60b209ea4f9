//! Fixture loading and database seeding. The `fitlog-seed` binary wraps
//! [`seed_database`]; the API test-suite reuses it to prepare in-memory
//! stores.

pub mod fixtures;

use fitlog_domain::{
    config::ConfigError,
    model::{Exercise, User, Workout},
    schema::SchemaError,
    services::telemetry::TelemetryError,
    storage::{DocumentStore, StorageError},
};
use metrics::counter;
use thiserror::Error;
use tracing::info;

pub use fixtures::Fixtures;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("malformed {collection} fixture: {source}")]
    Fixture {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {collection} fixture {id}: {source}")]
    InvalidFixture {
        collection: &'static str,
        id: String,
        #[source]
        source: SchemaError,
    },
}

/// Number of documents written per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub users: u64,
    pub exercises: u64,
    pub workouts: u64,
}

// 用 fixtures 覆盖三个集合的全部内容。
// 每个集合的替换在存储层内是一个事务；集合之间没有事务保证。
pub async fn seed_database<S>(store: &S, fixtures: Fixtures) -> Result<SeedReport, SeedError>
where
    S: DocumentStore<User> + DocumentStore<Exercise> + DocumentStore<Workout>,
{
    // 步骤 1：用户
    let users = DocumentStore::<User>::replace_collection(store, fixtures.users).await?;
    counter!("seed_documents_total", "collection" => "users").increment(users);

    // 步骤 2：动作（exercise）
    let exercises = DocumentStore::<Exercise>::replace_collection(store, fixtures.exercises).await?;
    counter!("seed_documents_total", "collection" => "exercises").increment(exercises);

    // 步骤 3：训练（workout）
    let workouts = DocumentStore::<Workout>::replace_collection(store, fixtures.workouts).await?;
    counter!("seed_documents_total", "collection" => "workouts").increment(workouts);

    info!(users, exercises, workouts, "database seeded");
    Ok(SeedReport {
        users,
        exercises,
        workouts,
    })
}
