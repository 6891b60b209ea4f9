//! Seeder binary that resets the database to the bundled fixture data.

use std::io;

use fitlog_domain::config::SeedConfig;
use fitlog_domain::services::telemetry::{init_telemetry, TelemetryConfig};
use fitlog_seed::{seed_database, Fixtures, SeedError, SeedReport};
use fitlog_storage::SeaOrmStorage;

#[tokio::main]
async fn main() -> io::Result<()> {
    match bootstrap().await {
        Ok(report) => {
            println!(
                "[seed] users={} exercises={} workouts={}",
                report.users, report.exercises, report.workouts
            );
            Ok(())
        }
        Err(err) => {
            eprintln!("[seed] seeding failed: {err}");
            Err(io::Error::other(err.to_string()))
        }
    }
}

async fn bootstrap() -> Result<SeedReport, SeedError> {
    let config = SeedConfig::load_from_env()?;
    init_telemetry(&TelemetryConfig::from_env("SEED")?)?;
    let fixtures = Fixtures::bundled()?;
    let storage = SeaOrmStorage::builder()
        .database_url(config.database_url())
        .build()
        .await?;
    seed_database(&storage, fixtures).await
}
