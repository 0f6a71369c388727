// SPDX-License-Identifier: MIT

//! Operator-invoked reference-data sync.
//!
//! Pulls teams from the NHL API and arenas from the local dataset and
//! reconciles both into the database, then exits. Run it from cron or by
//! hand; it is not part of the request path and expects to be the only
//! instance running.

use arena_tracker::{config::Config, migration::Migrator, services::ReferenceSync};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = Config::from_env().expect("Failed to load configuration");
    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let sync = ReferenceSync::new(&config);
    match sync.sync(&db).await {
        Ok(result) => {
            tracing::info!(
                teams_created = result.teams_created,
                teams_updated = result.teams_updated,
                arenas_synced = result.arenas_synced,
                "Reference sync completed"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Reference sync failed");
            Err(e.into())
        }
    }
}

fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arena_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
