// SPDX-License-Identifier: MIT

//! Reference-data synchronization: NHL teams and arenas.
//!
//! Two phases, each committed on its own:
//! 1. Team upsert, keyed by normalized abbreviation, fed by the NHL API.
//! 2. Arena upsert-and-link, fed by an operator-maintained JSON dataset.
//!
//! The fetch precedes any write, so a feed failure leaves zero mutations.
//! A missing or malformed arena dataset skips phase 2 only; team rows from
//! the same run stand. Bad individual records are skipped, storage errors
//! abort the run.

use crate::config::Config;
use crate::entities::{arena, prelude::Team, team};
use crate::services::nhl_api::{NhlClient, TeamFeedEntry};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Outcome counts of one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub teams_created: usize,
    pub teams_updated: usize,
    /// Arena dataset entries actually applied (created or updated).
    pub arenas_synced: usize,
}

/// Errors that abort a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("team feed error: {0}")]
    TeamFeed(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// One entry of the arena dataset, keyed externally by team abbreviation.
#[derive(Debug, Clone, Deserialize)]
pub struct ArenaDatasetEntry {
    pub name: Option<String>,
    pub city: Option<String>,
    pub capacity: Option<i32>,
}

/// Operator-invoked reference-data synchronizer.
pub struct ReferenceSync {
    nhl: NhlClient,
    arenas_file: PathBuf,
}

impl ReferenceSync {
    pub fn new(config: &Config) -> Self {
        Self {
            nhl: NhlClient::new(&config.nhl_stats_base_url, &config.nhl_web_base_url),
            arenas_file: PathBuf::from(&config.arenas_file),
        }
    }

    /// Run one full sync against the database.
    pub async fn sync(&self, db: &DatabaseConnection) -> Result<SyncResult, SyncError> {
        tracing::info!("Fetching teams from the NHL API");
        let feed = self
            .nhl
            .fetch_teams()
            .await
            .map_err(|e| SyncError::TeamFeed(e.to_string()))?;

        if feed.is_empty() {
            tracing::warn!("No teams returned from the NHL API");
            return Ok(SyncResult::default());
        }

        let txn = db.begin().await?;
        let (teams_created, teams_updated) = upsert_teams(&txn, &feed).await?;
        txn.commit().await?;
        tracing::info!(
            created = teams_created,
            updated = teams_updated,
            "Team phase committed"
        );

        // Reload with committed ids before linking arenas.
        let teams_by_abbreviation = load_teams_by_abbreviation(db).await?;

        let Some(dataset) = load_arena_dataset(&self.arenas_file) else {
            tracing::info!("Skipping arena sync (no arenas file or invalid)");
            return Ok(SyncResult {
                teams_created,
                teams_updated,
                arenas_synced: 0,
            });
        };

        let txn = db.begin().await?;
        let arenas_synced = sync_arenas(&txn, &dataset, &teams_by_abbreviation).await?;
        txn.commit().await?;
        tracing::info!(synced = arenas_synced, "Arena phase committed");

        Ok(SyncResult {
            teams_created,
            teams_updated,
            arenas_synced,
        })
    }
}

/// Upsert teams by abbreviation. Returns (created, updated).
///
/// Abbreviations are trimmed and upper-cased; entries without one cannot be
/// keyed and are skipped. A duplicate abbreviation in the feed merges into
/// the row materialized by the first occurrence: last one wins.
pub async fn upsert_teams<C: ConnectionTrait>(
    db: &C,
    feed: &[TeamFeedEntry],
) -> Result<(usize, usize), DbErr> {
    let mut by_abbreviation: HashMap<String, team::Model> = Team::find()
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.abbreviation.clone(), t))
        .collect();

    let mut created = 0;
    let mut updated = 0;

    for entry in feed {
        let abbreviation = entry.abbreviation.trim().to_uppercase();
        if abbreviation.is_empty() {
            continue;
        }

        if let Some(current) = by_abbreviation.get(&abbreviation) {
            let active = team::ActiveModel {
                id: Set(current.id),
                name: Set(if entry.name.is_empty() {
                    current.name.clone()
                } else {
                    entry.name.clone()
                }),
                // The feed is authoritative for city, even when it says None.
                city: Set(entry.city.clone()),
                ..Default::default()
            };
            let model = active.update(db).await?;
            by_abbreviation.insert(abbreviation, model);
            updated += 1;
        } else {
            let model = team::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(entry.name.clone()),
                abbreviation: Set(abbreviation.clone()),
                city: Set(entry.city.clone()),
                arena_id: Set(None),
                created_at: Set(Utc::now()),
            }
            .insert(db)
            .await?;
            by_abbreviation.insert(abbreviation, model);
            created += 1;
        }
    }

    Ok((created, updated))
}

/// Reload the full team set keyed by abbreviation.
pub async fn load_teams_by_abbreviation(
    db: &DatabaseConnection,
) -> Result<HashMap<String, team::Model>, DbErr> {
    Ok(Team::find()
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.abbreviation.clone(), t))
        .collect())
}

/// Create or update arenas from the dataset and link them to teams.
/// Returns the number of entries applied.
///
/// Entries keyed to an unknown abbreviation are dropped, never
/// orphan-created; entries without a name are invalid and dropped.
pub async fn sync_arenas<C: ConnectionTrait>(
    db: &C,
    dataset: &HashMap<String, ArenaDatasetEntry>,
    teams_by_abbreviation: &HashMap<String, team::Model>,
) -> Result<usize, DbErr> {
    let mut synced = 0;

    for (key, info) in dataset {
        let abbreviation = key.trim().to_uppercase();
        if abbreviation.is_empty() {
            continue;
        }
        let Some(team) = teams_by_abbreviation.get(&abbreviation) else {
            continue;
        };
        let Some(name) = info.name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };

        if let Some(arena_id) = team.arena_id {
            if let Some(existing) = arena::Entity::find_by_id(arena_id).one(db).await? {
                let active = arena::ActiveModel {
                    id: Set(existing.id),
                    name: Set(name.to_string()),
                    city: Set(info.city.clone()),
                    capacity: Set(info.capacity),
                    ..Default::default()
                };
                active.update(db).await?;
                synced += 1;
                continue;
            }
            // Dangling arena link: fall through and recreate.
        }

        let new_arena = arena::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            city: Set(info.city.clone()),
            capacity: Set(info.capacity),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;

        let link = team::ActiveModel {
            id: Set(team.id),
            arena_id: Set(Some(new_arena.id)),
            ..Default::default()
        };
        link.update(db).await?;
        synced += 1;
    }

    Ok(synced)
}

/// Load the arena dataset file. Returns None if missing or invalid.
pub fn load_arena_dataset(path: &Path) -> Option<HashMap<String, ArenaDatasetEntry>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Arenas file not readable");
            return None;
        }
    };
    parse_arena_dataset(&raw)
}

/// Parse the dataset from a JSON string: an object keyed by abbreviation.
/// A non-object document invalidates the whole dataset; an individual
/// malformed entry is dropped.
pub fn parse_arena_dataset(raw: &str) -> Option<HashMap<String, ArenaDatasetEntry>> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid JSON in arenas file");
            return None;
        }
    };

    let Some(object) = value.as_object() else {
        tracing::warn!("Arenas file must be a JSON object keyed by team abbreviation");
        return None;
    };

    let dataset = object
        .iter()
        .filter_map(
            |(key, entry)| match serde_json::from_value::<ArenaDatasetEntry>(entry.clone()) {
                Ok(parsed) => Some((key.clone(), parsed)),
                Err(e) => {
                    tracing::warn!(abbreviation = %key, error = %e, "Skipping malformed arena entry");
                    None
                }
            },
        )
        .collect();

    Some(dataset)
}
