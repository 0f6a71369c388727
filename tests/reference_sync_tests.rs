// SPDX-License-Identifier: MIT

//! Reference-data sync tests: team upsert semantics, arena linking, and
//! the record-skip rules.

use arena_tracker::config::Config;
use arena_tracker::entities::{arena, prelude::*, team};
use arena_tracker::services::nhl_api::TeamFeedEntry;
use arena_tracker::services::sync::{
    load_teams_by_abbreviation, parse_arena_dataset, sync_arenas, upsert_teams, ArenaDatasetEntry,
    SyncError, SyncResult,
};
use arena_tracker::services::ReferenceSync;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashMap;

mod common;

fn entry(name: &str, abbreviation: &str, city: Option<&str>) -> TeamFeedEntry {
    TeamFeedEntry {
        name: name.to_string(),
        abbreviation: abbreviation.to_string(),
        city: city.map(str::to_string),
    }
}

fn dataset(entries: &[(&str, &str, Option<&str>, Option<i32>)]) -> HashMap<String, ArenaDatasetEntry> {
    entries
        .iter()
        .map(|(key, name, city, capacity)| {
            (
                key.to_string(),
                ArenaDatasetEntry {
                    name: Some(name.to_string()),
                    city: city.map(str::to_string),
                    capacity: *capacity,
                },
            )
        })
        .collect()
}

/// Serve a fake NHL API on an ephemeral local port; returns the base URL.
async fn spawn_feed_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}")
}

fn sync_config(base_url: &str) -> Config {
    let mut config = Config::test_default();
    config.nhl_stats_base_url = base_url.to_string();
    config.nhl_web_base_url = base_url.to_string();
    config
}

fn good_feed_router() -> Router {
    Router::new()
        .route(
            "/en/team",
            get(|| async {
                Json(serde_json::json!({"data": [
                    {"fullName": "Boston Bruins", "triCode": "BOS"},
                    {"fullName": "San Jose Sharks", "triCode": "SJS"}
                ]}))
            }),
        )
        .route(
            "/v1/standings/now",
            get(|| async {
                Json(serde_json::json!({"standings": [
                    {"teamAbbrev": {"default": "BOS"}, "placeName": {"default": "Boston"}},
                    {"teamAbbrev": {"default": "SJS"}, "placeName": {"default": "San Jose"}}
                ]}))
            }),
        )
}

async fn team_by_abbrev(db: &DatabaseConnection, abbreviation: &str) -> Option<team::Model> {
    Team::find()
        .filter(team::Column::Abbreviation.eq(abbreviation))
        .one(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_sync_example_scenario() {
    // Feed: lowercase "bos" with city already mined from standings;
    // dataset keyed "BOS". Case-insensitive matching via upper-casing.
    let db = common::test_db().await;

    let feed = vec![entry("Bruins", "bos", Some("Boston"))];
    let (created, updated) = upsert_teams(&db, &feed).await.unwrap();
    assert_eq!((created, updated), (1, 0));

    let teams = load_teams_by_abbreviation(&db).await.unwrap();
    let arenas = dataset(&[("BOS", "TD Garden", Some("Boston"), Some(17850))]);
    let synced = sync_arenas(&db, &arenas, &teams).await.unwrap();
    assert_eq!(synced, 1);

    let team = team_by_abbrev(&db, "BOS").await.expect("team keyed BOS");
    assert_eq!(team.name, "Bruins");
    assert_eq!(team.city.as_deref(), Some("Boston"));

    let arena = Arena::find_by_id(team.arena_id.expect("team linked to arena"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(arena.name, "TD Garden");
    assert_eq!(arena.capacity, Some(17850));
}

#[tokio::test]
async fn test_second_run_updates_in_place() {
    let db = common::test_db().await;

    let (created, _) = upsert_teams(&db, &[entry("Bruins", "BOS", Some("Boston"))])
        .await
        .unwrap();
    assert_eq!(created, 1);
    let teams = load_teams_by_abbreviation(&db).await.unwrap();
    let arenas = dataset(&[("BOS", "TD Garden", Some("Boston"), Some(17850))]);
    sync_arenas(&db, &arenas, &teams).await.unwrap();

    let first_team = team_by_abbrev(&db, "BOS").await.unwrap();
    let first_arena_id = first_team.arena_id.unwrap();

    // Second run: the name changed upstream, the dataset did not.
    let (created, updated) = upsert_teams(&db, &[entry("Boston Bruins", "BOS", Some("Boston"))])
        .await
        .unwrap();
    assert_eq!((created, updated), (0, 1));

    let teams = load_teams_by_abbreviation(&db).await.unwrap();
    sync_arenas(&db, &arenas, &teams).await.unwrap();

    let team = team_by_abbrev(&db, "BOS").await.unwrap();
    assert_eq!(team.id, first_team.id);
    assert_eq!(team.name, "Boston Bruins");
    assert_eq!(team.arena_id, Some(first_arena_id));

    // Same arena row, not a duplicate.
    assert_eq!(Arena::find().all(&db).await.unwrap().len(), 1);
    assert_eq!(Team::find().all(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_abbreviation_skipped() {
    let db = common::test_db().await;

    let feed = vec![
        entry("Nameless", "", None),
        entry("Spacey", "   ", None),
        entry("Sharks", "SJS", None),
    ];
    let (created, updated) = upsert_teams(&db, &feed).await.unwrap();

    assert_eq!((created, updated), (1, 0));
    assert_eq!(Team::find().all(&db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_abbreviation_last_one_wins() {
    let db = common::test_db().await;

    let feed = vec![
        entry("Old Name", "UTA", Some("Salt Lake City")),
        entry("Utah Mammoth", "uta", Some("Salt Lake City")),
    ];
    let (created, updated) = upsert_teams(&db, &feed).await.unwrap();

    // First occurrence creates, the duplicate merges into the same row.
    assert_eq!((created, updated), (1, 1));
    let teams = Team::find().all(&db).await.unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].name, "Utah Mammoth");
}

#[tokio::test]
async fn test_arena_for_unknown_team_dropped() {
    let db = common::test_db().await;

    upsert_teams(&db, &[entry("Bruins", "BOS", None)])
        .await
        .unwrap();
    let teams = load_teams_by_abbreviation(&db).await.unwrap();

    let arenas = dataset(&[("ZZZ", "Ghost Rink", None, None)]);
    let synced = sync_arenas(&db, &arenas, &teams).await.unwrap();

    assert_eq!(synced, 0);
    assert!(Arena::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_arena_without_name_dropped() {
    let db = common::test_db().await;

    upsert_teams(&db, &[entry("Bruins", "BOS", None)])
        .await
        .unwrap();
    let teams = load_teams_by_abbreviation(&db).await.unwrap();

    let mut arenas = HashMap::new();
    arenas.insert(
        "BOS".to_string(),
        ArenaDatasetEntry {
            name: None,
            city: Some("Boston".to_string()),
            capacity: Some(17850),
        },
    );
    let synced = sync_arenas(&db, &arenas, &teams).await.unwrap();

    assert_eq!(synced, 0);
    assert!(Arena::find().all(&db).await.unwrap().is_empty());
    assert_eq!(team_by_abbrev(&db, "BOS").await.unwrap().arena_id, None);
}

#[tokio::test]
async fn test_team_without_arena_entry_keeps_no_link() {
    let db = common::test_db().await;

    upsert_teams(&db, &[entry("Bruins", "BOS", None), entry("Sharks", "SJS", None)])
        .await
        .unwrap();
    let teams = load_teams_by_abbreviation(&db).await.unwrap();

    let arenas = dataset(&[("BOS", "TD Garden", Some("Boston"), Some(17850))]);
    sync_arenas(&db, &arenas, &teams).await.unwrap();

    assert!(team_by_abbrev(&db, "BOS").await.unwrap().arena_id.is_some());
    assert!(team_by_abbrev(&db, "SJS").await.unwrap().arena_id.is_none());
}

#[tokio::test]
async fn test_feed_city_is_authoritative() {
    let db = common::test_db().await;

    upsert_teams(&db, &[entry("Bruins", "BOS", Some("Boston"))])
        .await
        .unwrap();
    // Standings unavailable next run: the feed now says no city.
    upsert_teams(&db, &[entry("Bruins", "BOS", None)])
        .await
        .unwrap();

    assert_eq!(team_by_abbrev(&db, "BOS").await.unwrap().city, None);
}

#[tokio::test]
async fn test_arena_update_rewrites_fields() {
    let db = common::test_db().await;

    upsert_teams(&db, &[entry("Bruins", "BOS", None)])
        .await
        .unwrap();
    let teams = load_teams_by_abbreviation(&db).await.unwrap();

    sync_arenas(
        &db,
        &dataset(&[("BOS", "TD Garden", Some("Boston"), Some(17850))]),
        &teams,
    )
    .await
    .unwrap();

    // Renovation bumps capacity; city detail dropped from the dataset.
    let teams = load_teams_by_abbreviation(&db).await.unwrap();
    sync_arenas(
        &db,
        &dataset(&[("BOS", "TD Garden", None, Some(17900))]),
        &teams,
    )
    .await
    .unwrap();

    let arenas = Arena::find().all(&db).await.unwrap();
    assert_eq!(arenas.len(), 1);
    assert_eq!(arenas[0].capacity, Some(17900));
    assert_eq!(arenas[0].city, None);
}

#[tokio::test]
async fn test_parsed_dataset_feeds_sync() {
    // End-to-end through the parser, the way the sync binary uses it.
    let db = common::test_db().await;

    upsert_teams(&db, &[entry("Bruins", "bos", None)])
        .await
        .unwrap();
    let teams = load_teams_by_abbreviation(&db).await.unwrap();

    let parsed = parse_arena_dataset(
        r#"{"BOS": {"name": "TD Garden", "city": "Boston", "capacity": 17850},
            "XXX": {"name": "Nowhere Arena"},
            "SJS": {"city": "San Jose"}}"#,
    )
    .unwrap();

    let synced = sync_arenas(&db, &parsed, &teams).await.unwrap();
    assert_eq!(synced, 1);

    let arenas = Arena::find()
        .filter(arena::Column::Name.eq("TD Garden"))
        .all(&db)
        .await
        .unwrap();
    assert_eq!(arenas.len(), 1);
}

#[tokio::test]
async fn test_sync_full_run_links_arenas() {
    let db = common::test_db().await;

    // test_default points arenas_file at the shipped data/arenas.json.
    let config = sync_config(&spawn_feed_server(good_feed_router()).await);
    let result = ReferenceSync::new(&config).sync(&db).await.unwrap();

    assert_eq!(result.teams_created, 2);
    assert_eq!(result.teams_updated, 0);
    assert_eq!(result.arenas_synced, 2);

    let bos = team_by_abbrev(&db, "BOS").await.unwrap();
    assert_eq!(bos.city.as_deref(), Some("Boston"));
    let garden = Arena::find_by_id(bos.arena_id.expect("BOS linked to an arena"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(garden.name, "TD Garden");
}

#[tokio::test]
async fn test_sync_aborts_when_team_feed_unavailable() {
    let db = common::test_db().await;

    let stub = Router::new().route(
        "/en/team",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let config = sync_config(&spawn_feed_server(stub).await);

    let err = ReferenceSync::new(&config).sync(&db).await.unwrap_err();
    assert!(matches!(err, SyncError::TeamFeed(_)));
    assert!(Team::find().all(&db).await.unwrap().is_empty());
    assert!(Arena::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sync_rejects_feed_without_data_array() {
    let db = common::test_db().await;

    let stub = Router::new().route(
        "/en/team",
        get(|| async { Json(serde_json::json!({"unexpected": true})) }),
    );
    let config = sync_config(&spawn_feed_server(stub).await);

    let err = ReferenceSync::new(&config).sync(&db).await.unwrap_err();
    assert!(matches!(err, SyncError::TeamFeed(_)));
    assert!(Team::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sync_with_empty_feed_is_a_no_op() {
    let db = common::test_db().await;

    let stub = Router::new().route(
        "/en/team",
        get(|| async { Json(serde_json::json!({"data": []})) }),
    );
    let config = sync_config(&spawn_feed_server(stub).await);

    let result = ReferenceSync::new(&config).sync(&db).await.unwrap();
    assert_eq!(result, SyncResult::default());
    assert!(Team::find().all(&db).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sync_missing_dataset_keeps_team_phase() {
    let db = common::test_db().await;

    let mut config = sync_config(&spawn_feed_server(good_feed_router()).await);
    config.arenas_file = "does/not/exist.json".to_string();

    let result = ReferenceSync::new(&config).sync(&db).await.unwrap();

    // Team rows are committed even though the arena phase was skipped.
    assert_eq!(result.teams_created, 2);
    assert_eq!(result.arenas_synced, 0);
    assert_eq!(Team::find().all(&db).await.unwrap().len(), 2);
    assert!(Arena::find().all(&db).await.unwrap().is_empty());

    let sjs = team_by_abbrev(&db, "SJS").await.unwrap();
    assert_eq!(sjs.city.as_deref(), Some("San Jose"));
    assert_eq!(sjs.arena_id, None);
}
