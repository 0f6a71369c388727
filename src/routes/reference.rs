// SPDX-License-Identifier: MIT

//! Read-only reference data endpoints: teams and arenas.

use crate::entities::{arena, team};
use crate::error::Result;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use sea_orm::{EntityTrait, QueryOrder};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/reference/teams", get(list_teams))
        .route("/api/v1/reference/arenas", get(list_arenas))
}

#[derive(Serialize)]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub abbreviation: String,
    pub city: Option<String>,
    pub arena_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct ArenaResponse {
    pub id: Uuid,
    pub name: String,
    pub city: Option<String>,
    pub capacity: Option<i32>,
}

/// List all NHL teams, ordered by name.
async fn list_teams(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TeamResponse>>> {
    let teams = team::Entity::find()
        .order_by_asc(team::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(
        teams
            .into_iter()
            .map(|t| TeamResponse {
                id: t.id,
                name: t.name,
                abbreviation: t.abbreviation,
                city: t.city,
                arena_id: t.arena_id,
            })
            .collect(),
    ))
}

/// List all NHL arenas, ordered by name.
async fn list_arenas(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ArenaResponse>>> {
    let arenas = arena::Entity::find()
        .order_by_asc(arena::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(
        arenas
            .into_iter()
            .map(|a| ArenaResponse {
                id: a.id,
                name: a.name,
                city: a.city,
                capacity: a.capacity,
            })
            .collect(),
    ))
}
