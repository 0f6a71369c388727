// SPDX-License-Identifier: MIT

//! Visit routes: recording attended games, with attached images.
//!
//! Everything here is owner-scoped: a visit belonging to another user
//! reads as not-found.

use crate::entities::{arena, image, team, visit};
use crate::error::{AppError, Result};
use crate::services::firebase::AuthClaims;
use crate::services::user;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Visit routes (require authentication; middleware applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/visits", get(list_visits).post(create_visit))
        .route("/api/v1/visits/{id}", get(get_visit).delete(delete_visit))
        .route("/api/v1/visits/{id}/images", post(add_image))
}

#[derive(Serialize)]
pub struct ImageResponse {
    pub id: Uuid,
    pub storage_url: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub uploaded_at: String,
}

impl From<image::Model> for ImageResponse {
    fn from(img: image::Model) -> Self {
        Self {
            id: img.id,
            storage_url: img.storage_url,
            file_size: img.file_size,
            mime_type: img.mime_type,
            uploaded_at: img.uploaded_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct VisitResponse {
    pub id: Uuid,
    pub arena_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub visit_date: NaiveDate,
    pub seating_location: Option<String>,
    pub created_at: String,
    pub images: Vec<ImageResponse>,
}

impl VisitResponse {
    fn from_model(visit: visit::Model, images: Vec<image::Model>) -> Self {
        Self {
            id: visit.id,
            arena_id: visit.arena_id,
            home_team_id: visit.home_team_id,
            away_team_id: visit.away_team_id,
            visit_date: visit.visit_date,
            seating_location: visit.seating_location,
            created_at: visit.created_at.to_rfc3339(),
            images: images.into_iter().map(ImageResponse::from).collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct CreateVisitRequest {
    pub arena_id: Uuid,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub visit_date: NaiveDate,
    pub seating_location: Option<String>,
}

#[derive(Deserialize)]
pub struct AddImageRequest {
    pub storage_url: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

/// List the current user's visits, newest game first, with images.
async fn list_visits(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<Vec<VisitResponse>>> {
    let me = user::reconcile(&state.db, &claims).await?;

    let visits = visit::Entity::find()
        .filter(visit::Column::UserId.eq(me.id))
        .order_by_desc(visit::Column::VisitDate)
        .find_with_related(image::Entity)
        .all(&state.db)
        .await?;

    Ok(Json(
        visits
            .into_iter()
            .map(|(v, images)| VisitResponse::from_model(v, images))
            .collect(),
    ))
}

/// Record a new visit for the current user.
async fn create_visit(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Json(body): Json<CreateVisitRequest>,
) -> Result<Json<VisitResponse>> {
    let me = user::reconcile(&state.db, &claims).await?;

    // Referenced reference data must exist before we record against it.
    if arena::Entity::find_by_id(body.arena_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!(
            "unknown arena: {}",
            body.arena_id
        )));
    }
    for team_id in [body.home_team_id, body.away_team_id] {
        if team::Entity::find_by_id(team_id)
            .one(&state.db)
            .await?
            .is_none()
        {
            return Err(AppError::BadRequest(format!("unknown team: {team_id}")));
        }
    }

    let now = Utc::now();
    let created = visit::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(me.id),
        arena_id: Set(body.arena_id),
        home_team_id: Set(body.home_team_id),
        away_team_id: Set(body.away_team_id),
        visit_date: Set(body.visit_date),
        seating_location: Set(body.seating_location),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(visit_id = %created.id, user_id = %me.id, "Visit recorded");
    Ok(Json(VisitResponse::from_model(created, Vec::new())))
}

/// Get one of the current user's visits, with images.
async fn get_visit(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<VisitResponse>> {
    let me = user::reconcile(&state.db, &claims).await?;
    let visit = find_owned_visit(&state, me.id, id).await?;

    let images = image::Entity::find()
        .filter(image::Column::VisitId.eq(visit.id))
        .all(&state.db)
        .await?;

    Ok(Json(VisitResponse::from_model(visit, images)))
}

#[derive(Serialize)]
pub struct DeleteVisitResponse {
    pub deleted: bool,
}

/// Delete a visit together with its images.
async fn delete_visit(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteVisitResponse>> {
    let me = user::reconcile(&state.db, &claims).await?;
    let visit = find_owned_visit(&state, me.id, id).await?;

    let txn = state.db.begin().await?;
    image::Entity::delete_many()
        .filter(image::Column::VisitId.eq(visit.id))
        .exec(&txn)
        .await?;
    visit::Entity::delete_by_id(visit.id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(visit_id = %id, user_id = %me.id, "Visit deleted");
    Ok(Json(DeleteVisitResponse { deleted: true }))
}

/// Attach an image to one of the current user's visits.
async fn add_image(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
    Json(body): Json<AddImageRequest>,
) -> Result<Json<ImageResponse>> {
    let me = user::reconcile(&state.db, &claims).await?;
    let visit = find_owned_visit(&state, me.id, id).await?;

    if body.storage_url.trim().is_empty() {
        return Err(AppError::BadRequest("storage_url must not be empty".into()));
    }

    let created = image::ActiveModel {
        id: Set(Uuid::new_v4()),
        visit_id: Set(visit.id),
        storage_url: Set(body.storage_url),
        file_size: Set(body.file_size),
        mime_type: Set(body.mime_type),
        uploaded_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    Ok(Json(created.into()))
}

/// Fetch a visit by id, scoped to its owner. Someone else's visit is
/// indistinguishable from a missing one.
async fn find_owned_visit(
    state: &AppState,
    user_id: Uuid,
    visit_id: Uuid,
) -> Result<visit::Model> {
    visit::Entity::find_by_id(visit_id)
        .filter(visit::Column::UserId.eq(user_id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("visit {visit_id}")))
}
