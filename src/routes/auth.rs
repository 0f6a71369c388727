// SPDX-License-Identifier: MIT

//! Authentication routes: token verification and profile sync.

use crate::error::Result;
use crate::services::firebase::AuthClaims;
use crate::services::user;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Auth routes (require authentication; middleware applied in routes/mod.rs).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/auth/verify", post(verify_token))
}

/// Current user profile, as stored after reconciliation.
#[derive(Serialize)]
pub struct MeResponse {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

/// Get (and on first call create) the current user's profile.
///
/// Subsequent calls refresh profile fields that changed upstream.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<MeResponse>> {
    let profile = user::reconcile(&state.db, &claims).await?;

    Ok(Json(MeResponse {
        uid: profile.firebase_uid,
        email: profile.email,
        email_verified: claims.email_verified,
        display_name: profile.display_name,
        avatar_url: profile.avatar_url,
        created_at: profile.created_at.to_rfc3339(),
    }))
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub uid: String,
    pub email: Option<String>,
}

/// Verify that a Firebase ID token is valid.
///
/// Does not create or update the user; use `/auth/me` for that.
async fn verify_token(Extension(claims): Extension<AuthClaims>) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        uid: claims.subject,
        email: claims.email,
    })
}
