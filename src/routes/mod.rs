// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod auth;
pub mod reference;
pub mod visits;

use crate::middleware::auth::{optional_auth, require_auth, OptionalIdentity};
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authenticated_as: Option<String>,
}

/// Root status endpoint. Anonymous and authenticated callers both get a
/// response; the latter see which identity the token resolved to.
async fn root(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    Extension(identity): Extension<OptionalIdentity>,
) -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} is running", state.config.app_name),
        authenticated_as: identity.0.and_then(|claims| claims.email),
    })
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS - allow the configured frontend plus localhost for dev
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(reference::routes());

    let optional_auth_routes = Router::new().route("/", get(root)).route_layer(
        middleware::from_fn_with_state(state.clone(), optional_auth),
    );

    let protected_routes = auth::routes()
        .merge(visits::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(optional_auth_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
