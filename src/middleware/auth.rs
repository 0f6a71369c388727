// SPDX-License-Identifier: MIT

//! Bearer-token authentication middleware.
//!
//! `require_auth` rejects the request unless the Firebase ID token checks
//! out; `optional_auth` degrades any failure to "anonymous" so a route can
//! serve both audiences. Verification failure detail is for logs only.

use crate::error::AppError;
use crate::services::firebase::AuthClaims;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Identity seen by optional-auth routes: `None` means anonymous.
#[derive(Debug, Clone)]
pub struct OptionalIdentity(pub Option<AuthClaims>);

/// Middleware that requires a valid Firebase ID token.
///
/// On success the verified [`AuthClaims`] are inserted as a request
/// extension for handlers to consume.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    match state.verifier.verify(&token).await {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Rejected bearer token");
            Err(AppError::Unauthorized)
        }
    }
}

/// Middleware that attaches an identity when one is presented and valid,
/// and `None` otherwise. Never rejects the request.
pub async fn optional_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match bearer_token(request.headers()) {
        Some(token) => match state.verifier.verify(&token).await {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid bearer token on optional route");
                None
            }
        },
        None => None,
    };

    request.extensions_mut().insert(OptionalIdentity(identity));
    next.run(request).await
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
