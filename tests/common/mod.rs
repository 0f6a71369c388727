// SPDX-License-Identifier: MIT

use arena_tracker::config::Config;
use arena_tracker::migration::Migrator;
use arena_tracker::routes::create_router;
use arena_tracker::services::firebase::{AuthClaims, TokenVerifier, VerifyError};
use arena_tracker::AppState;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::collections::HashMap;
use std::sync::Arc;

/// Create an in-memory test database with the full schema applied.
///
/// Pinned to one connection so every query sees the same in-memory
/// SQLite instance.
#[allow(dead_code)]
pub async fn test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Token verifier for tests: literal tokens map to fixed claims,
/// everything else fails verification.
#[derive(Default)]
pub struct StubVerifier {
    identities: HashMap<String, AuthClaims>,
}

impl StubVerifier {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_identity(mut self, token: &str, claims: AuthClaims) -> Self {
        self.identities.insert(token.to_string(), claims);
        self
    }
}

#[async_trait::async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> Result<AuthClaims, VerifyError> {
        self.identities
            .get(token)
            .cloned()
            .ok_or_else(|| VerifyError("unknown test token".to_string()))
    }
}

/// Minimal claims for a test identity.
#[allow(dead_code)]
pub fn claims_for(subject: &str, email: Option<&str>) -> AuthClaims {
    AuthClaims {
        subject: subject.to_string(),
        email: email.map(str::to_string),
        email_verified: email.is_some(),
        name: None,
        picture: None,
        extra: serde_json::Map::new(),
    }
}

/// Create a test app backed by an in-memory database and a stub verifier.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app(verifier: StubVerifier) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db().await;

    let state = Arc::new(AppState {
        config,
        db,
        verifier: Arc::new(verifier),
    });

    (create_router(state.clone()), state)
}
