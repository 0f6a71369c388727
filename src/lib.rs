// SPDX-License-Identifier: MIT

//! Arena-Tracker: track visits to NHL arenas.
//!
//! This crate provides the backend API for recording arena visits,
//! syncing reference data (teams and arenas) from external feeds, and
//! materializing users from Firebase-verified identities.

pub mod config;
pub mod entities;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod routes;
pub mod services;

use config::Config;
use sea_orm::DatabaseConnection;
use services::firebase::TokenVerifier;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: DatabaseConnection,
    pub verifier: Arc<dyn TokenVerifier>,
}
