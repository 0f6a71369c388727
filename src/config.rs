// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup into a plain struct that travels
//! inside `AppState`; no component does ambient env lookups after boot.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Human-readable service name (used by the root endpoint)
    pub app_name: String,
    /// Database connection URL (postgres:// in production, sqlite: locally)
    pub database_url: String,
    /// Firebase project ID; doubles as the expected token audience
    pub firebase_project_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Base URL of the NHL stats REST API (team list)
    pub nhl_stats_base_url: String,
    /// Base URL of the NHL web API (standings)
    pub nhl_web_base_url: String,
    /// Path to the operator-maintained arenas dataset
    pub arenas_file: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            app_name: env::var("APP_NAME").unwrap_or_else(|_| "NHL Arena Tracker API".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://arena_tracker.db?mode=rwc".to_string()),
            firebase_project_id: env::var("FIREBASE_PROJECT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_PROJECT_ID"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            nhl_stats_base_url: env::var("NHL_STATS_BASE_URL")
                .unwrap_or_else(|_| "https://api.nhle.com/stats/rest".to_string()),
            nhl_web_base_url: env::var("NHL_WEB_BASE_URL")
                .unwrap_or_else(|_| "https://api-web.nhle.com".to_string()),
            arenas_file: env::var("ARENAS_FILE").unwrap_or_else(|_| "data/arenas.json".to_string()),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            app_name: "NHL Arena Tracker API".to_string(),
            database_url: "sqlite::memory:".to_string(),
            firebase_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            nhl_stats_base_url: "http://localhost:0".to_string(),
            nhl_web_base_url: "http://localhost:0".to_string(),
            arenas_file: "data/arenas.json".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
