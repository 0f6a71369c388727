// SPDX-License-Identifier: MIT

//! NHL API client for the team feed.
//!
//! The team list comes from the stats REST endpoint; city names are mined
//! from the standings endpoint when available. The feed carries no stable
//! numeric id across runs, so the upper-cased abbreviation is the key.

use crate::error::AppError;
use serde::Deserialize;
use std::collections::HashMap;

/// One team record from the external feed, normalized for the sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamFeedEntry {
    pub name: String,
    pub abbreviation: String,
    pub city: Option<String>,
}

/// NHL API client.
#[derive(Clone)]
pub struct NhlClient {
    http: reqwest::Client,
    stats_base_url: String,
    web_base_url: String,
}

impl NhlClient {
    pub fn new(stats_base_url: &str, web_base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            stats_base_url: stats_base_url.trim_end_matches('/').to_string(),
            web_base_url: web_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch all NHL teams, enriched with city names from standings.
    ///
    /// A standings failure only costs the city enrichment; the primary
    /// team list must succeed or the whole fetch fails. A response without
    /// a `data` array counts as a failed fetch; an empty `data` array is a
    /// valid (empty) feed.
    pub async fn fetch_teams(&self) -> Result<Vec<TeamFeedEntry>, AppError> {
        let url = format!("{}/en/team", self.stats_base_url);
        let teams: serde_json::Value = self.get_json(&url).await?;

        let city_by_abbreviation = match self.fetch_standings().await {
            Ok(standings) => {
                let map = city_map_from_standings(&standings);
                tracing::debug!(count = map.len(), "City names linked from standings");
                Some(map)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Could not get standings for city names");
                None
            }
        };

        let entries = entries_from_feed(&teams, city_by_abbreviation.as_ref())?;

        tracing::info!(count = entries.len(), "Fetched teams from NHL API");
        Ok(entries)
    }

    async fn fetch_standings(&self) -> Result<serde_json::Value, AppError> {
        let url = format!("{}/v1/standings/now", self.web_base_url);
        self.get_json(&url).await
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::NhlApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::NhlApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::NhlApi(e.to_string()))
    }
}

/// Mine the feed rows out of a team-list response. The `data` array must
/// be present; non-object rows within it are dropped.
fn entries_from_feed(
    feed: &serde_json::Value,
    city_by_abbreviation: Option<&HashMap<String, String>>,
) -> Result<Vec<TeamFeedEntry>, AppError> {
    let rows = feed
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| AppError::NhlApi("team feed has no 'data' array".to_string()))?;

    Ok(rows
        .iter()
        .filter(|row| row.is_object())
        .map(|row| team_from_feed(row, city_by_abbreviation))
        .collect())
}

/// Map one feed row to a `TeamFeedEntry`. The feed uses `triCode` for the
/// abbreviation and `fullName` for the name.
fn team_from_feed(
    row: &serde_json::Value,
    city_by_abbreviation: Option<&HashMap<String, String>>,
) -> TeamFeedEntry {
    let abbreviation = row
        .get("triCode")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .trim()
        .to_uppercase();

    let name = row
        .get("fullName")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            if abbreviation.is_empty() {
                "Unknown".to_string()
            } else {
                abbreviation.clone()
            }
        });

    let city = city_by_abbreviation
        .filter(|_| !abbreviation.is_empty())
        .and_then(|m| m.get(&abbreviation).cloned());

    TeamFeedEntry {
        name,
        abbreviation,
        city,
    }
}

/// Link team abbreviations to city names from the standings response.
fn city_map_from_standings(standings: &serde_json::Value) -> HashMap<String, String> {
    let mut city_by_abbreviation = HashMap::new();
    let rows = standings
        .get("standings")
        .and_then(|s| s.as_array())
        .map(|v| v.as_slice())
        .unwrap_or_default();

    for row in rows {
        let abbreviation = row
            .get("teamAbbrev")
            .and_then(|a| a.get("default"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let city = row
            .get("placeName")
            .and_then(|p| p.get("default"))
            .and_then(|v| v.as_str());

        if let (false, Some(city)) = (abbreviation.is_empty(), city) {
            city_by_abbreviation.insert(abbreviation.to_string(), city.to_string());
        }
    }

    city_by_abbreviation
}
