// SPDX-License-Identifier: MIT

//! Firebase ID token verification.
//!
//! Tokens are RS256 JWTs signed by Google's secure-token service. Signing
//! keys are fetched from the public JWK endpoint and cached in memory with
//! a TTL; an unknown `kid` forces one refresh before giving up.

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const JWKS_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Verified identity claims released by Firebase.
///
/// Immutable snapshot of what the token asserted; `extra` carries any
/// claims this service does not model, for forward compatibility.
#[derive(Debug, Clone)]
pub struct AuthClaims {
    /// Stable subject id (`firebase_uid` on the user row).
    pub subject: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Token verification failure.
///
/// Deliberately a single kind: routes treat every failure as "unauthorized"
/// (or "anonymous" on optional-auth routes) and only logs see the detail.
#[derive(Debug, thiserror::Error)]
#[error("token verification failed: {0}")]
pub struct VerifyError(pub String);

/// Seam between the auth middleware and the external trust anchor.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthClaims, VerifyError>;
}

/// Raw JWT payload of a Firebase ID token.
#[derive(Debug, Deserialize)]
struct FirebaseTokenClaims {
    sub: String,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
    picture: Option<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<FirebaseTokenClaims> for AuthClaims {
    fn from(claims: FirebaseTokenClaims) -> Self {
        AuthClaims {
            subject: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified.unwrap_or(false),
            name: claims.name,
            picture: claims.picture,
            extra: claims.extra,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for Firebase-issued ID tokens.
pub struct FirebaseAuthVerifier {
    http_client: reqwest::Client,
    project_id: String,
    jwks_url: String,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl FirebaseAuthVerifier {
    pub fn new(project_id: &str) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()?;

        tracing::info!(project = project_id, "Initialized Firebase token verifier");

        Ok(Self {
            http_client,
            project_id: project_id.to_string(),
            jwks_url: JWKS_URL.to_string(),
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;
        validation
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, VerifyError> {
        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(VerifyError(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), VerifyError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        let jwks: JwkSet = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| VerifyError(format!("JWKS fetch failed: {e}")))?
            .error_for_status()
            .map_err(|e| VerifyError(format!("JWKS fetch failed: {e}")))?
            .json()
            .await
            .map_err(|e| VerifyError(format!("JWKS parse failed: {e}")))?;

        let mut keys_by_kid = HashMap::new();
        for jwk in jwks.keys {
            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys_by_kid.insert(jwk.kid, Arc::new(key));
                }
                Err(e) => {
                    tracing::warn!(kid = %jwk.kid, error = %e, "Skipping unusable JWK");
                }
            }
        }

        tracing::debug!(count = keys_by_kid.len(), "Refreshed Firebase JWKS");

        let mut cache = self.jwks_cache.write().await;
        *cache = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + JWKS_CACHE_TTL,
        });

        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for FirebaseAuthVerifier {
    async fn verify(&self, token: &str) -> Result<AuthClaims, VerifyError> {
        if token.trim().is_empty() {
            return Err(VerifyError("empty token".to_string()));
        }

        let header =
            decode_header(token).map_err(|e| VerifyError(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifyError(format!("unexpected JWT alg: {:?}", header.alg)));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let token_data =
            decode::<FirebaseTokenClaims>(token, decoding_key.as_ref(), &self.validation())
                .map_err(|e| VerifyError(format!("JWT validation failed: {e}")))?;

        Ok(token_data.claims.into())
    }
}
