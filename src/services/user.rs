// SPDX-License-Identifier: MIT

//! User reconciliation: first-touch materialization of Firebase identities.

use crate::entities::{prelude::User, user};
use crate::error::AppError;
use crate::services::firebase::AuthClaims;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    SqlErr,
};
use uuid::Uuid;

/// Find-or-create the user for a verified identity, refreshing mutable
/// profile fields from the claims.
///
/// A claim only overwrites the stored value when it is non-empty; partially
/// populated claims never erase known-good local data. When nothing changed
/// the write is skipped entirely, so repeated calls with identical claims
/// are idempotent.
pub async fn reconcile(
    db: &DatabaseConnection,
    claims: &AuthClaims,
) -> Result<user::Model, AppError> {
    if let Some(existing) = find_by_firebase_uid(db, &claims.subject).await? {
        return refresh_profile(db, existing, claims).await;
    }

    let now = Utc::now();
    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        firebase_uid: Set(claims.subject.clone()),
        email: Set(non_empty(claims.email.as_deref())
            .unwrap_or_default()
            .to_string()),
        display_name: Set(non_empty(claims.name.as_deref()).map(str::to_string)),
        avatar_url: Set(non_empty(claims.picture.as_deref()).map(str::to_string)),
        created_at: Set(now),
        updated_at: Set(now),
    };

    match new_user.insert(db).await {
        Ok(created) => {
            tracing::info!(firebase_uid = %claims.subject, "Created user on first authentication");
            Ok(created)
        }
        // A concurrent request for the same identity won the insert race.
        // The unique constraint on firebase_uid is the authoritative
        // deduplication, so fall back to reading the winner's row.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::debug!(
                firebase_uid = %claims.subject,
                "Lost user creation race, re-reading existing row"
            );
            let existing = find_by_firebase_uid(db, &claims.subject)
                .await?
                .ok_or_else(|| AppError::Database(format!("user {} vanished", claims.subject)))?;
            refresh_profile(db, existing, claims).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Get a user by their Firebase UID.
pub async fn find_by_firebase_uid(
    db: &DatabaseConnection,
    firebase_uid: &str,
) -> Result<Option<user::Model>, AppError> {
    Ok(User::find()
        .filter(user::Column::FirebaseUid.eq(firebase_uid))
        .one(db)
        .await?)
}

/// Overwrite stored profile fields from non-empty claims; no-op otherwise.
async fn refresh_profile(
    db: &DatabaseConnection,
    existing: user::Model,
    claims: &AuthClaims,
) -> Result<user::Model, AppError> {
    let mut changed = false;
    let mut active = user::ActiveModel {
        id: Set(existing.id),
        ..Default::default()
    };

    if let Some(email) = non_empty(claims.email.as_deref()) {
        if email != existing.email {
            active.email = Set(email.to_string());
            changed = true;
        }
    }
    if let Some(name) = non_empty(claims.name.as_deref()) {
        if existing.display_name.as_deref() != Some(name) {
            active.display_name = Set(Some(name.to_string()));
            changed = true;
        }
    }
    if let Some(picture) = non_empty(claims.picture.as_deref()) {
        if existing.avatar_url.as_deref() != Some(picture) {
            active.avatar_url = Set(Some(picture.to_string()));
            changed = true;
        }
    }

    if !changed {
        return Ok(existing);
    }

    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
