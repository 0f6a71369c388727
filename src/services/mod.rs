// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod firebase;
pub mod nhl_api;
pub mod sync;
pub mod user;

pub use firebase::{AuthClaims, FirebaseAuthVerifier, TokenVerifier, VerifyError};
pub use nhl_api::{NhlClient, TeamFeedEntry};
pub use sync::{ReferenceSync, SyncError, SyncResult};
