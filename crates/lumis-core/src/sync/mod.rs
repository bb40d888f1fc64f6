//! Backend sync: payload types and the HTTP client.
//!
//! The persisted store is mirrored to the backend as plain JSON; there
//! is no formal schema version. Cross-device conflicts resolve
//! last-write-wins on the server.

pub mod auth;
pub mod client;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::{DailyProgress, StreakState};

pub use auth::TokenStore;
pub use client::SyncClient;

/// User-tunable settings mirrored to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub daily_goal_minutes: f64,
    pub premium: bool,
}

/// Everything pushed to / pulled from `sync_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    pub settings: UserSettings,
    pub streak: StreakState,
    pub progress: Vec<DailyProgress>,
}

/// Access/refresh token pair returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Profile returned by `GET /profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a receipt validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptStatus {
    pub valid: bool,
    pub premium: bool,
}

/// Current sync status, persisted in the kv store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Last successful sync timestamp.
    pub last_sync_at: Option<DateTime<Utc>>,
}
