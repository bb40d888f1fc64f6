//! # Lumis Core Library
//!
//! This library provides the core business logic for Lumis, the
//! morning-sunlight habit app. It implements a CLI-first philosophy
//! where all operations are available via a standalone CLI binary,
//! with any GUI shell being a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Tracker**: daily light-minute accumulation, lux calibration,
//!   wall-clock tracking sessions and the streak engine
//! - **Shield**: the pure engage/release decision plus the controller
//!   that drives the native Screen Time bridge
//! - **Entitlements**: consumable unlocks (flares, skip passes, free
//!   monthly allotment)
//! - **Storage**: SQLite progress history and TOML-based configuration
//! - **Sync**: JSON-over-HTTPS backend client with token rotation
//!
//! ## Key Components
//!
//! - [`LumisStore`]: single-writer state store and transition methods
//! - [`ShieldController`]: debounced bridge command dispatch
//! - [`Database`]: progress history and kv persistence
//! - [`Config`]: application configuration management

pub mod apps;
pub mod entitlements;
pub mod error;
pub mod events;
pub mod notify;
pub mod shield;
pub mod storage;
pub mod store;
pub mod sync;
pub mod tracker;

pub use apps::{BlockedApp, BlockedApps, FREE_TIER_BLOCK_LIMIT};
pub use entitlements::{ConsumeOutcome, EntitlementLedger, GrantKind, UnlockSource};
pub use error::{ApiError, ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{LogNotifier, Notifier, ProgressUpdate};
pub use shield::{decide, NullBridge, ShieldBridge, ShieldController, ShieldDecision};
pub use storage::{Config, Database};
pub use store::LumisStore;
pub use sync::{SyncClient, SyncPayload, UserSettings};
pub use tracker::{
    CalibrationRecord, CreditPolicy, DailyProgress, DayBoundary, DayTracker, LightEnvironment,
    SessionState, StreakState, TrackingSession,
};
