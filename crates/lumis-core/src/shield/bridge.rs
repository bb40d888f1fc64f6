//! Native Screen Time bridge seam.
//!
//! The OS-level block lives outside this crate. Platform bindings
//! implement [`ShieldBridge`]; every call reports success as a plain
//! boolean and must never panic into domain code. On platforms
//! without Screen Time the [`NullBridge`] stands in and the shield is
//! logical-only.

use crate::apps::BlockedApp;

/// Platform enforcement surface for the app shield.
pub trait ShieldBridge: Send + Sync {
    /// Unique identifier (e.g. "screentime", "null").
    fn name(&self) -> &str;

    /// Ask the OS for Screen Time authorization.
    fn request_authorization(&self) -> bool;

    /// Present the native app picker. Returns true when the user
    /// changed the selection.
    fn show_app_picker(&self) -> bool {
        false // default no-op
    }

    /// The app selection the OS currently knows about.
    fn app_toggles(&self) -> Vec<BlockedApp> {
        Vec::new() // default no-op
    }

    /// Start blocking the selected apps.
    fn activate_shield(&self) -> bool;

    /// Stop blocking.
    fn deactivate_shield(&self) -> bool;

    /// Whether the OS reports the shield as currently enforcing.
    fn is_shield_active(&self) -> bool;

    /// Push progress numbers for the shield overlay UI.
    fn update_shield_data(&self, _goal_minutes: f64, _light_minutes: f64, _streak: u32) -> bool {
        true // default no-op
    }
}

/// No-op bridge for platforms without Screen Time.
///
/// Reports success so callers do not log a failure for every decision;
/// `is_shield_active` stays false because nothing enforces.
#[derive(Debug, Default)]
pub struct NullBridge;

impl ShieldBridge for NullBridge {
    fn name(&self) -> &str {
        "null"
    }

    fn request_authorization(&self) -> bool {
        true
    }

    fn activate_shield(&self) -> bool {
        true
    }

    fn deactivate_shield(&self) -> bool {
        true
    }

    fn is_shield_active(&self) -> bool {
        false
    }
}
