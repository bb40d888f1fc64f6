//! Lux calibration and indoor/outdoor classification.
//!
//! Calibration stores two baseline readings taken during onboarding:
//! one indoors away from windows, one outdoors. Tracking classifies
//! each sensor sample against these baselines to pick the credit rate.
//! Without a user-performed calibration, a fixed lux threshold is used.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Classification of a single ambient-light sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightEnvironment {
    Indoor,
    Outdoor,
}

/// Credit-rate parameters.
///
/// The indoor discount and the uncalibrated threshold are heuristics,
/// kept configurable rather than baked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPolicy {
    #[serde(default = "default_outdoor_multiplier")]
    pub outdoor_multiplier: f64,
    #[serde(default = "default_indoor_multiplier")]
    pub indoor_multiplier: f64,
    /// Lux threshold separating indoor from outdoor when no user
    /// calibration exists.
    #[serde(default = "default_uncalibrated_outdoor_lux")]
    pub uncalibrated_outdoor_lux: f64,
}

fn default_outdoor_multiplier() -> f64 {
    1.0
}
fn default_indoor_multiplier() -> f64 {
    0.5
}
fn default_uncalibrated_outdoor_lux() -> f64 {
    1000.0
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            outdoor_multiplier: default_outdoor_multiplier(),
            indoor_multiplier: default_indoor_multiplier(),
            uncalibrated_outdoor_lux: default_uncalibrated_outdoor_lux(),
        }
    }
}

impl CreditPolicy {
    /// Multiplier applied to elapsed minutes for the given environment.
    pub fn multiplier(&self, env: LightEnvironment) -> f64 {
        match env {
            LightEnvironment::Outdoor => self.outdoor_multiplier,
            LightEnvironment::Indoor => self.indoor_multiplier,
        }
    }
}

/// Indoor/outdoor lux baselines.
///
/// Created or overwritten during onboarding and settings; read-only
/// while tracking. Replaced, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationRecord {
    pub indoor_lux: f64,
    pub outdoor_lux: f64,
    /// Whether calibration was user-performed vs. defaulted.
    pub is_calibrated: bool,
}

impl Default for CalibrationRecord {
    fn default() -> Self {
        Self {
            indoor_lux: 250.0,
            outdoor_lux: 10_000.0,
            is_calibrated: false,
        }
    }
}

impl CalibrationRecord {
    /// Build a user-performed calibration from two baseline readings.
    ///
    /// # Errors
    ///
    /// Returns an error if either reading is negative or the outdoor
    /// baseline does not exceed the indoor one.
    pub fn calibrate(indoor_lux: f64, outdoor_lux: f64) -> Result<Self, ValidationError> {
        if indoor_lux < 0.0 || outdoor_lux < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "lux".into(),
                message: "lux readings cannot be negative".into(),
            });
        }
        if outdoor_lux <= indoor_lux {
            return Err(ValidationError::InvalidValue {
                field: "outdoor_lux".into(),
                message: format!(
                    "outdoor baseline ({outdoor_lux}) must exceed indoor baseline ({indoor_lux})"
                ),
            });
        }
        Ok(Self {
            indoor_lux,
            outdoor_lux,
            is_calibrated: true,
        })
    }

    /// Lux level at or above which a sample counts as outdoor.
    ///
    /// Calibrated records use the midpoint between the two baselines;
    /// uncalibrated records fall back to the policy threshold.
    pub fn outdoor_threshold(&self, policy: &CreditPolicy) -> f64 {
        if self.is_calibrated {
            (self.indoor_lux + self.outdoor_lux) / 2.0
        } else {
            policy.uncalibrated_outdoor_lux
        }
    }

    /// Classify a single lux sample.
    pub fn classify(&self, lux: f64, policy: &CreditPolicy) -> LightEnvironment {
        if lux >= self.outdoor_threshold(policy) {
            LightEnvironment::Outdoor
        } else {
            LightEnvironment::Indoor
        }
    }
}
