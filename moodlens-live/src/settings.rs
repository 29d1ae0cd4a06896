//! Caller-adjustable live loop settings
//!
//! Seeded from the `[live]` TOML table and adjustable at runtime. Values
//! outside their allowed range are rejected, never clamped.

use moodlens_common::config::LiveSection;
use serde::{Deserialize, Serialize};

use crate::error::LoopError;

/// Lowest selectable auto-commit threshold
pub const MIN_CONFIDENCE_FLOOR: f64 = 0.35;

/// Highest selectable auto-commit threshold
pub const MIN_CONFIDENCE_CEILING: f64 = 0.90;

/// Base intervals offered to users: ultra fast, balanced, battery saver
pub const BASE_INTERVAL_PRESETS_MS: [u64; 3] = [900, 1500, 2400];

/// Cadence and gating settings for one live loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveSettings {
    /// Base delay between inferences (ms)
    pub base_interval_ms: u64,
    /// Adapt the delay to the last observed confidence
    pub adaptive: bool,
    /// Commit gated candidates to the consumer automatically
    pub auto_apply: bool,
    /// Raw confidence needed for auto-commit
    pub min_confidence: f64,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            base_interval_ms: 1500,
            adaptive: true,
            auto_apply: true,
            min_confidence: 0.55,
        }
    }
}

impl LiveSettings {
    pub fn validate(&self) -> Result<(), LoopError> {
        if self.base_interval_ms == 0 {
            return Err(LoopError::InvalidSettings(
                "base_interval_ms must be positive".to_string(),
            ));
        }

        if !(MIN_CONFIDENCE_FLOOR..=MIN_CONFIDENCE_CEILING).contains(&self.min_confidence) {
            return Err(LoopError::InvalidSettings(format!(
                "min_confidence must be within [{}, {}], got {}",
                MIN_CONFIDENCE_FLOOR, MIN_CONFIDENCE_CEILING, self.min_confidence
            )));
        }

        Ok(())
    }

    /// Build validated settings from the TOML `[live]` table
    pub fn from_section(section: &LiveSection) -> Result<Self, LoopError> {
        let settings = Self {
            base_interval_ms: section.base_interval_ms,
            adaptive: section.adaptive,
            auto_apply: section.auto_apply,
            min_confidence: section.min_confidence,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Apply a partial update, returning the validated result
    ///
    /// `self` is left untouched; the caller decides whether to store it.
    pub fn merged(&self, update: &LiveSettingsUpdate) -> Result<Self, LoopError> {
        let merged = Self {
            base_interval_ms: update.base_interval_ms.unwrap_or(self.base_interval_ms),
            adaptive: update.adaptive.unwrap_or(self.adaptive),
            auto_apply: update.auto_apply.unwrap_or(self.auto_apply),
            min_confidence: update.min_confidence.unwrap_or(self.min_confidence),
        };
        merged.validate()?;
        Ok(merged)
    }
}

/// Partial settings change; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveSettingsUpdate {
    pub base_interval_ms: Option<u64>,
    pub adaptive: Option<bool>,
    pub auto_apply: Option<bool>,
    pub min_confidence: Option<f64>,
}
