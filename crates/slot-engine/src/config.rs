//! Engine configuration: injected default preferences and tunable scoring weights.
//!
//! The weights are heuristic parameters. What callers can rely on is their
//! relative behavior (an in-hours slot beats an out-of-hours one, a preferred
//! day beats a non-preferred one), not the exact numbers.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::model::UserSchedulingPreference;
use crate::window::MAX_HORIZON_DAYS;

/// Additive score adjustments applied on top of [`ScoringWeights::base`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub base: f64,
    pub in_working_hours: f64,
    pub outside_working_hours: f64,
    pub preferred_day: f64,
    pub non_preferred_day: f64,
    pub lunch_overlap: f64,
    pub sweet_spot: f64,
    pub round_time: f64,
    pub time_of_day_match: f64,
    pub organizer_day_match: f64,
    pub urgency_match: f64,
    pub historical_pattern: f64,
    pub optimal_hours: f64,
    pub late_day: f64,
    pub collaboration_day: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 0.5,
            in_working_hours: 0.3,
            outside_working_hours: -0.4,
            preferred_day: 0.2,
            non_preferred_day: -0.3,
            lunch_overlap: -0.2,
            sweet_spot: 0.15,
            round_time: 0.1,
            time_of_day_match: 0.3,
            organizer_day_match: 0.2,
            urgency_match: 0.4,
            historical_pattern: 0.15,
            optimal_hours: 0.1,
            late_day: -0.2,
            collaboration_day: 0.1,
        }
    }
}

/// Everything the engine needs besides the request itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Substituted for any participant without a stored preference record.
    pub default_preference: UserSchedulingPreference,
    pub weights: ScoringWeights,
    pub max_suggestions: usize,
    pub plain_grid_minutes: u32,
    pub context_grid_minutes: u32,
    pub default_horizon_days: u32,
    pub urgent_horizon_days: u32,
    /// Minimum distance between fill-in suggestions and rebalanced picks.
    pub min_separation_minutes: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_preference: UserSchedulingPreference::standard(),
            weights: ScoringWeights::default(),
            max_suggestions: 5,
            plain_grid_minutes: 15,
            context_grid_minutes: 30,
            default_horizon_days: 7,
            urgent_horizon_days: 3,
            min_separation_minutes: 120,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| SlotError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_suggestions == 0 {
            return Err(SlotError::InvalidConfig(
                "max_suggestions must be at least 1".to_string(),
            ));
        }
        for (name, grid) in [
            ("plain_grid_minutes", self.plain_grid_minutes),
            ("context_grid_minutes", self.context_grid_minutes),
        ] {
            if grid == 0 || 60 % grid != 0 {
                return Err(SlotError::InvalidConfig(format!(
                    "{name} must divide 60, got {grid}"
                )));
            }
        }
        for (name, days) in [
            ("default_horizon_days", self.default_horizon_days),
            ("urgent_horizon_days", self.urgent_horizon_days),
        ] {
            if !(1..=MAX_HORIZON_DAYS).contains(&days) {
                return Err(SlotError::InvalidConfig(format!(
                    "{name} must be between 1 and {MAX_HORIZON_DAYS}, got {days}"
                )));
            }
        }
        Ok(())
    }
}
