//! Engine configuration knobs.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::level::DEFAULT_MAX_LEVEL;
use crate::time::parse_timezone;

pub const DEFAULT_DAILY_STUDY_TARGET_MINUTES: u32 = 120;

/// Relative weight of each productivity signal.
///
/// The default only scores weekly study time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub study: f64,
    pub tasks: f64,
    pub goals: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            study: 1.0,
            tasks: 0.0,
            goals: 0.0,
        }
    }
}

impl ScoreWeights {
    pub fn new(study: f64, tasks: f64, goals: f64) -> Result<Self, ConfigError> {
        let ok = [study, tasks, goals]
            .iter()
            .all(|w| w.is_finite() && *w >= 0.0);
        if !ok {
            return Err(ConfigError::InvalidWeights);
        }
        Ok(Self { study, tasks, goals })
    }

    pub fn total(&self) -> f64 {
        self.study + self.tasks + self.goals
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Zone used to bucket instants into calendar days.
    pub timezone: Tz,
    pub daily_study_target_minutes: u32,
    pub max_level: u32,
    pub score_weights: ScoreWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            daily_study_target_minutes: DEFAULT_DAILY_STUDY_TARGET_MINUTES,
            max_level: DEFAULT_MAX_LEVEL,
            score_weights: ScoreWeights::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    pub fn with_timezone_name(self, name: &str) -> Result<Self, ConfigError> {
        Ok(self.with_timezone(parse_timezone(name)?))
    }

    pub fn with_daily_target(mut self, minutes: u32) -> Result<Self, ConfigError> {
        if minutes == 0 {
            return Err(ConfigError::ZeroDailyTarget);
        }
        self.daily_study_target_minutes = minutes;
        Ok(self)
    }

    pub fn with_max_level(mut self, max_level: u32) -> Result<Self, ConfigError> {
        if max_level == 0 {
            return Err(ConfigError::ZeroMaxLevel);
        }
        self.max_level = max_level;
        Ok(self)
    }

    pub fn with_score_weights(mut self, weights: ScoreWeights) -> Self {
        self.score_weights = weights;
        self
    }

    /// Minutes per week the study signal is measured against.
    pub fn weekly_target_minutes(&self) -> u64 {
        self.daily_study_target_minutes as u64 * 7
    }
}
