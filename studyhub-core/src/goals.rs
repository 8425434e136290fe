//! Goal types: numeric targets with a one-way completion transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Category;

/// A measurable goal, e.g. "read 12 chapters".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: Category,
    /// Positive target in `unit`.
    pub target_value: f64,
    /// 0 <= current_value <= target_value
    pub current_value: f64,
    /// Free-form unit ("chapters", "hours", ...)
    pub unit: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_completed: bool,
    /// Set at the first crossing of the target, never cleared afterwards.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub xp_value: u32,
}

impl Goal {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        target_value: f64,
        unit: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            category: Category::Study,
            target_value,
            current_value: 0.0,
            unit: unit.into(),
            deadline: None,
            created_at,
            updated_at: created_at,
            is_completed: false,
            completed_at: None,
            xp_value: 0,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Record a new absolute progress value.
    ///
    /// The value is clamped into `0..=target_value`. Returns `true` when this
    /// update is the one that completed the goal.
    pub fn record_progress(&mut self, value: f64, now: DateTime<Utc>) -> bool {
        let value = if value.is_finite() { value } else { 0.0 };
        self.current_value = value.clamp(0.0, self.target_value.max(0.0));
        self.updated_at = now;

        if !self.is_completed && self.target_value > 0.0 && self.current_value >= self.target_value
        {
            self.is_completed = true;
            self.completed_at = Some(now);
            return true;
        }
        false
    }

    /// Completion percentage in 0..=100.
    pub fn progress_percent(&self) -> f64 {
        if !(self.target_value > 0.0) || !self.current_value.is_finite() {
            return 0.0;
        }
        (self.current_value / self.target_value * 100.0).clamp(0.0, 100.0)
    }
}
