//! Study sessions: timer records created on start and finalized on end.
//!
//! The caller owns the single active session; these helpers only apply the
//! lifecycle transitions to one record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Category;
use crate::xp::xp_for_session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Pomodoro,
    DeepWork,
    Custom,
    Break,
}

impl SessionType {
    /// Default timer length in minutes.
    pub fn planned_minutes(&self) -> u32 {
        match self {
            SessionType::Pomodoro => 25,
            SessionType::DeepWork => 90,
            SessionType::Custom => 60,
            SessionType::Break => 15,
        }
    }

    /// Breaks are tracked but never count as study activity.
    pub fn is_study(&self) -> bool {
        !matches!(self, SessionType::Break)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    pub category: Category,
    pub session_type: SessionType,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// Minutes. Stored as received; read through `effective_minutes`.
    #[serde(default)]
    pub duration: i64,

    pub is_active: bool,
    #[serde(default)]
    pub is_paused: bool,
    /// Minutes accumulated while paused.
    #[serde(default)]
    pub paused_duration: i64,
    /// When the current pause began.
    #[serde(default)]
    pub paused_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub notes: Option<String>,
    /// 1-10 self-rating.
    #[serde(default)]
    pub focus_score: Option<f64>,
    #[serde(default)]
    pub xp_earned: u32,
}

impl StudySession {
    /// Start a new active session at `now`.
    pub fn start(
        id: impl Into<String>,
        category: Category,
        session_type: SessionType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: None,
            category,
            session_type,
            start_time: now,
            end_time: None,
            duration: 0,
            is_active: true,
            is_paused: false,
            paused_duration: 0,
            paused_at: None,
            notes: None,
            focus_score: None,
            xp_earned: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn pause(&mut self, now: DateTime<Utc>) {
        if !self.is_active || self.is_paused {
            return;
        }
        self.is_paused = true;
        self.paused_at = Some(now);
    }

    pub fn resume(&mut self, now: DateTime<Utc>) {
        if !self.is_active || !self.is_paused {
            return;
        }
        self.close_pause(now);
    }

    /// Finalize the session: fixes end time, duration and XP.
    ///
    /// Duration is whole elapsed minutes minus paused minutes. Ending an
    /// already finalized session is a no-op.
    pub fn end(&mut self, now: DateTime<Utc>, focus_score: Option<f64>, notes: Option<String>) {
        if self.is_finalized() {
            return;
        }
        if self.is_paused {
            self.close_pause(now);
        }

        let elapsed = (now - self.start_time).num_minutes().max(0);
        self.duration = (elapsed - self.paused_duration.max(0)).max(0);
        self.end_time = Some(now);
        self.is_active = false;
        self.focus_score = focus_score;
        if notes.is_some() {
            self.notes = notes;
        }
        self.xp_earned = xp_for_session(self);
    }

    fn close_pause(&mut self, now: DateTime<Utc>) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_duration += (now - paused_at).num_minutes().max(0);
        }
        self.is_paused = false;
    }

    pub fn is_finalized(&self) -> bool {
        self.end_time.is_some()
    }

    /// Duration in minutes with malformed (negative) values read as 0.
    pub fn effective_minutes(&self) -> u64 {
        self.duration.max(0) as u64
    }

    /// Focus score clamped into 1..=10; NaN and infinities read as absent.
    pub fn effective_focus(&self) -> Option<f64> {
        self.focus_score
            .filter(|score| score.is_finite())
            .map(|score| score.clamp(1.0, 10.0))
    }
}
