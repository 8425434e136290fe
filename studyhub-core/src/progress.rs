//! Progress aggregation: one pass from record snapshots to derived progress.
//!
//! `ProgressEngine::recompute` is called by the state owner whenever tasks,
//! goals or sessions change. It holds no state between calls; everything it
//! needs from the previous pass comes in through `PriorState`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::achievements::{evaluate_achievements, Achievement, AchievementDef, Catalog};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::goals::Goal;
use crate::level::resolve_level_capped;
use crate::productivity::compute_productivity_score;
use crate::session::StudySession;
use crate::streak::compute_streak;
use crate::task::Task;
use crate::xp::{xp_for_session, xp_for_task};

/// Read-only view over the caller's record sets.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub tasks: &'a [Task],
    pub goals: &'a [Goal],
    pub sessions: &'a [StudySession],
}

impl<'a> Snapshot<'a> {
    pub fn new(tasks: &'a [Task], goals: &'a [Goal], sessions: &'a [StudySession]) -> Self {
        Self {
            tasks,
            goals,
            sessions,
        }
    }

    /// Latest completion or session end among the records.
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        let task_times = self.tasks.iter().filter_map(Task::completion_time);
        let session_times = self.sessions.iter().filter_map(|s| s.end_time);
        task_times.chain(session_times).max()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub level: u32,
    pub current_xp: u64,
    pub next_level_xp: u64,
    pub total_xp: u64,
    pub streak_days: u32,
    pub longest_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<DateTime<Utc>>,
    pub productivity_score: u8,
    pub total_study_hours: f64,
    pub total_tasks_completed: u32,
    pub total_goals_completed: u32,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            next_level_xp: 1000,
            total_xp: 0,
            streak_days: 0,
            longest_streak: 0,
            last_active_date: None,
            productivity_score: 0,
            total_study_hours: 0.0,
            total_tasks_completed: 0,
            total_goals_completed: 0,
        }
    }
}

/// Output of the previous pass, fed back into the next one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorState {
    #[serde(default)]
    pub progress: UserProgress,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress: UserProgress,
    /// One instance per catalog entry.
    pub achievements: Vec<Achievement>,
    /// Unlocked for the first time in this pass; notify once each.
    pub newly_unlocked: Vec<Achievement>,
}

impl ProgressUpdate {
    pub fn into_prior(self) -> PriorState {
        PriorState {
            progress: self.progress,
            achievements: self.achievements,
        }
    }
}

/// Lifetime XP: completed tasks plus finished sessions.
pub fn total_xp(tasks: &[Task], sessions: &[StudySession]) -> u64 {
    let from_tasks: u64 = tasks
        .iter()
        .filter(|t| t.is_completed())
        .map(|t| xp_for_task(t) as u64)
        .fold(0u64, u64::saturating_add);
    let from_sessions: u64 = sessions
        .iter()
        .filter(|s| s.is_finalized())
        .map(|s| xp_for_session(s) as u64)
        .fold(0u64, u64::saturating_add);
    from_tasks.saturating_add(from_sessions)
}

/// Stateless orchestrator over a fixed config and catalog.
#[derive(Debug, Clone, Default)]
pub struct ProgressEngine {
    config: EngineConfig,
    catalog: Catalog,
}

impl ProgressEngine {
    pub fn new(config: EngineConfig, catalog: Catalog) -> Self {
        Self { config, catalog }
    }

    /// Engine for a named timezone with caller-supplied catalog entries.
    pub fn from_parts(timezone: &str, entries: Vec<AchievementDef>) -> Result<Self, EngineError> {
        let config = EngineConfig::default().with_timezone_name(timezone)?;
        Ok(Self::new(config, Catalog::new(entries)?))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Derive progress and achievements for the current snapshot.
    pub fn recompute(
        &self,
        snapshot: Snapshot<'_>,
        prior: &PriorState,
        now: DateTime<Utc>,
    ) -> ProgressUpdate {
        let malformed = snapshot.sessions.iter().filter(|s| s.duration < 0).count();
        if malformed > 0 {
            debug!(malformed, "negative session durations read as 0");
        }

        let total_xp = total_xp(snapshot.tasks, snapshot.sessions);
        let level = resolve_level_capped(total_xp, self.config.max_level);

        let streak_days = compute_streak(
            snapshot.sessions,
            snapshot.tasks,
            now,
            self.config.timezone,
        );
        let longest_streak = prior.progress.longest_streak.max(streak_days);

        let productivity_score = compute_productivity_score(
            snapshot.tasks,
            snapshot.sessions,
            snapshot.goals,
            now,
            &self.config,
        );

        let study_minutes: u64 = snapshot
            .sessions
            .iter()
            .map(StudySession::effective_minutes)
            .fold(0u64, u64::saturating_add);
        let total_tasks_completed =
            snapshot.tasks.iter().filter(|t| t.is_completed()).count() as u32;
        let total_goals_completed = snapshot.goals.iter().filter(|g| g.is_completed).count() as u32;

        let last_active_date = match (snapshot.last_activity(), prior.progress.last_active_date) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };

        let progress = UserProgress {
            level: level.level,
            current_xp: level.current_xp,
            next_level_xp: level.next_level_xp,
            total_xp,
            streak_days,
            longest_streak,
            last_active_date,
            productivity_score,
            total_study_hours: study_minutes as f64 / 60.0,
            total_tasks_completed,
            total_goals_completed,
        };

        if progress.level > prior.progress.level {
            info!(from = prior.progress.level, to = progress.level, "level up");
        }
        debug!(
            total_xp,
            level = progress.level,
            streak_days,
            productivity_score,
            "progress recomputed"
        );

        let evaluation = evaluate_achievements(
            &snapshot,
            &progress,
            &self.catalog,
            &prior.achievements,
            now,
        );

        ProgressUpdate {
            progress,
            achievements: evaluation.achievements,
            newly_unlocked: evaluation.newly_unlocked,
        }
    }
}
