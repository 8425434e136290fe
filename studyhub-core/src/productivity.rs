//! Productivity score (0-100).
//!
//! The study signal compares this week's study minutes against the weekly
//! target. Task completion rate and goal progress are optional signals,
//! weighted through `ScoreWeights` (both weigh 0 by default).

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::EngineConfig;
use crate::goals::Goal;
use crate::session::StudySession;
use crate::task::{Task, TaskStatus};
use crate::time::{in_week, local_date, week_start};

/// Minutes logged by sessions that started in the current Monday-based week.
pub fn weekly_study_minutes(sessions: &[StudySession], now: DateTime<Utc>, tz: Tz) -> u64 {
    let start = week_start(local_date(now, tz));
    sessions
        .iter()
        .filter(|s| in_week(local_date(s.start_time, tz), start))
        .map(StudySession::effective_minutes)
        .fold(0u64, u64::saturating_add)
}

/// Weekly study minutes as a percentage of the target, capped at 100.
pub fn study_signal(minutes: u64, weekly_target: u64) -> f64 {
    if weekly_target == 0 {
        return 0.0;
    }
    (minutes as f64 / weekly_target as f64 * 100.0).min(100.0)
}

/// Completed share of all non-cancelled tasks, 0..=100.
pub fn task_completion_signal(tasks: &[Task]) -> f64 {
    let considered: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Cancelled)
        .collect();
    if considered.is_empty() {
        return 0.0;
    }
    let done = considered.iter().filter(|t| t.is_completed()).count();
    done as f64 / considered.len() as f64 * 100.0
}

/// Mean goal progress, 0..=100.
pub fn goal_progress_signal(goals: &[Goal]) -> f64 {
    if goals.is_empty() {
        return 0.0;
    }
    goals.iter().map(Goal::progress_percent).sum::<f64>() / goals.len() as f64
}

pub fn compute_productivity_score(
    tasks: &[Task],
    sessions: &[StudySession],
    goals: &[Goal],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> u8 {
    let weights = config.score_weights;
    let total_weight = weights.total();
    if !(total_weight > 0.0) {
        return 0;
    }

    let mut weighted = 0.0;
    if weights.study > 0.0 {
        let minutes = weekly_study_minutes(sessions, now, config.timezone);
        weighted += weights.study * study_signal(minutes, config.weekly_target_minutes());
    }
    if weights.tasks > 0.0 {
        weighted += weights.tasks * task_completion_signal(tasks);
    }
    if weights.goals > 0.0 {
        weighted += weights.goals * goal_progress_signal(goals);
    }

    let score = (weighted / total_weight).round();
    if score.is_finite() { score.clamp(0.0, 100.0) as u8 } else { 0 }
}
