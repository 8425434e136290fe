//! XP awards for completed tasks and finished study sessions.

use crate::session::StudySession;
use crate::task::{Priority, Task};

/// XP per study minute.
pub const XP_PER_STUDY_MINUTE: u64 = 2;

/// Bonus for finishing a task at or before its deadline.
pub const DEADLINE_BONUS: f64 = 1.2;

/// Bonus for a session rated at least `FOCUS_BONUS_THRESHOLD`.
pub const FOCUS_BONUS: f64 = 1.3;
pub const FOCUS_BONUS_THRESHOLD: f64 = 8.0;

impl Priority {
    /// Base XP for completing a task of this priority.
    pub fn base_xp(&self) -> u32 {
        match self {
            Priority::Low => 10,
            Priority::Medium => 25,
            Priority::High => 50,
            Priority::Urgent => 75,
        }
    }
}

/// XP award for a completed task. Tasks that are not completed earn 0.
pub fn xp_for_task(task: &Task) -> u32 {
    if !task.is_completed() {
        return 0;
    }

    let base = task.priority.base_xp() as f64;
    let on_time = match (task.deadline, task.completed_at) {
        (Some(deadline), Some(completed_at)) => completed_at <= deadline,
        _ => false,
    };

    if on_time {
        (base * DEADLINE_BONUS).round() as u32
    } else {
        base as u32
    }
}

/// XP award for a session's duration, with the focus bonus when earned.
pub fn xp_for_session(session: &StudySession) -> u32 {
    let base = session.effective_minutes().saturating_mul(XP_PER_STUDY_MINUTE) as f64;
    let focused = session
        .effective_focus()
        .is_some_and(|score| score >= FOCUS_BONUS_THRESHOLD);

    let xp = if focused { (base * FOCUS_BONUS).round() } else { base };
    // `as` saturates for out-of-range floats.
    xp as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use crate::task::{Category, TaskStatus};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn completed(priority: Priority) -> Task {
        let mut t = Task::new("t", "task", t0()).with_priority(priority);
        t.status = TaskStatus::Completed;
        t.completed_at = Some(t0() + Duration::hours(1));
        t
    }

    fn session(minutes: i64, focus: Option<f64>) -> StudySession {
        let mut s = StudySession::start("s", Category::Study, SessionType::Custom, t0());
        s.duration = minutes;
        s.end_time = Some(t0() + Duration::minutes(minutes.max(0)));
        s.is_active = false;
        s.focus_score = focus;
        s
    }

    #[test]
    fn test_task_xp_table_without_deadline() {
        assert_eq!(xp_for_task(&completed(Priority::Low)), 10);
        assert_eq!(xp_for_task(&completed(Priority::Medium)), 25);
        assert_eq!(xp_for_task(&completed(Priority::High)), 50);
        assert_eq!(xp_for_task(&completed(Priority::Urgent)), 75);
    }

    #[test]
    fn test_task_deadline_bonus() {
        let met = completed(Priority::Medium).with_deadline(t0() + Duration::hours(2));
        assert_eq!(xp_for_task(&met), 30);

        let exact = completed(Priority::Urgent).with_deadline(t0() + Duration::hours(1));
        assert_eq!(xp_for_task(&exact), 90);

        let missed = completed(Priority::High).with_deadline(t0());
        assert_eq!(xp_for_task(&missed), 50);
    }

    #[test]
    fn test_task_bonus_needs_completion_time() {
        let mut t = completed(Priority::Low).with_deadline(t0() + Duration::days(1));
        t.completed_at = None;
        assert_eq!(xp_for_task(&t), 10);
    }

    #[test]
    fn test_open_task_earns_nothing() {
        let t = Task::new("t", "open", t0()).with_priority(Priority::Urgent);
        assert_eq!(xp_for_task(&t), 0);
    }

    #[test]
    fn test_session_xp_focus_threshold() {
        assert_eq!(xp_for_session(&session(30, None)), 60);
        assert_eq!(xp_for_session(&session(30, Some(7.9))), 60);
        assert_eq!(xp_for_session(&session(30, Some(8.0))), 78);
        assert_eq!(xp_for_session(&session(25, Some(10.0))), 65);
    }

    #[test]
    fn test_session_xp_malformed_inputs() {
        assert_eq!(xp_for_session(&session(-15, Some(9.0))), 0);
        assert_eq!(xp_for_session(&session(10, Some(f64::NAN))), 20);
    }
}
