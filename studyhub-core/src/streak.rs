//! Streaks: consecutive calendar days with qualifying activity.
//!
//! A day is active when a non-break study session finished on it or a task
//! was completed on it. Days are local calendar days in the configured zone.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::session::StudySession;
use crate::task::Task;
use crate::time::local_date;

/// Set of days with qualifying activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityCalendar {
    days: BTreeSet<NaiveDate>,
}

impl ActivityCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(sessions: &[StudySession], tasks: &[Task], tz: Tz) -> Self {
        let mut cal = Self::new();
        for session in sessions {
            if !session.session_type.is_study() {
                continue;
            }
            if let Some(end) = session.end_time {
                cal.mark(local_date(end, tz));
            }
        }
        for task in tasks {
            if let Some(done) = task.completion_time() {
                cal.mark(local_date(done, tz));
            }
        }
        cal
    }

    pub fn mark(&mut self, day: NaiveDate) {
        self.days.insert(day);
    }

    pub fn is_active(&self, day: NaiveDate) -> bool {
        self.days.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Consecutive active days ending at `today`.
    ///
    /// An idle `today` does not break the streak (the day is still in
    /// progress), so counting then starts from yesterday.
    pub fn current_streak(&self, today: NaiveDate) -> u32 {
        let mut cursor = today;
        if !self.is_active(cursor) {
            cursor -= Duration::days(1);
        }

        let mut count = 0u32;
        while self.is_active(cursor) {
            count += 1;
            cursor -= Duration::days(1);
        }
        count
    }

    /// Longest run of consecutive active days anywhere in the history.
    pub fn longest_run(&self) -> u32 {
        let mut best = 0u32;
        let mut run = 0u32;
        let mut prev: Option<NaiveDate> = None;

        for &day in &self.days {
            run = match prev {
                Some(p) if day - p == Duration::days(1) => run + 1,
                _ => 1,
            };
            best = best.max(run);
            prev = Some(day);
        }
        best
    }

    /// Number of active days in `[start, start + days)`.
    pub fn active_days_in(&self, start: NaiveDate, days: i64) -> u32 {
        let end = start + Duration::days(days);
        self.days.range(start..end).count() as u32
    }
}

/// Current streak in days as of `now`.
pub fn compute_streak(
    sessions: &[StudySession],
    tasks: &[Task],
    now: DateTime<Utc>,
    tz: Tz,
) -> u32 {
    ActivityCalendar::from_records(sessions, tasks, tz).current_streak(local_date(now, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use crate::task::Category;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 11, 18, 0, 0).unwrap()
    }

    fn done_task(id: &str, days_ago: i64) -> Task {
        let at = now() - Duration::days(days_ago);
        let mut t = Task::new(id, "task", at - Duration::hours(1));
        t.complete(at, None);
        t
    }

    fn finished_session(id: &str, days_ago: i64, kind: SessionType) -> StudySession {
        let start = now() - Duration::days(days_ago) - Duration::hours(1);
        let mut s = StudySession::start(id, Category::Study, kind, start);
        s.end(start + Duration::minutes(30), None, None);
        s
    }

    #[test]
    fn test_empty_history_has_no_streak() {
        assert_eq!(compute_streak(&[], &[], now(), chrono_tz::UTC), 0);
    }

    #[test]
    fn test_streak_counts_back_from_today() {
        let tasks = vec![done_task("a", 0), done_task("b", 1)];
        let sessions = vec![finished_session("s", 2, SessionType::Pomodoro)];
        assert_eq!(compute_streak(&sessions, &tasks, now(), chrono_tz::UTC), 3);
    }

    #[test]
    fn test_idle_today_keeps_yesterdays_streak() {
        let tasks = vec![done_task("a", 1), done_task("b", 2)];
        assert_eq!(compute_streak(&[], &tasks, now(), chrono_tz::UTC), 2);
    }

    #[test]
    fn test_gap_breaks_streak() {
        let tasks = vec![done_task("a", 0), done_task("b", 2), done_task("c", 3)];
        assert_eq!(compute_streak(&[], &tasks, now(), chrono_tz::UTC), 1);

        let stale = vec![done_task("a", 2)];
        assert_eq!(compute_streak(&[], &stale, now(), chrono_tz::UTC), 0);
    }

    #[test]
    fn test_breaks_and_open_records_do_not_count() {
        let sessions = vec![finished_session("brk", 0, SessionType::Break)];
        let mut open = StudySession::start("open", Category::Study, SessionType::Custom, now());
        open.duration = 30;
        let mut stale = Task::new("t", "todo", now());
        stale.completed_at = Some(now());

        let mut all = sessions.clone();
        all.push(open);
        assert_eq!(compute_streak(&all, &[stale], now(), chrono_tz::UTC), 0);
    }

    #[test]
    fn test_future_activity_ignored() {
        let tasks = vec![done_task("future", -1)];
        assert_eq!(compute_streak(&[], &tasks, now(), chrono_tz::UTC), 0);
    }

    #[test]
    fn test_days_follow_timezone() {
        // 02:00 UTC on Mar 11 is the evening of Mar 10 in Chicago (CDT, UTC-5).
        let at = Utc.with_ymd_and_hms(2026, 3, 11, 2, 0, 0).unwrap();
        let mut t = Task::new("late", "late night", at);
        t.complete(at, None);
        let yesterday_local = vec![t];

        let cal = ActivityCalendar::from_records(&[], &yesterday_local, chrono_tz::America::Chicago);
        assert!(cal.is_active(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()));
        assert!(!cal.is_active(NaiveDate::from_ymd_opt(2026, 3, 11).unwrap()));
    }

    #[test]
    fn test_longest_run() {
        let mut cal = ActivityCalendar::new();
        let d = |day| NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
        for day in [1, 2, 3, 5, 6, 9] {
            cal.mark(d(day));
        }
        assert_eq!(cal.longest_run(), 3);
        assert_eq!(cal.current_streak(d(6)), 2);
        assert_eq!(cal.active_days_in(d(2), 7), 4);
        assert_eq!(ActivityCalendar::new().longest_run(), 0);
    }
}
