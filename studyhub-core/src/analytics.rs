//! Daily and weekly rollups for dashboards.
//!
//! Sessions are attributed to the local day they started on, tasks and goals
//! to the local day they were completed on.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::goals::Goal;
use crate::session::StudySession;
use crate::streak::ActivityCalendar;
use crate::task::{Category, Task};
use crate::time::{in_week, local_date, week_start};
use crate::xp::{xp_for_session, xp_for_task};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAnalytics {
    pub date: NaiveDate,
    pub study_minutes: u64,
    pub tasks_completed: u32,
    pub goals_completed: u32,
    /// Mean rated focus, 0 when no session was rated.
    pub focus_score: f64,
    pub xp_earned: u64,
    pub session_count: u32,
    /// Study minutes per category.
    pub categories: BTreeMap<Category, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyAnalytics {
    /// Monday.
    pub week_start: NaiveDate,
    pub total_study_minutes: u64,
    pub total_tasks_completed: u32,
    pub total_goals_completed: u32,
    pub average_focus_score: f64,
    pub total_xp_earned: u64,
    /// Share of the 7 days with qualifying activity, 0..=100.
    pub consistency_score: u8,
    /// Weekday with the most study minutes; `None` for an idle week.
    pub most_productive_day: Option<Weekday>,
    pub categories: BTreeMap<Category, u64>,
    pub days: Vec<DailyAnalytics>,
}

fn empty_categories() -> BTreeMap<Category, u64> {
    Category::ALL.iter().map(|c| (*c, 0)).collect()
}

/// Mean of the rated, finished sessions; 0 when there are none.
pub fn average_focus<'a>(sessions: impl IntoIterator<Item = &'a StudySession>) -> f64 {
    let (sum, n) = sessions
        .into_iter()
        .filter(|s| s.is_finalized())
        .filter_map(StudySession::effective_focus)
        .fold((0.0, 0u32), |(sum, n), f| (sum + f, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

pub fn daily_analytics(
    date: NaiveDate,
    tasks: &[Task],
    sessions: &[StudySession],
    goals: &[Goal],
    tz: Tz,
) -> DailyAnalytics {
    let day_sessions: Vec<&StudySession> = sessions
        .iter()
        .filter(|s| local_date(s.start_time, tz) == date)
        .collect();
    let day_tasks: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.completion_time().is_some_and(|at| local_date(at, tz) == date))
        .collect();
    let goals_completed = goals
        .iter()
        .filter(|g| g.is_completed)
        .filter(|g| g.completed_at.is_some_and(|at| local_date(at, tz) == date))
        .count() as u32;

    let mut categories = empty_categories();
    for s in &day_sessions {
        let m = categories.entry(s.category).or_insert(0);
        *m = m.saturating_add(s.effective_minutes());
    }

    let session_xp: u64 = day_sessions
        .iter()
        .filter(|s| s.is_finalized())
        .map(|s| xp_for_session(s) as u64)
        .fold(0u64, u64::saturating_add);
    let task_xp: u64 = day_tasks
        .iter()
        .map(|t| xp_for_task(t) as u64)
        .fold(0u64, u64::saturating_add);

    DailyAnalytics {
        date,
        study_minutes: day_sessions
            .iter()
            .map(|s| s.effective_minutes())
            .fold(0u64, u64::saturating_add),
        tasks_completed: day_tasks.len() as u32,
        goals_completed,
        focus_score: average_focus(day_sessions.iter().copied()),
        xp_earned: session_xp.saturating_add(task_xp),
        session_count: day_sessions.len() as u32,
        categories,
    }
}

/// Rollup for the Monday-based week containing `any_day`.
pub fn weekly_analytics(
    any_day: NaiveDate,
    tasks: &[Task],
    sessions: &[StudySession],
    goals: &[Goal],
    tz: Tz,
) -> WeeklyAnalytics {
    let start = week_start(any_day);
    let days: Vec<DailyAnalytics> = (0..7)
        .map(|i| daily_analytics(start + Duration::days(i), tasks, sessions, goals, tz))
        .collect();

    let week_sessions = sessions
        .iter()
        .filter(|s| in_week(local_date(s.start_time, tz), start));

    let mut categories = empty_categories();
    for day in &days {
        for (cat, minutes) in &day.categories {
            let m = categories.entry(*cat).or_insert(0);
            *m = m.saturating_add(*minutes);
        }
    }

    let active_days = ActivityCalendar::from_records(sessions, tasks, tz).active_days_in(start, 7);
    let consistency_score = (active_days as f64 / 7.0 * 100.0).round() as u8;

    // Strictly greater keeps the earliest day on ties.
    let most_productive_day = days
        .iter()
        .filter(|d| d.study_minutes > 0)
        .fold(None::<&DailyAnalytics>, |best, d| match best {
            Some(b) if b.study_minutes >= d.study_minutes => Some(b),
            _ => Some(d),
        })
        .map(|d| d.date.weekday());

    WeeklyAnalytics {
        week_start: start,
        total_study_minutes: days.iter().map(|d| d.study_minutes).fold(0u64, u64::saturating_add),
        total_tasks_completed: days.iter().map(|d| d.tasks_completed).sum(),
        total_goals_completed: days.iter().map(|d| d.goals_completed).sum(),
        average_focus_score: average_focus(week_sessions),
        total_xp_earned: days.iter().map(|d| d.xp_earned).fold(0u64, u64::saturating_add),
        consistency_score,
        most_productive_day,
        categories,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionType;
    use chrono::{DateTime, TimeZone, Utc};

    fn monday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 9, 9, 0, 0).unwrap()
    }

    fn session(id: &str, start: DateTime<Utc>, minutes: i64, focus: Option<f64>, cat: Category) -> StudySession {
        let mut s = StudySession::start(id, cat, SessionType::Custom, start);
        s.end(start + Duration::minutes(minutes), focus, None);
        s
    }

    #[test]
    fn test_empty_day_has_zero_focus() {
        let day = daily_analytics(monday().date_naive(), &[], &[], &[], chrono_tz::UTC);
        assert_eq!(day.focus_score, 0.0);
        assert_eq!(day.study_minutes, 0);
        assert_eq!(day.categories.len(), 8);
        assert!(day.categories.values().all(|m| *m == 0));
    }

    #[test]
    fn test_daily_rollup() {
        let sessions = vec![
            session("a", monday(), 60, Some(9.0), Category::Study),
            session("b", monday() + Duration::hours(3), 30, Some(6.0), Category::Work),
            session("c", monday() + Duration::hours(5), 15, None, Category::Study),
            session("other-day", monday() + Duration::days(1), 45, Some(2.0), Category::Study),
        ];
        let mut task = Task::new("t", "quiz", monday()).with_priority(crate::task::Priority::High);
        task.complete(monday() + Duration::hours(2), None);
        let mut goal = Goal::new("g", "pages", 10.0, "pages", monday());
        goal.record_progress(10.0, monday() + Duration::hours(4));

        let day = daily_analytics(monday().date_naive(), &[task], &sessions, &[goal], chrono_tz::UTC);
        assert_eq!(day.study_minutes, 105);
        assert_eq!(day.session_count, 3);
        assert_eq!(day.tasks_completed, 1);
        assert_eq!(day.goals_completed, 1);
        assert_eq!(day.focus_score, 7.5);
        // 156 (60 min, focused) + 60 + 30 + 50 (task)
        assert_eq!(day.xp_earned, 296);
        assert_eq!(day.categories[&Category::Study], 75);
        assert_eq!(day.categories[&Category::Work], 30);
    }

    #[test]
    fn test_weekly_rollup() {
        let sessions = vec![
            session("mon", monday(), 30, Some(8.0), Category::Study),
            session("wed", monday() + Duration::days(2), 90, Some(6.0), Category::Study),
            session("thu", monday() + Duration::days(3), 90, None, Category::Hobby),
            session("last-week", monday() - Duration::days(2), 500, Some(1.0), Category::Study),
        ];

        let sunday = monday().date_naive() + Duration::days(6);
        let week = weekly_analytics(sunday, &[], &sessions, &[], chrono_tz::UTC);

        assert_eq!(week.week_start, monday().date_naive());
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.total_study_minutes, 210);
        assert_eq!(week.average_focus_score, 7.0);
        // 3 of 7 days active
        assert_eq!(week.consistency_score, 43);
        assert_eq!(week.most_productive_day, Some(Weekday::Wed));
        assert_eq!(week.categories[&Category::Hobby], 90);
    }

    #[test]
    fn test_most_productive_tie_goes_to_earlier_day() {
        let sessions = vec![
            session("fri", monday() + Duration::days(4), 60, None, Category::Study),
            session("tue", monday() + Duration::days(1), 60, None, Category::Study),
            session("sat", monday() + Duration::days(5), 30, None, Category::Study),
        ];
        let week = weekly_analytics(monday().date_naive(), &[], &sessions, &[], chrono_tz::UTC);
        assert_eq!(week.most_productive_day, Some(Weekday::Tue));
    }

    #[test]
    fn test_idle_week() {
        let week = weekly_analytics(monday().date_naive(), &[], &[], &[], chrono_tz::UTC);
        assert_eq!(week.most_productive_day, None);
        assert_eq!(week.consistency_score, 0);
        assert_eq!(week.average_focus_score, 0.0);
    }
}
