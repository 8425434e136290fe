//! Achievement catalog and evaluation.
//!
//! The catalog is static configuration supplied by the caller. Evaluation
//! turns it into runtime `Achievement` instances, merging with the instances
//! from the previous pass so that an unlock is never revoked.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::progress::{Snapshot, UserProgress};
use crate::task::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Tasks,
    StudyTime,
    Consistency,
    Focus,
    Goals,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn display_name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// Rule that measures progress toward an achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AchievementMetric {
    TasksCompleted,
    TasksCompletedWithPriority { priority: Priority },
    /// Completed at or before the task's deadline.
    TasksCompletedBeforeDeadline,
    /// Finished, non-break sessions.
    SessionsCompleted,
    FocusedSessions { min_focus: f64 },
    StudyHours,
    StreakDays,
    LongestStreak,
    GoalsCompleted,
    Level,
    TotalXp,
    ProductivityScore,
}

impl AchievementMetric {
    /// Current progress value in the unit of the achievement's requirement.
    pub fn measure(&self, snapshot: &Snapshot<'_>, progress: &UserProgress) -> f64 {
        let value = match self {
            AchievementMetric::TasksCompleted => {
                snapshot.tasks.iter().filter(|t| t.is_completed()).count() as f64
            }
            AchievementMetric::TasksCompletedWithPriority { priority } => snapshot
                .tasks
                .iter()
                .filter(|t| t.is_completed() && t.priority == *priority)
                .count() as f64,
            AchievementMetric::TasksCompletedBeforeDeadline => snapshot
                .tasks
                .iter()
                .filter(|t| match (t.completion_time(), t.deadline) {
                    (Some(done), Some(deadline)) => done <= deadline,
                    _ => false,
                })
                .count() as f64,
            AchievementMetric::SessionsCompleted => snapshot
                .sessions
                .iter()
                .filter(|s| s.is_finalized() && s.session_type.is_study())
                .count() as f64,
            AchievementMetric::FocusedSessions { min_focus } => snapshot
                .sessions
                .iter()
                .filter(|s| s.is_finalized() && s.session_type.is_study())
                .filter(|s| s.effective_focus().is_some_and(|f| f >= *min_focus))
                .count() as f64,
            AchievementMetric::StudyHours => progress.total_study_hours,
            AchievementMetric::StreakDays => progress.streak_days as f64,
            AchievementMetric::LongestStreak => progress.longest_streak as f64,
            AchievementMetric::GoalsCompleted => progress.total_goals_completed as f64,
            AchievementMetric::Level => progress.level as f64,
            AchievementMetric::TotalXp => progress.total_xp as f64,
            AchievementMetric::ProductivityScore => progress.productivity_score as f64,
        };
        if value.is_finite() { value.max(0.0) } else { 0.0 }
    }
}

/// Static catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    /// Threshold in the metric's unit.
    pub requirement: f64,
    pub xp_value: u32,
    pub rarity: Rarity,
    pub metric: AchievementMetric,
}

impl AchievementDef {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        category: AchievementCategory,
        metric: AchievementMetric,
        requirement: f64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            icon: String::new(),
            category,
            requirement,
            xp_value: 50,
            rarity: Rarity::Common,
            metric,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_xp(mut self, xp_value: u32) -> Self {
        self.xp_value = xp_value;
        self
    }

    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }
}

/// Runtime achievement instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub category: AchievementCategory,
    pub requirement: f64,
    pub progress: f64,
    /// Monotonic: once true, stays true.
    pub is_unlocked: bool,
    #[serde(default)]
    pub unlocked_at: Option<DateTime<Utc>>,
    pub xp_value: u32,
    pub rarity: Rarity,
}

impl Achievement {
    /// Fresh locked instance at progress 0.
    pub fn locked(def: &AchievementDef) -> Self {
        Self {
            id: def.id.clone(),
            title: def.title.clone(),
            description: def.description.clone(),
            icon: def.icon.clone(),
            category: def.category,
            requirement: def.requirement,
            progress: 0.0,
            is_unlocked: false,
            unlocked_at: None,
            xp_value: def.xp_value,
            rarity: def.rarity,
        }
    }

    /// Progress toward the requirement, 0..=100.
    pub fn percent(&self) -> f64 {
        if self.is_unlocked {
            return 100.0;
        }
        if !(self.requirement > 0.0) {
            return 0.0;
        }
        (self.progress / self.requirement * 100.0).clamp(0.0, 100.0)
    }
}

/// Validated, ordered set of achievement definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<AchievementDef>,
}

impl Catalog {
    pub fn new(entries: Vec<AchievementDef>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for def in &entries {
            if def.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(def.id.as_str()) {
                return Err(CatalogError::DuplicateId(def.id.clone()));
            }
            if !def.requirement.is_finite() || def.requirement <= 0.0 {
                return Err(CatalogError::InvalidRequirement {
                    id: def.id.clone(),
                    requirement: def.requirement,
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn entries(&self) -> &[AchievementDef] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&AchievementDef> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Locked instances for every entry, e.g. for a brand new user.
    pub fn initial_instances(&self) -> Vec<Achievement> {
        self.entries.iter().map(Achievement::locked).collect()
    }
}

impl Default for Catalog {
    /// Starter catalog covering every achievement category.
    fn default() -> Self {
        use AchievementCategory as C;
        use AchievementMetric as M;

        let entries = vec![
            AchievementDef::new("first_task", "Getting Started", "Complete your first task", C::Tasks, M::TasksCompleted, 1.0)
                .with_icon("🎯")
                .with_xp(50),
            AchievementDef::new("task_apprentice", "Task Apprentice", "Complete 10 tasks", C::Tasks, M::TasksCompleted, 10.0)
                .with_icon("✅")
                .with_xp(100),
            AchievementDef::new("task_master", "Task Master", "Complete 100 tasks", C::Tasks, M::TasksCompleted, 100.0)
                .with_icon("🏆")
                .with_xp(500)
                .with_rarity(Rarity::Epic),
            AchievementDef::new("firefighter", "Firefighter", "Complete 5 urgent tasks", C::Tasks, M::TasksCompletedWithPriority { priority: Priority::Urgent }, 5.0)
                .with_icon("🚒")
                .with_xp(150)
                .with_rarity(Rarity::Rare),
            AchievementDef::new("beat_the_clock", "Beat the Clock", "Finish 5 tasks before their deadline", C::Tasks, M::TasksCompletedBeforeDeadline, 5.0)
                .with_icon("⏰")
                .with_xp(150)
                .with_rarity(Rarity::Rare),
            AchievementDef::new("first_session", "First Focus", "Finish your first study session", C::StudyTime, M::SessionsCompleted, 1.0)
                .with_icon("📚")
                .with_xp(50),
            AchievementDef::new("ten_hours", "Ten Hour Club", "Study for 10 hours in total", C::StudyTime, M::StudyHours, 10.0)
                .with_icon("⏳")
                .with_xp(200)
                .with_rarity(Rarity::Rare),
            AchievementDef::new("hundred_hours", "Centurion Scholar", "Study for 100 hours in total", C::StudyTime, M::StudyHours, 100.0)
                .with_icon("🎓")
                .with_xp(1000)
                .with_rarity(Rarity::Legendary),
            AchievementDef::new("streak_3", "On a Roll", "Keep a 3-day streak", C::Consistency, M::StreakDays, 3.0)
                .with_icon("🔥")
                .with_xp(75),
            AchievementDef::new("streak_7", "Weekly Warrior", "Keep a 7-day streak", C::Consistency, M::StreakDays, 7.0)
                .with_icon("🔥")
                .with_xp(200)
                .with_rarity(Rarity::Rare),
            AchievementDef::new("streak_30", "Unstoppable", "Keep a 30-day streak", C::Consistency, M::StreakDays, 30.0)
                .with_icon("🌋")
                .with_xp(750)
                .with_rarity(Rarity::Epic),
            AchievementDef::new("in_the_zone", "In the Zone", "Finish 5 sessions rated 8 or higher", C::Focus, M::FocusedSessions { min_focus: 8.0 }, 5.0)
                .with_icon("🧠")
                .with_xp(150)
                .with_rarity(Rarity::Rare),
            AchievementDef::new("first_goal", "Goal Getter", "Complete your first goal", C::Goals, M::GoalsCompleted, 1.0)
                .with_icon("🥅")
                .with_xp(100),
            AchievementDef::new("rising_star", "Rising Star", "Reach level 5", C::Special, M::Level, 5.0)
                .with_icon("⭐")
                .with_xp(250)
                .with_rarity(Rarity::Epic),
            AchievementDef::new("peak_week", "Peak Week", "Hit a productivity score of 100", C::Special, M::ProductivityScore, 100.0)
                .with_icon("📈")
                .with_xp(300)
                .with_rarity(Rarity::Epic),
        ];

        Self { entries }
    }
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementEvaluation {
    /// One instance per catalog entry, in catalog order.
    pub achievements: Vec<Achievement>,
    /// Entries that crossed their requirement in this pass.
    pub newly_unlocked: Vec<Achievement>,
}

/// Evaluate the catalog against fresh progress, merging with `prior`.
///
/// - Prior unlocks are kept with their original `unlocked_at`.
/// - First-time unlocks get `unlocked_at = now` and are reported in
///   `newly_unlocked`.
/// - Prior instances without a catalog entry are dropped.
pub fn evaluate_achievements(
    snapshot: &Snapshot<'_>,
    progress: &UserProgress,
    catalog: &Catalog,
    prior: &[Achievement],
    now: DateTime<Utc>,
) -> AchievementEvaluation {
    let prior_by_id: HashMap<&str, &Achievement> =
        prior.iter().map(|a| (a.id.as_str(), a)).collect();

    let orphaned = prior_by_id
        .keys()
        .filter(|id| catalog.get(id).is_none())
        .count();
    if orphaned > 0 {
        debug!(orphaned, "dropping achievements missing from catalog");
    }

    let mut out = AchievementEvaluation::default();

    for def in catalog.entries() {
        let mut achievement = Achievement::locked(def);
        achievement.progress = def.metric.measure(snapshot, progress);

        let previous = prior_by_id.get(def.id.as_str());
        match previous {
            Some(prev) if prev.is_unlocked => {
                achievement.is_unlocked = true;
                achievement.unlocked_at = prev.unlocked_at;
            }
            _ if achievement.progress >= def.requirement => {
                achievement.is_unlocked = true;
                achievement.unlocked_at = Some(now);
                info!(id = %def.id, title = %def.title, "achievement unlocked");
                out.newly_unlocked.push(achievement.clone());
            }
            _ => {}
        }

        out.achievements.push(achievement);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap()
    }

    fn completed_tasks(n: usize) -> Vec<Task> {
        (0..n)
            .map(|i| {
                let mut t = Task::new(format!("t{i}"), "task", now() - Duration::days(1));
                t.complete(now() - Duration::hours(1), None);
                t
            })
            .collect()
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            AchievementDef::new("first_task", "Getting Started", "Complete your first task", AchievementCategory::Tasks, AchievementMetric::TasksCompleted, 1.0),
            AchievementDef::new("three_tasks", "Hat Trick", "Complete 3 tasks", AchievementCategory::Tasks, AchievementMetric::TasksCompleted, 3.0)
                .with_rarity(Rarity::Rare),
        ])
        .unwrap()
    }

    #[test]
    fn test_catalog_validation() {
        let dup = Catalog::new(vec![
            AchievementDef::new("a", "A", "", AchievementCategory::Special, AchievementMetric::Level, 2.0),
            AchievementDef::new("a", "A again", "", AchievementCategory::Special, AchievementMetric::Level, 3.0),
        ]);
        assert_eq!(dup, Err(CatalogError::DuplicateId("a".into())));

        let empty_id = Catalog::new(vec![AchievementDef::new(" ", "", "", AchievementCategory::Special, AchievementMetric::Level, 2.0)]);
        assert_eq!(empty_id, Err(CatalogError::EmptyId));

        let bad_req = Catalog::new(vec![AchievementDef::new("z", "", "", AchievementCategory::Special, AchievementMetric::Level, 0.0)]);
        assert!(matches!(bad_req, Err(CatalogError::InvalidRequirement { .. })));
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let defaults = Catalog::default();
        let revalidated = Catalog::new(defaults.entries().to_vec()).unwrap();
        assert_eq!(revalidated.len(), defaults.len());
        let first = defaults.get("first_task").unwrap();
        assert_eq!(first.requirement, 1.0);
        assert_eq!(first.xp_value, 50);
        assert_eq!(first.rarity, Rarity::Common);
    }

    #[test]
    fn test_first_unlock_is_reported_once() {
        let tasks = completed_tasks(1);
        let snapshot = Snapshot::new(&tasks, &[], &[]);
        let progress = UserProgress::default();

        let first = evaluate_achievements(&snapshot, &progress, &catalog(), &[], now());
        assert_eq!(first.newly_unlocked.len(), 1);
        assert_eq!(first.newly_unlocked[0].id, "first_task");
        assert_eq!(first.achievements[0].unlocked_at, Some(now()));
        assert!(!first.achievements[1].is_unlocked);
        assert_eq!(first.achievements[1].progress, 1.0);

        let later = now() + Duration::hours(1);
        let second = evaluate_achievements(&snapshot, &progress, &catalog(), &first.achievements, later);
        assert!(second.newly_unlocked.is_empty());
        assert_eq!(second.achievements, first.achievements);
    }

    #[test]
    fn test_unlock_survives_progress_drop() {
        let tasks = completed_tasks(3);
        let snapshot = Snapshot::new(&tasks, &[], &[]);
        let progress = UserProgress::default();
        let unlocked = evaluate_achievements(&snapshot, &progress, &catalog(), &[], now());
        assert!(unlocked.achievements.iter().all(|a| a.is_unlocked));

        // Every task deleted.
        let empty = Snapshot::new(&[], &[], &[]);
        let after = evaluate_achievements(&empty, &progress, &catalog(), &unlocked.achievements, now() + Duration::days(1));
        assert!(after.achievements.iter().all(|a| a.is_unlocked));
        assert!(after.achievements.iter().all(|a| a.unlocked_at == Some(now())));
        assert!(after.achievements.iter().all(|a| a.progress == 0.0));
        assert!(after.newly_unlocked.is_empty());
    }

    #[test]
    fn test_catalog_is_authoritative() {
        let mut orphan = Achievement::locked(
            &AchievementDef::new("retired", "Old", "", AchievementCategory::Special, AchievementMetric::Level, 1.0),
        );
        orphan.is_unlocked = true;
        let mut stale = Achievement::locked(&catalog().entries()[1]);
        stale.title = "Outdated title".into();

        let snapshot = Snapshot::new(&[], &[], &[]);
        let eval = evaluate_achievements(&snapshot, &UserProgress::default(), &catalog(), &[orphan, stale], now());

        let ids: Vec<&str> = eval.achievements.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["first_task", "three_tasks"]);
        assert_eq!(eval.achievements[1].title, "Hat Trick");
        assert!(eval.achievements.iter().all(|a| !a.is_unlocked && a.progress == 0.0));
    }

    #[test]
    fn test_progress_metrics_read_user_progress() {
        let snapshot = Snapshot::new(&[], &[], &[]);
        let progress = UserProgress {
            level: 5,
            total_study_hours: 12.5,
            streak_days: 7,
            ..UserProgress::default()
        };
        assert_eq!(AchievementMetric::Level.measure(&snapshot, &progress), 5.0);
        assert_eq!(AchievementMetric::StudyHours.measure(&snapshot, &progress), 12.5);
        assert_eq!(AchievementMetric::StreakDays.measure(&snapshot, &progress), 7.0);

        let nan = UserProgress {
            total_study_hours: f64::NAN,
            ..UserProgress::default()
        };
        assert_eq!(AchievementMetric::StudyHours.measure(&snapshot, &nan), 0.0);
    }

    #[test]
    fn test_session_metrics_skip_breaks() {
        use crate::session::{SessionType, StudySession};
        use crate::task::Category;

        let finished = |id: &str, kind: SessionType| {
            let mut s = StudySession::start(id, Category::Study, kind, now() - Duration::hours(2));
            s.end(now() - Duration::hours(1), Some(9.0), None);
            s
        };
        let sessions = vec![
            finished("deep", SessionType::DeepWork),
            finished("pause", SessionType::Break),
            finished("pomo", SessionType::Pomodoro),
        ];
        let snapshot = Snapshot::new(&[], &[], &sessions);
        let progress = UserProgress::default();

        let focused = AchievementMetric::FocusedSessions { min_focus: 8.0 };
        assert_eq!(focused.measure(&snapshot, &progress), 2.0);
        assert_eq!(AchievementMetric::SessionsCompleted.measure(&snapshot, &progress), 2.0);
    }

    #[test]
    fn test_metric_wire_shape() {
        let metric: AchievementMetric =
            serde_json::from_str(r#"{"kind":"tasks_completed_with_priority","priority":"urgent"}"#).unwrap();
        assert_eq!(
            metric,
            AchievementMetric::TasksCompletedWithPriority { priority: Priority::Urgent }
        );
    }

    #[test]
    fn test_percent() {
        let mut a = Achievement::locked(&catalog().entries()[1]);
        a.progress = 1.5;
        assert_eq!(a.percent(), 50.0);
        a.is_unlocked = true;
        a.progress = 0.0;
        assert_eq!(a.percent(), 100.0);
    }
}
