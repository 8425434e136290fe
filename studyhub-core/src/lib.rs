//! studyhub-core: progress and gamification engine for the StudyHub dashboard.
//!
//! Callers hand in snapshots of their task, goal and session records and get
//! back derived progress (XP, level, streak, productivity score) plus
//! achievement state. Nothing here performs I/O.

pub mod achievements;
pub mod analytics;
pub mod config;
pub mod error;
pub mod goals;
pub mod level;
pub mod productivity;
pub mod progress;
pub mod session;
pub mod streak;
pub mod task;
pub mod time;
pub mod xp;

pub use achievements::{
    evaluate_achievements, Achievement, AchievementCategory, AchievementDef,
    AchievementEvaluation, AchievementMetric, Catalog, Rarity,
};
pub use analytics::{daily_analytics, weekly_analytics, DailyAnalytics, WeeklyAnalytics};
pub use config::{EngineConfig, ScoreWeights};
pub use error::{CatalogError, ConfigError, EngineError};
pub use goals::Goal;
pub use level::{resolve_level, resolve_level_capped, LevelInfo};
pub use productivity::compute_productivity_score;
pub use progress::{PriorState, ProgressEngine, ProgressUpdate, Snapshot, UserProgress};
pub use session::{SessionType, StudySession};
pub use streak::{compute_streak, ActivityCalendar};
pub use task::{Category, Priority, Task, TaskStatus};
pub use xp::{xp_for_session, xp_for_task};
