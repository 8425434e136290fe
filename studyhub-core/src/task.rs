//! Task model for the progress engine.
//!
//! Tasks are owned by the caller's task list; the engine only reads them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::xp::xp_for_task;

/// Life area a task, goal or session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Study,
    Personal,
    Fitness,
    Work,
    Hobby,
    Health,
    Social,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Study,
        Category::Personal,
        Category::Fitness,
        Category::Work,
        Category::Hobby,
        Category::Health,
        Category::Social,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Study => "Study",
            Category::Personal => "Personal",
            Category::Fitness => "Fitness",
            Category::Work => "Work",
            Category::Hobby => "Hobby",
            Category::Health => "Health",
            Category::Social => "Social",
            Category::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Core task type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,

    pub category: Category,
    pub priority: Priority,
    pub status: TaskStatus,

    /// Optional hard deadline (UTC).
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Set iff `status == Completed`.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    /// Minutes.
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    /// Minutes.
    #[serde(default)]
    pub actual_minutes: Option<u32>,

    /// 0 until completion, then fixed.
    #[serde(default)]
    pub xp_value: u32,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            category: Category::Study,
            priority: Priority::Medium,
            status: TaskStatus::Todo,
            deadline: None,
            created_at,
            updated_at: created_at,
            completed_at: None,
            estimated_minutes: None,
            actual_minutes: None,
            xp_value: 0,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Completion instant, only for tasks that are actually completed.
    pub fn completion_time(&self) -> Option<DateTime<Utc>> {
        if self.is_completed() { self.completed_at } else { None }
    }

    /// Mark the task completed at `now` and fix its XP award.
    ///
    /// Completing an already completed task leaves it untouched so the award
    /// and timestamp stay fixed.
    pub fn complete(&mut self, now: DateTime<Utc>, actual_minutes: Option<u32>) {
        if self.is_completed() {
            return;
        }
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
        if actual_minutes.is_some() {
            self.actual_minutes = actual_minutes;
        }
        self.xp_value = xp_for_task(self);
    }

    /// Cancel an open task. Completed tasks stay completed.
    pub fn cancel(&mut self, now: DateTime<Utc>) {
        if self.is_completed() {
            return;
        }
        self.status = TaskStatus::Cancelled;
        self.updated_at = now;
    }
}
