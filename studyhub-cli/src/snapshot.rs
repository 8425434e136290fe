//! JSON snapshot file: the records plus the state persisted by the last pass.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use studyhub_core::{
    Achievement, Goal, PriorState, ProgressUpdate, Snapshot, StudySession, Task, UserProgress,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub sessions: Vec<StudySession>,
    #[serde(default)]
    pub progress: UserProgress,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
}

impl SnapshotFile {
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let s = serde_json::to_string_pretty(self).context("serialize snapshot")?;
        fs::write(path, s).with_context(|| format!("write {}", path.display()))
    }

    pub fn records(&self) -> Snapshot<'_> {
        Snapshot::new(&self.tasks, &self.goals, &self.sessions)
    }

    pub fn prior(&self) -> PriorState {
        PriorState {
            progress: self.progress.clone(),
            achievements: self.achievements.clone(),
        }
    }

    /// Store the derived state so the next pass sees it as prior.
    pub fn apply(&mut self, update: &ProgressUpdate) {
        self.progress = update.progress.clone();
        self.achievements = update.achievements.clone();
    }
}
