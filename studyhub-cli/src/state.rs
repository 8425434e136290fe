use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$STUDYHUB_HOME`, or `~/.studyhub`.
pub fn studyhub_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("STUDYHUB_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".studyhub"))
}

pub fn ensure_studyhub_home() -> Result<PathBuf> {
    let dir = studyhub_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_snapshot_path() -> Result<PathBuf> {
    Ok(studyhub_home()?.join("snapshot.json"))
}
