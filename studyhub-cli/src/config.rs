use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use studyhub_core::{AchievementDef, Catalog, EngineConfig, ScoreWeights};
use tracing::debug;

use crate::state::{ensure_studyhub_home, studyhub_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub scoring: ScoringSection,
    #[serde(default)]
    pub catalog: CatalogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// IANA zone used for calendar days (streaks, weeks).
    pub timezone: String,
    pub daily_study_target_minutes: u32,
    pub max_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSection {
    pub study: f64,
    pub tasks: f64,
    pub goals: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSection {
    /// TOML file with `[[achievement]]` tables. Relative paths resolve
    /// against the StudyHub home. Unset means the built-in catalog.
    pub path: Option<String>,
}

impl Default for EngineSection {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        Self {
            timezone: "UTC".to_string(),
            daily_study_target_minutes: defaults.daily_study_target_minutes,
            max_level: defaults.max_level,
        }
    }
}

impl Default for ScoringSection {
    fn default() -> Self {
        let w = ScoreWeights::default();
        Self {
            study: w.study,
            tasks: w.tasks,
            goals: w.goals,
        }
    }
}

/// On-disk catalog layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(rename = "achievement", default)]
    pub achievements: Vec<AchievementDef>,
}

impl Config {
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let weights = ScoreWeights::new(self.scoring.study, self.scoring.tasks, self.scoring.goals)
            .context("invalid [scoring] weights")?;
        let cfg = EngineConfig::default()
            .with_timezone_name(&self.engine.timezone)
            .context("invalid [engine] timezone")?
            .with_daily_target(self.engine.daily_study_target_minutes)
            .context("invalid [engine] daily_study_target_minutes")?
            .with_max_level(self.engine.max_level)
            .context("invalid [engine] max_level")?
            .with_score_weights(weights);
        Ok(cfg)
    }

    pub fn catalog(&self) -> Result<Catalog> {
        let Some(raw) = self.catalog.path.as_deref() else {
            return Ok(Catalog::default());
        };
        let p = resolve_catalog_path(raw)?;
        load_catalog(&p)
    }
}

fn resolve_catalog_path(raw: &str) -> Result<PathBuf> {
    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return Ok(p);
    }
    Ok(studyhub_home()?.join(p))
}

pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let file: CatalogFile =
        toml::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    debug!(entries = file.achievements.len(), path = %path.display(), "loaded catalog");
    Catalog::new(file.achievements).with_context(|| format!("validate {}", path.display()))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(studyhub_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        debug!(path = %p.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = ensure_studyhub_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let written = save_config(&Config::default())?;
    println!("Wrote {}", written.display());
    Ok(())
}
