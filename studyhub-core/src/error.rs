//! Error types for configuration and catalog construction.
//!
//! The engine computations themselves never fail; these only surface when
//! building an `EngineConfig` or a `Catalog` from external input.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("daily study target must be at least one minute")]
    ZeroDailyTarget,

    #[error("max level must be at least 1")]
    ZeroMaxLevel,

    #[error("score weights must be finite and non-negative")]
    InvalidWeights,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("achievement id must not be empty")]
    EmptyId,

    #[error("duplicate achievement id: {0}")]
    DuplicateId(String),

    #[error("achievement {id} has invalid requirement {requirement}")]
    InvalidRequirement { id: String, requirement: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}
