//! Shared configuration and data types for the folio achievements workspace.
//!
//! Holds the platform registry (descriptors, fallback records, display
//! metadata), the canonical stat types produced by an aggregation sweep, and
//! environment-driven application configuration.

pub mod app_config;
pub mod config;
pub mod platforms;
pub mod stats;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use platforms::{
    load_platforms, parse_platforms, Category, FallbackRecord, FieldMap, PlatformConfig,
    PlatformDescriptor, PlatformDisplay, PlatformsFile,
};
pub use stats::{AchievementStats, PlatformResult, StatField, StatValue};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read platforms file {path}: {source}")]
    PlatformsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse platforms file: {0}")]
    PlatformsFileParse(#[from] serde_yaml::Error),

    #[error("platforms validation failed: {0}")]
    Validation(String),
}
