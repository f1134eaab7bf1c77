//! Configuration for the oscar command bot
//!
//! This crate provides:
//! - Configuration file discovery and loading (TOML)
//! - The access list (`check_permissions`, `is_admin`)
//! - The label catalog the bot is allowed to create and maintain

pub mod bot_config;
pub mod config_file;
pub mod labels;

use std::path::PathBuf;
use thiserror::Error;

pub use bot_config::{AccessConfig, BotConfig};
pub use config_file::{find_config_file, CONFIG_FILE};
pub use labels::{LabelCatalog, LabelSpec, APPROVED, CI_FAILURE, DO_NOT_MERGE, NEEDS_TRIAGE};

/// Errors raised while loading the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Label '{name}' has invalid color '{color}', expected 6 hex digits")]
    InvalidColor { name: String, color: String },

    #[error("Label with empty name in catalog")]
    EmptyLabelName,

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}
