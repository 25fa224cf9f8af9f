//! Process configuration.
//!
//! `Config` holds the environment-provided locations of the settings file and the database.
//! `RuntimeConfig` is the validated, mutable settings document the bot runs with.

pub mod runtime;

use std::path::PathBuf;

pub use runtime::{lookup, ConfigField, RuntimeConfig, Settings};

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_DATABASE_URL: &str = "sqlite://modbot.db?mode=rwc";

pub struct Config {
    pub config_path: PathBuf,
    pub database_url: String,
}

impl Config {
    /// Reads `MODBOT_CONFIG` and `DATABASE_URL`, falling back to local defaults.
    ///
    /// Call after `dotenvy::dotenv()` so values from a `.env` file are visible.
    pub fn from_env() -> Self {
        Self {
            config_path: std::env::var("MODBOT_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH)),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
        }
    }
}
