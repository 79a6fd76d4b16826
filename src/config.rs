//! Game configuration
//!
//! Read from environment variables (a `.env` file is loaded by the binary
//! before this runs); CLI flags override individual fields afterwards.

use crate::clock::DEFAULT_TIME_LIMIT_SECS;
use crate::error::{GameError, Result};
use crate::game::GameOptions;
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_DB_PATH: &str = "TICTICTOMB_DB_PATH";
pub const ENV_ASSETS_DIR: &str = "TICTICTOMB_ASSETS_DIR";
pub const ENV_TIME_LIMIT_SECS: &str = "TICTICTOMB_TIME_LIMIT_SECS";
pub const ENV_VERIFY: &str = "TICTICTOMB_VERIFY";
pub const ENV_MAX_ROWS: &str = "TICTICTOMB_MAX_ROWS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Directory holding `schema.sql` and `sample_data.sql`
    pub assets_dir: PathBuf,
    pub time_limit_secs: u64,
    /// Ask the player to confirm each finding before the stage advances
    pub require_verification: bool,
    /// Rows printed per result table
    pub max_rows: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("database/tictictomb.db"),
            assets_dir: PathBuf::from("database"),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            require_verification: true,
            max_rows: 200,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup(ENV_ASSETS_DIR) {
            config.assets_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(ENV_TIME_LIMIT_SECS) {
            config.time_limit_secs = parse_number(ENV_TIME_LIMIT_SECS, &value)?;
            if config.time_limit_secs == 0 {
                return Err(GameError::Config(format!(
                    "{} must be greater than zero",
                    ENV_TIME_LIMIT_SECS
                )));
            }
        }
        if let Some(value) = lookup(ENV_VERIFY) {
            config.require_verification = parse_bool(ENV_VERIFY, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_ROWS) {
            config.max_rows = parse_number(ENV_MAX_ROWS, &value)?;
        }

        Ok(config)
    }

    pub fn game_options(&self) -> GameOptions {
        GameOptions {
            time_limit_secs: self.time_limit_secs,
            require_verification: self.require_verification,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GameError::Config(format!("{} must be a non-negative integer, got '{}'", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GameError::Config(format!("{} must be true or false, got '{}'", key, value))),
    }
}
