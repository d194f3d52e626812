//! Runtime configuration: defaults, an optional TOML file, then command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use helpdesk_core::AppError;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;

pub const DEFAULT_LOG_FILTER: &str = "helpdesk=warn,helpdesk_cli=warn,helpdesk_core=warn";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite file holding the incidents.
    pub db_path: PathBuf,
    /// `tracing` filter directive; `RUST_LOG` wins when set.
    pub log_filter: String,
    /// Keep the store in memory.
    pub ephemeral: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("helpdesk.sqlite"),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            ephemeral: false,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| {
            AppError::new("CONFIG_PARSE_FAILED", "Failed to parse configuration")
                .with_details(e.to_string())
        })
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path).map_err(|e| {
            AppError::new("CONFIG_READ_FAILED", "Failed to read configuration file")
                .with_details(format!("path={}; err={e}", path.display()))
        })?;
        Self::from_toml_str(&text).map_err(|e| {
            let details = e.details.clone().unwrap_or_default();
            e.with_details(format!("path={}; {details}", path.display()))
        })
    }

    /// Configuration file (when given) with command-line flags applied on top.
    pub fn resolve(cli: &Cli) -> Result<Self, AppError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(db) = &cli.db {
            config.db_path = db.clone();
        }
        if cli.ephemeral {
            config.ephemeral = true;
        }
        Ok(config)
    }
}
