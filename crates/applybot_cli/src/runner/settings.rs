//! Client settings, read from a RON file next to the working directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use applybot_engine::EngineSettings;
use applybot_logging::LogDestination;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "./applybot.ron";
pub const DEFAULT_CREDENTIALS_PATH: &str = "./.applybot_credentials.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub token_key: String,
    pub credentials_path: PathBuf,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub log_destination: LogTarget,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let engine = EngineSettings::default();
        Self {
            base_url: engine.base_url,
            token_key: engine.token_key,
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            connect_timeout_ms: engine.connect_timeout.as_millis() as u64,
            request_timeout_ms: engine.request_timeout.as_millis() as u64,
            log_destination: LogTarget::default(),
            verbose: false,
        }
    }
}

impl Settings {
    /// Missing file means defaults; anything unreadable or malformed is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading settings from {path:?}"));
            }
        };
        ron::from_str(&content).with_context(|| format!("parsing settings from {path:?}"))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            base_url: self.base_url.clone(),
            token_key: self.token_key.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
