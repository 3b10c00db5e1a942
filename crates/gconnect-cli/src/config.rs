//! Command-line configuration.
//!
//! Stores the portal settings and the last username used, so repeated
//! invocations only need the password when the stored session has expired.
//!
//! Configuration is stored at `~/.config/gconnect/config.json`. The
//! `GCONNECT_SESSION_DIR` environment variable overrides where session
//! cookie files are kept.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gconnect_core::PortalConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

const APP_NAME: &str = "gconnect";
const CONFIG_FILE: &str = "config.json";
const SESSION_DIR_ENV: &str = "GCONNECT_SESSION_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub last_username: Option<String>,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(skip)]
    path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        let mut config = Self::load_from(&config_dir.join(APP_NAME).join(CONFIG_FILE))?;

        if let Some(dir) = std::env::var_os(SESSION_DIR_ENV).filter(|d| !d.is_empty()) {
            config.portal.session_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }

    /// Read the file at `path`; a missing file yields the portal defaults
    fn load_from(path: &Path) -> Result<Self> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str::<Self>(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()))
            }
        };
        config.path = path.to_path_buf();
        Ok(config)
    }

    /// Remember `username` for the next prompt.
    ///
    /// The file is only rewritten when the username changed. Returns whether
    /// it was.
    pub fn remember_username(&mut self, username: &str) -> Result<bool> {
        if self.last_username.as_deref() == Some(username) {
            return Ok(false);
        }
        self.last_username = Some(username.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config file {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Saved last username");
        Ok(true)
    }
}
