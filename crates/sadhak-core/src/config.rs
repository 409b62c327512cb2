use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dispatcher::ReplyOrder;

/// Endpoint used when nothing else is configured; the calculator server's default port
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5001";

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "SADHAK_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub reply_order: Option<ReplyOrder>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Endpoint to talk to: CLI flag, then `SADHAK_ENDPOINT`, then the config file,
    /// then the default
    pub fn endpoint(&self, cli_override: Option<&str>) -> String {
        let env = std::env::var(ENDPOINT_ENV).ok();
        self.resolve_endpoint(cli_override, env.as_deref())
    }

    fn resolve_endpoint(&self, cli_override: Option<&str>, env: Option<&str>) -> String {
        [cli_override, env, self.endpoint.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string()
    }

    /// `--ordered` forces submission order; otherwise the configured order
    pub fn reply_order(&self, ordered_flag: bool) -> ReplyOrder {
        if ordered_flag {
            ReplyOrder::Submission
        } else {
            self.reply_order.unwrap_or_default()
        }
    }

    /// CLI seconds win over the config file. No timeout unless one is set;
    /// zero from either source also means none.
    pub fn request_timeout(&self, cli_secs: Option<u64>) -> Option<Duration> {
        cli_secs
            .or(self.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Fold command-line settings into the stored config
    pub fn apply_overrides(&mut self, endpoint: Option<&str>, ordered: bool, timeout: Option<u64>) {
        if let Some(endpoint) = endpoint {
            self.endpoint = Some(endpoint.to_string());
        }
        if ordered {
            self.reply_order = Some(ReplyOrder::Submission);
        }
        if let Some(secs) = timeout {
            self.request_timeout_secs = Some(secs);
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("sadhak"))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
