use crate::error::{CliError, Result};
use directories::BaseDirs;
use rtc_access::{Role, DEFAULT_EXPIRE_SECONDS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const NOT_SET: &str = "(not set)";

/// Persistent CLI defaults, stored at `~/.rtc/config.toml`
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Channel used when `--channel` is omitted
    pub default_channel: Option<String>,
    /// Token lifetime used when `--expire` is omitted
    pub default_expire_seconds: Option<u32>,
    pub default_role: Option<Role>,
}

impl CliConfig {
    pub const KEYS: [&'static str; 3] =
        ["default_channel", "default_expire_seconds", "default_role"];

    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("Failed to parse config: {e}")))?;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = BaseDirs::new()
            .ok_or_else(|| CliError::Config("Could not determine home directory".to_string()))?
            .home_dir()
            .to_path_buf();
        Ok(home.join(".rtc"))
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Set `key` from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_channel" => self.default_channel = Some(value.to_string()),
            "default_expire_seconds" => {
                let seconds = value
                    .parse::<u32>()
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or_else(|| {
                        CliError::InvalidInput(format!("Invalid lifetime in seconds: {value}"))
                    })?;
                self.default_expire_seconds = Some(seconds);
            }
            "default_role" => {
                let role = value
                    .parse::<Role>()
                    .map_err(|e| CliError::InvalidInput(e.to_string()))?;
                self.default_role = Some(role);
            }
            _ => {
                return Err(CliError::InvalidInput(format!(
                    "Unknown configuration key: {key}"
                )));
            }
        }
        Ok(())
    }

    /// String form of `key`, `None` when unset.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match key {
            "default_channel" => Ok(self.default_channel.clone()),
            "default_expire_seconds" => Ok(self.default_expire_seconds.map(|s| s.to_string())),
            "default_role" => Ok(self.default_role.map(|r| r.to_string())),
            _ => Err(CliError::InvalidInput(format!(
                "Unknown configuration key: {key}"
            ))),
        }
    }

    pub fn expire_seconds(&self) -> u32 {
        self.default_expire_seconds.unwrap_or(DEFAULT_EXPIRE_SECONDS)
    }

    pub fn role(&self) -> Role {
        self.default_role.unwrap_or_default()
    }
}
