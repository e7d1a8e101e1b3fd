use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::DeployPolling;
use crate::api::constants::DEFAULT_API_VERSION;

/// Environment variables that override the stored session
pub const ENV_INSTANCE_URL: &str = "FORCE_INSTANCE_URL";
pub const ENV_ACCESS_TOKEN: &str = "FORCE_ACCESS_TOKEN";
pub const ENV_API_VERSION: &str = "FORCE_API_VERSION";

/// An already established org session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    pub instance_url: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

impl SessionConfig {
    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_environment: Option<String>,
    #[serde(default)]
    pub environments: HashMap<String, SessionConfig>,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_deploy_timeout_secs")]
    pub deploy_timeout_secs: u64,
    /// Queue the ticket listings are restricted to
    #[serde(default = "default_ticket_queue")]
    pub ticket_queue: String,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_deploy_timeout_secs() -> u64 {
    30 * 60
}

fn default_ticket_queue() -> String {
    "ISD.Research Computing Support".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            deploy_timeout_secs: default_deploy_timeout_secs(),
            ticket_queue: default_ticket_queue(),
        }
    }
}

impl Settings {
    pub fn deploy_polling(&self) -> DeployPolling {
        DeployPolling {
            interval: Duration::from_millis(self.poll_interval_ms.max(100)),
            timeout: Duration::from_secs(self.deploy_timeout_secs),
        }
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // Use XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("force-cli")
        } else {
            // Use home directory with dot prefix on Windows/Mac
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".force-cli")
        };

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        Self::from_toml(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        debug!(
            "Loaded config with {} environments",
            config.environments.len()
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        debug!("Saving config to: {:?}", config_path);

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).with_context(|| {
                    format!("Failed to create config directory: {:?}", config_dir)
                })?;
                info!("Created config directory: {:?}", config_dir);
            }
        }

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn get_current_session(&self) -> Option<&SessionConfig> {
        let current_env = self.current_environment.as_ref()?;
        self.environments.get(current_env)
    }

    pub fn get_current_environment_name(&self) -> Option<&String> {
        self.current_environment.as_ref()
    }

    pub fn set_current_environment(&mut self, name: String) -> Result<()> {
        if !self.environments.contains_key(&name) {
            anyhow::bail!("Environment '{}' not found", name);
        }

        info!("Setting current environment to: {}", name);
        self.current_environment = Some(name);
        Ok(())
    }

    pub fn list_environments(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.environments.keys().collect();
        names.sort();
        names
    }

    pub fn remove_environment(&mut self, name: &str) -> Result<()> {
        if !self.environments.contains_key(name) {
            anyhow::bail!("Environment '{}' not found", name);
        }

        info!("Removing environment: {}", name);
        self.environments.remove(name);

        // If this was the current environment, clear it
        if self.current_environment.as_deref() == Some(name) {
            warn!("Removed current environment, clearing current selection");
            self.current_environment = None;
        }

        Ok(())
    }

    /// Pick the session to use: `FORCE_INSTANCE_URL`/`FORCE_ACCESS_TOKEN`
    /// win, then the named environment, then the current one.
    pub fn resolve_session(&self, env_name: Option<&str>) -> Result<SessionConfig> {
        self.resolve_session_with(env_name, |key| std::env::var(key).ok())
    }

    fn resolve_session_with<F>(&self, env_name: Option<&str>, var: F) -> Result<SessionConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(instance_url), Some(access_token)) =
            (var(ENV_INSTANCE_URL), var(ENV_ACCESS_TOKEN))
        {
            debug!("Using session from {} / {}", ENV_INSTANCE_URL, ENV_ACCESS_TOKEN);
            return Ok(SessionConfig {
                instance_url,
                access_token,
                api_version: var(ENV_API_VERSION),
            });
        }

        match env_name {
            Some(name) => self
                .environments
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("Environment '{}' not found", name)),
            None => self.get_current_session().cloned().ok_or_else(|| {
                anyhow::anyhow!(
                    "No active session. Set {} and {}, or select an environment with 'force env use <name>'.",
                    ENV_INSTANCE_URL,
                    ENV_ACCESS_TOKEN
                )
            }),
        }
    }
}
