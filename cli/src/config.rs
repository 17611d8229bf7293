// Configuration management for the Shout CLI
//
// Cross-platform config stored in:
// - macOS: ~/Library/Application Support/shout/config.json
// - Linux: ~/.config/shout/config.json
// - Windows: %APPDATA%\shout\config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shout_core::{FeedbackOptions, PublishConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Public key of the developer feedback is addressed to
    pub developer: String,

    /// Namespace feedback is filed under
    pub namespace: String,

    /// Relays to publish to
    pub relays: Vec<String>,

    /// Per-relay deadline in seconds (0 disables it)
    pub ack_timeout_secs: u64,

    /// Where this config lives; not persisted
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            developer: String::new(),
            namespace: String::new(),
            relays: vec![
                // Empty by default - users add their own
            ],
            ack_timeout_secs: 10,
            path: None,
        }
    }
}

impl Config {
    /// Get the config directory path (cross-platform)
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("shout");

        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

        Ok(config_dir)
    }

    /// Get the default config file path
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load the config from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::config_file()?),
        }
    }

    /// Load config from file, or create default if not exists
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            let mut config = Config::default();
            config.path = Some(path.to_path_buf());
            config.save()?;
            config
        };
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Path the config is saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_ref().context("Config has no file path")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;
        Ok(())
    }

    /// Add a relay
    pub fn add_relay(&mut self, relay: String) -> Result<bool> {
        if self.relays.contains(&relay) {
            return Ok(false);
        }
        self.relays.push(relay);
        self.save()?;
        Ok(true)
    }

    /// Remove a relay
    pub fn remove_relay(&mut self, relay: &str) -> Result<bool> {
        let before = self.relays.len();
        self.relays.retain(|r| r != relay);
        let removed = self.relays.len() != before;
        if removed {
            self.save()?;
        }
        Ok(removed)
    }

    /// Set a config value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "developer" => self.developer = value.to_string(),
            "namespace" => self.namespace = value.to_string(),
            "ack_timeout_secs" => {
                self.ack_timeout_secs = value.parse().context("Invalid number")?;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        self.save()?;
        Ok(())
    }

    /// Get a config value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "developer" => Some(self.developer.clone()),
            "namespace" => Some(self.namespace.clone()),
            "ack_timeout_secs" => Some(self.ack_timeout_secs.to_string()),
            _ => None,
        }
    }

    /// List all config values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("developer".to_string(), or_unset(&self.developer)),
            ("namespace".to_string(), or_unset(&self.namespace)),
            ("ack_timeout_secs".to_string(), self.ack_timeout_secs.to_string()),
            ("relays".to_string(), self.relays.len().to_string()),
        ]
    }

    /// Feedback options for the core
    pub fn feedback_options(&self) -> FeedbackOptions {
        FeedbackOptions {
            developer: self.developer.clone(),
            namespace: self.namespace.clone(),
            relays: self.relays.clone(),
        }
    }

    /// Publish settings for the core
    pub fn publish_config(&self) -> PublishConfig {
        match self.ack_timeout_secs {
            0 => PublishConfig::unbounded(),
            secs => PublishConfig::with_timeout(Duration::from_secs(secs)),
        }
    }
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(unset)".to_string()
    } else {
        value.to_string()
    }
}
