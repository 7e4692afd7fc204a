//! Command allow-list
//!
//! Loads and saves the JSON file naming which commands the shell accepts.

use anyhow::{Context as _, Result};
use gitsim_core::OPERATIONS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "gitsim_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub enabled_commands: BTreeSet<String>,
}

impl Default for Config {
    /// Every known command enabled.
    fn default() -> Self {
        Self {
            enabled_commands: OPERATIONS.iter().map(|op| op.name.to_string()).collect(),
        }
    }
}

impl Config {
    /// Reads the config at `path`, writing the default there first when the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!(path = %path.display(), "wrote default config");
            return Ok(config);
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!(
            path = %path.display(),
            enabled = config.enabled_commands.len(),
            "loaded config"
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn is_enabled(&self, command: &str) -> bool {
        self.enabled_commands.contains(command)
    }

    /// Returns false when the command was already enabled.
    pub fn enable(&mut self, command: &str) -> bool {
        self.enabled_commands.insert(command.to_string())
    }

    /// Returns false when the command was already disabled.
    pub fn disable(&mut self, command: &str) -> bool {
        self.enabled_commands.remove(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_writes_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let config = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert!(config.is_enabled("commit"));
        assert!(config.is_enabled("pr"));
        assert_eq!(config.enabled_commands.len(), OPERATIONS.len());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.json");

        let mut config = Config::default();
        assert!(config.disable("pr"));
        assert!(!config.disable("pr"));
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert!(!loaded.is_enabled("pr"));
        assert!(loaded.is_enabled("init"));
    }

    #[test]
    fn test_reads_plain_command_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, r#"{ "enabled_commands": ["init", "status"] }"#).unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert!(config.is_enabled("status"));
        assert!(!config.is_enabled("commit"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_or_create(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
