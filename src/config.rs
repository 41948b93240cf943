// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Engine configuration system

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default file looked up by [`EngineConfig::load`]
pub const CONFIG_FILE: &str = "meshcut.toml";

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of cut workers; `None` means one per available core
    pub workers: Option<usize>,
    /// Worker threads are named `{prefix}-{index}`
    pub thread_name_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: None,
            thread_name_prefix: "cut-worker".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: Some(workers),
            ..Self::default()
        }
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `meshcut.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(workers) = std::env::var("MESHCUT_WORKERS") {
            if let Ok(workers) = workers.parse() {
                self.workers = Some(workers);
            }
        }

        if let Ok(prefix) = std::env::var("MESHCUT_THREAD_PREFIX") {
            if !prefix.is_empty() {
                self.thread_name_prefix = prefix;
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Effective worker count, never zero
    pub fn resolved_workers(&self) -> usize {
        match self.workers {
            Some(workers) => workers.max(1),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.workers, None);
        assert_eq!(config.thread_name_prefix, "cut-worker");
        assert!(config.resolved_workers() >= 1);
    }

    #[test]
    fn test_zero_workers_resolves_to_one() {
        assert_eq!(EngineConfig::with_workers(0).resolved_workers(), 1);
        assert_eq!(EngineConfig::with_workers(6).resolved_workers(), 6);
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE);

        let config = EngineConfig {
            workers: Some(3),
            thread_name_prefix: "slicer".to_string(),
        };
        config.save(&path)?;

        assert_eq!(EngineConfig::from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "workers = 2\n")?;

        let config = EngineConfig::from_file(&path)?;
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.thread_name_prefix, "cut-worker");
        Ok(())
    }

    #[test]
    fn test_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "workers = \"many\"").unwrap();
        assert!(EngineConfig::from_file(&path).is_err());
    }
}
