// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Repair configuration: defaults, TOML file and environment overrides

use crate::error::RepairError;
use crate::repair::{IntersectionParams, NonManifoldParams, DEFAULT_CACHE_TTL};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File picked up by [`RepairConfig::load`] from the working directory
pub const CONFIG_FILE: &str = "polyframe-repair.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    /// Smoothing rounds of the self-intersection engine
    pub max_attempts: usize,
    /// Weld and dissolve distance of the non-manifold engine
    pub merge_distance: f64,
    /// Vertex islands below this size are deleted
    pub delete_island_threshold: usize,
    /// Cached counts expire after this many seconds; `None` keeps them
    /// until the mesh changes
    pub cache_ttl_secs: Option<u64>,
    /// Process batch objects on the rayon pool
    pub parallel: bool,
}

impl Default for RepairConfig {
    fn default() -> Self {
        let intersections = IntersectionParams::default();
        let non_manifold = NonManifoldParams::default();
        Self {
            max_attempts: intersections.max_attempts,
            merge_distance: non_manifold.merge_distance,
            delete_island_threshold: non_manifold.delete_island_threshold,
            cache_ttl_secs: None,
            parallel: false,
        }
    }
}

impl RepairConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: RepairConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load [`CONFIG_FILE`] if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `POLYFRAME_REPAIR_*` overrides from `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("POLYFRAME_REPAIR_MAX_ATTEMPTS") {
            self.max_attempts = value
                .parse()
                .with_context(|| format!("POLYFRAME_REPAIR_MAX_ATTEMPTS is not a count: {value}"))?;
        }
        if let Some(value) = lookup("POLYFRAME_REPAIR_MERGE_DISTANCE") {
            self.merge_distance = value
                .parse()
                .with_context(|| format!("POLYFRAME_REPAIR_MERGE_DISTANCE is not a number: {value}"))?;
        }
        if let Some(value) = lookup("POLYFRAME_REPAIR_ISLAND_THRESHOLD") {
            self.delete_island_threshold = value
                .parse()
                .with_context(|| format!("POLYFRAME_REPAIR_ISLAND_THRESHOLD is not a count: {value}"))?;
        }
        if let Some(value) = lookup("POLYFRAME_REPAIR_PARALLEL") {
            self.parallel = value.parse().unwrap_or(false);
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), RepairError> {
        self.intersection_params().validate()?;
        self.non_manifold_params().validate()
    }

    pub fn intersection_params(&self) -> IntersectionParams {
        IntersectionParams {
            max_attempts: self.max_attempts,
        }
    }

    pub fn non_manifold_params(&self) -> NonManifoldParams {
        NonManifoldParams {
            merge_distance: self.merge_distance,
            delete_island_threshold: self.delete_island_threshold,
        }
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Turn on the default five minute cache expiry
    pub fn with_default_ttl(mut self) -> Self {
        self.cache_ttl_secs = Some(DEFAULT_CACHE_TTL.as_secs());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = RepairConfig::default();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.delete_island_threshold, 100);
        assert!((config.merge_distance - 0.001).abs() < 1e-12);
        assert!(config.validate().is_ok());
        assert_eq!(config.clone().with_default_ttl().cache_ttl(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        let config = RepairConfig {
            max_attempts: 8,
            parallel: true,
            ..Default::default()
        };
        config.save(&path)?;
        assert_eq!(RepairConfig::from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let config: RepairConfig = toml::from_str("merge_distance = 0.01\n")?;
        assert_eq!(config.max_attempts, 5);
        assert!((config.merge_distance - 0.01).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut config = RepairConfig::default();
        config.apply_env(|key| match key {
            "POLYFRAME_REPAIR_MAX_ATTEMPTS" => Some("2".to_string()),
            "POLYFRAME_REPAIR_PARALLEL" => Some("true".to_string()),
            _ => None,
        })?;
        assert_eq!(config.max_attempts, 2);
        assert!(config.parallel);

        let bad = config.apply_env(|key| (key == "POLYFRAME_REPAIR_MERGE_DISTANCE").then(|| "far".to_string()));
        assert!(bad.is_err());
        Ok(())
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = RepairConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
