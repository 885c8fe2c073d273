// src/config.rs

//! Configuration for the cluster refinement runtime.
//!
//! This module provides configuration parsing from TOML files, environment
//! variable overrides, and validation of configuration values. The settings
//! here describe the fixed worker topology and the model dimensions; they
//! are invariant for the duration of a refinement step.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{RefineError, Result};

// Top-level refinement configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefineConfig {
    pub worker: WorkerConfig,
    pub model: ModelConfig,
}

// Worker pool topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    // Total number of cooperating worker processes.
    pub num_workers: usize,
    // This process's rank, 0-based. Rank 0 coordinates merges.
    pub rank: usize,
}

/// Model dimensions consumed by the step and passed through to the
/// model store by the driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of user clusters (K).
    pub num_clusters: usize,
    /// Per-cluster size parameter for the model store. The core never
    /// interprets this; it only validates and forwards it.
    pub cluster_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            num_workers: 1,
            rank: 0,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            num_clusters: 1,
            cluster_capacity: 1,
        }
    }
}

impl FromStr for RefineConfig {
    type Err = RefineError;

    /// Parse configuration from a TOML string.
    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s)
            .map_err(|e| RefineError::config_with_source("failed to parse TOML config", e))
    }
}

impl RefineConfig {
    // Load configuration from a TOML file.
    //
    // # Errors
    //
    // Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RefineError::config_with_source(
                format!("failed to read config file '{}'", path.display()),
                e,
            )
        })?;
        let config: Self = content.parse()?;
        config.validate()?;
        Ok(config)
    }

    // Apply environment variable overrides.
    //
    // Environment variables are prefixed with `REFINE_`:
    // - `REFINE_NUM_WORKERS` overrides `worker.num_workers`
    // - `REFINE_WORKER_RANK` overrides `worker.rank`
    // - `REFINE_NUM_CLUSTERS` overrides `model.num_clusters`
    // - `REFINE_CLUSTER_CAPACITY` overrides `model.cluster_capacity`
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("REFINE_NUM_WORKERS") {
            if let Ok(v) = val.parse() {
                self.worker.num_workers = v;
            }
        }
        if let Ok(val) = std::env::var("REFINE_WORKER_RANK") {
            if let Ok(v) = val.parse() {
                self.worker.rank = v;
            }
        }
        if let Ok(val) = std::env::var("REFINE_NUM_CLUSTERS") {
            if let Ok(v) = val.parse() {
                self.model.num_clusters = v;
            }
        }
        if let Ok(val) = std::env::var("REFINE_CLUSTER_CAPACITY") {
            if let Ok(v) = val.parse() {
                self.model.cluster_capacity = v;
            }
        }
        self
    }

    // Validate all configuration values.
    //
    // # Errors
    //
    // Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.worker.num_workers == 0 {
            return Err(RefineError::config(
                "worker.num_workers must be greater than 0",
            ));
        }

        if self.worker.rank >= self.worker.num_workers {
            return Err(RefineError::config(format!(
                "worker.rank ({}) must be less than worker.num_workers ({})",
                self.worker.rank, self.worker.num_workers
            )));
        }

        if self.model.num_clusters == 0 {
            return Err(RefineError::config(
                "model.num_clusters must be greater than 0",
            ));
        }

        if self.model.cluster_capacity == 0 {
            return Err(RefineError::config(
                "model.cluster_capacity must be greater than 0",
            ));
        }

        Ok(())
    }
}
