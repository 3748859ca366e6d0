// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::ExecutionOptions;
use crate::errors::{ConfigError, FailureStrategy};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Runtime configuration, typically loaded from a YAML file.
///
/// # Fields
/// * `failure_strategy` - How a failing process affects the run (optional,
///   defaults to `continue_on_error`)
/// * `executor_options` - Wave executor tuning (optional)
/// * `namespaces` - Process namespaces to create up front (optional)
///
/// # Example
/// ```yaml
/// failure_strategy: fail_fast
/// executor_options:
///   max_concurrency: 4
/// namespaces:
///   - id: core
///     default: true
///   - id: scratch
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub namespaces: Vec<NamespaceConfig>,
}

/// Wave executor options.
///
/// # Fields
/// * `max_concurrency` - Maximum processes running at once within a wave
///   (optional, defaults to the number of CPU cores)
#[derive(Debug, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

/// One process namespace.
///
/// A `locked` namespace created from configuration starts empty and stays
/// empty unless the application supplies a sealed factory with the same id.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NamespaceConfig {
    pub id: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub locked: bool,
}

impl Config {
    /// Check the cross-field rules serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.executor_options.max_concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "executor_options.max_concurrency must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for namespace in &self.namespaces {
            if namespace.id.trim().is_empty() {
                return Err(ConfigError::Invalid("namespace id must not be empty".to_string()));
            }
            if !seen.insert(namespace.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "namespace '{}' is declared more than once",
                    namespace.id
                )));
            }
        }

        let defaults: Vec<&str> = self
            .namespaces
            .iter()
            .filter(|n| n.default)
            .map(|n| n.id.as_str())
            .collect();
        if defaults.len() > 1 {
            return Err(ConfigError::Invalid(format!(
                "only one default namespace is allowed, found: {}",
                defaults.join(", ")
            )));
        }

        Ok(())
    }

    /// Executor options with unset fields filled from the defaults.
    pub fn execution_options(&self) -> ExecutionOptions {
        let defaults = ExecutionOptions::default();
        ExecutionOptions::new(
            self.executor_options
                .max_concurrency
                .unwrap_or(defaults.max_concurrency),
            self.failure_strategy,
        )
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config from a YAML file and run [`Config::validate`] on it.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    cfg.validate()?;
    Ok(cfg)
}
