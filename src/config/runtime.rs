// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::coercion::CoercionRegistry;
use crate::config::Config;
use crate::engine::{ExecutionOptions, PipelineBuilder};
use crate::errors::RegistryError;
use crate::process::ProcessBuilder;
use crate::registry::{ProcessFactory, ProcessManager};

/// Runtime builder - assembles the coercion registry, the process manager
/// and the executor options an application shares between its pipelines.
///
/// # Examples
///
/// ## Building runtime from configuration
/// ```
/// use pipeweave::config::{Config, NamespaceConfig, RuntimeBuilder};
/// use pipeweave::errors::FailureStrategy;
///
/// let config = Config {
///     failure_strategy: FailureStrategy::FailFast,
///     namespaces: vec![NamespaceConfig {
///         id: "core".to_string(),
///         default: true,
///         locked: false,
///     }],
///     ..Default::default()
/// };
///
/// let runtime = RuntimeBuilder::from_config(&config).build().unwrap();
///
/// assert_eq!(runtime.options().failure_strategy, FailureStrategy::FailFast);
/// assert_eq!(runtime.manager().default_factory().unwrap().id(), "core");
/// ```
pub struct RuntimeBuilder {
    coercions: Option<Arc<CoercionRegistry>>,
    namespaces: Vec<ProcessFactory>,
    options: ExecutionOptions,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            coercions: None,
            namespaces: Vec::new(),
            options: ExecutionOptions::default(),
        }
    }

    /// Start from configuration: executor options plus one empty namespace
    /// per configured entry.
    pub fn from_config(cfg: &Config) -> Self {
        let mut builder = Self::new().options(cfg.execution_options());
        for namespace in &cfg.namespaces {
            builder = builder.namespace(ProcessFactory::with_flags(
                namespace.id.clone(),
                namespace.locked,
                namespace.default,
            ));
        }
        builder
    }

    /// Use `coercions` instead of a fresh registry with the built-in rules.
    pub fn coercions(mut self, coercions: Arc<CoercionRegistry>) -> Self {
        self.coercions = Some(coercions);
        self
    }

    /// Add a namespace, replacing an earlier one with the same id.
    pub fn namespace(mut self, factory: ProcessFactory) -> Self {
        self.namespaces.retain(|existing| existing.id() != factory.id());
        self.namespaces.push(factory);
        self
    }

    pub fn options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Runtime, RegistryError> {
        let manager = ProcessManager::new();
        for factory in self.namespaces {
            manager.insert_factory(factory)?;
        }

        Ok(Runtime {
            coercions: self.coercions.unwrap_or_default(),
            manager: Arc::new(manager),
            options: self.options,
        })
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared state for building and running pipelines.
#[derive(Debug, Clone)]
pub struct Runtime {
    coercions: Arc<CoercionRegistry>,
    manager: Arc<ProcessManager>,
    options: ExecutionOptions,
}

impl Runtime {
    pub fn coercions(&self) -> &Arc<CoercionRegistry> {
        &self.coercions
    }

    pub fn manager(&self) -> &Arc<ProcessManager> {
        &self.manager
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// A process builder wired to this runtime's coercion registry.
    pub fn process_builder(&self, id: impl Into<String>) -> ProcessBuilder {
        ProcessBuilder::new(id).coercions(self.coercions.clone())
    }

    /// A pipeline builder carrying this runtime's executor options.
    pub fn pipeline(&self, id: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(id).options(self.options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::DataType;
    use crate::config::NamespaceConfig;
    use crate::errors::FailureStrategy;
    use crate::process::{PortRef, Process};
    use crate::traits::FnBody;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn namespace(id: &str, default: bool, locked: bool) -> NamespaceConfig {
        NamespaceConfig {
            id: id.to_string(),
            default,
            locked,
        }
    }

    #[test]
    fn test_from_config_creates_namespaces() {
        let cfg = Config {
            namespaces: vec![namespace("core", true, true), namespace("scratch", false, false)],
            ..Default::default()
        };

        let runtime = RuntimeBuilder::from_config(&cfg).build().unwrap();

        assert_eq!(runtime.manager().factory_ids(), vec!["core", "scratch"]);
        let core = runtime.manager().default_factory().unwrap();
        assert_eq!(core.id(), "core");
        assert!(core.is_locked());
        assert!(!runtime.manager().factory("scratch").is_locked());
    }

    #[test]
    fn test_supplied_namespace_replaces_configured_one() {
        let cfg = Config {
            namespaces: vec![namespace("core", true, true)],
            ..Default::default()
        };
        let echo = Arc::new(
            Process::builder("echo")
                .input("in", DataType::any())
                .output("out", DataType::any())
                .body(FnBody::new(1, |args| Ok(json!({ "out": args[0].clone() }))))
                .build()
                .unwrap(),
        );

        let runtime = RuntimeBuilder::from_config(&cfg)
            .namespace(ProcessFactory::sealed("core", true, vec![echo]))
            .build()
            .unwrap();

        assert!(runtime.manager().process("echo", None).is_some());
    }

    #[test]
    fn test_two_default_namespaces_rejected() {
        let result = RuntimeBuilder::new()
            .namespace(ProcessFactory::with_flags("a", false, true))
            .namespace(ProcessFactory::with_flags("b", false, true))
            .build();

        assert!(matches!(result, Err(RegistryError::DuplicateDefault { .. })));
    }

    #[tokio::test]
    async fn test_runtime_builders_share_state() {
        let coercions = Arc::new(CoercionRegistry::new());
        coercions.register(
            DataType::new("shout"),
            |v: &Value| v.as_str().map(|s| json!(s.to_uppercase())),
        );

        let cfg = Config {
            failure_strategy: FailureStrategy::FailFast,
            ..Default::default()
        };
        let runtime = RuntimeBuilder::from_config(&cfg)
            .coercions(coercions)
            .build()
            .unwrap();

        let loud = Arc::new(
            runtime
                .process_builder("loud")
                .input("text", DataType::new("shout"))
                .output("text", DataType::string())
                .body(FnBody::new(1, |args| Ok(json!({ "text": args[0].clone() }))))
                .build()
                .unwrap(),
        );
        let quiet = Arc::new(
            runtime
                .process_builder("quiet")
                .input("text", DataType::string())
                .output("len", DataType::integer())
                .body(FnBody::new(1, |args| {
                    Ok(json!({ "len": args[0].as_str().map(str::len).unwrap_or_default() }))
                }))
                .build()
                .unwrap(),
        );

        let pipeline = runtime
            .pipeline("shout")
            .connect(&loud, "text", &quiet, "text")
            .build()
            .unwrap();
        assert_eq!(pipeline.options().failure_strategy, FailureStrategy::FailFast);

        pipeline
            .execute(HashMap::from([(PortRef::new("loud", "text"), json!("hey"))]))
            .await
            .unwrap();

        assert_eq!(loud.result("text"), Some(json!("HEY")));
        assert_eq!(pipeline.result(&PortRef::new("quiet", "len")), Some(json!(3)));
    }
}
