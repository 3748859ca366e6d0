// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::errors::RegistryError;
use crate::observability::messages::registry::NamespaceCreated;
use crate::observability::messages::StructuredLog;
use crate::process::Process;
use crate::registry::ProcessFactory;

/// Owner of all process namespaces.
///
/// ```
/// use pipeweave::registry::{ProcessFactory, ProcessManager};
///
/// let manager = ProcessManager::new();
/// manager.insert_factory(ProcessFactory::sealed("core", true, vec![])).unwrap();
///
/// assert_eq!(manager.default_factory().unwrap().id(), "core");
/// // Unknown namespaces are created on first lookup.
/// assert!(!manager.factory("scratch").is_locked());
/// ```
#[derive(Debug, Default)]
pub struct ProcessManager {
    factories: RwLock<HashMap<String, Arc<ProcessFactory>>>,
}

impl ProcessManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the namespace `id`, creating an unlocked non-default one if needed.
    pub fn factory(&self, id: &str) -> Arc<ProcessFactory> {
        {
            let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
            if let Some(factory) = factories.get(id) {
                return factory.clone();
            }
        }

        let mut factories = self.factories.write().unwrap_or_else(|e| e.into_inner());
        factories
            .entry(id.to_string())
            .or_insert_with(|| {
                NamespaceCreated { factory_id: id }.log();
                Arc::new(ProcessFactory::new(id))
            })
            .clone()
    }

    /// Add a pre-built namespace, replacing one with the same id.
    ///
    /// Fails when `factory` is flagged default and a different default
    /// namespace already exists.
    pub fn insert_factory(&self, factory: ProcessFactory) -> Result<Arc<ProcessFactory>, RegistryError> {
        let mut factories = self.factories.write().unwrap_or_else(|e| e.into_inner());
        if factory.is_default() {
            if let Some(existing) = factories
                .values()
                .find(|f| f.is_default() && f.id() != factory.id())
            {
                return Err(RegistryError::DuplicateDefault {
                    existing: existing.id().to_string(),
                    rejected: factory.id().to_string(),
                });
            }
        }

        let factory = Arc::new(factory);
        factories.insert(factory.id().to_string(), factory.clone());
        Ok(factory)
    }

    /// The namespace flagged default, if any.
    pub fn default_factory(&self) -> Option<Arc<ProcessFactory>> {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        factories.values().find(|f| f.is_default()).cloned()
    }

    /// Look up a process in `factory_id`, or in the default namespace when
    /// no namespace is named.
    pub fn process(&self, id: &str, factory_id: Option<&str>) -> Option<Arc<Process>> {
        let factory = match factory_id {
            Some(factory_id) => self.factory(factory_id),
            None => self.default_factory()?,
        };
        factory.get(id)
    }

    /// Namespace identifiers, sorted.
    pub fn factory_ids(&self) -> Vec<String> {
        let factories = self.factories.read().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = factories.keys().cloned().collect();
        ids.sort();
        ids
    }
}
