// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::observability::messages::registry::{ProcessRegistered, RegistrationRejected};
use crate::observability::messages::StructuredLog;
use crate::process::Process;

/// One process namespace.
///
/// The `locked` and `default` flags are fixed at construction. A locked
/// factory silently refuses registrations, so its contents must be supplied
/// up front through [`ProcessFactory::sealed`].
pub struct ProcessFactory {
    id: String,
    locked: bool,
    default: bool,
    processes: Mutex<HashMap<String, Arc<Process>>>,
}

impl ProcessFactory {
    /// An unlocked, non-default namespace.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_flags(id, false, false)
    }

    pub fn with_flags(id: impl Into<String>, locked: bool, default: bool) -> Self {
        Self {
            id: id.into(),
            locked,
            default,
            processes: Mutex::new(HashMap::new()),
        }
    }

    /// A locked namespace pre-populated with `processes`.
    pub fn sealed<I>(id: impl Into<String>, default: bool, processes: I) -> Self
    where
        I: IntoIterator<Item = Arc<Process>>,
    {
        let processes = processes
            .into_iter()
            .map(|p| (p.id().to_string(), p))
            .collect();
        Self {
            id: id.into(),
            locked: true,
            default,
            processes: Mutex::new(processes),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    /// Add `process`, replacing any process with the same id.
    ///
    /// Returns `false` without registering when the factory is locked.
    pub fn register(&self, process: Arc<Process>) -> bool {
        if self.locked {
            RegistrationRejected {
                factory_id: &self.id,
                process_id: process.id(),
            }
            .log();
            return false;
        }

        ProcessRegistered {
            factory_id: &self.id,
            process_id: process.id(),
        }
        .log();
        let mut processes = self.processes.lock().unwrap_or_else(|e| e.into_inner());
        processes.insert(process.id().to_string(), process);
        true
    }

    pub fn get(&self, id: &str) -> Option<Arc<Process>> {
        let processes = self.processes.lock().unwrap_or_else(|e| e.into_inner());
        processes.get(id).cloned()
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<String> {
        let processes = self.processes.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<String> = processes.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Snapshot of every registered process.
    pub fn processes(&self) -> Vec<Arc<Process>> {
        let processes = self.processes.lock().unwrap_or_else(|e| e.into_inner());
        processes.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.processes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ProcessFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessFactory")
            .field("id", &self.id)
            .field("locked", &self.locked)
            .field("default", &self.default)
            .field("process_ids", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::DataType;
    use crate::traits::FnBody;
    use serde_json::json;

    fn process(id: &str) -> Arc<Process> {
        Arc::new(
            Process::builder(id)
                .output("out", DataType::any())
                .body(FnBody::new(0, |_| Ok(json!({ "out": null }))))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_register_and_get() {
        let factory = ProcessFactory::new("scratch");
        assert!(factory.is_empty());

        assert!(factory.register(process("a")));
        assert!(factory.register(process("b")));

        assert_eq!(factory.len(), 2);
        assert_eq!(factory.get("a").unwrap().id(), "a");
        assert!(factory.get("missing").is_none());
        assert_eq!(factory.ids(), vec!["a", "b"]);
    }

    #[test]
    fn test_register_replaces_same_id() {
        let factory = ProcessFactory::new("scratch");
        let first = process("a");
        let second = process("a");
        factory.register(first);
        factory.register(second.clone());

        assert_eq!(factory.len(), 1);
        assert!(Arc::ptr_eq(&factory.get("a").unwrap(), &second));
    }

    #[test]
    fn test_locked_factory_ignores_registration() {
        let factory = ProcessFactory::sealed("core", true, vec![process("builtin")]);

        assert!(factory.is_locked());
        assert!(factory.is_default());
        assert!(!factory.register(process("intruder")));
        assert!(factory.get("intruder").is_none());
        assert!(factory.get("builtin").is_some());
    }

    #[test]
    fn test_concurrent_registration() {
        let factory = Arc::new(ProcessFactory::new("shared"));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let factory = factory.clone();
                std::thread::spawn(move || {
                    factory.register(process(&format!("p{i}")));
                    factory.get(&format!("p{i}")).is_some()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(factory.len(), 8);
    }
}
