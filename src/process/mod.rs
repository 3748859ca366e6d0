// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Processes: named units of computation with ordered, typed ports.
//!
//! A [`Process`] couples metadata, an ordered input map, an ordered output
//! map and a [`ProcessBody`]. Its structure is fixed at construction; each
//! successful [`Process::execute`] overwrites the stored results.
//!
//! ```
//! use pipeweave::coercion::DataType;
//! use pipeweave::process::Process;
//! use pipeweave::traits::FnBody;
//! use serde_json::json;
//! use std::collections::HashMap;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let concat = Process::builder("concat")
//!     .input("a", DataType::string())
//!     .input("b", DataType::string())
//!     .output("sum", DataType::string())
//!     .body(FnBody::new(2, |args| {
//!         let a = args[0].as_str().unwrap_or_default();
//!         let b = args[1].as_str().unwrap_or_default();
//!         Ok(json!({ "sum": format!("{a}{b}") }))
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let inputs = HashMap::from([
//!     ("a".to_string(), json!("foo")),
//!     ("b".to_string(), json!("bar")),
//! ]);
//! concat.execute(inputs).await.unwrap();
//! assert_eq!(concat.results()["sum"], json!("foobar"));
//! # }
//! ```

mod port;

pub use port::PortRef;

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::Instrument;

use crate::coercion::{value_kind, CoercionRegistry, DataType};
use crate::errors::ProcessError;
use crate::observability::messages::process::{
    ProcessExecutionCompleted, ProcessExecutionFailed, ProcessExecutionStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::ProcessBody;

/// Output values keyed by port name, in declaration order.
pub type PortValues = IndexMap<String, Value>;

/// Descriptive metadata of a process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessMetadata {
    pub id: String,
    pub title: String,
    pub description: String,
    pub version: String,
    pub keywords: Vec<String>,
}

pub struct Process {
    metadata: ProcessMetadata,
    inputs: IndexMap<String, DataType>,
    outputs: IndexMap<String, DataType>,
    body: Arc<dyn ProcessBody>,
    coercions: Arc<CoercionRegistry>,
    results: RwLock<PortValues>,
}

impl Process {
    pub fn builder(id: impl Into<String>) -> ProcessBuilder {
        ProcessBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &ProcessMetadata {
        &self.metadata
    }

    /// Declared inputs in declaration order.
    pub fn inputs(&self) -> &IndexMap<String, DataType> {
        &self.inputs
    }

    /// Declared outputs in declaration order.
    pub fn outputs(&self) -> &IndexMap<String, DataType> {
        &self.outputs
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    /// Reference to one of this process's ports.
    pub fn port(&self, name: impl Into<String>) -> PortRef {
        PortRef::new(self.id(), name)
    }

    /// Results of the last successful execution, empty before the first one.
    pub fn results(&self) -> PortValues {
        self.results
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn result(&self, port: &str) -> Option<Value> {
        self.results
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(port)
            .cloned()
    }

    /// Run the body once.
    ///
    /// `inputs` must name exactly the declared inputs. Values are coerced to
    /// the declared input types before the call and the body's outputs to
    /// the declared output types after it. On failure the stored results are
    /// left as they were.
    pub async fn execute(&self, inputs: HashMap<String, Value>) -> Result<PortValues, ProcessError> {
        let start_msg = ProcessExecutionStarted {
            process_id: self.id(),
            input_count: inputs.len(),
        };
        let span = start_msg.span("process_execution");
        start_msg.log();

        let start_time = Instant::now();
        match self.run(inputs).instrument(span).await {
            Ok(outputs) => {
                ProcessExecutionCompleted {
                    process_id: self.id(),
                    output_count: outputs.len(),
                    duration: start_time.elapsed(),
                }
                .log();

                let mut results = self.results.write().unwrap_or_else(|e| e.into_inner());
                *results = outputs.clone();
                Ok(outputs)
            }
            Err(e) => {
                ProcessExecutionFailed {
                    process_id: self.id(),
                    error: &e,
                }
                .log();
                Err(e)
            }
        }
    }

    async fn run(&self, mut inputs: HashMap<String, Value>) -> Result<PortValues, ProcessError> {
        if inputs.len() != self.inputs.len() || !self.inputs.keys().all(|k| inputs.contains_key(k)) {
            let mut supplied: Vec<String> = inputs.keys().cloned().collect();
            supplied.sort();
            return Err(ProcessError::ArityMismatch {
                process_id: self.id().to_string(),
                expected: self.inputs.keys().cloned().collect(),
                supplied,
            });
        }

        let args: Vec<Value> = self
            .inputs
            .iter()
            .map(|(name, data_type)| {
                let value = inputs.remove(name).unwrap_or(Value::Null);
                self.coercions.coerce(&value, data_type)
            })
            .collect();

        let returned = self
            .body
            .invoke(args)
            .await
            .map_err(|source| ProcessError::Execution {
                process_id: self.id().to_string(),
                source,
            })?;

        let mut returned = match returned {
            Value::Object(map) => map,
            other => {
                return Err(ProcessError::InvalidResultType {
                    process_id: self.id().to_string(),
                    found: value_kind(&other),
                })
            }
        };

        let mut outputs = PortValues::with_capacity(self.outputs.len());
        for (name, data_type) in &self.outputs {
            let value = returned
                .remove(name)
                .ok_or_else(|| ProcessError::MissingOutput {
                    process_id: self.id().to_string(),
                    port: name.clone(),
                })?;
            outputs.insert(name.clone(), self.coercions.coerce(&value, data_type));
        }

        Ok(outputs)
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("id", &self.metadata.id)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

/// Builder for [`Process`].
///
/// Title defaults to the identifier; the coercion registry defaults to a
/// fresh [`CoercionRegistry::new`]. Pass a shared registry with
/// [`ProcessBuilder::coercions`] so custom rules apply.
pub struct ProcessBuilder {
    metadata: ProcessMetadata,
    inputs: Vec<(String, DataType)>,
    outputs: Vec<(String, DataType)>,
    body: Option<Arc<dyn ProcessBody>>,
    coercions: Option<Arc<CoercionRegistry>>,
}

impl ProcessBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            metadata: ProcessMetadata {
                id: id.into(),
                ..Default::default()
            },
            inputs: Vec::new(),
            outputs: Vec::new(),
            body: None,
            coercions: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.metadata.version = version.into();
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.metadata.keywords.push(keyword.into());
        self
    }

    pub fn input(mut self, name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        self.inputs.push((name.into(), data_type.into()));
        self
    }

    pub fn output(mut self, name: impl Into<String>, data_type: impl Into<DataType>) -> Self {
        self.outputs.push((name.into(), data_type.into()));
        self
    }

    pub fn body<B: ProcessBody + 'static>(mut self, body: B) -> Self {
        self.body = Some(Arc::new(body));
        self
    }

    pub fn shared_body(mut self, body: Arc<dyn ProcessBody>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn coercions(mut self, coercions: Arc<CoercionRegistry>) -> Self {
        self.coercions = Some(coercions);
        self
    }

    pub fn build(self) -> Result<Process, ProcessError> {
        let mut metadata = self.metadata;
        if metadata.id.trim().is_empty() {
            return Err(ProcessError::InvalidIdentifier);
        }
        if metadata.title.is_empty() {
            metadata.title = metadata.id.clone();
        }

        let inputs = collect_ports(&metadata.id, "input", self.inputs)?;
        let outputs = collect_ports(&metadata.id, "output", self.outputs)?;

        let body = self.body.ok_or_else(|| ProcessError::MissingBody {
            process_id: metadata.id.clone(),
        })?;
        if body.arity() != inputs.len() {
            return Err(ProcessError::BodyArityMismatch {
                process_id: metadata.id,
                declared: inputs.len(),
                body: body.arity(),
            });
        }

        Ok(Process {
            metadata,
            inputs,
            outputs,
            body,
            coercions: self.coercions.unwrap_or_default(),
            results: RwLock::new(PortValues::new()),
        })
    }
}

fn collect_ports(
    process_id: &str,
    direction: &'static str,
    ports: Vec<(String, DataType)>,
) -> Result<IndexMap<String, DataType>, ProcessError> {
    let mut map = IndexMap::with_capacity(ports.len());
    for (name, data_type) in ports {
        if map.contains_key(&name) {
            return Err(ProcessError::DuplicatePort {
                process_id: process_id.to_string(),
                direction,
                port: name,
            });
        }
        map.insert(name, data_type);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FnBody;
    use serde_json::json;

    fn concat() -> Process {
        Process::builder("concat")
            .title("Concatenate")
            .version("1.0")
            .keyword("text")
            .input("a", DataType::string())
            .input("b", DataType::string())
            .output("sum", DataType::string())
            .body(FnBody::new(2, |args| {
                let a = args[0].as_str().unwrap_or_default();
                let b = args[1].as_str().unwrap_or_default();
                Ok(json!({ "sum": format!("{a}{b}") }))
            }))
            .build()
            .unwrap()
    }

    fn inputs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_concat_scenario() {
        let process = concat();
        assert!(process.results().is_empty());

        let outputs = process
            .execute(inputs(&[("a", json!("foo")), ("b", json!("bar"))]))
            .await
            .unwrap();

        assert_eq!(outputs["sum"], json!("foobar"));
        assert_eq!(process.results().len(), 1);
        assert_eq!(process.result("sum"), Some(json!("foobar")));
    }

    #[tokio::test]
    async fn test_inputs_are_coerced_before_body() {
        let process = concat();
        process
            .execute(inputs(&[("a", json!(4)), ("b", json!(true))]))
            .await
            .unwrap();

        assert_eq!(process.result("sum"), Some(json!("4true")));
    }

    #[tokio::test]
    async fn test_outputs_are_coerced_and_extra_keys_dropped() {
        let process = Process::builder("count")
            .input("text", DataType::string())
            .output("length", DataType::integer())
            .body(FnBody::new(1, |args| {
                let len = args[0].as_str().unwrap_or_default().len();
                Ok(json!({ "length": len.to_string(), "debug": "ignored" }))
            }))
            .build()
            .unwrap();

        let outputs = process
            .execute(inputs(&[("text", json!("hello"))]))
            .await
            .unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs["length"], json!(5));
    }

    #[tokio::test]
    async fn test_arity_mismatch_leaves_results_untouched() {
        let process = concat();
        process
            .execute(inputs(&[("a", json!("x")), ("b", json!("y"))]))
            .await
            .unwrap();

        let cases = vec![
            inputs(&[("a", json!("only"))]),
            inputs(&[("a", json!("1")), ("c", json!("2"))]),
            inputs(&[("a", json!("1")), ("b", json!("2")), ("c", json!("3"))]),
        ];
        for case in cases {
            let err = process.execute(case).await.unwrap_err();
            assert!(matches!(err, ProcessError::ArityMismatch { .. }));
        }
        assert_eq!(process.result("sum"), Some(json!("xy")));
    }

    #[tokio::test]
    async fn test_body_error_is_execution_error() {
        let process = Process::builder("boom")
            .output("out", DataType::any())
            .body(FnBody::new(0, |_| Err(anyhow::anyhow!("exploded"))))
            .build()
            .unwrap();

        let err = process.execute(HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ProcessError::Execution { .. }));
        assert!(err.to_string().contains("exploded"));
        assert_eq!(err.process_id(), Some("boom"));
    }

    #[tokio::test]
    async fn test_non_object_result_is_invalid() {
        let process = Process::builder("scalar")
            .output("out", DataType::any())
            .body(FnBody::new(0, |_| Ok(json!(3))))
            .build()
            .unwrap();

        let err = process.execute(HashMap::new()).await.unwrap_err();
        assert!(matches!(
            err,
            ProcessError::InvalidResultType { found: "number", .. }
        ));
    }

    #[tokio::test]
    async fn test_missing_output_names_port() {
        let process = Process::builder("partial")
            .output("first", DataType::any())
            .output("second", DataType::any())
            .body(FnBody::new(0, |_| Ok(json!({ "first": 1 }))))
            .build()
            .unwrap();

        let err = process.execute(HashMap::new()).await.unwrap_err();
        match err {
            ProcessError::MissingOutput { port, .. } => assert_eq!(port, "second"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(process.results().is_empty());
    }

    #[test]
    fn test_body_arity_rejected_at_construction() {
        let result = Process::builder("bad")
            .input("a", DataType::string())
            .input("b", DataType::string())
            .output("out", DataType::string())
            .body(FnBody::new(1, |_| Ok(json!({}))))
            .build();

        assert!(matches!(
            result,
            Err(ProcessError::BodyArityMismatch { declared: 2, body: 1, .. })
        ));
    }

    #[test]
    fn test_builder_rejects_bad_structure() {
        let duplicate = Process::builder("dup")
            .input("a", DataType::string())
            .input("a", DataType::integer())
            .body(FnBody::new(2, |_| Ok(json!({}))))
            .build();
        assert!(matches!(duplicate, Err(ProcessError::DuplicatePort { direction: "input", .. })));

        let empty_id = Process::builder("  ")
            .body(FnBody::new(0, |_| Ok(json!({}))))
            .build();
        assert!(matches!(empty_id, Err(ProcessError::InvalidIdentifier)));

        let no_body = Process::builder("nobody").build();
        assert!(matches!(no_body, Err(ProcessError::MissingBody { .. })));
    }

    #[test]
    fn test_metadata_and_port_order() {
        let process = concat();
        assert_eq!(process.metadata().title, "Concatenate");
        assert_eq!(process.metadata().version, "1.0");
        assert_eq!(process.metadata().keywords, vec!["text"]);
        assert_eq!(
            process.inputs().keys().collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(process.port("sum"), PortRef::new("concat", "sum"));

        let untitled = Process::builder("plain")
            .body(FnBody::new(0, |_| Ok(json!({}))))
            .build()
            .unwrap();
        assert_eq!(untitled.metadata().title, "plain");
    }
}
