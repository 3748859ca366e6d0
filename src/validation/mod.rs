// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validation checks: guards evaluated against resolved port values.
//!
//! A check gathers the values of a list of ports, hands them positionally to
//! a [`Predicate`], and applies the fail or success policy. A `Stop` policy
//! turns the outcome into a [`ValidationError`] that aborts the caller; a
//! `Continue` policy only logs.
//!
//! ```
//! use pipeweave::process::PortRef;
//! use pipeweave::validation::{Action, ValidationCheck, ValidationOutcome};
//! use serde_json::{json, Value};
//! use std::collections::HashMap;
//!
//! let check = ValidationCheck::new()
//!     .ports([PortRef::new("buffer", "distance")])
//!     .predicate(|args: &[Value]| json!(args[0].as_f64().unwrap_or(0.0) > 0.0))
//!     .on_fail(Action::Continue, "distance must be positive");
//!
//! let inputs = HashMap::from([(PortRef::new("buffer", "distance"), json!(-1.0))]);
//! assert_eq!(check.run(&inputs).unwrap(), ValidationOutcome::Failed);
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::coercion::value_kind;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    NonBooleanPredicate, PortValueMissing, ValidationCheckFailed, ValidationPassed,
};
use crate::observability::messages::StructuredLog;
use crate::process::{PortRef, Process};
use crate::traits::Predicate;

const UNBOUND: &str = "<unbound>";

/// What to do once the predicate has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Raise a [`ValidationError`].
    Stop,
    /// Log and carry on.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    pub action: Action,
    pub message: String,
}

impl Policy {
    pub fn new(action: Action, message: impl Into<String>) -> Self {
        Self {
            action,
            message: message.into(),
        }
    }
}

/// Where a check argument is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortSide {
    /// The owning process's results when it declares an output of that
    /// name, otherwise the supplied input map.
    Auto,
    /// Always the supplied input map.
    Input,
}

#[derive(Debug, Clone)]
struct CheckPort {
    port: PortRef,
    side: PortSide,
}

/// Result of a check whose triggered policy was `Continue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Passed,
    Failed,
}

/// Guard bound to (at most) one process.
///
/// Defaults: fail policy `Stop` ("validation failed"), success policy
/// `Continue` ("validation passed"), no predicate. A check without a
/// predicate always fails.
#[derive(Clone)]
pub struct ValidationCheck {
    process: Option<Arc<Process>>,
    ports: Vec<CheckPort>,
    predicate: Option<Arc<dyn Predicate>>,
    on_fail: Policy,
    on_success: Policy,
}

impl ValidationCheck {
    pub fn new() -> Self {
        Self {
            process: None,
            ports: Vec::new(),
            predicate: None,
            on_fail: Policy::new(Action::Stop, "validation failed"),
            on_success: Policy::new(Action::Continue, "validation passed"),
        }
    }

    /// Bind to `process`; its outputs become resolvable from its results.
    pub fn bind(mut self, process: Arc<Process>) -> Self {
        self.process = Some(process);
        self
    }

    /// Replace the argument list.
    ///
    /// A port naming an output of its owning process resolves from that
    /// process's results, even when the process also has an input with the
    /// same name. Use [`ValidationCheck::input_port`] to read the input.
    pub fn ports<I, P>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PortRef>,
    {
        self.ports = ports
            .into_iter()
            .map(|port| CheckPort {
                port: port.into(),
                side: PortSide::Auto,
            })
            .collect();
        self
    }

    /// Append one argument resolved like those given to [`ValidationCheck::ports`].
    pub fn port(mut self, port: impl Into<PortRef>) -> Self {
        self.ports.push(CheckPort {
            port: port.into(),
            side: PortSide::Auto,
        });
        self
    }

    /// Append one argument read only from the supplied input map.
    pub fn input_port(mut self, port: impl Into<PortRef>) -> Self {
        self.ports.push(CheckPort {
            port: port.into(),
            side: PortSide::Input,
        });
        self
    }

    pub fn predicate<P: Predicate + 'static>(mut self, predicate: P) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn on_fail(mut self, action: Action, message: impl Into<String>) -> Self {
        self.on_fail = Policy::new(action, message);
        self
    }

    pub fn on_success(mut self, action: Action, message: impl Into<String>) -> Self {
        self.on_success = Policy::new(action, message);
        self
    }

    pub fn bound_process(&self) -> Option<&Arc<Process>> {
        self.process.as_ref()
    }

    pub fn bound_process_id(&self) -> Option<&str> {
        self.process.as_deref().map(Process::id)
    }

    pub fn port_refs(&self) -> impl Iterator<Item = &PortRef> {
        self.ports.iter().map(|entry| &entry.port)
    }

    /// Evaluate the check outside a pipeline.
    ///
    /// Only the bound process is known here: a port naming one of its
    /// outputs resolves from its results, every other port from `inputs`.
    /// Ports without a value are passed as `null`.
    pub fn run(&self, inputs: &HashMap<PortRef, Value>) -> Result<ValidationOutcome, ValidationError> {
        self.evaluate(None, inputs)
    }

    /// Evaluate the check against a set of processes.
    ///
    /// A port naming an output of its owning process in `processes` resolves
    /// from that process's results, otherwise from `inputs`.
    pub fn run_with(
        &self,
        processes: &IndexMap<String, Arc<Process>>,
        inputs: &HashMap<PortRef, Value>,
    ) -> Result<ValidationOutcome, ValidationError> {
        self.evaluate(Some(processes), inputs)
    }

    fn evaluate(
        &self,
        processes: Option<&IndexMap<String, Arc<Process>>>,
        inputs: &HashMap<PortRef, Value>,
    ) -> Result<ValidationOutcome, ValidationError> {
        let label = self.bound_process_id().unwrap_or(UNBOUND);
        let args: Vec<Value> = self
            .ports
            .iter()
            .map(|entry| self.resolve(entry, processes, inputs))
            .collect();

        let passed = match &self.predicate {
            Some(predicate) => match predicate.evaluate(&args) {
                Value::Bool(b) => b,
                other => {
                    NonBooleanPredicate {
                        process_id: label,
                        found: value_kind(&other),
                    }
                    .log();
                    false
                }
            },
            None => false,
        };

        let (policy, outcome) = if passed {
            (&self.on_success, ValidationOutcome::Passed)
        } else {
            (&self.on_fail, ValidationOutcome::Failed)
        };

        match outcome {
            ValidationOutcome::Passed => ValidationPassed {
                process_id: label,
                message: &policy.message,
            }
            .log(),
            ValidationOutcome::Failed => ValidationCheckFailed {
                process_id: label,
                message: &policy.message,
            }
            .log(),
        }

        match (policy.action, outcome) {
            (Action::Continue, _) => Ok(outcome),
            (Action::Stop, ValidationOutcome::Failed) => Err(ValidationError::Failed {
                process_id: label.to_string(),
                message: policy.message.clone(),
            }),
            (Action::Stop, ValidationOutcome::Passed) => Err(ValidationError::Stopped {
                process_id: label.to_string(),
                message: policy.message.clone(),
            }),
        }
    }

    fn resolve(
        &self,
        entry: &CheckPort,
        processes: Option<&IndexMap<String, Arc<Process>>>,
        inputs: &HashMap<PortRef, Value>,
    ) -> Value {
        let port = &entry.port;
        let owner = match entry.side {
            PortSide::Input => None,
            PortSide::Auto => processes
                .and_then(|known| known.get(port.process_id()))
                .or_else(|| self.process.as_ref().filter(|p| p.id() == port.process_id())),
        };
        let from_results = owner
            .filter(|p| p.has_output(port.port()))
            .map(|p| p.result(port.port()));

        let value = match from_results {
            Some(result) => result,
            None => inputs.get(port).cloned(),
        };

        value.unwrap_or_else(|| {
            PortValueMissing {
                process_id: self.bound_process_id().unwrap_or(UNBOUND),
                port,
            }
            .log();
            Value::Null
        })
    }
}

impl Default for ValidationCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationCheck")
            .field("process", &self.bound_process_id())
            .field("ports", &self.ports)
            .field("has_predicate", &self.predicate.is_some())
            .field("on_fail", &self.on_fail)
            .field("on_success", &self.on_success)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::DataType;
    use crate::traits::FnBody;
    use serde_json::json;

    fn positive(args: &[Value]) -> Value {
        json!(args[0].as_f64().unwrap_or(0.0) > 0.0)
    }

    fn inputs(value: Value) -> HashMap<PortRef, Value> {
        HashMap::from([(PortRef::new("buffer", "distance"), value)])
    }

    fn distance_check() -> ValidationCheck {
        ValidationCheck::new()
            .ports([("buffer", "distance")])
            .predicate(positive)
    }

    #[test]
    fn test_stop_on_fail_raises() {
        let check = distance_check().on_fail(Action::Stop, "distance must be positive");

        let err = check.run(&inputs(json!(-3))).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Failed {
                process_id: UNBOUND.to_string(),
                message: "distance must be positive".to_string(),
            }
        );
    }

    #[test]
    fn test_continue_on_fail_returns() {
        let check = distance_check().on_fail(Action::Continue, "distance must be positive");
        assert_eq!(check.run(&inputs(json!(-3))).unwrap(), ValidationOutcome::Failed);
    }

    #[test]
    fn test_pass_with_default_policies() {
        let check = distance_check();
        assert_eq!(check.run(&inputs(json!(5))).unwrap(), ValidationOutcome::Passed);
    }

    #[test]
    fn test_stop_on_success_raises() {
        let check = distance_check().on_success(Action::Stop, "enough");
        assert!(matches!(
            check.run(&inputs(json!(5))),
            Err(ValidationError::Stopped { .. })
        ));
    }

    #[test]
    fn test_non_boolean_result_behaves_as_false() {
        let non_boolean = |_: &[Value]| json!("yes");

        let stop = ValidationCheck::new()
            .ports([("buffer", "distance")])
            .predicate(non_boolean)
            .on_fail(Action::Stop, "bad");
        assert!(matches!(
            stop.run(&inputs(json!(5))),
            Err(ValidationError::Failed { .. })
        ));

        let cont = ValidationCheck::new()
            .ports([("buffer", "distance")])
            .predicate(non_boolean)
            .on_fail(Action::Continue, "bad");
        assert_eq!(cont.run(&inputs(json!(5))).unwrap(), ValidationOutcome::Failed);
    }

    #[test]
    fn test_missing_predicate_fails() {
        let check = ValidationCheck::new().on_fail(Action::Continue, "no predicate");
        assert_eq!(check.run(&HashMap::new()).unwrap(), ValidationOutcome::Failed);
    }

    #[test]
    fn test_missing_port_value_is_null() {
        let check = ValidationCheck::new()
            .ports([("nowhere", "nothing")])
            .predicate(|args: &[Value]| json!(args[0].is_null()))
            .on_fail(Action::Stop, "expected null");

        assert_eq!(check.run(&HashMap::new()).unwrap(), ValidationOutcome::Passed);
    }

    #[tokio::test]
    async fn test_output_ports_resolve_from_bound_results() {
        let process = Arc::new(
            Process::builder("double")
                .input("x", DataType::integer())
                .output("y", DataType::integer())
                .body(FnBody::new(1, |args| {
                    Ok(json!({ "y": args[0].as_i64().unwrap_or(0) * 2 }))
                }))
                .build()
                .unwrap(),
        );
        process
            .execute(HashMap::from([("x".to_string(), json!(21))]))
            .await
            .unwrap();

        // "x" is an input, so it comes from the supplied map; "y" from results.
        let check = ValidationCheck::new()
            .bind(process.clone())
            .ports([("double", "x"), ("double", "y")])
            .predicate(|args: &[Value]| json!(args[0] == json!(21) && args[1] == json!(42)))
            .on_fail(Action::Stop, "mismatch");

        let supplied = HashMap::from([(PortRef::new("double", "x"), json!(21))]);
        assert_eq!(check.run(&supplied).unwrap(), ValidationOutcome::Passed);
        assert_eq!(check.bound_process_id(), Some("double"));
    }

    fn add_one(id: &str) -> Arc<Process> {
        Arc::new(
            Process::builder(id)
                .input("n", DataType::integer())
                .output("n", DataType::integer())
                .body(FnBody::new(1, |args| {
                    Ok(json!({ "n": args[0].as_i64().unwrap_or(0) + 1 }))
                }))
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_input_port_reads_shadowed_input() {
        let process = add_one("inc");
        process
            .execute(HashMap::from([("n".to_string(), json!(1))]))
            .await
            .unwrap();

        let check = ValidationCheck::new()
            .bind(process)
            .input_port(("inc", "n"))
            .port(("inc", "n"))
            .predicate(|args: &[Value]| json!(args[0] == json!(1) && args[1] == json!(2)))
            .on_fail(Action::Stop, "sides mixed up");

        let supplied = HashMap::from([(PortRef::new("inc", "n"), json!(1))]);
        assert_eq!(check.run(&supplied).unwrap(), ValidationOutcome::Passed);
        assert_eq!(check.port_refs().count(), 2);
    }

    #[tokio::test]
    async fn test_run_with_reads_outputs_of_any_known_process() {
        let upstream = add_one("upstream");
        let downstream = add_one("downstream");
        upstream
            .execute(HashMap::from([("n".to_string(), json!(10))]))
            .await
            .unwrap();

        let check = ValidationCheck::new()
            .bind(downstream.clone())
            .ports([("upstream", "n")])
            .predicate(|args: &[Value]| json!(args[0] == json!(11)))
            .on_fail(Action::Continue, "upstream value missing");

        // Without the process set only the bound process is consulted.
        assert_eq!(check.run(&HashMap::new()).unwrap(), ValidationOutcome::Failed);

        let processes: IndexMap<String, Arc<Process>> = [upstream, downstream]
            .into_iter()
            .map(|p| (p.id().to_string(), p))
            .collect();
        assert_eq!(
            check.run_with(&processes, &HashMap::new()).unwrap(),
            ValidationOutcome::Passed
        );
    }
}
