// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline composition.
//!
//! A [`PipelineBuilder`] collects processes and links; [`PipelineBuilder::build`]
//! derives everything the run needs up front:
//!
//! 1. **Participants**: every process named by a link, in first-reference order
//! 2. **Unresolved inputs**: participant inputs no link targets; these become
//!    the pipeline's own inputs
//! 3. **Unresolved outputs**: participant outputs no link reads; these become
//!    the pipeline's results
//! 4. **Schedule**: the waves, see [`Schedule`]
//!
//! ```
//! use pipeweave::coercion::DataType;
//! use pipeweave::engine::PipelineBuilder;
//! use pipeweave::process::{PortRef, Process};
//! use pipeweave::traits::FnBody;
//! use serde_json::json;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let upper = Arc::new(
//!     Process::builder("upper")
//!         .input("text", DataType::string())
//!         .output("text", DataType::string())
//!         .body(FnBody::new(1, |args| {
//!             Ok(json!({ "text": args[0].as_str().unwrap_or_default().to_uppercase() }))
//!         }))
//!         .build()
//!         .unwrap(),
//! );
//! let exclaim = Arc::new(
//!     Process::builder("exclaim")
//!         .input("text", DataType::string())
//!         .output("text", DataType::string())
//!         .body(FnBody::new(1, |args| {
//!             Ok(json!({ "text": format!("{}!", args[0].as_str().unwrap_or_default()) }))
//!         }))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let pipeline = PipelineBuilder::new("shout")
//!     .connect(&upper, "text", &exclaim, "text")
//!     .build()
//!     .unwrap();
//!
//! let inputs = HashMap::from([(PortRef::new("upper", "text"), json!("hi"))]);
//! pipeline.execute(inputs).await.unwrap();
//! assert_eq!(pipeline.result(&PortRef::new("exclaim", "text")), Some(json!("HI!")));
//! # }
//! ```

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::coercion::DataType;
use crate::engine::executor::{ExecutionOptions, RunControl, RunSummary, WaveExecutor};
use crate::engine::link::Link;
use crate::engine::schedule::Schedule;
use crate::errors::PipelineError;
use crate::observability::messages::engine::{PipelineBuilt, ProcessUnschedulable};
use crate::observability::messages::StructuredLog;
use crate::process::{PortRef, Process};
use crate::progress::ProgressMonitor;
use crate::registry::ProcessFactory;
use crate::validation::ValidationCheck;

pub struct PipelineBuilder {
    id: String,
    known: HashMap<String, Arc<Process>>,
    links: Vec<Link>,
    checks: Vec<ValidationCheck>,
    options: ExecutionOptions,
}

impl PipelineBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            known: HashMap::new(),
            links: Vec::new(),
            checks: Vec::new(),
            options: ExecutionOptions::default(),
        }
    }

    /// Make `process` resolvable by id for [`PipelineBuilder::link`].
    ///
    /// Only processes named by a link take part in the pipeline.
    pub fn process(mut self, process: Arc<Process>) -> Self {
        self.known.insert(process.id().to_string(), process);
        self
    }

    /// Make every process registered in `factory` resolvable.
    pub fn processes_from(mut self, factory: &ProcessFactory) -> Self {
        for process in factory.processes() {
            self.known.entry(process.id().to_string()).or_insert(process);
        }
        self
    }

    /// Link an output port to an input port, both given by reference.
    pub fn link(mut self, source: impl Into<PortRef>, target: impl Into<PortRef>) -> Self {
        self.links.push(Link::new(source, target));
        self
    }

    /// Link `source.output` to `target.input`, registering both processes.
    pub fn connect(
        self,
        source: &Arc<Process>,
        output: &str,
        target: &Arc<Process>,
        input: &str,
    ) -> Self {
        let link = Link::new(source.port(output), target.port(input));
        let mut builder = self.process(source.clone()).process(target.clone());
        builder.links.push(link);
        builder
    }

    /// Attach a validation check.
    ///
    /// Unbound checks run before the first wave. Bound checks run right
    /// after the wave of their process, and only if that process succeeded.
    pub fn check(mut self, check: ValidationCheck) -> Self {
        self.checks.push(check);
        self
    }

    pub fn options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Pipeline, PipelineError> {
        if self.links.is_empty() {
            return Err(PipelineError::EmptyPipeline { pipeline_id: self.id });
        }

        let mut processes: IndexMap<String, Arc<Process>> = IndexMap::new();
        let mut outgoing: HashMap<PortRef, Vec<PortRef>> = HashMap::new();
        let mut targets: HashSet<PortRef> = HashSet::new();

        for link in &self.links {
            let source = self.resolve(&link.source)?;
            let target = self.resolve(&link.target)?;

            if !source.has_output(link.source.port()) {
                return Err(PipelineError::UnknownPort {
                    port: link.source.clone(),
                    direction: "output",
                });
            }
            if !target.has_input(link.target.port()) {
                return Err(PipelineError::UnknownPort {
                    port: link.target.clone(),
                    direction: "input",
                });
            }
            if !targets.insert(link.target.clone()) {
                return Err(PipelineError::DuplicateLinkTarget {
                    target: link.target.clone(),
                });
            }

            processes.entry(source.id().to_string()).or_insert(source);
            processes.entry(target.id().to_string()).or_insert(target);
            outgoing
                .entry(link.source.clone())
                .or_default()
                .push(link.target.clone());
        }

        let mut unresolved_inputs = IndexMap::new();
        let mut unresolved_outputs = IndexMap::new();
        for process in processes.values() {
            for (name, data_type) in process.inputs() {
                let port = process.port(name.as_str());
                if !targets.contains(&port) {
                    unresolved_inputs.insert(port, data_type.clone());
                }
            }
            for (name, data_type) in process.outputs() {
                let port = process.port(name.as_str());
                if !outgoing.contains_key(&port) {
                    unresolved_outputs.insert(port, data_type.clone());
                }
            }
        }

        for check in &self.checks {
            if let Some(bound) = check.bound_process_id() {
                if !processes.contains_key(bound) {
                    return Err(PipelineError::UnknownProcess {
                        process_id: bound.to_string(),
                    });
                }
            }
        }

        let schedule = Schedule::compute(&processes, &outgoing, unresolved_inputs.keys().cloned());
        for excluded in schedule.unschedulable() {
            ProcessUnschedulable {
                pipeline_id: &self.id,
                process_id: &excluded.process_id,
                missing_inputs: &excluded.missing_inputs,
            }
            .log();
        }

        PipelineBuilt {
            pipeline_id: &self.id,
            process_count: processes.len(),
            wave_count: schedule.wave_count(),
            unresolved_inputs: unresolved_inputs.len(),
            unresolved_outputs: unresolved_outputs.len(),
        }
        .log();

        Ok(Pipeline {
            id: self.id,
            processes,
            links: self.links,
            outgoing,
            unresolved_inputs,
            unresolved_outputs,
            schedule,
            checks: self.checks,
            options: self.options,
            results: RwLock::new(IndexMap::new()),
        })
    }

    fn resolve(&self, port: &PortRef) -> Result<Arc<Process>, PipelineError> {
        self.known
            .get(port.process_id())
            .cloned()
            .ok_or_else(|| PipelineError::UnknownProcess {
                process_id: port.process_id().to_string(),
            })
    }
}

/// A built pipeline: linked processes, their schedule, and the results of
/// the last run.
pub struct Pipeline {
    id: String,
    processes: IndexMap<String, Arc<Process>>,
    links: Vec<Link>,
    outgoing: HashMap<PortRef, Vec<PortRef>>,
    unresolved_inputs: IndexMap<PortRef, DataType>,
    unresolved_outputs: IndexMap<PortRef, DataType>,
    schedule: Schedule,
    checks: Vec<ValidationCheck>,
    options: ExecutionOptions,
    results: RwLock<IndexMap<PortRef, Value>>,
}

impl Pipeline {
    pub fn builder(id: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Participating processes in first-reference order.
    pub fn processes(&self) -> impl Iterator<Item = &Arc<Process>> {
        self.processes.values()
    }

    pub fn process(&self, id: &str) -> Option<&Arc<Process>> {
        self.processes.get(id)
    }

    pub(crate) fn participants(&self) -> &IndexMap<String, Arc<Process>> {
        &self.processes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Link targets fed by `source`.
    pub fn targets_of(&self, source: &PortRef) -> &[PortRef] {
        self.outgoing.get(source).map(Vec::as_slice).unwrap_or_default()
    }

    /// Inputs the caller must supply, with their declared types.
    pub fn unresolved_inputs(&self) -> &IndexMap<PortRef, DataType> {
        &self.unresolved_inputs
    }

    /// Outputs collected into the results, with their declared types.
    pub fn unresolved_outputs(&self) -> &IndexMap<PortRef, DataType> {
        &self.unresolved_outputs
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn checks(&self) -> &[ValidationCheck] {
        &self.checks
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    /// Root monitor sized for one step per scheduled process.
    pub fn progress_monitor(&self) -> Arc<ProgressMonitor> {
        ProgressMonitor::create(self.id.clone(), self.schedule.scheduled_count())
    }

    /// Unlinked outputs produced by the last run.
    pub fn results(&self) -> IndexMap<PortRef, Value> {
        self.results.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn result(&self, port: &PortRef) -> Option<Value> {
        self.results
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(port)
            .cloned()
    }

    /// Run every wave with the pipeline's options.
    ///
    /// `inputs` must hold exactly as many values as there are unresolved
    /// inputs. Individual process failures do not fail the run unless the
    /// failure strategy is `FailFast`.
    pub async fn execute(&self, inputs: HashMap<PortRef, Value>) -> Result<RunSummary, PipelineError> {
        self.execute_with(inputs, RunControl::default()).await
    }

    /// Like [`Pipeline::execute`], with cancellation and progress reporting.
    pub async fn execute_with(
        &self,
        inputs: HashMap<PortRef, Value>,
        control: RunControl,
    ) -> Result<RunSummary, PipelineError> {
        WaveExecutor::new(self.options.clone())
            .run(self, inputs, control)
            .await
    }

    pub(crate) fn clear_results(&self) {
        self.results
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub(crate) fn store_result(&self, port: PortRef, value: Value) {
        self.results
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(port, value);
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("processes", &self.processes.keys().collect::<Vec<_>>())
            .field("links", &self.links.len())
            .field("waves", &self.schedule.waves())
            .finish()
    }
}
