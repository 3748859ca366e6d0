// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::engine::pipeline::Pipeline;
use crate::errors::{FailureStrategy, PipelineError, ProcessError};
use crate::observability::messages::engine::{
    ExecutionCancelled, ExecutionCompleted, ExecutionStarted, UnknownPipelineInput, WaveStarted,
};
use crate::observability::messages::StructuredLog;
use crate::process::{PortRef, PortValues};
use crate::progress::ProgressMonitor;

/// Knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Upper bound on processes running at once inside a wave
    pub max_concurrency: usize,
    pub failure_strategy: FailureStrategy,
}

impl ExecutionOptions {
    /// `max_concurrency` is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn new(max_concurrency: usize, failure_strategy: FailureStrategy) -> Self {
        Self {
            max_concurrency: permits(max_concurrency),
            failure_strategy,
        }
    }
}

impl Default for ExecutionOptions {
    /// One slot per CPU core, lenient failure handling.
    fn default() -> Self {
        let concurrency = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::new(concurrency, FailureStrategy::default())
    }
}

fn permits(max_concurrency: usize) -> usize {
    max_concurrency.clamp(1, Semaphore::MAX_PERMITS)
}

/// Caller-side hooks into a single run.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    cancellation: Option<CancellationToken>,
    progress: Option<Arc<ProgressMonitor>>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checked between waves. A wave already started always runs to completion.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Receives one step per finished process, successful or not.
    pub fn progress(mut self, monitor: Arc<ProgressMonitor>) -> Self {
        self.progress = Some(monitor);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Outcome counts of a run that was not aborted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub waves_run: usize,
}

/// Runs a [`Pipeline`] wave by wave.
///
/// Every process in a wave is spawned onto the tokio runtime, bounded by a
/// semaphore of `max_concurrency` permits. The next wave starts only after
/// the whole current wave has finished and its outputs have been relayed
/// along the links.
pub struct WaveExecutor {
    options: ExecutionOptions,
}

impl WaveExecutor {
    pub fn new(options: ExecutionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    pub async fn run(
        &self,
        pipeline: &Pipeline,
        inputs: HashMap<PortRef, Value>,
        control: RunControl,
    ) -> Result<RunSummary, PipelineError> {
        let started = ExecutionStarted {
            pipeline_id: pipeline.id(),
            process_count: pipeline.schedule().scheduled_count(),
            wave_count: pipeline.schedule().wave_count(),
            max_concurrency: self.options.max_concurrency,
        };
        let span = started.span("pipeline_run");
        started.log();

        self.run_waves(pipeline, inputs, control)
            .instrument(span)
            .await
    }

    async fn run_waves(
        &self,
        pipeline: &Pipeline,
        inputs: HashMap<PortRef, Value>,
        control: RunControl,
    ) -> Result<RunSummary, PipelineError> {
        let start_time = Instant::now();
        let expected = pipeline.unresolved_inputs().len();
        if inputs.len() != expected {
            return Err(PipelineError::InputCountMismatch {
                pipeline_id: pipeline.id().to_string(),
                expected,
                supplied: inputs.len(),
            });
        }

        pipeline.clear_results();

        let mut working: HashMap<PortRef, Value> = HashMap::with_capacity(inputs.len());
        for (port, value) in inputs {
            if !pipeline.unresolved_inputs().contains_key(&port) {
                UnknownPipelineInput {
                    pipeline_id: pipeline.id(),
                    port: &port,
                }
                .log();
                continue;
            }
            working.insert(port, value);
        }

        for check in pipeline.checks().iter().filter(|c| c.bound_process().is_none()) {
            check.run_with(pipeline.participants(), &working)?;
        }

        // Options built by hand skip the clamp in `ExecutionOptions::new`.
        let semaphore = Arc::new(Semaphore::new(permits(self.options.max_concurrency)));
        let mut summary = RunSummary::default();

        for (index, wave) in pipeline.schedule().waves().iter().enumerate() {
            if control.is_cancelled() {
                ExecutionCancelled {
                    pipeline_id: pipeline.id(),
                    completed_waves: index,
                }
                .log();
                return Err(PipelineError::Cancelled {
                    pipeline_id: pipeline.id().to_string(),
                    completed_waves: index,
                });
            }

            WaveStarted {
                pipeline_id: pipeline.id(),
                wave: index,
                process_ids: wave,
            }
            .log();

            let outcomes = self
                .run_wave(pipeline, wave, &working, &semaphore, &control)
                .await;

            let mut first_failure = None;
            let mut succeeded_ids: Vec<String> = Vec::new();
            for (process_id, outcome) in outcomes {
                match outcome {
                    Ok(outputs) => {
                        summary.succeeded += 1;
                        for (port, value) in outputs {
                            let source = PortRef::new(process_id.as_str(), port);
                            let targets = pipeline.targets_of(&source);
                            if targets.is_empty() {
                                pipeline.store_result(source, value);
                            } else {
                                for target in targets {
                                    working.insert(target.clone(), value.clone());
                                }
                            }
                        }
                        succeeded_ids.push(process_id);
                    }
                    Err(error) => {
                        summary.failed += 1;
                        first_failure.get_or_insert(error);
                    }
                }
            }
            summary.waves_run += 1;

            if let (FailureStrategy::FailFast, Some(error)) =
                (self.options.failure_strategy, first_failure)
            {
                return Err(PipelineError::ProcessFailed {
                    pipeline_id: pipeline.id().to_string(),
                    source: error,
                });
            }

            for check in pipeline.checks() {
                let bound_here = check
                    .bound_process_id()
                    .is_some_and(|id| succeeded_ids.iter().any(|s| s == id));
                if bound_here {
                    check.run_with(pipeline.participants(), &working)?;
                }
            }
        }

        ExecutionCompleted {
            pipeline_id: pipeline.id(),
            succeeded: summary.succeeded,
            failed: summary.failed,
            duration: start_time.elapsed(),
        }
        .log();

        Ok(summary)
    }

    /// Spawn every process of one wave and collect `(process id, outcome)`
    /// pairs in wave order.
    async fn run_wave(
        &self,
        pipeline: &Pipeline,
        wave: &[String],
        working: &HashMap<PortRef, Value>,
        semaphore: &Arc<Semaphore>,
        control: &RunControl,
    ) -> Vec<(String, Result<PortValues, ProcessError>)> {
        let mut tasks = Vec::with_capacity(wave.len());

        for process_id in wave {
            let Some(process) = pipeline.process(process_id).cloned() else {
                continue;
            };

            let process_inputs: HashMap<String, Value> = process
                .inputs()
                .keys()
                .filter_map(|name| {
                    working
                        .get(&process.port(name.as_str()))
                        .map(|value| (name.clone(), value.clone()))
                })
                .collect();

            let semaphore = semaphore.clone();
            let task = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| ProcessError::Execution {
                    process_id: process.id().to_string(),
                    source: anyhow::Error::new(e),
                })?;
                process.execute(process_inputs).await
            });
            tasks.push((process_id.clone(), task));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for (process_id, task) in tasks {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(ProcessError::Execution {
                    process_id: process_id.clone(),
                    source: anyhow::anyhow!("task join error: {}", join_error),
                }),
            };
            if let Some(monitor) = &control.progress {
                monitor.increment_step();
            }
            outcomes.push((process_id, outcome));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::DataType;
    use crate::engine::PipelineBuilder;
    use crate::process::Process;
    use crate::traits::FnBody;
    use serde_json::json;

    #[test]
    fn test_options_clamp_concurrency() {
        struct TestCase {
            requested: usize,
            expected: usize,
        }

        let cases = vec![
            TestCase {
                requested: 0,
                expected: 1,
            },
            TestCase {
                requested: 8,
                expected: 8,
            },
            TestCase {
                requested: usize::MAX,
                expected: Semaphore::MAX_PERMITS,
            },
        ];

        for case in cases {
            let options = ExecutionOptions::new(case.requested, FailureStrategy::default());
            assert_eq!(options.max_concurrency, case.expected, "requested {}", case.requested);
        }
    }

    #[tokio::test]
    async fn test_unclamped_options_still_run() {
        let echo = |id: &str| {
            Arc::new(
                Process::builder(id)
                    .input("v", DataType::any())
                    .output("v", DataType::any())
                    .body(FnBody::new(1, |args| Ok(json!({ "v": args[0].clone() }))))
                    .build()
                    .unwrap(),
            )
        };
        let first = echo("first");
        let second = echo("second");

        let pipeline = PipelineBuilder::new("wide")
            .connect(&first, "v", &second, "v")
            .options(ExecutionOptions {
                max_concurrency: usize::MAX,
                failure_strategy: FailureStrategy::FailFast,
            })
            .build()
            .unwrap();

        let summary = pipeline
            .execute(HashMap::from([(PortRef::new("first", "v"), json!("x"))]))
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 2);
        assert_eq!(pipeline.result(&PortRef::new("second", "v")), Some(json!("x")));
    }
}
