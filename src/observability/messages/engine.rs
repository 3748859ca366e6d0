// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for pipeline composition and execution events.
//!
//! This module contains message types for logging events related to:
//! * Pipeline build results (participants, unresolved ports, waves)
//! * Processes excluded from the schedule
//! * Run lifecycle (start, per-wave progress, completion, cancellation)

use crate::observability::messages::StructuredLog;
use crate::process::PortRef;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Pipeline built and scheduled.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipeweave::observability::messages::engine::PipelineBuilt;
///
/// let msg = PipelineBuilt {
///     pipeline_id: "ingest",
///     process_count: 3,
///     wave_count: 2,
///     unresolved_inputs: 2,
///     unresolved_outputs: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PipelineBuilt<'a> {
    pub pipeline_id: &'a str,
    pub process_count: usize,
    pub wave_count: usize,
    pub unresolved_inputs: usize,
    pub unresolved_outputs: usize,
}

impl Display for PipelineBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' built: {} processes in {} waves, {} inputs, {} outputs",
            self.pipeline_id,
            self.process_count,
            self.wave_count,
            self.unresolved_inputs,
            self.unresolved_outputs
        )
    }
}

impl StructuredLog for PipelineBuilt<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline_id = self.pipeline_id,
            process_count = self.process_count,
            wave_count = self.wave_count,
            unresolved_inputs = self.unresolved_inputs,
            unresolved_outputs = self.unresolved_outputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline_built",
            span_name = name,
            pipeline_id = self.pipeline_id,
            process_count = self.process_count,
            wave_count = self.wave_count,
        )
    }
}

/// A process could never become ready (cycle or unsatisfiable input) and was
/// left out of the schedule.
///
/// # Log Level
/// `warn!` - Structural problem, the rest of the pipeline still runs
pub struct ProcessUnschedulable<'a> {
    pub pipeline_id: &'a str,
    pub process_id: &'a str,
    pub missing_inputs: &'a [String],
}

impl Display for ProcessUnschedulable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process '{}' in pipeline '{}' cannot be scheduled, unsatisfied inputs: [{}]",
            self.process_id,
            self.pipeline_id,
            self.missing_inputs.join(", ")
        )
    }
}

impl StructuredLog for ProcessUnschedulable<'_> {
    fn log(&self) {
        tracing::warn!(
            pipeline_id = self.pipeline_id,
            process_id = self.process_id,
            missing_inputs = %self.missing_inputs.join(", "),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "process_unschedulable",
            span_name = name,
            pipeline_id = self.pipeline_id,
            process_id = self.process_id,
        )
    }
}

/// Pipeline run started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionStarted<'a> {
    pub pipeline_id: &'a str,
    pub process_count: usize,
    pub wave_count: usize,
    pub max_concurrency: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting pipeline '{}': {} processes in {} waves, max_concurrency={}",
            self.pipeline_id, self.process_count, self.wave_count, self.max_concurrency
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline_id = self.pipeline_id,
            process_count = self.process_count,
            wave_count = self.wave_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            pipeline_id = self.pipeline_id,
            process_count = self.process_count,
            wave_count = self.wave_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// Pipeline run finished every wave.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub pipeline_id: &'a str,
    pub succeeded: usize,
    pub failed: usize,
    pub duration: std::time::Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' completed: {} succeeded, {} failed in {:?}",
            self.pipeline_id, self.succeeded, self.failed, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            pipeline_id = self.pipeline_id,
            succeeded = self.succeeded,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution_completed",
            span_name = name,
            pipeline_id = self.pipeline_id,
            duration = ?self.duration,
        )
    }
}

/// One wave is about to run.
///
/// # Log Level
/// `debug!` - Per-wave detail
pub struct WaveStarted<'a> {
    pub pipeline_id: &'a str,
    pub wave: usize,
    pub process_ids: &'a [String],
}

impl Display for WaveStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' wave {}: [{}]",
            self.pipeline_id,
            self.wave,
            self.process_ids.join(", ")
        )
    }
}

impl StructuredLog for WaveStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            pipeline_id = self.pipeline_id,
            wave = self.wave,
            process_count = self.process_ids.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "wave",
            span_name = name,
            pipeline_id = self.pipeline_id,
            wave = self.wave,
        )
    }
}

/// Run cancelled between waves.
///
/// # Log Level
/// `warn!` - Run ended early on request
pub struct ExecutionCancelled<'a> {
    pub pipeline_id: &'a str,
    pub completed_waves: usize,
}

impl Display for ExecutionCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' cancelled after {} waves",
            self.pipeline_id, self.completed_waves
        )
    }
}

impl StructuredLog for ExecutionCancelled<'_> {
    fn log(&self) {
        tracing::warn!(
            pipeline_id = self.pipeline_id,
            completed_waves = self.completed_waves,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "execution_cancelled",
            span_name = name,
            pipeline_id = self.pipeline_id,
            completed_waves = self.completed_waves,
        )
    }
}

/// A supplied input does not name any unresolved pipeline input.
///
/// # Log Level
/// `warn!` - Caller mistake, value ignored
pub struct UnknownPipelineInput<'a> {
    pub pipeline_id: &'a str,
    pub port: &'a PortRef,
}

impl Display for UnknownPipelineInput<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline '{}' ignores value for '{}': not an unresolved input",
            self.pipeline_id, self.port
        )
    }
}

impl StructuredLog for UnknownPipelineInput<'_> {
    fn log(&self) {
        tracing::warn!(
            pipeline_id = self.pipeline_id,
            process_id = self.port.process_id(),
            port = self.port.port(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "unknown_pipeline_input",
            span_name = name,
            pipeline_id = self.pipeline_id,
            port = %self.port,
        )
    }
}
