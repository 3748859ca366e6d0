// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for process execution and value coercion.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Process execution started.
///
/// # Log Level
/// `debug!` - Per-process detail
///
/// # Example
/// ```
/// use pipeweave::observability::messages::process::ProcessExecutionStarted;
///
/// let msg = ProcessExecutionStarted {
///     process_id: "concat",
///     input_count: 2,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct ProcessExecutionStarted<'a> {
    pub process_id: &'a str,
    pub input_count: usize,
}

impl Display for ProcessExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process '{}' execution started: {} inputs",
            self.process_id, self.input_count
        )
    }
}

impl StructuredLog for ProcessExecutionStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            process_id = self.process_id,
            input_count = self.input_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "process_execution",
            span_name = name,
            process_id = self.process_id,
            input_count = self.input_count,
        )
    }
}

/// Process execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProcessExecutionCompleted<'a> {
    pub process_id: &'a str,
    pub output_count: usize,
    pub duration: std::time::Duration,
}

impl Display for ProcessExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process '{}' completed: {} outputs in {:?}",
            self.process_id, self.output_count, self.duration
        )
    }
}

impl StructuredLog for ProcessExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            process_id = self.process_id,
            output_count = self.output_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "process_completed",
            span_name = name,
            process_id = self.process_id,
            output_count = self.output_count,
            duration = ?self.duration,
        )
    }
}

/// Process execution failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use pipeweave::observability::messages::process::ProcessExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = ProcessExecutionFailed {
///     process_id: "concat",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ProcessExecutionFailed<'a> {
    pub process_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process '{}' execution failed: {}",
            self.process_id, self.error
        )
    }
}

impl StructuredLog for ProcessExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            process_id = self.process_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "process_failed",
            span_name = name,
            process_id = self.process_id,
            error = %self.error,
        )
    }
}

/// A coercion rule produced nothing and the original value was kept.
///
/// # Log Level
/// `debug!` - Expected during normal operation
pub struct CoercionFallback<'a> {
    pub data_type: &'a str,
    pub value_kind: &'a str,
}

impl Display for CoercionFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No '{}' conversion for {} value, keeping original",
            self.data_type, self.value_kind
        )
    }
}

impl StructuredLog for CoercionFallback<'_> {
    fn log(&self) {
        tracing::debug!(
            data_type = self.data_type,
            value_kind = self.value_kind,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "coercion_fallback",
            span_name = name,
            data_type = self.data_type,
            value_kind = self.value_kind,
        )
    }
}
