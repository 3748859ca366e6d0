// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for pipeline composition and execution.

use serde::Deserialize;
use thiserror::Error;

use crate::errors::{ProcessError, ValidationError};
use crate::process::PortRef;

/// How the composer reacts when a process inside a wave fails.
///
/// # Variants
/// * `ContinueOnError` - log the failure and keep running later waves with
///   whatever values are available (default)
/// * `FailFast` - finish the current wave, then abort the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    #[default]
    ContinueOnError,
    FailFast,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Pipeline '{pipeline_id}' has no links")]
    EmptyPipeline { pipeline_id: String },

    #[error("Link references unknown process '{process_id}'")]
    UnknownProcess { process_id: String },

    /// A link endpoint names a port the process does not declare on that side.
    #[error("Link references unknown {direction} port '{port}'")]
    UnknownPort {
        port: PortRef,
        direction: &'static str,
    },

    #[error("Input '{target}' is targeted by more than one link")]
    DuplicateLinkTarget { target: PortRef },

    #[error("Pipeline '{pipeline_id}' expects {expected} inputs but received {supplied}")]
    InputCountMismatch {
        pipeline_id: String,
        expected: usize,
        supplied: usize,
    },

    #[error("Pipeline '{pipeline_id}' aborted: {source}")]
    ProcessFailed {
        pipeline_id: String,
        #[source]
        source: ProcessError,
    },

    #[error("Pipeline '{pipeline_id}' cancelled after {completed_waves} waves")]
    Cancelled {
        pipeline_id: String,
        completed_waves: usize,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
