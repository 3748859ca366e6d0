// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while building or executing a single process.

use thiserror::Error;

/// Failures local to one process.
///
/// Execution failures never escape a pipeline run on their own; the composer
/// logs them and moves on unless it was configured to fail fast.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Supplied input names do not match the declared inputs.
    #[error("Process '{process_id}' expects inputs [{}] but received [{}]", .expected.join(", "), .supplied.join(", "))]
    ArityMismatch {
        process_id: String,
        expected: Vec<String>,
        supplied: Vec<String>,
    },

    /// The body returned an error.
    #[error("Process '{process_id}' body failed: {source}")]
    Execution {
        process_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The body returned something other than an object.
    #[error("Process '{process_id}' body returned {found} instead of an output map")]
    InvalidResultType {
        process_id: String,
        found: &'static str,
    },

    /// A declared output is absent from the body's result.
    #[error("Process '{process_id}' did not produce declared output '{port}'")]
    MissingOutput { process_id: String, port: String },

    /// The body takes a different number of arguments than there are inputs.
    #[error("Process '{process_id}' declares {declared} inputs but its body takes {body} arguments")]
    BodyArityMismatch {
        process_id: String,
        declared: usize,
        body: usize,
    },

    /// The same port name was declared twice on one side.
    #[error("Process '{process_id}' declares {direction} port '{port}' more than once")]
    DuplicatePort {
        process_id: String,
        direction: &'static str,
        port: String,
    },

    #[error("Process identifier must not be empty")]
    InvalidIdentifier,

    #[error("Process '{process_id}' has no body")]
    MissingBody { process_id: String },
}

impl ProcessError {
    /// Identifier of the process the error belongs to, if any.
    pub fn process_id(&self) -> Option<&str> {
        match self {
            ProcessError::ArityMismatch { process_id, .. }
            | ProcessError::Execution { process_id, .. }
            | ProcessError::InvalidResultType { process_id, .. }
            | ProcessError::MissingOutput { process_id, .. }
            | ProcessError::BodyArityMismatch { process_id, .. }
            | ProcessError::DuplicatePort { process_id, .. }
            | ProcessError::MissingBody { process_id } => Some(process_id),
            ProcessError::InvalidIdentifier => None,
        }
    }
}
