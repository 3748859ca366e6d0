// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Raised by a validation check whose triggered policy is `Stop`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Predicate failed and the fail policy is `Stop`.
    #[error("Validation failed for '{process_id}': {message}")]
    Failed { process_id: String, message: String },

    /// Predicate passed and the success policy is `Stop`.
    #[error("Validation stopped the run at '{process_id}': {message}")]
    Stopped { process_id: String, message: String },
}
