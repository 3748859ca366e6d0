// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for validation check outcomes.
//!
//! This module contains message types for logging events related to:
//! * Predicate pass/fail results under a `Continue` policy
//! * Ports that could not be resolved to a value
//! * Predicates that returned a non-boolean result

use crate::observability::messages::StructuredLog;
use crate::process::PortRef;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Validation predicate passed.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pipeweave::observability::messages::validation::ValidationPassed;
///
/// let msg = ValidationPassed {
///     process_id: "buffer",
///     message: "distance is positive",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ValidationPassed<'a> {
    pub process_id: &'a str,
    pub message: &'a str,
}

impl Display for ValidationPassed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Validation passed for '{}': {}", self.process_id, self.message)
    }
}

impl StructuredLog for ValidationPassed<'_> {
    fn log(&self) {
        tracing::info!(
            process_id = self.process_id,
            message = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "validation_passed",
            span_name = name,
            process_id = self.process_id,
        )
    }
}

/// Validation predicate failed.
///
/// # Log Level
/// `warn!` - Check failed under a `Continue` policy, run goes on
pub struct ValidationCheckFailed<'a> {
    pub process_id: &'a str,
    pub message: &'a str,
}

impl Display for ValidationCheckFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Validation failed for '{}': {}", self.process_id, self.message)
    }
}

impl StructuredLog for ValidationCheckFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            process_id = self.process_id,
            message = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "validation_failed",
            span_name = name,
            process_id = self.process_id,
        )
    }
}

/// A checked port had no value; `null` is passed to the predicate instead.
///
/// # Log Level
/// `warn!` - Likely misconfigured check
pub struct PortValueMissing<'a> {
    pub process_id: &'a str,
    pub port: &'a PortRef,
}

impl Display for PortValueMissing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validation for '{}' found no value for port '{}'",
            self.process_id, self.port
        )
    }
}

impl StructuredLog for PortValueMissing<'_> {
    fn log(&self) {
        tracing::warn!(
            process_id = self.process_id,
            port = %self.port,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "port_value_missing",
            span_name = name,
            process_id = self.process_id,
            port = %self.port,
        )
    }
}

pub struct NonBooleanPredicate<'a> {
    pub process_id: &'a str,
    pub found: &'a str,
}

impl Display for NonBooleanPredicate<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validation predicate for '{}' returned {} instead of a boolean",
            self.process_id, self.found
        )
    }
}

impl StructuredLog for NonBooleanPredicate<'_> {
    fn log(&self) {
        tracing::warn!(
            process_id = self.process_id,
            found = self.found,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "non_boolean_predicate",
            span_name = name,
            process_id = self.process_id,
        )
    }
}
