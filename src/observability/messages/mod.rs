// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `engine` - pipeline build, scheduling and wave execution events
//! * `process` - process execution and coercion events
//! * `registry` - namespace and registration events
//! * `validation` - validation check outcomes
//!
//! # Usage Pattern
//!
//! ```rust
//! use pipeweave::observability::messages::engine::ExecutionStarted;
//! use pipeweave::observability::messages::StructuredLog;
//!
//! let msg = ExecutionStarted {
//!     pipeline_id: "ingest",
//!     process_count: 5,
//!     wave_count: 3,
//!     max_concurrency: 4,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod engine;
pub mod process;
pub mod registry;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a `tracing` event at its designated level.
    fn log(&self);

    /// Open a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
