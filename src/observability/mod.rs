// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output of the crate goes through message types defined in
//! [`messages`]. Each message is a small struct implementing `Display` plus
//! [`messages::StructuredLog`], so call sites never carry format strings and
//! every event carries the same structured fields (process id, port, wave).
//!
//! # Usage
//!
//! ```rust
//! use pipeweave::observability::messages::process::ProcessExecutionFailed;
//! use pipeweave::observability::messages::StructuredLog;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! ProcessExecutionFailed {
//!     process_id: "concat",
//!     error: &error,
//! }
//! .log();
//! ```
//!
//! Installing a subscriber is left to the application; see [`init_tracing`].

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
