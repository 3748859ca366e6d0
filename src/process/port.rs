// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to one port of one process: `(process id, port name)`.
///
/// Used for link endpoints, pipeline-level inputs/outputs and validation
/// check arguments. Whether it names an input or an output depends on where
/// it is used.
///
/// ```
/// use pipeweave::process::PortRef;
///
/// let port = PortRef::new("concat", "sum");
/// assert_eq!(port.process_id(), "concat");
/// assert_eq!(port.to_string(), "concat:sum");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortRef {
    process_id: String,
    port: String,
}

impl PortRef {
    pub fn new(process_id: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            process_id: process_id.into(),
            port: port.into(),
        }
    }

    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.process_id, self.port)
    }
}

impl<P: Into<String>, N: Into<String>> From<(P, N)> for PortRef {
    fn from((process_id, port): (P, N)) -> Self {
        Self::new(process_id, port)
    }
}
