// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::process::PortRef;

/// Directed edge from one process's output to another process's input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub source: PortRef,
    pub target: PortRef,
}

impl Link {
    pub fn new(source: impl Into<PortRef>, target: impl Into<PortRef>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
