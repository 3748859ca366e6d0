// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for process registry events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

pub struct ProcessRegistered<'a> {
    pub factory_id: &'a str,
    pub process_id: &'a str,
}

impl Display for ProcessRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered process '{}' in factory '{}'",
            self.process_id, self.factory_id
        )
    }
}

impl StructuredLog for ProcessRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            factory_id = self.factory_id,
            process_id = self.process_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "process_registered",
            span_name = name,
            factory_id = self.factory_id,
            process_id = self.process_id,
        )
    }
}

/// Registration ignored because the factory is locked.
///
/// # Log Level
/// `warn!` - The process is not available in this namespace
pub struct RegistrationRejected<'a> {
    pub factory_id: &'a str,
    pub process_id: &'a str,
}

impl Display for RegistrationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Factory '{}' is locked, process '{}' not registered",
            self.factory_id, self.process_id
        )
    }
}

impl StructuredLog for RegistrationRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            factory_id = self.factory_id,
            process_id = self.process_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "registration_rejected",
            span_name = name,
            factory_id = self.factory_id,
            process_id = self.process_id,
        )
    }
}

pub struct NamespaceCreated<'a> {
    pub factory_id: &'a str,
}

impl Display for NamespaceCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Created process namespace '{}'", self.factory_id)
    }
}

impl StructuredLog for NamespaceCreated<'_> {
    fn log(&self) {
        tracing::debug!(factory_id = self.factory_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "namespace_created",
            span_name = name,
            factory_id = self.factory_id,
        )
    }
}
