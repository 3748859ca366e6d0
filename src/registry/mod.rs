// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Namespaced storage and lookup of processes.
//!
//! A [`ProcessFactory`] is one namespace (identifier → process). A
//! [`ProcessManager`] owns the namespaces and creates missing ones on lookup.
//! Neither is global: the manager is owned by the application's
//! [`Runtime`](crate::config::Runtime).

mod factory;
mod manager;

pub use factory::ProcessFactory;
pub use manager::ProcessManager;
