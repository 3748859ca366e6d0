// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A second factory flagged as default was offered to the manager.
    #[error("Factory '{rejected}' cannot be the default: '{existing}' already is")]
    DuplicateDefault { existing: String, rejected: String },
}
