// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod pipeline;
mod process;
mod registry;
mod validation;

pub use config::ConfigError;
pub use pipeline::{FailureStrategy, PipelineError};
pub use process::ProcessError;
pub use registry::RegistryError;
pub use validation::ValidationError;
