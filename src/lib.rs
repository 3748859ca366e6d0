// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod coercion;      // data types + value coercion
pub mod config;        // YAML config + runtime assembly
pub mod engine;        // pipeline composition + wave execution
pub mod errors;        // error handling
pub mod observability;
pub mod process;       // typed-port processes
pub mod progress;      // hierarchical progress reporting
pub mod registry;      // process namespaces
pub mod traits;        // process bodies, predicates, coercion rules
pub mod validation;    // checks on port values
