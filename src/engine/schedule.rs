// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wave scheduling.
//!
//! Kahn-style levelling over ports rather than over whole processes: a
//! process becomes ready once every one of its declared inputs is available,
//! either as a pipeline input or as the target of a link whose source
//! process ran in an earlier wave.
//!
//! ```text
//!   available = pipeline inputs
//!   loop:
//!     wave = remaining processes whose inputs are all available
//!     wave empty and processes remain -> those are unschedulable, stop
//!     available += link targets fed by the wave's outputs
//! ```
//!
//! Processes that never become ready (cycles, inputs fed only by other
//! unschedulable processes) are reported instead of failing the build.

use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::process::{PortRef, Process};

/// A process left out of the schedule, with the inputs that never became
/// available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnschedulableProcess {
    pub process_id: String,
    pub missing_inputs: Vec<String>,
}

/// Ordered waves of process ids plus the processes that could not be placed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    waves: Vec<Vec<String>>,
    unschedulable: Vec<UnschedulableProcess>,
}

impl Schedule {
    /// Compute the waves for `processes`.
    ///
    /// * `outgoing` - link source → link targets
    /// * `pipeline_inputs` - inputs exposed by the pipeline itself
    ///
    /// Within a wave, processes keep the order of `processes`.
    pub fn compute(
        processes: &IndexMap<String, Arc<Process>>,
        outgoing: &HashMap<PortRef, Vec<PortRef>>,
        pipeline_inputs: impl IntoIterator<Item = PortRef>,
    ) -> Self {
        let mut available: HashSet<PortRef> = pipeline_inputs.into_iter().collect();
        let mut remaining: Vec<&Arc<Process>> = processes.values().collect();
        let mut waves = Vec::new();

        while !remaining.is_empty() {
            let (wave, blocked): (Vec<&Arc<Process>>, Vec<&Arc<Process>>) =
                remaining.into_iter().partition(|process| {
                    process
                        .inputs()
                        .keys()
                        .all(|name| available.contains(&process.port(name.as_str())))
                });
            remaining = blocked;

            if wave.is_empty() {
                break;
            }

            // Staged separately so a process never unlocks a sibling in its own wave.
            let staged: Vec<PortRef> = wave
                .iter()
                .flat_map(|process| {
                    process
                        .outputs()
                        .keys()
                        .filter_map(|name| outgoing.get(&process.port(name.as_str())))
                        .flatten()
                        .cloned()
                        .collect::<Vec<_>>()
                })
                .collect();
            available.extend(staged);

            waves.push(wave.iter().map(|p| p.id().to_string()).collect());
        }

        let unschedulable = remaining
            .into_iter()
            .map(|process| UnschedulableProcess {
                process_id: process.id().to_string(),
                missing_inputs: process
                    .inputs()
                    .keys()
                    .filter(|name| !available.contains(&process.port(name.as_str())))
                    .cloned()
                    .collect(),
            })
            .collect();

        Self {
            waves,
            unschedulable,
        }
    }

    pub fn waves(&self) -> &[Vec<String>] {
        &self.waves
    }

    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Number of processes that will actually run.
    pub fn scheduled_count(&self) -> usize {
        self.waves.iter().map(Vec::len).sum()
    }

    pub fn unschedulable(&self) -> &[UnschedulableProcess] {
        &self.unschedulable
    }

    /// Index of the wave containing `process_id`.
    pub fn wave_of(&self, process_id: &str) -> Option<usize> {
        self.waves
            .iter()
            .position(|wave| wave.iter().any(|id| id == process_id))
    }

    pub fn is_scheduled(&self, process_id: &str) -> bool {
        self.wave_of(process_id).is_some()
    }
}
