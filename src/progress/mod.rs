// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Hierarchical progress tracking.
//!
//! A [`ProgressMonitor`] counts completed steps out of a fixed total. A child
//! created with [`ProgressMonitor::sub_progress`] stands for one whole step of
//! its parent and reports its own fraction into it, so nested work can be
//! tracked without the parent knowing its shape.
//!
//! Counters are atomic and children only ever get read by their parent,
//! never written, so sibling monitors can be driven from different tasks.
//!
//! ```
//! use pipeweave::progress::ProgressMonitor;
//!
//! let root = ProgressMonitor::create("import", 7);
//! root.increment_step();
//! let child = root.sub_progress("reproject", 4);
//! for _ in 0..4 {
//!     child.increment_step();
//! }
//! assert!((root.progress() - 200.0 / 7.0).abs() < 1e-9);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct ProgressMonitor {
    name: String,
    total_steps: usize,
    completed: AtomicUsize,
    children: Mutex<Vec<Arc<ProgressMonitor>>>,
}

impl ProgressMonitor {
    /// Root monitor with nothing completed.
    pub fn create(name: impl Into<String>, total_steps: usize) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            total_steps,
            completed: AtomicUsize::new(0),
            children: Mutex::new(Vec::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn completed_steps(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Mark one more step done. No-op once all steps are complete.
    pub fn increment_step(&self) {
        let total = self.total_steps;
        let _ = self
            .completed
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |done| {
                (done < total).then_some(done + 1)
            });
    }

    /// Child monitor worth one full step of this monitor.
    ///
    /// Every child gets its own whole step; siblings do not split one.
    pub fn sub_progress(&self, name: impl Into<String>, total_steps: usize) -> Arc<ProgressMonitor> {
        let child = ProgressMonitor::create(name, total_steps);
        self.children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(child.clone());
        child
    }

    pub fn children(&self) -> Vec<Arc<ProgressMonitor>> {
        self.children
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Overall completion in percent, `0.0..=100.0`.
    ///
    /// `100 × (completed + Σ child fraction) / total`, saturating at 100.
    /// A monitor with zero total steps is complete.
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return 100.0;
        }

        let children: f64 = self
            .children()
            .iter()
            .map(|child| child.progress() / 100.0)
            .sum();
        let done = self.completed_steps() as f64 + children;

        (100.0 * done / self.total_steps as f64).min(100.0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 100.0
    }
}

impl std::fmt::Debug for ProgressMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressMonitor")
            .field("name", &self.name)
            .field("total_steps", &self.total_steps)
            .field("completed", &self.completed_steps())
            .field("children", &self.children().len())
            .finish()
    }
}
