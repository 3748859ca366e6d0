pub mod executor;
pub mod link;
pub mod pipeline;
pub mod schedule;

pub use executor::{ExecutionOptions, RunControl, RunSummary, WaveExecutor};
pub use link::Link;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use schedule::{Schedule, UnschedulableProcess};
