//! Human- and machine-readable output of a run.
pub mod report;

pub use report::{FrontSample, UpdateReport, WorkerReport};
