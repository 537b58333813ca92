//! Pareto front computation: the dominance kernel, per-node front storage,
//! the batch label-setting engine and the incremental propagator.
pub mod engine;
pub mod incremental;
pub mod kernel;
pub mod ledger;

pub use engine::{EngineConfig, EngineStats, ParetoEngine};
pub use incremental::{EvictionPolicy, IncrementalPropagator, PropagationConfig, PropagationStats};
pub use kernel::{dominates, is_non_dominated};
pub use ledger::{FrontTable, Label, ParetoFront};
