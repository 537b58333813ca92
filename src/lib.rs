// Crate root: Pareto-optimal paths over multi-objective graphs, computed in batch
// and maintained incrementally across a set of partitioned workers.
//
// Layering, leaves first:
// store -> partition -> compute (kernel, ledger, engine, incremental) -> cluster -> display.

pub mod cluster;
pub mod compute;
pub mod config;
pub mod display;
pub mod error;
pub mod partition;
pub mod store;

// --- Re-exports ---
pub use cluster::{run_cluster, Coordinator, CoordinatorConfig, EdgeMutation};
pub use compute::{
    EvictionPolicy, FrontTable, IncrementalPropagator, Label, ParetoEngine, ParetoFront, PropagationConfig,
};
pub use config::RunConfig;
pub use error::{MospError, Result};
pub use partition::{BfsPartitioner, PartitionAssignment, Partitioner};
pub use store::{CostVector, GraphStore, NodeId};

/// Installs a `tracing` subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}
