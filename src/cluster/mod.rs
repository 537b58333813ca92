//! Worker orchestration: the partition broadcast, per-worker coordinators and an
//! in-process runner that plays the distributed tier with one thread per worker.
pub mod broadcast;
pub mod coordinator;
mod run;

pub use broadcast::{Broadcast, ChannelBroadcast, ROOT_WORKER};
pub use coordinator::{Coordinator, CoordinatorConfig, EdgeMutation};
pub use run::run_cluster;
