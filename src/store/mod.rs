//! Graph storage: node ids, cost vectors, the indexed adjacency store and its text loaders.
pub mod ingest;
pub mod registry;
pub mod types;

pub use registry::GraphStore;
pub use types::{add_costs, unit_cost, zero_cost, CostVector, Edge, NodeId};
