//! Per-worker orchestration.
//!
//! A coordinator owns a full local copy of the graph and a full front table, but
//! only reports the fronts of the nodes its partition assigns to it. Incremental
//! updates run over the whole local table; nothing they change is sent to other
//! workers, so fronts of nodes owned elsewhere go stale there.

use super::broadcast::{Broadcast, ROOT_WORKER};
use crate::compute::{
    EngineConfig, FrontTable, IncrementalPropagator, ParetoEngine, ParetoFront, PropagationConfig,
    PropagationStats,
};
use crate::display::{UpdateReport, WorkerReport};
use crate::error::{MospError, Result};
use crate::partition::{PartitionAssignment, Partitioner};
use crate::store::{CostVector, GraphStore, NodeId};
use std::time::{Duration, Instant};

/// A local edge change.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeMutation {
    Insert { from: NodeId, to: NodeId, cost: CostVector },
    Update { from: NodeId, to: NodeId, cost: CostVector },
    Remove { from: NodeId, to: NodeId },
}

impl EdgeMutation {
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        match self {
            EdgeMutation::Insert { from, to, .. }
            | EdgeMutation::Update { from, to, .. }
            | EdgeMutation::Remove { from, to } => (*from, *to),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub engine: EngineConfig,
    pub propagation: PropagationConfig,
}

pub struct Coordinator {
    worker: u32,
    num_workers: u32,
    graph: GraphStore,
    config: CoordinatorConfig,
    assignment: Option<PartitionAssignment>,
    owned: Vec<NodeId>,
    fronts: FrontTable,
    source: Option<NodeId>,
    elapsed: Duration,
    updates: Vec<UpdateReport>,
}

impl Coordinator {
    pub fn new(worker: u32, num_workers: u32, graph: GraphStore, config: CoordinatorConfig) -> Result<Self> {
        if num_workers == 0 || worker >= num_workers {
            return Err(MospError::Config(format!(
                "worker {} is not a member of a group of {}", worker, num_workers
            )));
        }
        let fronts = FrontTable::new(graph.num_nodes());
        Ok(Self {
            worker,
            num_workers,
            graph,
            config,
            assignment: None,
            owned: Vec::new(),
            fronts,
            source: None,
            elapsed: Duration::ZERO,
            updates: Vec::new(),
        })
    }

    pub fn worker(&self) -> u32 { self.worker }
    pub fn is_elected(&self) -> bool { self.worker == ROOT_WORKER }
    pub fn graph(&self) -> &GraphStore { &self.graph }
    pub fn owned(&self) -> &[NodeId] { &self.owned }
    pub fn assignment(&self) -> Option<&PartitionAssignment> { self.assignment.as_ref() }
    pub fn elapsed(&self) -> Duration { self.elapsed }

    /// The full local working table, including nodes owned by other workers.
    pub fn fronts(&self) -> &FrontTable { &self.fronts }

    pub fn front(&self, node: NodeId) -> Option<&ParetoFront> { self.fronts.get(node) }

    /// The fronts of owned nodes only; every other entry is empty.
    pub fn owned_fronts(&self) -> FrontTable { self.fronts.filtered(&self.owned) }

    pub fn owns(&self, node: NodeId) -> bool {
        self.assignment.as_ref().and_then(|a| a.owner(node)) == Some(self.worker)
    }

    /// Obtains the partition table: the elected worker computes and publishes it,
    /// every worker (the elected one included) then blocks until it is delivered.
    pub fn bootstrap(&mut self, partitioner: &dyn Partitioner, transport: &dyn Broadcast) -> Result<()> {
        if self.is_elected() {
            let assignment = partitioner.partition(&self.graph, self.num_workers)?;
            tracing::info!(
                worker = self.worker,
                nodes = self.graph.num_nodes(),
                edges = self.graph.num_edges(),
                parts = self.num_workers,
                "partitioned graph"
            );
            transport.publish(assignment.as_slice())?;
        }

        let table = transport.receive()?;
        if table.len() != self.graph.num_nodes() {
            return Err(MospError::PartitionFailure(format!(
                "received table for {} nodes, local graph has {}", table.len(), self.graph.num_nodes()
            )));
        }
        let assignment = PartitionAssignment::new(table.to_vec(), self.num_workers)?;
        self.owned = assignment.owned_by(self.worker);
        self.assignment = Some(assignment);
        tracing::info!(worker = self.worker, owned = self.owned.len(), "received partition table");
        Ok(())
    }

    /// Batch computation from `source`. The search covers the whole local graph.
    pub fn run_initial(&mut self, source: NodeId) -> Result<Duration> {
        let start = Instant::now();
        self.fronts = ParetoEngine::new(&self.graph)
            .with_config(self.config.engine)
            .compute_all(source)?;
        self.elapsed = start.elapsed();
        self.source = Some(source);
        tracing::info!(
            worker = self.worker,
            source = source.0,
            elapsed_ms = self.elapsed.as_secs_f64() * 1e3,
            "initial Pareto computation finished"
        );
        Ok(self.elapsed)
    }

    /// Full batch recomputation from the stored source, discarding incremental drift.
    pub fn recompute(&mut self) -> Result<Duration> {
        let source = self.source.ok_or_else(|| MospError::Config("recompute requested before run_initial".into()))?;
        self.run_initial(source)
    }

    /// Applies `mutation` to the local graph and, when the edge's source node is
    /// owned and fronts exist, propagates its effects.
    ///
    /// Returns the propagation statistics, or `None` when nothing was propagated.
    /// Removals never propagate: fronts are not shrunk incrementally.
    pub fn apply_mutation(&mut self, mutation: EdgeMutation) -> Result<Option<PropagationStats>> {
        let (from, to) = mutation.endpoints();
        let propagates = match mutation {
            EdgeMutation::Insert { cost, .. } => {
                self.graph.add_edge(from, to, cost)?;
                true
            }
            EdgeMutation::Update { cost, .. } => {
                self.graph.update_edge_weight(from, to, cost)?;
                true
            }
            EdgeMutation::Remove { .. } => {
                self.graph.remove_edge(from, to)?;
                tracing::debug!(worker = self.worker, from = from.0, to = to.0, "edge removed; fronts left as they are");
                false
            }
        };

        let stats = if !propagates || self.source.is_none() {
            None
        } else if !self.owns(from) {
            tracing::debug!(worker = self.worker, from = from.0, "mutation at a node owned elsewhere; not propagated");
            None
        } else {
            let stats = IncrementalPropagator::new(&self.graph, self.config.propagation)
                .propagate(&mut self.fronts, &[from])?;
            if stats.inserted > 0 && self.num_workers > 1 {
                tracing::warn!(
                    worker = self.worker,
                    inserted = stats.inserted,
                    "incremental changes are not exchanged with other workers"
                );
            }
            Some(stats)
        };

        self.updates.push(UpdateReport::new(from, to, stats, &self.fronts));
        Ok(stats)
    }

    pub fn report(&self, sample_size: usize) -> WorkerReport {
        let mut report = WorkerReport::new(self.worker, &self.owned, &self.fronts, sample_size, self.elapsed);
        report.updates = self.updates.clone();
        report
    }
}
