//! Node-to-worker assignment.
//!
//! The core only relies on the [`Partitioner`] contract: a total mapping of every
//! node to an owner in `[0, k)`. Cut quality and balance are the implementation's
//! business.
mod bfs;

pub use bfs::{BfsPartitioner, RoundRobinPartitioner};

use crate::error::{MospError, Result};
use crate::store::{GraphStore, NodeId};

pub trait Partitioner: Send + Sync {
    fn partition(&self, graph: &GraphStore, num_parts: u32) -> Result<PartitionAssignment>;
}

/// Owner id per node. Validated on construction and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionAssignment {
    parts: Vec<u32>,
    num_parts: u32,
}

impl PartitionAssignment {
    pub fn new(parts: Vec<u32>, num_parts: u32) -> Result<Self> {
        if num_parts == 0 {
            return Err(MospError::PartitionFailure("part count must be positive".into()));
        }
        if let Some((node, &owner)) = parts.iter().enumerate().find(|&(_, &p)| p >= num_parts) {
            return Err(MospError::PartitionFailure(format!(
                "node {} assigned to part {} outside 0..{}", node, owner, num_parts
            )));
        }
        Ok(Self { parts, num_parts })
    }

    pub fn len(&self) -> usize { self.parts.len() }
    pub fn is_empty(&self) -> bool { self.parts.is_empty() }
    pub fn num_parts(&self) -> u32 { self.num_parts }
    pub fn as_slice(&self) -> &[u32] { &self.parts }
    pub fn into_vec(self) -> Vec<u32> { self.parts }

    pub fn owner(&self, node: NodeId) -> Option<u32> {
        self.parts.get(node.index()).copied()
    }

    pub fn owned_by(&self, worker: u32) -> Vec<NodeId> {
        self.parts
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p == worker)
            .map(|(i, _)| NodeId::new(i))
            .collect()
    }

    pub fn part_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_parts as usize];
        for &p in &self.parts {
            sizes[p as usize] += 1;
        }
        sizes
    }
}

fn check_request(graph: &GraphStore, num_parts: u32) -> Result<()> {
    if num_parts == 0 {
        return Err(MospError::PartitionFailure("part count must be positive".into()));
    }
    if graph.is_empty() {
        return Err(MospError::PartitionFailure("cannot partition an empty graph".into()));
    }
    Ok(())
}
