use super::types::*;
use crate::error::{MospError, Result};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Adjacency-list graph with multi-objective edge costs.
///
/// Every edge is reachable in O(1) through `edge_index`, which maps
/// `(from, to)` to the edge's position in `adjacency[from]`. The index is
/// kept consistent with the adjacency lists by every mutating call; a call
/// that fails leaves the graph untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStore {
    adjacency: Vec<Vec<Edge>>,
    num_objectives: usize,
    edge_count: usize,

    // Ephemeral lookup state (Not serialized, rebuilt on load)
    #[serde(skip)]
    edge_index: Vec<HashMap<NodeId, usize>>,
}

impl GraphStore {
    /// Creates a graph with `num_nodes` isolated nodes and `num_objectives` costs per edge.
    pub fn new(num_nodes: usize, num_objectives: usize) -> Result<Self> {
        if num_objectives == 0 {
            return Err(MospError::InvalidWeightDimension { expected: 1, actual: 0 });
        }
        Ok(Self {
            adjacency: vec![Vec::new(); num_nodes],
            num_objectives,
            edge_count: 0,
            edge_index: vec![HashMap::new(); num_nodes],
        })
    }

    pub fn num_nodes(&self) -> usize { self.adjacency.len() }
    pub fn num_edges(&self) -> usize { self.edge_count }
    pub fn num_objectives(&self) -> usize { self.num_objectives }
    pub fn is_empty(&self) -> bool { self.adjacency.is_empty() }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.adjacency.len()).map(NodeId::new)
    }

    #[inline]
    pub fn check_node(&self, node: NodeId) -> Result<()> {
        if node.index() < self.adjacency.len() {
            Ok(())
        } else {
            Err(MospError::OutOfRange { node, count: self.adjacency.len() })
        }
    }

    fn check_cost(&self, cost: &[f64]) -> Result<()> {
        if cost.len() != self.num_objectives {
            return Err(MospError::InvalidWeightDimension {
                expected: self.num_objectives,
                actual: cost.len(),
            });
        }
        if let Some(bad) = cost.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(MospError::InvalidWeight(format!(
                "edge costs must be finite and non-negative, got {}", bad
            )));
        }
        Ok(())
    }

    /// Appends the edge `from -> to` and indexes it.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, cost: CostVector) -> Result<()> {
        self.check_node(from)?;
        self.check_node(to)?;
        self.check_cost(&cost)?;
        let index = &mut self.edge_index[from.index()];
        if index.contains_key(&to) {
            return Err(MospError::DuplicateEdge { from, to });
        }

        let edges = &mut self.adjacency[from.index()];
        index.insert(to, edges.len());
        edges.push(Edge { to, cost });
        self.edge_count += 1;
        Ok(())
    }

    /// Removes the edge `from -> to`, returning its cost.
    ///
    /// Order of the remaining edges is preserved, so every edge after the removed
    /// slot shifts down by one and is re-indexed: O(degree(from)).
    pub fn remove_edge(&mut self, from: NodeId, to: NodeId) -> Result<CostVector> {
        self.check_node(from)?;
        let idx = self.edge_index[from.index()]
            .remove(&to)
            .ok_or(MospError::NotFound { from, to })?;

        let edges = &mut self.adjacency[from.index()];
        let removed = edges.remove(idx);
        let index = &mut self.edge_index[from.index()];
        for (pos, edge) in edges.iter().enumerate().skip(idx) {
            index.insert(edge.to, pos);
        }
        self.edge_count -= 1;
        Ok(removed.cost)
    }

    /// Replaces the cost of `from -> to`, returning the previous cost.
    pub fn update_edge_weight(&mut self, from: NodeId, to: NodeId, cost: CostVector) -> Result<CostVector> {
        self.check_node(from)?;
        let idx = *self.edge_index[from.index()]
            .get(&to)
            .ok_or(MospError::NotFound { from, to })?;
        self.check_cost(&cost)?;
        Ok(std::mem::replace(&mut self.adjacency[from.index()][idx].cost, cost))
    }

    pub fn neighbors(&self, node: NodeId) -> Result<&[Edge]> {
        self.check_node(node)?;
        Ok(&self.adjacency[node.index()])
    }

    /// Unchecked neighbour access for hot loops whose node ids came from this graph.
    #[inline(always)]
    pub(crate) fn edges_of(&self, node: NodeId) -> &[Edge] {
        &self.adjacency[node.index()]
    }

    pub fn edge_cost(&self, from: NodeId, to: NodeId) -> Option<&CostVector> {
        let idx = *self.edge_index.get(from.index())?.get(&to)?;
        Some(&self.adjacency[from.index()][idx].cost)
    }

    pub fn contains_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.edge_cost(from, to).is_some()
    }

    /// Grows or shrinks the node set. Shrinking drops every edge that touches a removed node.
    pub fn resize(&mut self, num_nodes: usize) {
        self.adjacency.resize(num_nodes, Vec::new());
        for edges in &mut self.adjacency {
            edges.retain(|e| e.to.index() < num_nodes);
        }
        // Positions shift after `retain`, so the whole index is rebuilt.
        self.rebuild_edge_index();
    }

    /// Rebuilds `edge_index` and `edge_count` from the adjacency lists.
    pub fn rebuild_edge_index(&mut self) {
        self.edge_index = self.adjacency
            .iter()
            .map(|edges| edges.iter().enumerate().map(|(pos, e)| (e.to, pos)).collect())
            .collect();
        self.edge_count = self.adjacency.iter().map(Vec::len).sum();
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores a snapshot written by [`GraphStore::to_json`], validating every edge.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut graph: GraphStore = serde_json::from_str(json)?;
        if graph.num_objectives == 0 {
            return Err(MospError::InvalidWeightDimension { expected: 1, actual: 0 });
        }
        graph.rebuild_edge_index();
        for (from, edges) in graph.adjacency.iter().enumerate() {
            let from = NodeId::new(from);
            for (pos, edge) in edges.iter().enumerate() {
                graph.check_node(edge.to)?;
                graph.check_cost(&edge.cost)?;
                // A later duplicate overwrites the index slot of an earlier one.
                if graph.edge_index[from.index()][&edge.to] != pos {
                    return Err(MospError::DuplicateEdge { from, to: edge.to });
                }
            }
        }
        Ok(graph)
    }

    #[cfg(test)]
    pub(crate) fn assert_index_consistent(&self) {
        let mut total = 0;
        for (from, edges) in self.adjacency.iter().enumerate() {
            assert_eq!(self.edge_index[from].len(), edges.len(), "index size at node {}", from);
            for (pos, edge) in edges.iter().enumerate() {
                assert_eq!(self.edge_index[from][&edge.to], pos, "index slot of {} -> {:?}", from, edge.to);
            }
            total += edges.len();
        }
        assert_eq!(total, self.edge_count);
    }
}
