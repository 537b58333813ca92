//! ledger.rs
//! Per-node Pareto fronts, stored densely by node index.

use super::kernel::{covers, dominates, lexicographic};
use crate::store::{add_costs, CostVector, Edge, NodeId};

/// The accumulated cost of one path, optionally with the nodes it traversed.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub cost: CostVector,
    pub path: Option<Vec<NodeId>>,
}

impl Label {
    pub fn new(cost: CostVector) -> Self {
        Self { cost, path: None }
    }

    pub fn with_path(cost: CostVector, path: Vec<NodeId>) -> Self {
        Self { cost, path: Some(path) }
    }

    /// The label reached by following `edge` from this label's node.
    pub fn extend(&self, edge: &Edge) -> Label {
        let cost = add_costs(&self.cost, &edge.cost);
        let path = self.path.as_ref().map(|p| {
            let mut next = Vec::with_capacity(p.len() + 1);
            next.extend_from_slice(p);
            next.push(edge.to);
            next
        });
        Label { cost, path }
    }
}

/// A set of labels at one node.
///
/// Fronts built through [`ParetoFront::insert`] are antichains: no member
/// dominates another and no cost vector appears twice. [`ParetoFront::insert_retaining`]
/// only guarantees the absence of duplicates and of covered insertions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParetoFront {
    labels: Vec<Label>,
}

impl ParetoFront {
    pub fn new() -> Self { Self::default() }

    pub fn labels(&self) -> &[Label] { &self.labels }
    pub fn len(&self) -> usize { self.labels.len() }
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    pub fn costs(&self) -> impl Iterator<Item = &CostVector> + '_ {
        self.labels.iter().map(|l| &l.cost)
    }

    /// Inserts `label` unless an existing member dominates or equals it, evicting
    /// every member the new label dominates.
    ///
    /// Returns `None` when the label was rejected, otherwise the number of evicted labels.
    pub fn insert(&mut self, label: Label) -> Option<usize> {
        if self.labels.iter().any(|l| covers(&l.cost, &label.cost)) {
            return None;
        }
        let before = self.labels.len();
        self.labels.retain(|l| !dominates(&label.cost, &l.cost));
        let evicted = before - self.labels.len();
        self.labels.push(label);
        Some(evicted)
    }

    /// What [`ParetoFront::insert`] would do with `cost`, without changing the front:
    /// `None` if a member covers it, otherwise the number of members it would evict.
    pub fn admission(&self, cost: &[f64]) -> Option<usize> {
        if self.labels.iter().any(|l| covers(&l.cost, cost)) {
            return None;
        }
        Some(self.labels.iter().filter(|l| dominates(cost, &l.cost)).count())
    }

    /// Inserts `label` unless an existing member dominates or equals it. Nothing is evicted.
    pub fn insert_retaining(&mut self, label: Label) -> bool {
        if self.labels.iter().any(|l| covers(&l.cost, &label.cost)) {
            return false;
        }
        self.labels.push(label);
        true
    }

    pub fn contains_cost(&self, cost: &[f64]) -> bool {
        self.labels.iter().any(|l| l.cost.as_slice() == cost)
    }

    /// True iff no member dominates or duplicates another.
    pub fn is_antichain(&self) -> bool {
        self.labels.iter().enumerate().all(|(i, a)| {
            self.labels[i + 1..].iter().all(|b| !covers(&a.cost, &b.cost) && !covers(&b.cost, &a.cost))
        })
    }

    /// The member costs in lexicographic order, for order-independent comparison.
    pub fn sorted_costs(&self) -> Vec<CostVector> {
        let mut costs: Vec<CostVector> = self.costs().cloned().collect();
        costs.sort_by(|a, b| lexicographic(a, b));
        costs
    }

    pub fn clear(&mut self) { self.labels.clear(); }
}

/// Array-indexed front storage, sized to the graph at construction.
#[derive(Debug, Clone, Default)]
pub struct FrontTable {
    fronts: Vec<ParetoFront>,
}

impl FrontTable {
    pub fn new(num_nodes: usize) -> Self {
        Self { fronts: vec![ParetoFront::new(); num_nodes] }
    }

    pub fn len(&self) -> usize { self.fronts.len() }
    pub fn is_empty(&self) -> bool { self.fronts.is_empty() }

    /// Grows the table to cover nodes added to the graph after construction.
    pub fn ensure_capacity(&mut self, size: usize) {
        if self.fronts.len() < size {
            self.fronts.resize(size, ParetoFront::new());
        }
    }

    #[inline(always)]
    pub fn get(&self, node: NodeId) -> Option<&ParetoFront> {
        self.fronts.get(node.index())
    }

    #[inline(always)]
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut ParetoFront> {
        self.fronts.get_mut(node.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ParetoFront)> + '_ {
        self.fronts.iter().enumerate().map(|(i, f)| (NodeId::new(i), f))
    }

    /// Copies the fronts of `nodes` into a new table of the same size; every other front is empty.
    pub fn filtered(&self, nodes: &[NodeId]) -> FrontTable {
        let mut out = FrontTable::new(self.fronts.len());
        for &node in nodes {
            if let (Some(src), Some(dst)) = (self.get(node), out.get_mut(node)) {
                *dst = src.clone();
            }
        }
        out
    }

    pub fn invalidate(&mut self, nodes: impl IntoIterator<Item = NodeId>) {
        for node in nodes {
            if let Some(front) = self.fronts.get_mut(node.index()) {
                front.clear();
            }
        }
    }

    pub fn total_labels(&self) -> usize {
        self.fronts.iter().map(ParetoFront::len).sum()
    }
}
