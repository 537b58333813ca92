use serde::{Serialize, Deserialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self {
        debug_assert!(idx <= u32::MAX as usize, "node index {} does not fit in u32", idx);
        Self(idx as u32)
    }
}

/// A cost vector with one entry per objective.
///
/// **Optimization:** up to four objectives are stored inline, so the common
/// bi- and tri-objective cases never allocate per label.
pub type CostVector = SmallVec<[f64; 4]>;

/// Returns the all-zero cost vector for `m` objectives.
pub fn zero_cost(m: usize) -> CostVector {
    SmallVec::from_elem(0.0, m)
}

/// Returns the all-one cost vector used by the text loaders.
pub fn unit_cost(m: usize) -> CostVector {
    SmallVec::from_elem(1.0, m)
}

/// Component-wise sum of two cost vectors of equal length.
#[inline]
pub fn add_costs(a: &[f64], b: &[f64]) -> CostVector {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// A directed edge, stored in the adjacency list of its source node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub to: NodeId,
    pub cost: CostVector,
}
