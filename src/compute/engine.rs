//! Batch multi-objective label-setting search (a Pareto generalisation of Dijkstra).
use super::kernel::lexicographic;
use super::ledger::{FrontTable, Label};
use crate::error::Result;
use crate::store::{zero_cost, GraphStore, NodeId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Record the traversed node sequence on every label.
    pub track_paths: bool,
}

/// Counters from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub labels_pushed: usize,
    pub labels_expanded: usize,
    pub stale_skipped: usize,
}

/// A frontier entry. The heap pops the lexicographically smallest cost first,
/// ties broken by node id.
///
/// This order only decides which label is expanded next. With more than one
/// objective no scalar order can guarantee that a popped label is final, so the
/// result is determined by the dominance pruning alone.
struct Frontier {
    label: Label,
    node: NodeId,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        lexicographic(&other.label.cost, &self.label.cost).then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Frontier {}

pub struct ParetoEngine<'a> {
    graph: &'a GraphStore,
    config: EngineConfig,
}

impl<'a> ParetoEngine<'a> {
    pub fn new(graph: &'a GraphStore) -> Self {
        Self { graph, config: EngineConfig::default() }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Computes the fronts of `filter` nodes (all nodes when `None`).
    ///
    /// The search always covers everything reachable from `source`; the filter
    /// only decides which fronts are copied into the result.
    pub fn compute(&self, source: NodeId, filter: Option<&[NodeId]>) -> Result<FrontTable> {
        let all = self.compute_all(source)?;
        Ok(match filter {
            Some(nodes) => all.filtered(nodes),
            None => all,
        })
    }

    pub fn compute_all(&self, source: NodeId) -> Result<FrontTable> {
        self.compute_with_stats(source).map(|(table, _)| table)
    }

    pub fn compute_with_stats(&self, source: NodeId) -> Result<(FrontTable, EngineStats)> {
        self.graph.check_node(source)?;
        let mut fronts = FrontTable::new(self.graph.num_nodes());
        let mut stats = EngineStats::default();
        let mut heap = BinaryHeap::new();

        // 1. Seed the source with the zero vector
        let zero = zero_cost(self.graph.num_objectives());
        let start = if self.config.track_paths {
            Label::with_path(zero, vec![source])
        } else {
            Label::new(zero)
        };
        if let Some(front) = fronts.get_mut(source) {
            front.insert(start.clone());
        }
        heap.push(Frontier { label: start, node: source });
        stats.labels_pushed += 1;

        // 2. Expand until the frontier is empty
        while let Some(Frontier { label, node: u }) = heap.pop() {
            // A label evicted after it was pushed is dominated by one that is (or was)
            // expanded itself, so its extensions could never survive.
            let live = fronts.get(u).map_or(false, |f| f.contains_cost(&label.cost));
            if !live {
                stats.stale_skipped += 1;
                continue;
            }
            stats.labels_expanded += 1;

            for edge in self.graph.edges_of(u) {
                let candidate = label.extend(edge);
                let Some(front) = fronts.get_mut(edge.to) else { continue };
                if front.insert(candidate.clone()).is_some() {
                    heap.push(Frontier { label: candidate, node: edge.to });
                    stats.labels_pushed += 1;
                }
            }
        }

        tracing::debug!(
            source = source.0,
            pushed = stats.labels_pushed,
            expanded = stats.labels_expanded,
            stale = stats.stale_skipped,
            labels = fronts.total_labels(),
            "batch Pareto search finished"
        );
        Ok((fronts, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MospError;
    use crate::store::CostVector;
    use smallvec::smallvec;

    fn n(i: u32) -> NodeId { NodeId(i) }

    fn cv(c: &[f64]) -> CostVector { CostVector::from_slice(c) }

    fn diamond() -> GraphStore {
        let mut g = GraphStore::new(4, 2).unwrap();
        g.add_edge(n(0), n(1), smallvec![1.0, 5.0]).unwrap();
        g.add_edge(n(0), n(2), smallvec![5.0, 1.0]).unwrap();
        g.add_edge(n(1), n(3), smallvec![1.0, 1.0]).unwrap();
        g.add_edge(n(2), n(3), smallvec![1.0, 1.0]).unwrap();
        g
    }

    /// A layered graph with many incomparable paths and a few cycles.
    fn lattice() -> GraphStore {
        let mut g = GraphStore::new(12, 2).unwrap();
        let edges = [
            (0, 1, [1.0, 4.0]), (0, 2, [4.0, 1.0]), (0, 3, [2.0, 2.0]),
            (1, 4, [1.0, 3.0]), (1, 5, [3.0, 1.0]), (2, 4, [2.0, 2.0]),
            (2, 5, [1.0, 1.0]), (3, 4, [2.0, 1.0]), (3, 6, [1.0, 2.0]),
            (4, 7, [1.0, 1.0]), (5, 7, [2.0, 3.0]), (6, 7, [3.0, 1.0]),
            (7, 8, [1.0, 2.0]), (7, 9, [2.0, 1.0]), (8, 10, [1.0, 1.0]),
            (9, 10, [1.0, 1.0]), (10, 0, [1.0, 1.0]), (5, 1, [1.0, 1.0]),
            (6, 3, [0.5, 0.5]), (9, 11, [3.0, 0.0]), (8, 11, [0.0, 3.0]),
        ];
        for (from, to, c) in edges {
            g.add_edge(n(from), n(to), cv(&c)).unwrap();
        }
        g
    }

    #[test]
    fn test_diamond_front_at_sink() {
        let g = diamond();
        let fronts = ParetoEngine::new(&g).compute_all(n(0)).unwrap();
        let sink = fronts.get(n(3)).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.sorted_costs(), vec![cv(&[2.0, 6.0]), cv(&[6.0, 2.0])]);
    }

    #[test]
    fn test_dominated_shortcut_leaves_front_unchanged() {
        let mut g = diamond();
        g.add_edge(n(0), n(3), smallvec![10.0, 10.0]).unwrap();
        let fronts = ParetoEngine::new(&g).compute_all(n(0)).unwrap();
        assert_eq!(fronts.get(n(3)).unwrap().sorted_costs(), vec![cv(&[2.0, 6.0]), cv(&[6.0, 2.0])]);
    }

    #[test]
    fn test_source_front_is_zero_vector() {
        let g = lattice();
        let fronts = ParetoEngine::new(&g).compute_all(n(0)).unwrap();
        assert_eq!(fronts.get(n(0)).unwrap().sorted_costs(), vec![cv(&[0.0, 0.0])]);
    }

    #[test]
    fn test_every_front_is_an_antichain() {
        let g = lattice();
        let fronts = ParetoEngine::new(&g).compute_all(n(0)).unwrap();
        for (node, front) in fronts.iter() {
            assert!(front.is_antichain(), "front at {:?} is not an antichain: {:?}", node, front);
        }
        assert!(fronts.get(n(11)).unwrap().len() >= 2);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let g = lattice();
        let engine = ParetoEngine::new(&g);
        let first = engine.compute_all(n(0)).unwrap();
        let second = engine.compute_all(n(0)).unwrap();
        for (node, front) in first.iter() {
            assert_eq!(front.sorted_costs(), second.get(node).unwrap().sorted_costs());
        }
    }

    #[test]
    fn test_labels_are_costs_of_real_paths() {
        let g = lattice();
        let engine = ParetoEngine::new(&g).with_config(EngineConfig { track_paths: true });
        let fronts = engine.compute_all(n(0)).unwrap();
        for (node, front) in fronts.iter() {
            for label in front.labels() {
                let path = label.path.as_ref().expect("paths are tracked");
                assert_eq!(path.first(), Some(&n(0)));
                assert_eq!(path.last(), Some(&node));
                let mut total = vec![0.0; 2];
                for hop in path.windows(2) {
                    let cost = g.edge_cost(hop[0], hop[1]).expect("path uses existing edges");
                    for (t, c) in total.iter_mut().zip(cost) {
                        *t += c;
                    }
                }
                assert_eq!(total.as_slice(), label.cost.as_slice());
            }
        }
    }

    #[test]
    fn test_filter_restricts_output_not_traversal() {
        let g = diamond();
        let fronts = ParetoEngine::new(&g).compute(n(0), Some(&[n(3)])).unwrap();
        assert!(fronts.get(n(1)).unwrap().is_empty());
        assert_eq!(fronts.get(n(3)).unwrap().len(), 2);
    }

    #[test]
    fn test_unreachable_nodes_have_empty_fronts() {
        let g = diamond();
        let fronts = ParetoEngine::new(&g).compute_all(n(1)).unwrap();
        assert!(fronts.get(n(0)).unwrap().is_empty());
        assert!(fronts.get(n(2)).unwrap().is_empty());
        assert_eq!(fronts.get(n(3)).unwrap().sorted_costs(), vec![cv(&[1.0, 1.0])]);
    }

    #[test]
    fn test_bad_source_is_out_of_range() {
        let g = diamond();
        assert!(matches!(ParetoEngine::new(&g).compute_all(n(9)), Err(MospError::OutOfRange { .. })));
    }
}
