use super::{check_request, PartitionAssignment, Partitioner};
use crate::error::Result;
use crate::store::GraphStore;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;

/// Grows contiguous regions of at most `ceil(n / k)` nodes in breadth-first order.
///
/// Edge direction is ignored. Each connected component is walked from its lowest
/// node id, and a region is closed as soon as it is full, so regions may span
/// component boundaries but never skip around inside one.
#[derive(Debug, Clone, Copy, Default)]
pub struct BfsPartitioner;

impl BfsPartitioner {
    fn undirected_view(graph: &GraphStore) -> UnGraph<(), ()> {
        let mut view = UnGraph::with_capacity(graph.num_nodes(), graph.num_edges());
        for _ in 0..graph.num_nodes() {
            view.add_node(());
        }
        for from in graph.node_ids() {
            for edge in graph.edges_of(from) {
                view.add_edge(NodeIndex::new(from.index()), NodeIndex::new(edge.to.index()), ());
            }
        }
        view
    }
}

impl Partitioner for BfsPartitioner {
    fn partition(&self, graph: &GraphStore, num_parts: u32) -> Result<PartitionAssignment> {
        check_request(graph, num_parts)?;
        let n = graph.num_nodes();
        let capacity = n.div_ceil(num_parts as usize);
        let view = Self::undirected_view(graph);

        let mut parts = vec![u32::MAX; n];
        let mut region = 0u32;
        let mut filled = 0usize;
        for start in 0..n {
            if parts[start] != u32::MAX {
                continue;
            }
            // Components are disjoint, so a walk from an unassigned node only meets unassigned nodes.
            let mut bfs = Bfs::new(&view, NodeIndex::new(start));
            while let Some(node) = bfs.next(&view) {
                parts[node.index()] = region;
                filled += 1;
                if filled == capacity {
                    region = (region + 1).min(num_parts - 1);
                    filled = 0;
                }
            }
        }

        let assignment = PartitionAssignment::new(parts, num_parts)?;
        tracing::info!(parts = num_parts, sizes = ?assignment.part_sizes(), "BFS partitioning finished");
        Ok(assignment)
    }
}

/// Assigns node `i` to part `i mod k`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinPartitioner;

impl Partitioner for RoundRobinPartitioner {
    fn partition(&self, graph: &GraphStore, num_parts: u32) -> Result<PartitionAssignment> {
        check_request(graph, num_parts)?;
        let parts = (0..graph.num_nodes()).map(|i| (i % num_parts as usize) as u32).collect();
        PartitionAssignment::new(parts, num_parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MospError;
    use crate::store::{unit_cost, NodeId};
    use rstest::rstest;
    use std::collections::HashSet;

    fn ring(n: usize) -> GraphStore {
        let mut g = GraphStore::new(n, 2).unwrap();
        for i in 0..n {
            g.add_edge(NodeId::new(i), NodeId::new((i + 1) % n), unit_cost(2)).unwrap();
        }
        g
    }

    fn assert_covers(assignment: &PartitionAssignment, n: usize, k: u32) {
        let mut seen = HashSet::new();
        for worker in 0..k {
            for node in assignment.owned_by(worker) {
                assert!(seen.insert(node), "node {:?} owned twice", node);
            }
        }
        assert_eq!(seen.len(), n);
    }

    #[rstest]
    #[case(10, 1)]
    #[case(10, 3)]
    #[case(7, 7)]
    #[case(3, 5)]
    fn test_partitioners_cover_all_nodes_once(#[case] n: usize, #[case] k: u32) {
        let g = ring(n);
        let bfs = BfsPartitioner.partition(&g, k).unwrap();
        let rr = RoundRobinPartitioner.partition(&g, k).unwrap();
        assert_covers(&bfs, n, k);
        assert_covers(&rr, n, k);
        assert_eq!(bfs.len(), n);
    }

    #[test]
    fn test_bfs_regions_are_balanced_and_contiguous() {
        let g = ring(9);
        let parts = BfsPartitioner.partition(&g, 3).unwrap();
        assert_eq!(parts.part_sizes(), vec![3, 3, 3]);
        // Node 0 and its ring neighbours land together.
        assert_eq!(parts.owner(NodeId(0)), parts.owner(NodeId(1)));
        assert_eq!(parts.owner(NodeId(0)), parts.owner(NodeId(8)));
    }

    #[test]
    fn test_bfs_handles_disconnected_nodes() {
        let mut g = GraphStore::new(6, 1).unwrap();
        g.add_edge(NodeId(4), NodeId(5), unit_cost(1)).unwrap();
        let parts = BfsPartitioner.partition(&g, 2).unwrap();
        assert_covers(&parts, 6, 2);
        assert_eq!(parts.part_sizes(), vec![3, 3]);
    }

    #[test]
    fn test_invalid_requests_fail_loudly() {
        let g = ring(4);
        assert!(matches!(BfsPartitioner.partition(&g, 0), Err(MospError::PartitionFailure(_))));
        let empty = GraphStore::new(0, 1).unwrap();
        assert!(matches!(RoundRobinPartitioner.partition(&empty, 2), Err(MospError::PartitionFailure(_))));
    }
}
