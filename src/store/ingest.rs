//! Text-format graph loaders.
//!
//! Two formats are supported, both producing unit cost vectors of length `m`:
//! - the adjacency format (`%` comments, header `nodeCount edgeCount`, then one
//!   line of 1-based neighbour ids per node),
//! - the edge list (`#` comments, one `from to` pair per line, 0-based ids).

use super::registry::GraphStore;
use super::types::{unit_cost, NodeId};
use crate::error::{MospError, Result};
use std::fs;
use std::path::Path;

const ADJACENCY_COMMENT: char = '%';
const EDGE_LIST_COMMENT: char = '#';

/// Node ids are stored as `u32`.
const MAX_NODE_ID: usize = u32::MAX as usize;

/// Yields `(1-based line number, trimmed line)` for every line that is neither blank nor a comment.
fn content_lines(text: &str, marker: char) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(move |(_, line)| !line.is_empty() && !line.starts_with(marker))
}

fn parse_field(token: &str, line: usize) -> Result<usize> {
    token.parse::<usize>().map_err(|_| MospError::Parse {
        line,
        message: format!("expected a non-negative integer, got '{}'", token),
    })
}

fn check_node_id(id: usize, line: usize) -> Result<()> {
    if id > MAX_NODE_ID {
        return Err(MospError::Parse {
            line,
            message: format!("node id {} exceeds the largest supported id {}", id, MAX_NODE_ID),
        });
    }
    Ok(())
}

pub fn load_adjacency(path: impl AsRef<Path>, num_objectives: usize) -> Result<GraphStore> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_adjacency(&text, num_objectives)
}

pub fn parse_adjacency(text: &str, num_objectives: usize) -> Result<GraphStore> {
    let mut lines = content_lines(text, ADJACENCY_COMMENT);

    // 1. Header
    let (header_line, header) = lines.next().ok_or(MospError::Parse {
        line: 0,
        message: "missing 'nodeCount edgeCount' header".into(),
    })?;
    let mut fields = header.split_whitespace();
    let node_count = parse_field(fields.next().unwrap_or_default(), header_line)?;
    let declared_edges = fields.next().map(|tok| parse_field(tok, header_line)).transpose()?;
    check_node_id(node_count.saturating_sub(1), header_line)?;

    // 2. One neighbour line per node
    let mut graph = GraphStore::new(node_count, num_objectives)?;
    for (node, (line_no, line)) in lines.take(node_count).enumerate() {
        for token in line.split_whitespace() {
            let neighbour = parse_field(token, line_no)?;
            if neighbour == 0 || neighbour > node_count {
                return Err(MospError::Parse {
                    line: line_no,
                    message: format!("neighbour id {} outside 1..={}", neighbour, node_count),
                });
            }
            match graph.add_edge(NodeId::new(node), NodeId::new(neighbour - 1), unit_cost(num_objectives)) {
                Ok(()) => {}
                Err(MospError::DuplicateEdge { .. }) => {
                    tracing::debug!(line = line_no, neighbour, "skipping repeated neighbour");
                }
                Err(e) => return Err(e),
            }
        }
    }

    if let Some(declared) = declared_edges {
        if declared != graph.num_edges() {
            // Undirected adjacency files declare each edge once but list it twice.
            tracing::debug!(declared, loaded = graph.num_edges(), "adjacency header edge count differs from loaded edges");
        }
    }
    tracing::info!(nodes = graph.num_nodes(), edges = graph.num_edges(), "loaded adjacency graph");
    Ok(graph)
}

pub fn load_edge_list(path: impl AsRef<Path>, num_objectives: usize) -> Result<GraphStore> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_edge_list(&text, None, num_objectives)
}

/// Loads an edge list into a graph of exactly `max_nodes` nodes, dropping edges
/// with an endpoint outside that range.
pub fn load_edge_list_bounded(path: impl AsRef<Path>, max_nodes: usize, num_objectives: usize) -> Result<GraphStore> {
    let text = fs::read_to_string(path.as_ref())?;
    parse_edge_list(&text, Some(max_nodes), num_objectives)
}

pub fn parse_edge_list(text: &str, max_nodes: Option<usize>, num_objectives: usize) -> Result<GraphStore> {
    if let Some(limit) = max_nodes {
        if limit.saturating_sub(1) > MAX_NODE_ID {
            return Err(MospError::Config(format!("max_nodes {} exceeds the u32 id range", limit)));
        }
    }
    let mut pairs = Vec::new();
    let mut max_id: Option<usize> = None;

    for (line_no, line) in content_lines(text, EDGE_LIST_COMMENT) {
        let mut fields = line.split_whitespace().map(str::parse::<usize>);
        let (from, to) = match (fields.next(), fields.next()) {
            (Some(Ok(from)), Some(Ok(to))) => (from, to),
            _ => {
                tracing::debug!(line = line_no, "skipping malformed edge-list line");
                continue;
            }
        };
        check_node_id(from, line_no)?;
        check_node_id(to, line_no)?;
        if let Some(limit) = max_nodes {
            if from >= limit || to >= limit {
                continue;
            }
        }
        max_id = Some(max_id.map_or(from.max(to), |m| m.max(from).max(to)));
        pairs.push((from, to));
    }

    let node_count = max_nodes.unwrap_or_else(|| max_id.map_or(0, |m| m + 1));
    let mut graph = GraphStore::new(node_count, num_objectives)?;
    for (from, to) in pairs {
        match graph.add_edge(NodeId::new(from), NodeId::new(to), unit_cost(num_objectives)) {
            Ok(()) => {}
            Err(MospError::DuplicateEdge { .. }) => {
                tracing::debug!(from, to, "skipping duplicate edge");
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(nodes = graph.num_nodes(), edges = graph.num_edges(), "loaded edge list");
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn n(i: u32) -> NodeId { NodeId(i) }

    #[test]
    fn test_adjacency_converts_to_zero_based() {
        let text = "% a triangle\n3 3\n2 3\n% mid comment\n3\n1\n";
        let g = parse_adjacency(text, 2).unwrap();
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.num_edges(), 4);
        assert!(g.contains_edge(n(0), n(1)));
        assert!(g.contains_edge(n(0), n(2)));
        assert!(g.contains_edge(n(1), n(2)));
        assert!(g.contains_edge(n(2), n(0)));
        assert_eq!(g.edge_cost(n(0), n(1)).unwrap().as_slice(), &[1.0, 1.0]);
    }

    #[test]
    fn test_adjacency_rejects_bad_neighbour() {
        assert!(matches!(parse_adjacency("2 1\n0\n\n", 1), Err(MospError::Parse { line: 2, .. })));
        assert!(matches!(parse_adjacency("2 1\n3\n", 1), Err(MospError::Parse { .. })));
        assert!(matches!(parse_adjacency("% only comments\n", 1), Err(MospError::Parse { .. })));
    }

    #[test]
    fn test_adjacency_skips_repeated_neighbour() {
        let g = parse_adjacency("2 1\n2 2\n1\n", 1).unwrap();
        assert_eq!(g.num_edges(), 2);
        assert!(g.contains_edge(n(0), n(1)));
        assert!(g.contains_edge(n(1), n(0)));
    }

    #[test]
    fn test_ids_beyond_u32_are_rejected_with_line() {
        let big = (u32::MAX as u64 + 1).to_string();
        let header = format!("% big\n{} 0\n", u64::from(u32::MAX) + 2);
        assert!(matches!(parse_adjacency(&header, 1), Err(MospError::Parse { line: 2, .. })));

        let text = format!("0 1\n0 {}\n", big);
        assert!(matches!(parse_edge_list(&text, None, 1), Err(MospError::Parse { line: 2, .. })));
        assert!(matches!(parse_edge_list(&text, Some(4), 1), Err(MospError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_edge_list_node_count_is_max_id_plus_one() {
        let text = "# header\n0 1\n1 7\nnot an edge\n7 0\n1 7\n";
        let g = parse_edge_list(text, None, 3).unwrap();
        assert_eq!(g.num_nodes(), 8);
        assert_eq!(g.num_edges(), 3);
        assert_eq!(g.edge_cost(n(7), n(0)).unwrap().as_slice(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_bounded_edge_list_drops_out_of_range_edges() {
        let text = "0 1\n1 5\n2 3\n";
        let g = parse_edge_list(text, Some(4), 2).unwrap();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 2);
        assert!(!g.contains_edge(n(1), n(5)));
    }

    #[test]
    fn test_load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# demo\n0 1\n1 2").unwrap();
        let g = load_edge_list(file.path(), 2).unwrap();
        assert_eq!(g.num_edges(), 2);

        let missing = file.path().with_extension("missing");
        assert!(matches!(load_edge_list(&missing, 2), Err(MospError::Io(_))));
        assert!(matches!(load_adjacency(&missing, 2), Err(MospError::Io(_))));
    }
}
