//! Incremental maintenance of Pareto fronts after local edge changes.
//!
//! The propagator runs a worklist to a fixpoint. Each round has two phases:
//! 1. **Collect** (parallel): every dirty node extends the labels it gained in the
//!    previous round along each outgoing edge. Candidates are pre-screened against
//!    a read-only view of the table.
//! 2. **Merge** (single thread): candidates are applied in a deterministic order and
//!    every accepted label marks its node dirty for the next round.
//!
//! No front is written while the collect phase runs, so no locking is needed.
//!
//! Unlike the batch engine, the default [`EvictionPolicy::Retain`] never removes a
//! destination label that a new candidate dominates. Fronts therefore only grow
//! under repeated updates, and can stop being antichains. [`EvictionPolicy::Evict`]
//! applies the batch engine's rule instead. Neither policy removes labels whose
//! paths got more expensive or disappeared; [`crate::cluster::Coordinator::recompute`]
//! is the way back to exact fronts.

use super::kernel::{is_non_dominated, lexicographic};
use super::ledger::{FrontTable, Label};
use crate::error::{MospError, Result};
use crate::store::{GraphStore, NodeId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Insert non-dominated candidates, keep everything already in the front.
    #[default]
    Retain,
    /// Insert non-dominated candidates and evict the members they dominate.
    Evict,
}

impl FromStr for EvictionPolicy {
    type Err = MospError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "retain" => Ok(EvictionPolicy::Retain),
            "evict" => Ok(EvictionPolicy::Evict),
            other => Err(MospError::Config(format!("unknown eviction policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationConfig {
    pub eviction: EvictionPolicy,
    /// Rounds allowed before the run is abandoned with `PropagationLimit`.
    pub max_rounds: usize,
    /// A candidate that would grow a front already holding this many labels is dropped.
    pub max_front_size: Option<usize>,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self { eviction: EvictionPolicy::Retain, max_rounds: 10_000, max_front_size: None }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    pub rounds: usize,
    pub inserted: usize,
    pub evicted: usize,
    /// Candidates discarded because admitting them would grow a front past `max_front_size`.
    pub dropped: usize,
}

pub struct IncrementalPropagator<'a> {
    graph: &'a GraphStore,
    config: PropagationConfig,
}

impl<'a> IncrementalPropagator<'a> {
    pub fn new(graph: &'a GraphStore, config: PropagationConfig) -> Self {
        Self { graph, config }
    }

    /// Propagates from `seeds` until no node is dirty.
    ///
    /// Each seed starts dirty with its whole current front, so a seed whose front is
    /// empty (unreachable from the source) propagates nothing.
    pub fn propagate(&self, fronts: &mut FrontTable, seeds: &[NodeId]) -> Result<PropagationStats> {
        let n = self.graph.num_nodes();
        fronts.ensure_capacity(n);
        for &seed in seeds {
            self.graph.check_node(seed)?;
        }

        let mut stats = PropagationStats::default();
        let mut dirty = vec![false; n];
        let mut deltas: Vec<Vec<Label>> = vec![Vec::new(); n];
        for &seed in seeds {
            if !dirty[seed.index()] {
                dirty[seed.index()] = true;
                deltas[seed.index()] = fronts.get(seed).map(|f| f.labels().to_vec()).unwrap_or_default();
            }
        }

        loop {
            // 1. Drain the worklist. Labels evicted since they were queued are skipped.
            let mut work: Vec<(NodeId, Vec<Label>)> = Vec::new();
            for idx in 0..n {
                if !std::mem::replace(&mut dirty[idx], false) {
                    continue;
                }
                let node = NodeId::new(idx);
                let mut delta = std::mem::take(&mut deltas[idx]);
                if let Some(front) = fronts.get(node) {
                    delta.retain(|l| front.contains_cost(&l.cost));
                }
                if !delta.is_empty() {
                    work.push((node, delta));
                }
            }
            if work.is_empty() {
                break;
            }
            if stats.rounds == self.config.max_rounds {
                return Err(MospError::PropagationLimit { rounds: stats.rounds });
            }
            stats.rounds += 1;

            // 2. Collect candidates in parallel against the frozen table
            let graph = self.graph;
            let table: &FrontTable = fronts;
            let mut candidates: Vec<(NodeId, Label)> = work
                .par_iter()
                .flat_map_iter(|(u, delta)| {
                    graph.edges_of(*u).iter().flat_map(move |edge| {
                        delta.iter().map(move |label| (edge.to, label.extend(edge)))
                    })
                })
                .filter(|(v, candidate)| {
                    table.get(*v).map_or(false, |f| is_non_dominated(&candidate.cost, f.labels()))
                })
                .collect();

            // 3. Merge single-threaded: by node, then cheapest first
            candidates.sort_by(|(a, x), (b, y)| a.cmp(b).then_with(|| lexicographic(&x.cost, &y.cost)));
            for (v, candidate) in candidates {
                let Some(front) = fronts.get_mut(v) else { continue };
                // Rejected: covered, possibly by a label merged earlier this round.
                let Some(evictable) = front.admission(&candidate.cost) else { continue };
                let grows = match self.config.eviction {
                    EvictionPolicy::Retain => true,
                    EvictionPolicy::Evict => evictable == 0,
                };
                if let Some(cap) = self.config.max_front_size {
                    if grows && front.len() >= cap {
                        stats.dropped += 1;
                        continue;
                    }
                }
                match self.config.eviction {
                    EvictionPolicy::Retain => {
                        front.insert_retaining(candidate.clone());
                    }
                    EvictionPolicy::Evict => {
                        stats.evicted += front.insert(candidate.clone()).unwrap_or(0);
                    }
                }
                stats.inserted += 1;
                dirty[v.index()] = true;
                deltas[v.index()].push(candidate);
            }
        }

        if stats.dropped > 0 {
            tracing::warn!(dropped = stats.dropped, cap = ?self.config.max_front_size, "front size cap discarded candidates");
        }
        tracing::debug!(
            rounds = stats.rounds,
            inserted = stats.inserted,
            evicted = stats.evicted,
            policy = ?self.config.eviction,
            "incremental propagation reached fixpoint"
        );
        Ok(stats)
    }
}
