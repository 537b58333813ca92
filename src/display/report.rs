//! Per-worker run summaries, printable as text or JSON.
use crate::compute::{FrontTable, ParetoFront, PropagationStats};
use crate::store::NodeId;
use serde::Serialize;
use std::fmt::{self, Write};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontSample {
    pub node: u32,
    pub front: Vec<Vec<f64>>,
}

impl FrontSample {
    pub fn new(node: NodeId, front: &ParetoFront) -> Self {
        Self {
            node: node.0,
            front: front.sorted_costs().into_iter().map(|c| c.to_vec()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateReport {
    pub from: u32,
    pub to: u32,
    /// `None` when the mutation was not propagated (non-owned source, or a removal).
    pub rounds: Option<usize>,
    pub inserted: Option<usize>,
    pub target: FrontSample,
}

impl UpdateReport {
    pub fn new(from: NodeId, to: NodeId, stats: Option<PropagationStats>, fronts: &FrontTable) -> Self {
        let empty = ParetoFront::new();
        Self {
            from: from.0,
            to: to.0,
            rounds: stats.map(|s| s.rounds),
            inserted: stats.map(|s| s.inserted),
            target: FrontSample::new(to, fronts.get(to).unwrap_or(&empty)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerReport {
    pub worker: u32,
    pub owned: Vec<u32>,
    pub samples: Vec<FrontSample>,
    pub elapsed_secs: f64,
    pub updates: Vec<UpdateReport>,
}

impl WorkerReport {
    pub fn new(worker: u32, owned: &[NodeId], fronts: &FrontTable, sample_size: usize, elapsed: Duration) -> Self {
        let empty = ParetoFront::new();
        Self {
            worker,
            owned: owned.iter().map(|n| n.0).collect(),
            samples: owned
                .iter()
                .take(sample_size)
                .map(|&node| FrontSample::new(node, fronts.get(node).unwrap_or(&empty)))
                .collect(),
            elapsed_secs: elapsed.as_secs_f64(),
            updates: Vec::new(),
        }
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn format_front(front: &[Vec<f64>]) -> String {
    let mut out = String::new();
    for cost in front {
        let parts: Vec<String> = cost.iter().map(|c| c.to_string()).collect();
        let _ = write!(out, "[{}] ", parts.join(","));
    }
    out.trim_end().to_string()
}

impl fmt::Display for WorkerReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owned: Vec<String> = self.owned.iter().map(u32::to_string).collect();
        writeln!(f, "worker {} owns nodes: {}", self.worker, owned.join(" "))?;
        writeln!(f, "worker {} MSPA time: {:.6} seconds.", self.worker, self.elapsed_secs)?;
        for sample in &self.samples {
            writeln!(f, "worker {} node {} Pareto front: {}", self.worker, sample.node, format_front(&sample.front))?;
        }
        for update in &self.updates {
            match update.rounds {
                Some(rounds) => writeln!(
                    f,
                    "worker {} edge {}->{} propagated in {} rounds, node {} updated Pareto front: {}",
                    self.worker, update.from, update.to, rounds, update.to, format_front(&update.target.front)
                )?,
                None => writeln!(
                    f,
                    "worker {} applied edge {}->{} without propagation",
                    self.worker, update.from, update.to
                )?,
            }
        }
        Ok(())
    }
}
