//! Defines the error type shared by every module of the crate.
use crate::store::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MospError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Invalid weight dimension: expected {expected} objectives, got {actual}")]
    InvalidWeightDimension { expected: usize, actual: usize },
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
    #[error("Edge {from:?} -> {to:?} not found")]
    NotFound { from: NodeId, to: NodeId },
    #[error("Edge {from:?} -> {to:?} already exists")]
    DuplicateEdge { from: NodeId, to: NodeId },
    #[error("Node {node:?} out of range for graph with {count} nodes")]
    OutOfRange { node: NodeId, count: usize },
    #[error("Partitioning failed: {0}")]
    PartitionFailure(String),
    #[error("Partition broadcast aborted before delivery")]
    BroadcastAborted,
    #[error("Broadcast error: {0}")]
    Broadcast(String),
    #[error("Worker {0} panicked")]
    WorkerPanicked(u32),
    #[error("Incremental propagation did not reach a fixpoint within {rounds} rounds")]
    PropagationLimit { rounds: usize },
    #[error("Config error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MospError>;
