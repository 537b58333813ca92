//! Run configuration, loadable from a JSON file. Every field has a default.
use crate::compute::{EngineConfig, EvictionPolicy, PropagationConfig};
use crate::error::{MospError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Objectives per edge cost vector.
    pub objectives: usize,
    /// Number of workers (and partitions).
    pub workers: u32,
    /// Source node of the batch search.
    pub source: u32,
    /// Owned nodes whose fronts are printed per worker.
    pub sample_size: usize,
    /// Restrict edge-list loading to the first `max_nodes` node ids.
    pub max_nodes: Option<usize>,
    pub eviction: EvictionPolicy,
    pub max_rounds: usize,
    pub max_front_size: Option<usize>,
    pub track_paths: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let propagation = PropagationConfig::default();
        Self {
            objectives: 2,
            workers: 1,
            source: 0,
            sample_size: 3,
            max_nodes: None,
            eviction: propagation.eviction,
            max_rounds: propagation.max_rounds,
            max_front_size: propagation.max_front_size,
            track_paths: false,
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.objectives == 0 {
            return Err(MospError::Config("objectives must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(MospError::Config("workers must be at least 1".into()));
        }
        if self.max_rounds == 0 {
            return Err(MospError::Config("max_rounds must be at least 1".into()));
        }
        if self.max_front_size == Some(0) {
            return Err(MospError::Config("max_front_size must be positive when set".into()));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig { track_paths: self.track_paths }
    }

    pub fn propagation_config(&self) -> PropagationConfig {
        PropagationConfig {
            eviction: self.eviction,
            max_rounds: self.max_rounds,
            max_front_size: self.max_front_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RunConfig::from_json_str(r#"{ "workers": 4, "eviction": "evict" }"#).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.eviction, EvictionPolicy::Evict);
        assert_eq!(config.objectives, 2);
        assert_eq!(config.sample_size, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(RunConfig::from_json_str(r#"{ "workers": 0 }"#), Err(MospError::Config(_))));
        assert!(matches!(RunConfig::from_json_str(r#"{ "objectives": 0 }"#), Err(MospError::Config(_))));
        assert!(matches!(RunConfig::from_json_str(r#"{ "max_front_size": 0 }"#), Err(MospError::Config(_))));
        assert!(matches!(RunConfig::from_json_str(r#"{ "wokers": 2 }"#), Err(MospError::Serde(_))));
    }

    #[test]
    fn test_propagation_config_mirrors_fields() {
        let config = RunConfig { max_rounds: 7, max_front_size: Some(5), ..Default::default() };
        let p = config.propagation_config();
        assert_eq!(p.max_rounds, 7);
        assert_eq!(p.max_front_size, Some(5));
        assert_eq!(p.eviction, EvictionPolicy::Retain);
    }
}
