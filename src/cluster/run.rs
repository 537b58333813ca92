use super::broadcast::{ChannelBroadcast, ROOT_WORKER};
use super::coordinator::{Coordinator, CoordinatorConfig, EdgeMutation};
use crate::config::RunConfig;
use crate::display::WorkerReport;
use crate::error::{MospError, Result};
use crate::partition::Partitioner;
use crate::store::{GraphStore, NodeId};
use std::thread;

/// Runs `config.workers` coordinators on their own threads and collects their reports.
///
/// Every worker loads its own copy of the graph through `loader`. The root worker
/// partitions and broadcasts, then each worker computes fronts from `config.source`
/// and applies `mutations` to its local copy. The run fails as a whole if any worker
/// fails; a failure of the root is reported in preference to the aborts it causes.
pub fn run_cluster<L>(
    config: &RunConfig,
    loader: L,
    partitioner: &dyn Partitioner,
    mutations: &[EdgeMutation],
) -> Result<Vec<WorkerReport>>
where
    L: Fn(u32) -> Result<GraphStore> + Sync,
{
    config.validate()?;
    let coordinator_config = CoordinatorConfig {
        engine: config.engine_config(),
        propagation: config.propagation_config(),
    };
    let loader = &loader;

    let results: Vec<Result<WorkerReport>> = thread::scope(|scope| {
        let handles: Vec<_> = ChannelBroadcast::group(config.workers)
            .into_iter()
            .enumerate()
            .map(|(rank, transport)| {
                let rank = rank as u32;
                let handle = scope.spawn(move || -> Result<WorkerReport> {
                    let graph = loader(rank)?;
                    let mut worker = Coordinator::new(rank, config.workers, graph, coordinator_config)?;
                    worker.bootstrap(partitioner, &transport)?;
                    drop(transport);
                    worker.run_initial(NodeId(config.source))?;
                    for mutation in mutations {
                        worker.apply_mutation(mutation.clone())?;
                    }
                    Ok(worker.report(config.sample_size))
                });
                (rank, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(rank, handle)| handle.join().unwrap_or(Err(MospError::WorkerPanicked(rank))))
            .collect()
    });

    let mut reports = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (rank, result) in results.into_iter().enumerate() {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(worker = rank, error = %e, "worker failed");
                let is_root = rank as u32 == ROOT_WORKER;
                if is_root || first_error.is_none() {
                    first_error = Some(e);
                }
                if is_root {
                    break;
                }
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{BfsPartitioner, RoundRobinPartitioner};
    use crate::store::CostVector;
    use smallvec::smallvec;
    use std::collections::HashSet;

    fn n(i: u32) -> NodeId { NodeId(i) }

    fn diamond() -> GraphStore {
        let mut g = GraphStore::new(4, 2).unwrap();
        g.add_edge(n(0), n(1), smallvec![1.0, 5.0]).unwrap();
        g.add_edge(n(0), n(2), smallvec![5.0, 1.0]).unwrap();
        g.add_edge(n(1), n(3), smallvec![1.0, 1.0]).unwrap();
        g.add_edge(n(2), n(3), smallvec![1.0, 1.0]).unwrap();
        g
    }

    #[test]
    fn test_owned_sets_partition_the_graph() {
        let config = RunConfig { workers: 3, ..Default::default() };
        let reports = run_cluster(&config, |_| Ok(diamond()), &BfsPartitioner, &[]).unwrap();
        assert_eq!(reports.len(), 3);

        let mut seen = HashSet::new();
        for report in &reports {
            for &node in &report.owned {
                assert!(seen.insert(node), "node {} owned twice", node);
            }
        }
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn test_owner_reports_sink_front() {
        let config = RunConfig { workers: 2, sample_size: 4, ..Default::default() };
        let reports = run_cluster(&config, |_| Ok(diamond()), &RoundRobinPartitioner, &[]).unwrap();
        // Round robin: node 3 belongs to worker 1.
        let sink = reports[1].samples.iter().find(|s| s.node == 3).unwrap();
        assert_eq!(sink.front, vec![vec![2.0, 6.0], vec![6.0, 2.0]]);
    }

    #[test]
    fn test_only_owner_propagates_mutation() {
        let config = RunConfig { workers: 2, ..Default::default() };
        let mutation = EdgeMutation::Insert { from: n(0), to: n(3), cost: CostVector::from_slice(&[1.0, 1.0]) };
        let reports = run_cluster(&config, |_| Ok(diamond()), &RoundRobinPartitioner, &[mutation]).unwrap();
        assert!(reports[0].updates[0].rounds.is_some());
        assert_eq!(reports[1].updates[0].rounds, None);
        assert_eq!(reports[0].updates[0].target.front.len(), 3);
        assert_eq!(reports[1].updates[0].target.front.len(), 2);
    }

    #[test]
    fn test_root_load_failure_fails_the_run() {
        let config = RunConfig { workers: 3, ..Default::default() };
        let err = run_cluster(
            &config,
            |rank| if rank == 0 { Err(MospError::Parse { line: 1, message: "bad".into() }) } else { Ok(diamond()) },
            &BfsPartitioner,
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, MospError::Parse { .. }));
    }

    #[test]
    fn test_partition_failure_is_not_masked() {
        let config = RunConfig { workers: 2, ..Default::default() };
        let err = run_cluster(&config, |_| GraphStore::new(0, 2), &BfsPartitioner, &[]).unwrap_err();
        assert!(matches!(err, MospError::PartitionFailure(_)));
    }
}
