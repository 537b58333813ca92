//! `mosp`: load a graph, partition it across workers, compute Pareto fronts from a
//! source node and optionally apply one edge insertion.
//!
//! Usage:
//!   mosp --edge-list graph.txt --workers 4 --source 0
//!   mosp --adjacency graph.graph --objectives 3 --insert 5,9 --json

use clap::{ArgGroup, Parser};
use mosp_core::cluster::EdgeMutation;
use mosp_core::store::{ingest, unit_cost};
use mosp_core::{init_tracing, run_cluster, BfsPartitioner, EvictionPolicy, GraphStore, MospError, NodeId, RunConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-objective Pareto shortest paths", long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["edge_list", "adjacency"])))]
struct Cli {
    /// Whitespace-separated `from to` pairs, one per line, `#` comments
    #[arg(long, value_name = "PATH")]
    edge_list: Option<PathBuf>,

    /// 1-based adjacency file with a `nodes edges` header, `%` comments
    #[arg(long, value_name = "PATH")]
    adjacency: Option<PathBuf>,

    /// JSON run configuration; flags below override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long)]
    objectives: Option<usize>,

    #[arg(long)]
    workers: Option<u32>,

    #[arg(long)]
    source: Option<u32>,

    /// Only load edges whose endpoints are below this id (edge list only)
    #[arg(long)]
    max_nodes: Option<usize>,

    /// Owned nodes printed per worker
    #[arg(long)]
    sample: Option<usize>,

    /// retain | evict
    #[arg(long)]
    eviction: Option<EvictionPolicy>,

    /// Insert a unit-cost edge `FROM,TO` after the initial computation
    #[arg(long, value_name = "FROM,TO", value_parser = parse_endpoints)]
    insert: Option<(u32, u32)>,

    /// Print reports as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn parse_endpoints(s: &str) -> Result<(u32, u32), String> {
    let (from, to) = s.split_once(',').ok_or_else(|| format!("expected FROM,TO, got '{}'", s))?;
    let from = from.trim().parse::<u32>().map_err(|e| format!("bad FROM '{}': {}", from, e))?;
    let to = to.trim().parse::<u32>().map_err(|e| format!("bad TO '{}': {}", to, e))?;
    Ok((from, to))
}

impl Cli {
    fn run_config(&self) -> mosp_core::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_path(path)?,
            None => RunConfig::default(),
        };
        if let Some(v) = self.objectives {
            config.objectives = v;
        }
        if let Some(v) = self.workers {
            config.workers = v;
        }
        if let Some(v) = self.source {
            config.source = v;
        }
        if let Some(v) = self.max_nodes {
            config.max_nodes = Some(v);
        }
        if let Some(v) = self.sample {
            config.sample_size = v;
        }
        if let Some(v) = self.eviction {
            config.eviction = v;
        }
        config.validate()?;
        Ok(config)
    }

    fn load(&self, config: &RunConfig) -> mosp_core::Result<GraphStore> {
        match (&self.edge_list, &self.adjacency) {
            (Some(path), _) => match config.max_nodes {
                Some(limit) => ingest::load_edge_list_bounded(path, limit, config.objectives),
                None => ingest::load_edge_list(path, config.objectives),
            },
            (None, Some(path)) => ingest::load_adjacency(path, config.objectives),
            (None, None) => Err(MospError::Config("no input graph given".into())),
        }
    }
}

fn run(cli: &Cli) -> mosp_core::Result<()> {
    let config = cli.run_config()?;
    let mutations: Vec<EdgeMutation> = cli
        .insert
        .map(|(from, to)| EdgeMutation::Insert {
            from: NodeId(from),
            to: NodeId(to),
            cost: unit_cost(config.objectives),
        })
        .into_iter()
        .collect();

    let reports = run_cluster(&config, |_| cli.load(&config), &BfsPartitioner, &mutations)?;

    if cli.json {
        let rendered = serde_json::to_string_pretty(&reports)?;
        println!("{}", rendered);
    } else {
        for report in &reports {
            print!("{}", report);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
