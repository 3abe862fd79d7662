//! trapeze - direction-aware clustering of paired observations
//!
//! # Commands
//!
//! - `run <input> [max_k]`: cluster a two-column file and write the tables
//!   consumed by the plotting scripts
//! - `stats <clustered_data.txt>`: recompute per-cluster statistics from an
//!   existing clustered table
//! - `config`: print the effective configuration as TOML
//!
//! Flags override values from `--config <file.toml>`, which override the
//! built-in defaults. Logs go to stderr; `RUST_LOG` sets the filter unless
//! `--verbose` is given.

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use trapeze_cluster::{Label, Linkage, Method, Observation};
use trapeze_core::output::OutputFiles;
use trapeze_core::{
    cluster_statistics, write_outputs, Engine, EngineConfig, TrapezeError, TrapezeResult,
};
use trapeze_io::{create_output, read_clustered_file, write_group_report, write_statistics_table};

#[derive(Parser)]
#[command(name = "trapeze")]
#[command(version)]
#[command(about = "Cluster paired (X, Y) observations by direction and summarise each cluster")]
#[command(propagate_version = true)]
struct Cli {
    /// Debug-level logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster a two-column file and write the result tables
    Run(RunArgs),
    /// Recompute statistics from an existing clustered table
    Stats(StatsArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Two-column input (comma, tab or whitespace separated)
    input: PathBuf,

    /// Upper bound for the elbow search, or the fixed k with --no-auto-k
    max_k: Option<usize>,

    /// Directory for the output tables
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    cluster: ClusterArgs,
}

#[derive(Args)]
struct StatsArgs {
    /// Clustered table written by `trapeze run`
    input: PathBuf,

    /// Directory for the statistics tables
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Args)]
struct ConfigArgs {
    /// Upper bound for the cluster count
    #[arg(long)]
    max_k: Option<usize>,

    #[command(flatten)]
    cluster: ClusterArgs,
}

#[derive(Args, Default)]
struct ClusterArgs {
    /// hierarchical, hdbscan or kmeans-elbow
    #[arg(short, long)]
    method: Option<String>,

    /// ward, complete, average or single (hierarchical only)
    #[arg(short, long)]
    linkage: Option<String>,

    /// Smallest density cluster (hdbscan only)
    #[arg(long)]
    min_cluster_size: Option<usize>,

    /// Neighbour rank for core distances (hdbscan only)
    #[arg(long)]
    min_samples: Option<usize>,

    /// Use max_k as the cluster count instead of the elbow search
    #[arg(long)]
    no_auto_k: bool,

    /// log2-transform X and Y before clustering
    #[arg(long)]
    log2: bool,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ClusterArgs {
    /// Defaults, then the config file, then flags
    fn resolve(&self, max_k: Option<usize>) -> TrapezeResult<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_file(path)?,
            None => EngineConfig::default(),
        };

        let clustering = &mut config.clustering;
        if let Some(method) = &self.method {
            clustering.method = method.parse::<Method>()?;
        }
        if let Some(linkage) = &self.linkage {
            clustering.linkage = linkage.parse::<Linkage>()?;
        }
        if let Some(k) = max_k {
            clustering.max_k = k;
        }
        if let Some(size) = self.min_cluster_size {
            clustering.min_cluster_size = size;
        }
        if self.min_samples.is_some() {
            clustering.min_samples = self.min_samples;
        }
        if self.no_auto_k {
            clustering.auto_k = false;
        }
        if self.log2 {
            config.preprocess.log2_transform = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => run(args),
        Commands::Stats(args) => stats(args),
        Commands::Config(args) => print_config(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.stage() {
                Some(stage) => eprintln!("Error [{stage}]: {err}"),
                None => eprintln!("Error: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> TrapezeResult<()> {
    let config = args.cluster.resolve(args.max_k)?;
    info!(
        input = %args.input.display(),
        method = %config.clustering.method,
        max_k = config.clustering.max_k,
        log2 = config.preprocess.log2_transform,
        "Starting run"
    );

    let engine = Engine::new(config)?;
    let output = engine.run_file(&args.input)?;
    let files = write_outputs(&output, &args.output_dir)?;

    let report = &output.report;
    println!(
        "{} observations, {} clusters, {} noise points",
        report.counts.total, report.total_clusters, report.noise
    );
    for group in &report.groups {
        println!(
            "  {:<10} {:>5} points  clusters {:?}",
            group.direction.name(),
            group.points,
            group.cluster_ids
        );
    }
    if !report.outlier_clusters.is_empty() {
        println!("  outside whiskers: {:?}", report.outlier_clusters);
    }
    println!("Wrote {}", files.clustered.display());
    println!("Wrote {}", files.calculated.display());
    Ok(())
}

fn stats(args: StatsArgs) -> TrapezeResult<()> {
    let rows = read_clustered_file(&args.input)?;
    let observations: Vec<Observation> =
        rows.iter().map(|r| Observation::new(r.x, r.y)).collect();
    let labels: Vec<Label> = rows
        .iter()
        .map(|r| usize::try_from(r.cluster).map_or(Label::Noise, Label::Cluster))
        .collect();

    let statistics = cluster_statistics(&observations, &labels);
    info!(
        rows = rows.len(),
        clusters = statistics.len(),
        "Recomputed cluster statistics"
    );

    fs::create_dir_all(&args.output_dir)?;
    let files = OutputFiles::in_dir(&args.output_dir);
    create_output(&files.calculated)
        .and_then(|w| write_statistics_table(w, &statistics))
        .map_err(TrapezeError::Output)?;
    create_output(&files.statistics)
        .and_then(|w| write_group_report(w, &statistics))
        .map_err(TrapezeError::Output)?;

    println!("Wrote {}", files.calculated.display());
    println!("Wrote {}", files.statistics.display());
    Ok(())
}

fn print_config(args: ConfigArgs) -> TrapezeResult<()> {
    let config = args.cluster.resolve(args.max_k)?;
    let toml = config
        .to_toml()
        .map_err(|e| TrapezeError::Config(e.to_string()))?;
    print!("{toml}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_run_positional_max_k() {
        let cli = parse(&["trapeze", "run", "data.txt", "4", "-m", "kmeans"]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.max_k, Some(4));

        let config = args.cluster.resolve(args.max_k).unwrap();
        assert_eq!(config.clustering.max_k, 4);
        assert_eq!(config.clustering.method, Method::KMeansElbow);
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[clustering]\nmethod = \"hdbscan\"\nmin_cluster_size = 8\nlinkage = \"single\""
        )
        .unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let cli = parse(&[
            "trapeze",
            "run",
            "data.txt",
            "--config",
            &path,
            "--min-cluster-size",
            "4",
            "--log2",
            "--no-auto-k",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };

        let config = args.cluster.resolve(args.max_k).unwrap();
        assert_eq!(config.clustering.method, Method::Hdbscan);
        assert_eq!(config.clustering.linkage, Linkage::Single);
        assert_eq!(config.clustering.min_cluster_size, 4);
        assert!(!config.clustering.auto_k);
        assert!(config.preprocess.log2_transform);
    }

    #[test]
    fn test_unknown_method_is_parameter_error() {
        let args = ClusterArgs {
            method: Some("spectral".to_string()),
            ..ClusterArgs::default()
        };
        assert!(matches!(
            args.resolve(None),
            Err(TrapezeError::Parameter(_))
        ));
    }

    #[test]
    fn test_zero_max_k_rejected() {
        assert!(matches!(
            ClusterArgs::default().resolve(Some(0)),
            Err(TrapezeError::Parameter(_))
        ));
    }

    #[test]
    fn test_stats_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clustered_data.txt");
        fs::write(&input, "X Y Cluster\n1 2 0\n2 3 0\n5 1 1\n9 9 -1\n").unwrap();

        stats(StatsArgs {
            input,
            output_dir: dir.path().to_path_buf(),
        })
        .unwrap();

        let table = fs::read_to_string(dir.path().join("calculated_points.txt")).unwrap();
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().nth(1).unwrap().ends_with("\t2"));
    }
}
