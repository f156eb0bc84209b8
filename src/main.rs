use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use arbor_io::{CsvReader, ExperimentName, ResultWriter};
use arbor_tree::TreeConfig;

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Decision tree induction over CSV tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel prediction (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a tree, evaluate it on its training rows, and write the artifacts
    Build {
        /// Path to the input CSV file (header row required)
        #[arg(long)]
        data: PathBuf,

        /// Column holding the label to predict
        #[arg(long)]
        decision: String,

        /// Column to exclude from the candidate attributes (repeatable)
        #[arg(long = "skip")]
        skip: Vec<String>,

        /// Maximum tree depth (root is depth 0)
        #[arg(long, default_value_t = 5)]
        max_depth: usize,

        /// Minimum information gain (bits) required to split
        #[arg(long, default_value_t = 0.1)]
        entropy_threshold: f64,

        /// Experiment name for output files (must match [a-zA-Z0-9_-]+)
        #[arg(long)]
        experiment: String,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Print the tree outline to stderr
        #[arg(long, default_value_t = false)]
        print_tree: bool,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct BuildOutput {
    experiment: String,
    n_rows: usize,
    n_dropped: usize,
    n_attributes: usize,
    labels: Vec<String>,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    accuracy: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Build {
            data,
            decision,
            skip,
            max_depth,
            entropy_threshold,
            experiment,
            output_dir,
            print_tree,
        } => {
            // Validate the experiment name before doing any work.
            let experiment_name =
                ExperimentName::new(experiment.as_str()).context("invalid experiment name")?;

            let raw = CsvReader::new(&data)
                .read()
                .with_context(|| format!("failed to read {}", data.display()))?;
            info!(
                n_rows = raw.n_rows(),
                n_columns = raw.columns().len(),
                "loaded data"
            );

            let config = TreeConfig::new(decision)
                .with_skip_attributes(skip)
                .with_max_depth(max_depth)
                .with_entropy_threshold(entropy_threshold);
            let result = config.fit(&raw).context("tree induction failed")?;

            let display = result.display_tree();
            let writer = ResultWriter::new(&output_dir, experiment_name)
                .context("failed to create result writer")?;
            writer
                .write_tree(&display)
                .context("failed to write tree")?;
            writer
                .write_evaluation(&result)
                .context("failed to write evaluation")?;

            if print_tree {
                eprint!("{display}");
                eprint!("{}", result.confusion_matrix());
            }

            let meta = result.metadata();
            let output = BuildOutput {
                experiment,
                n_rows: meta.n_records,
                n_dropped: meta.n_dropped,
                n_attributes: meta.n_attributes,
                labels: result.dataset().label_names().to_vec(),
                n_nodes: meta.n_nodes,
                n_leaves: meta.n_leaves,
                depth: meta.depth,
                accuracy: result.accuracy(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
