//! Command-line arguments and subcommands of `combilab`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "combilab",
    version,
    about = "Benchmarks combinatorial test suite generators on identical t-way problems."
)]
pub struct LabArgs {
    /// YAML lab configuration. Defaults apply when omitted.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// More log output; repeat for debug and trace. RUST_LOG wins.
    #[arg(long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every experiment of the sweep and print a summary.
    Run {
        /// Generate inputs but do not start any tool.
        #[arg(long)]
        dry_run: bool,
        /// Time limit per tool invocation, in milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Append one JSON record per experiment to this file.
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Only run one testing problem (name or slug, e.g. `forbidden`).
        #[arg(long)]
        group: Option<String>,
    },
    /// Write the input files of every experiment without running them.
    Generate {
        #[arg(long)]
        group: Option<String>,
    },
    /// List the experiments the sweep would run.
    List {
        #[arg(long)]
        group: Option<String>,
    },
    /// Report external tools that cannot be found.
    CheckEnv,
    /// Print the input file of one problem for one tool.
    Encode {
        /// Testing problem (name or slug).
        #[arg(long, default_value = "comb")]
        problem: String,
        #[arg(long)]
        tool: String,
        #[arg(short)]
        t: usize,
        #[arg(short)]
        v: usize,
        #[arg(short)]
        n: usize,
        /// Fraction of adjacent parameter pairs with forbidden tuples.
        #[arg(long, default_value_t = 0.0)]
        fraction_params: f64,
        /// Fraction of values forbidden per constrained parameter.
        #[arg(long, default_value_t = 0.0)]
        fraction_values: f64,
        /// Number of pre-existing tests for test suite completion.
        #[arg(long, default_value_t = 0)]
        num_tests: usize,
        /// Seed for the pre-existing tests; the configured seed otherwise.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Remove lock and temporary files left by interrupted runs.
    Clean,
}
