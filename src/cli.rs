use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "codequal")]
#[command(about = "Code quality analysis for Rust projects", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full analysis sequence (fmt, check, lint with fixes,
    /// tests, coverage, complexity, metrics, HTML report)
    Analyse {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Format code with cargo fmt
    Fmt {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Run cargo check and write output to metrics/check.txt
    Check {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Run cargo clippy and write JSON diagnostics to metrics/lint.json
    Lint {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Apply machine-applicable fixes
        #[arg(long)]
        fix: bool,
    },

    /// Run the test suite
    Test {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Run tests with coverage (metrics/coverage.json and metrics/coverage/)
    Coverage {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Run complexity analysis (metrics/complexity.txt)
    Complexity {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Run the per-file metrics pipeline (metrics/report.json)
    Metrics {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Number of metric workers (0 = logical CPU count)
        #[arg(short, long, default_value_t = crate::config::DEFAULT_WORKERS)]
        jobs: usize,

        /// Bound on the discovery queue (caps in-flight file handles)
        #[arg(long, default_value_t = crate::config::DEFAULT_QUEUE_CAPACITY)]
        queue_capacity: usize,

        /// File extensions to analyze
        #[arg(long = "extension", value_delimiter = ',', default_value = "rs")]
        extensions: Vec<String>,

        /// Glob patterns to exclude
        #[arg(long = "exclude", value_delimiter = ',')]
        exclude: Vec<String>,

        /// Also analyze files matched by .gitignore
        #[arg(long = "no-ignore")]
        no_ignore: bool,
    },

    /// Render the HTML dashboard from the metrics directory
    Report {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Install required tools (cargo-llvm-cov, rust-code-analysis-cli)
    Tools,
}
