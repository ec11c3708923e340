use anyhow::Result;
use clap::Parser;
use codequal::cli::{Cli, Commands};
use codequal::config::PipelineConfig;
use codequal::runner::{prepare_target, resolve_target};
use codequal::{report, runner, tools};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match cli.command {
        Commands::Analyse { path } => {
            let (path, metrics_dir) = prepare_target(&path)?;
            runner::run_analyse(&path, &metrics_dir)
        }
        Commands::Fmt { path } => runner::run_format(&resolve_target(&path)?),
        Commands::Check { path } => {
            let (path, metrics_dir) = prepare_target(&path)?;
            runner::run_check(&path, &metrics_dir)
        }
        Commands::Lint { path, fix } => {
            let (path, metrics_dir) = prepare_target(&path)?;
            runner::run_lint(&path, &metrics_dir, fix)
        }
        Commands::Test { path } => runner::run_tests(&resolve_target(&path)?),
        Commands::Coverage { path } => {
            let (path, metrics_dir) = prepare_target(&path)?;
            runner::run_coverage(&path, &metrics_dir)
        }
        Commands::Complexity { path } => {
            let (path, metrics_dir) = prepare_target(&path)?;
            runner::run_complexity(&path, &metrics_dir)
        }
        Commands::Metrics {
            path,
            jobs,
            queue_capacity,
            extensions,
            exclude,
            no_ignore,
        } => {
            let (path, metrics_dir) = prepare_target(&path)?;
            let config = PipelineConfig::new()
                .with_jobs(jobs)
                .with_queue_capacity(queue_capacity)
                .with_extensions(extensions)
                .with_exclude_patterns(exclude)
                .with_git_ignore(!no_ignore);
            runner::run_metrics(&path, &metrics_dir, config)
        }
        Commands::Report { path } => {
            let (_, metrics_dir) = prepare_target(&path)?;
            report::generate_html(&metrics_dir).map(|_| ())
        }
        Commands::Tools => tools::install_all(),
    }
}

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
