//! External-tool orchestration.
//!
//! Thin process glue around cargo tooling, one function per tool, each
//! capturing output into the `metrics/` artifact directory. Tool findings
//! (check warnings, lint issues, complex functions) are reported but never
//! fatal; only failing to invoke a tool, or a failing build/test, errors.

use crate::config::PipelineConfig;
use crate::errors::CodequalError;
use crate::io::ReportWriter;
use crate::pipeline::MetricsPipeline;
use crate::{report, tools};
use anyhow::{anyhow, Context, Result};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolves and validates the target directory.
pub fn resolve_target(path: &Path) -> Result<PathBuf> {
    let absolute = path
        .canonicalize()
        .map_err(|e| CodequalError::io(path, e))
        .with_context(|| format!("path does not exist: {}", path.display()))?;
    if !absolute.is_dir() {
        return Err(anyhow!("not a directory: {}", absolute.display()));
    }
    Ok(absolute)
}

/// Resolves the target and ensures its `metrics/` artifact directory.
pub fn prepare_target(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let absolute = resolve_target(path)?;
    let metrics_dir = absolute.join("metrics");
    fs::create_dir_all(&metrics_dir).map_err(|e| CodequalError::io(&metrics_dir, e))?;
    Ok((absolute, metrics_dir))
}

/// Runs the full sequence: format, check, lint with fixes, tests,
/// coverage, complexity, the metrics pipeline, and the HTML dashboard.
/// Stops at the first step error.
pub fn run_analyse(path: &Path, metrics_dir: &Path) -> Result<()> {
    println!("Starting full analysis...");

    let steps: &[(&str, fn(&Path, &Path) -> Result<()>)] = &[
        ("Format", |p, _| run_format(p)),
        ("Check", run_check),
        ("Lint with fixes", |p, m| run_lint(p, m, true)),
        ("Tests", |p, _| run_tests(p)),
        ("Coverage", run_coverage),
        ("Complexity", run_complexity),
        ("Metrics", |p, m| run_metrics(p, m, PipelineConfig::default())),
        ("HTML report", |_, m| report::generate_html(m).map(|_| ())),
    ];

    for (name, step) in steps {
        println!("\n=== {name} ===");
        step(path, metrics_dir).with_context(|| format!("analysis failed at step: {name}"))?;
    }

    println!("\n=== Analysis complete ===");
    println!("Reports written to: {}", metrics_dir.display());
    Ok(())
}

/// Formats the tree with `cargo fmt`.
pub fn run_format(path: &Path) -> Result<()> {
    println!("Formatting code with cargo fmt...");
    let status = Command::new("cargo")
        .arg("fmt")
        .current_dir(path)
        .status()
        .context("failed to run cargo fmt")?;

    if !status.success() {
        return Err(anyhow!("cargo fmt exited with {status}"));
    }
    println!("{} Format complete", "✓".green());
    Ok(())
}

/// Runs `cargo check` and captures its combined output to
/// `metrics/check.txt`. Findings are reported, not fatal.
pub fn run_check(path: &Path, metrics_dir: &Path) -> Result<()> {
    println!("Running cargo check...");
    let check_file = metrics_dir.join("check.txt");

    let output = Command::new("cargo")
        .args(["check", "--all-targets"])
        .current_dir(path)
        .output()
        .context("failed to run cargo check")?;

    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);
    fs::write(&check_file, &combined)
        .with_context(|| format!("error writing {}", check_file.display()))?;

    if !output.status.success() {
        eprintln!(
            "cargo check found issues (see {}):\n{}",
            check_file.display(),
            String::from_utf8_lossy(&combined)
        );
    }

    println!(
        "{} Check complete (output: {})",
        "✓".green(),
        check_file.display()
    );
    Ok(())
}

/// Runs clippy with `--message-format=json`, capturing the diagnostic
/// stream to `metrics/lint.json`. Lint findings are non-fatal.
pub fn run_lint(path: &Path, metrics_dir: &Path, fix: bool) -> Result<()> {
    tools::require(
        "cargo-clippy",
        "not found; install it with `rustup component add clippy`",
    )?;

    let lint_file = metrics_dir.join("lint.json");
    let mut args = vec!["clippy", "--message-format=json"];
    if fix {
        args.extend(["--fix", "--allow-dirty", "--allow-staged"]);
        println!("Running cargo clippy with --fix...");
    } else {
        println!("Running cargo clippy...");
    }

    let output = Command::new("cargo")
        .args(&args)
        .current_dir(path)
        .output()
        .context("failed to run cargo clippy")?;

    fs::write(&lint_file, &output.stdout)
        .with_context(|| format!("error writing {}", lint_file.display()))?;

    let issues = count_lint_issues(&String::from_utf8_lossy(&output.stdout));
    if issues > 0 {
        println!("Lint issues found: {issues}");
        // Second human-readable pass for the console, findings already
        // captured above.
        let _ = Command::new("cargo")
            .arg("clippy")
            .current_dir(path)
            .status();
    }

    if !output.status.success() {
        eprintln!("cargo clippy found issues (see {})", lint_file.display());
    }

    println!(
        "{} Lint complete (report: {})",
        "✓".green(),
        lint_file.display()
    );
    Ok(())
}

/// Counts `compiler-message` diagnostics with warning or error level in a
/// cargo JSON diagnostic stream.
pub fn count_lint_issues(json_lines: &str) -> usize {
    json_lines
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter(|msg| msg["reason"] == "compiler-message")
        .filter(|msg| {
            matches!(
                msg["message"]["level"].as_str(),
                Some("warning") | Some("error")
            )
        })
        .count()
}

/// Runs the test suite. Test failure fails the step.
pub fn run_tests(path: &Path) -> Result<()> {
    println!("Running tests...");
    let status = Command::new("cargo")
        .arg("test")
        .current_dir(path)
        .status()
        .context("failed to run cargo test")?;

    if !status.success() {
        return Err(anyhow!("tests failed with {status}"));
    }
    println!("{} Tests passed", "✓".green());
    Ok(())
}

/// Runs tests under cargo-llvm-cov, writing a JSON summary to
/// `metrics/coverage.json` and an HTML report under `metrics/coverage/`.
pub fn run_coverage(path: &Path, metrics_dir: &Path) -> Result<()> {
    if !tools::is_installed("cargo-llvm-cov") {
        println!("cargo-llvm-cov not found, installing...");
        tools::install_cargo_llvm_cov().context("error installing cargo-llvm-cov")?;
    }

    println!("Running tests with coverage...");
    let coverage_json = metrics_dir.join("coverage.json");
    let coverage_html = metrics_dir.join("coverage");

    let status = Command::new("cargo")
        .args(["llvm-cov", "--json", "--summary-only", "--output-path"])
        .arg(&coverage_json)
        .current_dir(path)
        .status()
        .context("failed to run cargo llvm-cov")?;
    if !status.success() {
        return Err(anyhow!("coverage tests failed with {status}"));
    }

    let status = Command::new("cargo")
        .args(["llvm-cov", "report", "--html", "--output-dir"])
        .arg(&coverage_html)
        .current_dir(path)
        .status()
        .context("failed to generate HTML coverage report")?;
    if !status.success() {
        return Err(anyhow!("coverage HTML generation failed with {status}"));
    }

    println!(
        "{} Coverage complete (summary: {}, HTML: {})",
        "✓".green(),
        coverage_json.display(),
        coverage_html.display()
    );
    Ok(())
}

/// Dumps per-file complexity metrics to `metrics/complexity.txt`. A
/// non-zero exit only means findings; it does not fail the step.
pub fn run_complexity(path: &Path, metrics_dir: &Path) -> Result<()> {
    if !tools::is_installed("rust-code-analysis-cli") {
        println!("rust-code-analysis-cli not found, installing...");
        tools::install_rust_code_analysis().context("error installing rust-code-analysis-cli")?;
    }

    println!("Running complexity analysis...");
    let complexity_file = metrics_dir.join("complexity.txt");

    let output = Command::new("rust-code-analysis-cli")
        .args(["--metrics", "--paths"])
        .arg(path)
        .output()
        .context("failed to run rust-code-analysis-cli")?;

    let mut combined = output.stdout;
    combined.extend_from_slice(&output.stderr);
    fs::write(&complexity_file, &combined)
        .with_context(|| format!("error writing {}", complexity_file.display()))?;

    println!(
        "{} Complexity analysis complete (output: {})",
        "✓".green(),
        complexity_file.display()
    );
    Ok(())
}

/// Runs the concurrent metrics pipeline over `path` and publishes the
/// per-file report to `metrics/report.json`.
pub fn run_metrics(path: &Path, metrics_dir: &Path, config: PipelineConfig) -> Result<()> {
    println!("Collecting per-file metrics...");

    let snapshot = MetricsPipeline::new(config).run(path)?;
    let writer = ReportWriter::new(metrics_dir.join("report.json"));
    writer.write(&snapshot)?;

    println!(
        "{} Metrics complete ({} files, report: {})",
        "✓".green(),
        snapshot.len(),
        writer.path().display()
    );
    Ok(())
}
