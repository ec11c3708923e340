//! HTML dashboard rendered from the artifacts in the metrics directory.

use crate::core::Snapshot;
use anyhow::{Context, Result};
use chrono::Local;
use html_escape::encode_text;
use std::fs;
use std::path::{Path, PathBuf};

const TEMPLATE: &str = include_str!("templates/dashboard.html");

/// Everything the dashboard shows, collected from the sibling artifacts.
/// Missing artifacts leave their section empty; only a malformed
/// `report.json` is an error.
#[derive(Debug, Default)]
pub struct MetricsSummary {
    pub timestamp: String,
    pub file_rows: Vec<(String, String)>,
    pub total_files: usize,
    pub total_rows: u64,
    pub check_output: String,
    pub check_issue_count: usize,
    pub lint_issue_count: usize,
    pub coverage_percent: Option<f64>,
    pub complexity_output: String,
    pub has_coverage_html: bool,
}

/// Renders `metrics/report.html` and returns its path.
pub fn generate_html(metrics_dir: &Path) -> Result<PathBuf> {
    println!("Generating HTML report...");

    let summary = collect_metrics(metrics_dir).context("error collecting metrics")?;
    let html = render_html(&summary);

    let report_path = metrics_dir.join("report.html");
    fs::write(&report_path, html)
        .with_context(|| format!("error writing {}", report_path.display()))?;

    println!("✓ HTML report generated: {}", report_path.display());
    Ok(report_path)
}

pub fn collect_metrics(metrics_dir: &Path) -> Result<MetricsSummary> {
    let mut summary = MetricsSummary {
        timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        ..Default::default()
    };

    let report_file = metrics_dir.join("report.json");
    if let Ok(data) = fs::read_to_string(&report_file) {
        let snapshot: Snapshot = serde_json::from_str(&data)
            .with_context(|| format!("malformed {}", report_file.display()))?;
        summary.total_files = snapshot.len();
        for (id, entry) in &snapshot.0 {
            for (name, value) in entry {
                if name == crate::pipeline::NUMBER_OF_ROWS {
                    if let crate::core::MetricValue::Count(rows) = value {
                        summary.total_rows += rows;
                        summary.file_rows.push((id.clone(), rows.to_string()));
                    }
                }
            }
        }
    }

    if let Ok(data) = fs::read_to_string(metrics_dir.join("check.txt")) {
        summary.check_issue_count = data
            .lines()
            .filter(|line| line.contains("warning") || line.contains("error"))
            .count();
        summary.check_output = data;
    }

    if let Ok(data) = fs::read_to_string(metrics_dir.join("lint.json")) {
        summary.lint_issue_count = crate::runner::count_lint_issues(&data);
    }

    if let Ok(data) = fs::read_to_string(metrics_dir.join("coverage.json")) {
        summary.coverage_percent = parse_coverage_percent(&data);
    }

    if let Ok(data) = fs::read_to_string(metrics_dir.join("complexity.txt")) {
        summary.complexity_output = data;
    }

    summary.has_coverage_html = metrics_dir.join("coverage").join("index.html").exists();

    Ok(summary)
}

/// Total line coverage percentage from a cargo-llvm-cov JSON summary.
fn parse_coverage_percent(data: &str) -> Option<f64> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    value["data"][0]["totals"]["lines"]["percent"].as_f64()
}

fn render_html(summary: &MetricsSummary) -> String {
    let file_table: String = summary
        .file_rows
        .iter()
        .map(|(id, rows)| {
            format!(
                "<tr><td>{}</td><td class=\"num\">{}</td></tr>\n",
                encode_text(id),
                encode_text(rows)
            )
        })
        .collect();

    let coverage = summary
        .coverage_percent
        .map(|p| format!("{p:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());
    let coverage_link = if summary.has_coverage_html {
        r#"<a href="coverage/index.html">full coverage report</a>"#.to_string()
    } else {
        String::new()
    };

    TEMPLATE
        .replace("{{TIMESTAMP}}", &encode_text(&summary.timestamp))
        .replace("{{TOTAL_FILES}}", &summary.total_files.to_string())
        .replace("{{TOTAL_ROWS}}", &summary.total_rows.to_string())
        .replace("{{FILE_ROWS}}", &file_table)
        .replace(
            "{{CHECK_COUNT}}",
            &summary.check_issue_count.to_string(),
        )
        .replace("{{CHECK_OUTPUT}}", &encode_text(&summary.check_output))
        .replace("{{LINT_COUNT}}", &summary.lint_issue_count.to_string())
        .replace("{{COVERAGE}}", &coverage)
        .replace("{{COVERAGE_LINK}}", &coverage_link)
        .replace(
            "{{COMPLEXITY_OUTPUT}}",
            &encode_text(&summary.complexity_output),
        )
}
