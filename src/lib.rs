// Export modules for library usage
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod tools;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use crate::core::{MetricEntry, MetricValue, MetricsAggregator, Snapshot};
pub use crate::errors::CodequalError;
pub use crate::io::ReportWriter;
pub use crate::pipeline::{
    cancellation, CancellationSource, CancellationToken, LineCount, Metric, MetricsPipeline,
    NUMBER_OF_ROWS,
};
