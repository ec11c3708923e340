//! Concurrent file-discovery-and-metrics pipeline.
//!
//! One run moves through: Idle → Walking+Working (walker and pool run
//! concurrently) → Draining (queue closed, workers finishing) → Barrier
//! (all workers exited) → Serializing → Done. No state is re-enterable; a
//! fresh run builds a fresh pipeline.

pub mod cancel;
pub mod metric;
pub mod queue;
pub mod walker;
pub mod worker;

pub use cancel::{cancellation, CancellationSource, CancellationToken};
pub use metric::{LineCount, Metric, NUMBER_OF_ROWS};

use crate::config::PipelineConfig;
use crate::core::{MetricsAggregator, Snapshot};
use crate::errors::CodequalError;
use crate::pipeline::queue::work_queue;
use crate::pipeline::walker::Walker;
use crate::pipeline::worker::WorkerPool;
use std::path::Path;
use std::sync::Arc;

pub struct MetricsPipeline {
    config: PipelineConfig,
    metrics: Vec<Box<dyn Metric>>,
}

impl MetricsPipeline {
    /// Pipeline with the default metric set (line count).
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            metrics: vec![Box::new(LineCount)],
        }
    }

    /// Adds a metric computed for every discovered file.
    pub fn with_metric(mut self, metric: Box<dyn Metric>) -> Self {
        self.metrics.push(metric);
        self
    }

    /// Replaces the metric set entirely.
    pub fn with_metrics(mut self, metrics: Vec<Box<dyn Metric>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Runs discovery and computation to completion and returns the final
    /// snapshot.
    pub fn run(self, root: &Path) -> Result<Snapshot, CodequalError> {
        let (_source, token) = cancellation();
        self.run_with_cancellation(root, &token)
    }

    /// As [`run`](Self::run), but observing an external cancellation
    /// token. A cancelled run returns `CodequalError::Cancelled` after the
    /// workers have exited and released their handles.
    pub fn run_with_cancellation(
        self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<Snapshot, CodequalError> {
        let walker = Walker::new(root, &self.config)?;
        let aggregator = Arc::new(MetricsAggregator::new());
        let (sender, receiver) = work_queue(self.config.queue_capacity());
        let metrics = Arc::new(self.metrics);

        // Workers start before traversal so discovery and computation
        // overlap from the first file.
        let pool = WorkerPool::spawn(
            self.config.jobs(),
            receiver,
            Arc::clone(&aggregator),
            metrics,
            cancel.clone(),
        );

        // Walker::run consumes the sender: the queue closes exactly once,
        // whether traversal finished or aborted, so the pool always drains
        // and the barrier below always returns.
        let walked = walker.run(&aggregator, sender, cancel);

        pool.join();

        let enqueued = walked?;
        if cancel.is_cancelled() {
            return Err(CodequalError::Cancelled);
        }

        log::info!(
            "metrics pipeline complete: {} files discovered, {} enqueued",
            aggregator.len(),
            enqueued
        );
        Ok(aggregator.snapshot())
    }
}
