//! Fixed pool of metric workers.
//!
//! Each worker loops on the queue until it is closed and empty, computes
//! every configured metric against the dequeued handle, and records the
//! results in the aggregator. `join` is the completion barrier the report
//! writer waits on.

use crate::core::MetricsAggregator;
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::metric::Metric;
use crate::pipeline::queue::{WorkItem, WorkReceiver};
use crossbeam::select;
use std::io::{Seek, SeekFrom};
use std::sync::Arc;
use std::thread::JoinHandle;

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `jobs` workers. Called before traversal begins so discovery
    /// and computation overlap.
    pub fn spawn(
        jobs: usize,
        queue: WorkReceiver,
        aggregator: Arc<MetricsAggregator>,
        metrics: Arc<Vec<Box<dyn Metric>>>,
        cancel: CancellationToken,
    ) -> Self {
        let handles = (0..jobs)
            .map(|worker| {
                let queue = queue.clone();
                let aggregator = Arc::clone(&aggregator);
                let metrics = Arc::clone(&metrics);
                let cancel = cancel.clone();
                std::thread::Builder::new()
                    .name(format!("metric-worker-{worker}"))
                    .spawn(move || worker_loop(&queue, &aggregator, &metrics, &cancel))
                    .expect("failed to spawn metric worker")
            })
            .collect();

        Self { handles }
    }

    /// Completion barrier: returns only once every worker has exited.
    pub fn join(self) {
        for handle in self.handles {
            if handle.join().is_err() {
                log::error!("metric worker panicked");
            }
        }
    }
}

fn worker_loop(
    queue: &WorkReceiver,
    aggregator: &MetricsAggregator,
    metrics: &[Box<dyn Metric>],
    cancel: &CancellationToken,
) {
    loop {
        let item = select! {
            recv(queue) -> msg => match msg {
                Ok(item) => item,
                // Queue closed and empty: the termination sentinel.
                Err(_) => break,
            },
            recv(cancel.observer()) -> _ => break,
        };
        process_item(item, aggregator, metrics);
    }
}

/// Computes all metrics for one file. The handle is released when `item`
/// drops at the end of the call.
fn process_item(mut item: WorkItem, aggregator: &MetricsAggregator, metrics: &[Box<dyn Metric>]) {
    for metric in metrics {
        if let Err(e) = item.file.seek(SeekFrom::Start(0)) {
            log::warn!("cannot rewind {}: {}", item.id, e);
            return;
        }
        let value = match metric.compute(&mut item.file) {
            Ok(value) => value,
            Err(e) => {
                // Metric omitted for this file; the pipeline continues.
                log::warn!("{} failed for {}: {}", metric.name(), item.id, e);
                continue;
            }
        };
        if let Err(e) = aggregator.set_metric(&item.id, metric.name(), value) {
            log::warn!("dropping metric write: {e}");
        }
    }
}
