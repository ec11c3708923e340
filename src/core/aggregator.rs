//! Thread-safe store of per-file metrics.
//!
//! The aggregator is the single shared mutable structure in the pipeline.
//! A file must be registered before any metric may be recorded against it;
//! the walker guarantees this by registering each file before it hands the
//! file to the pool. Writes for unregistered files are recoverable errors,
//! never panics.

use crate::core::{MetricEntry, MetricValue, Snapshot};
use crate::errors::CodequalError;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MetricsAggregator {
    data: Mutex<BTreeMap<String, MetricEntry>>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty metric entry for `id`. Registering the same id
    /// again installs a fresh empty entry (last registration wins).
    pub fn register_file(&self, id: &str) {
        let mut data = self.data.lock();
        data.insert(id.to_string(), MetricEntry::new());
    }

    /// Records a metric for an already-registered file.
    ///
    /// Returns `CodequalError::UnregisteredFile` when `id` was never
    /// registered; the caller logs and continues.
    pub fn set_metric(
        &self,
        id: &str,
        name: &str,
        value: MetricValue,
    ) -> Result<(), CodequalError> {
        let mut data = self.data.lock();
        match data.get_mut(id) {
            Some(entry) => {
                entry.insert(name.to_string(), value);
                Ok(())
            }
            None => Err(CodequalError::UnregisteredFile { id: id.to_string() }),
        }
    }

    /// Number of registered files.
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Consistent deep copy of the full mapping. Entry mutation holds the
    /// same lock, so a snapshot never observes a half-written entry.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.data.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn register_then_set_metric() {
        let aggregator = MetricsAggregator::new();
        aggregator.register_file("src/a.rs");
        aggregator
            .set_metric("src/a.rs", "number_of_rows", MetricValue::Count(42))
            .unwrap();

        let snapshot = aggregator.snapshot();
        assert_eq!(
            snapshot.get("src/a.rs").and_then(|e| e.get("number_of_rows")),
            Some(&MetricValue::Count(42))
        );
    }

    #[test]
    fn set_metric_on_unregistered_file_is_recoverable() {
        let aggregator = MetricsAggregator::new();
        let err = aggregator
            .set_metric("src/ghost.rs", "number_of_rows", MetricValue::Count(1))
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(aggregator.snapshot().is_empty());
    }

    #[test]
    fn reregistration_installs_fresh_entry() {
        let aggregator = MetricsAggregator::new();
        aggregator.register_file("src/a.rs");
        aggregator
            .set_metric("src/a.rs", "number_of_rows", MetricValue::Count(10))
            .unwrap();
        aggregator.register_file("src/a.rs");

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.get("src/a.rs").unwrap().is_empty());
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let aggregator = MetricsAggregator::new();
        aggregator.register_file("src/a.rs");
        let before = aggregator.snapshot();

        aggregator
            .set_metric("src/a.rs", "number_of_rows", MetricValue::Count(5))
            .unwrap();

        assert!(before.get("src/a.rs").unwrap().is_empty());
        assert!(!aggregator.snapshot().get("src/a.rs").unwrap().is_empty());
    }

    #[test]
    fn concurrent_writers_record_every_metric() {
        let aggregator = Arc::new(MetricsAggregator::new());
        for i in 0..100 {
            aggregator.register_file(&format!("src/f{i}.rs"));
        }

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let aggregator = Arc::clone(&aggregator);
                std::thread::spawn(move || {
                    for i in (worker..100).step_by(4) {
                        aggregator
                            .set_metric(
                                &format!("src/f{i}.rs"),
                                "number_of_rows",
                                MetricValue::Count(i as u64),
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.len(), 100);
        for i in 0..100 {
            assert_eq!(
                snapshot
                    .get(&format!("src/f{i}.rs"))
                    .and_then(|e| e.get("number_of_rows")),
                Some(&MetricValue::Count(i as u64))
            );
        }
    }
}
