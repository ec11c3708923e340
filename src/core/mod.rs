pub mod aggregator;

pub use aggregator::MetricsAggregator;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single metric value. Metrics are polymorphic: counts serialize as
/// numbers, everything else as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Text(String),
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        Self::Count(value)
    }
}

impl From<usize> for MetricValue {
    fn from(value: usize) -> Self {
        Self::Count(value as u64)
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Metrics recorded for one file: metric name to value.
pub type MetricEntry = BTreeMap<String, MetricValue>;

/// Immutable point-in-time copy of the aggregator contents, keyed by
/// normalized relative path. This is the shape of the published report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot(pub BTreeMap<String, MetricEntry>);

impl Snapshot {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MetricEntry> {
        self.0.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}
