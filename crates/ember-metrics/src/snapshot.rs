//! Point-in-time metric snapshots

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Metrics;

/// Snapshot of all metrics at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Counter values
    pub counters: HashMap<String, u64>,
    /// Gauge values
    pub gauges: HashMap<String, i64>,
    /// Histogram summaries
    pub histograms: HashMap<String, HistogramSummary>,
}

/// Summary of a histogram
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Mean value
    pub mean: f64,
    /// Largest observed value
    pub max: f64,
    /// Total observation count
    pub count: u64,
}

impl MetricsSnapshot {
    /// Create a snapshot from a Metrics instance
    pub fn from_metrics(metrics: &Metrics) -> Self {
        let counters = metrics.all_counters().into_iter().collect();
        let gauges = metrics.all_gauges().into_iter().collect();
        let histograms = metrics
            .all_histograms()
            .into_iter()
            .map(|(name, mean, max, count)| (name, HistogramSummary { mean, max, count }))
            .collect();

        Self {
            counters,
            gauges,
            histograms,
        }
    }

    /// Export snapshot as pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json() {
        let metrics = Metrics::new();
        metrics.inc("txpool.accepted", 100);
        metrics.set("txpool.pending", 5);
        metrics.observe("txpool.add", 50.0);

        let snapshot = MetricsSnapshot::from_metrics(&metrics);
        let json = snapshot.to_json().unwrap();

        assert!(json.contains("txpool.accepted"));
        assert!(json.contains("100"));
        assert!(json.contains("txpool.pending"));
    }
}
