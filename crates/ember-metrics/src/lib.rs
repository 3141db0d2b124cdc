//! # ember-metrics
//!
//! Observability and metrics collection for EmberLedger.
//!
//! Features:
//! - Histogram for latency tracking
//! - Counter for event counting
//! - Gauge for current values
//! - JSON-exportable snapshots

#![warn(missing_docs)]
#![warn(clippy::all)]

mod histogram;
mod registry;
mod snapshot;

pub use histogram::Histogram;
pub use registry::Metrics;
pub use snapshot::{HistogramSummary, MetricsSnapshot};

/// Macro for timing a block of code
#[macro_export]
macro_rules! timed {
    ($metrics:expr, $name:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        $metrics.observe($name, start.elapsed().as_micros() as f64);
        result
    }};
}
