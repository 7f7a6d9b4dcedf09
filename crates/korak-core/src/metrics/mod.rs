//! In-process metrics registry rendered in Prometheus text format.
//!
//! Counters, gauges and histograms carry dynamic labels backed by `DashMap`,
//! with values stored in atomics so concurrent handlers can report without
//! locking. Registration is get-or-create: declaring a name twice hands back
//! the instance registered first.

mod atomic;
mod collector;
mod counter;
mod gauge;
mod histogram;
mod labels;
mod registry;

pub use collector::{Collector, ProcessCollector};
pub use counter::{Counter, CounterSeries};
pub use gauge::{Gauge, GaugeSeries};
pub use histogram::{Histogram, HistogramSeries, HistogramTimer};
pub use registry::{MetricKind, Registry};

/// Content type of the text exposition format produced by [`Registry::serialize`].
pub const TEXT_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";
