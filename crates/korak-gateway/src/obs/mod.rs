//! Observability wiring: the application metric catalog on top of the
//! shared `korak_core::metrics::Registry`, rendered by the `/metrics` handler.

pub mod metrics;

pub use metrics::AppMetrics;
