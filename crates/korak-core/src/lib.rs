//! korak core: transport-agnostic error types and the metrics registry.
//!
//! This crate defines the error surface shared by the gateway and the
//! in-process Prometheus registry that request handlers report into. It
//! carries no HTTP or async runtime dependencies so it can be reused by any
//! handler that needs counters or histograms.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Misuse of the registry (wrong label set, kind clash) surfaces as
//! `KorakError`/`Result` so a bad call site cannot crash the process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{KorakError, Result};
