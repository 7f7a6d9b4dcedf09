//! korak gateway library entry.
//!
//! This crate wires config, the metrics catalog, the email sender and the
//! webhook receiver into an axum service. It is consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod email;
pub mod obs;
pub mod ops;
pub mod router;
pub mod webhook;
