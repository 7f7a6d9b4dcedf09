//! Top-level facade crate for korak.
//!
//! Re-exports the core metrics/error types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use korak_core::*;
}

pub mod gateway {
    pub use korak_gateway::*;
}
