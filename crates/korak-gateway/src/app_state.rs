//! Shared application state for the korak gateway.
//!
//! The metrics registry and the email sender are constructed by the caller
//! (the binary or a test) and injected here; nothing is stashed in globals.

use std::sync::Arc;

use korak_core::error::Result;
use korak_core::metrics::Registry;

use crate::config::GatewayConfig;
use crate::email::EmailSender;
use crate::obs::AppMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    metrics: AppMetrics,
    email: Arc<dyn EmailSender>,
}

impl AppState {
    /// Build application state.
    /// Installs the application metrics into `registry`; seeding happens only
    /// the first time a given registry is used.
    pub fn new(cfg: GatewayConfig, registry: Arc<Registry>, email: Arc<dyn EmailSender>) -> Result<Self> {
        let metrics = AppMetrics::install(registry, &cfg.metrics)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, metrics, email }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> &AppMetrics {
        &self.inner.metrics
    }

    pub fn email(&self) -> Arc<dyn EmailSender> {
        Arc::clone(&self.inner.email)
    }
}
