//! Application metric catalog.
//!
//! Names and label schemas are scraped by dashboards and must stay stable.
//! `AppMetrics::install` is safe to run repeatedly against one registry: the
//! metrics are get-or-create and pre-population is guarded by
//! `Registry::first_init`.

use std::sync::Arc;

use korak_core::error::Result;
use korak_core::metrics::{Counter, Histogram, ProcessCollector, Registry};

use crate::config::MetricsSection;

/// Email API latency buckets, in seconds.
pub const EMAIL_DURATION_BUCKETS: [f64; 6] = [0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

pub const BOOKINGS_TOTAL: &str = "bookings_total";
pub const BOOKINGS_REVENUE: &str = "bookings_revenue_euros";
pub const USER_SIGNUPS: &str = "user_signups_total";
pub const EMAIL_SENT: &str = "email_sent_total";
pub const EMAIL_DURATION: &str = "email_send_duration_seconds";
pub const EMAIL_ERRORS: &str = "email_errors_total";

#[derive(Clone)]
pub struct AppMetrics {
    registry: Arc<Registry>,
    pub bookings_total: Counter,
    pub bookings_revenue: Counter,
    pub user_signups: Counter,
    pub emails_sent: Counter,
    pub email_duration: Histogram,
    pub email_errors: Counter,
}

impl AppMetrics {
    /// Register (or look up) every application metric in `registry` and seed
    /// the known label series on the registry's first initialization.
    pub fn install(registry: Arc<Registry>, cfg: &MetricsSection) -> Result<Self> {
        let metrics = Self {
            bookings_total: registry.get_or_create_counter(BOOKINGS_TOTAL, "Total bookings", &["status", "type"])?,
            bookings_revenue: registry.get_or_create_counter(
                BOOKINGS_REVENUE,
                "Total booking revenue in euros",
                &["type"],
            )?,
            user_signups: registry.get_or_create_counter(USER_SIGNUPS, "Total user signups", &["locale"])?,
            emails_sent: registry.get_or_create_counter(EMAIL_SENT, "Emails sent by template", &["template"])?,
            email_duration: registry.get_or_create_histogram(
                EMAIL_DURATION,
                "Email API latency",
                &["template"],
                &EMAIL_DURATION_BUCKETS,
            )?,
            email_errors: registry.get_or_create_counter(EMAIL_ERRORS, "Failed email sends", &["template"])?,
            registry,
        };

        if metrics.registry.first_init() {
            metrics.prepopulate(cfg)?;
            if cfg.process_metrics {
                let collector = ProcessCollector::register(&metrics.registry)?;
                metrics.registry.register_collector(Arc::new(collector));
            }
            tracing::info!(metrics = metrics.registry.len(), "metrics registry initialized");
        } else {
            tracing::debug!("metrics registry already initialized; skipping pre-population");
        }

        Ok(metrics)
    }

    /// Seed every expected series with 0 so it is scraped before first use.
    fn prepopulate(&self, cfg: &MetricsSection) -> Result<()> {
        for status in &cfg.booking_statuses {
            for ty in &cfg.booking_types {
                self.bookings_total
                    .labels(&[("status", status.as_str()), ("type", ty.as_str())])?
                    .inc_by(0.0);
            }
        }
        for ty in &cfg.booking_types {
            self.bookings_revenue.labels(&[("type", ty.as_str())])?.inc_by(0.0);
        }
        for locale in &cfg.locales {
            self.user_signups.labels(&[("locale", locale.as_str())])?.inc_by(0.0);
        }
        for template in &cfg.sent_templates {
            self.emails_sent.labels(&[("template", template.as_str())])?.inc_by(0.0);
        }
        for template in &cfg.error_templates {
            self.email_errors.labels(&[("template", template.as_str())])?.inc_by(0.0);
        }
        Ok(())
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Record one booking event and its revenue.
    ///
    /// No route in this service books lessons; booking flows that share the
    /// registry call this so their series match the pre-populated ones.
    pub fn record_booking(&self, status: &str, booking_type: &str, revenue_euros: f64) -> Result<()> {
        self.bookings_total
            .labels(&[("status", status), ("type", booking_type)])?
            .inc();
        self.bookings_revenue
            .labels(&[("type", booking_type)])?
            .inc_by(revenue_euros);
        Ok(())
    }

    /// Render the whole registry for a scrape.
    pub fn render(&self) -> String {
        self.registry.serialize()
    }
}
