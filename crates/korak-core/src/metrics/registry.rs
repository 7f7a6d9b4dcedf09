use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use super::collector::Collector;
use super::counter::Counter;
use super::gauge::Gauge;
use super::histogram::Histogram;
use super::labels::Desc;
use crate::error::{KorakError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
        }
    }
}

#[derive(Clone)]
enum Metric {
    Counter(Counter),
    Gauge(Gauge),
    Histogram(Histogram),
}

impl Metric {
    fn kind(&self) -> MetricKind {
        match self {
            Metric::Counter(_) => MetricKind::Counter,
            Metric::Gauge(_) => MetricKind::Gauge,
            Metric::Histogram(_) => MetricKind::Histogram,
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Metric::Counter(c) => c.render(out),
            Metric::Gauge(g) => g.render(out),
            Metric::Histogram(h) => h.render(out),
        }
    }

    fn kind_error(&self, name: &str, expected: MetricKind) -> KorakError {
        KorakError::MetricKind {
            name: name.to_string(),
            expected: expected.as_str(),
            found: self.kind().as_str(),
        }
    }
}

struct Entry {
    seq: u64,
    metric: Metric,
}

/// Process-wide set of metrics, constructed once at startup and shared by
/// `Arc` with every handler.
///
/// Registration is get-or-create keyed by metric name: the first declaration
/// wins and later ones receive the same handle, whatever help text or labels
/// they pass. Serialization lists metrics in registration order.
#[derive(Default)]
pub struct Registry {
    metrics: DashMap<String, Entry>,
    next_seq: AtomicU64,
    initialized: AtomicBool,
    collectors: Mutex<Vec<Arc<dyn Collector>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_counter(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Counter> {
        if let Some(e) = self.metrics.get(name) {
            return match &e.metric {
                Metric::Counter(c) => Ok(c.clone()),
                other => Err(other.kind_error(name, MetricKind::Counter)),
            };
        }
        let desc = Desc::new(name, help, label_names, false)?;
        let metric = self.insert_or_existing(name, Metric::Counter(Counter::new(desc)));
        match metric {
            Metric::Counter(c) => Ok(c),
            other => Err(other.kind_error(name, MetricKind::Counter)),
        }
    }

    pub fn get_or_create_gauge(&self, name: &str, help: &str, label_names: &[&str]) -> Result<Gauge> {
        if let Some(e) = self.metrics.get(name) {
            return match &e.metric {
                Metric::Gauge(g) => Ok(g.clone()),
                other => Err(other.kind_error(name, MetricKind::Gauge)),
            };
        }
        let desc = Desc::new(name, help, label_names, false)?;
        let metric = self.insert_or_existing(name, Metric::Gauge(Gauge::new(desc)));
        match metric {
            Metric::Gauge(g) => Ok(g),
            other => Err(other.kind_error(name, MetricKind::Gauge)),
        }
    }

    /// `buckets` are ascending upper bounds; `+Inf` is always appended.
    pub fn get_or_create_histogram(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
        buckets: &[f64],
    ) -> Result<Histogram> {
        if let Some(e) = self.metrics.get(name) {
            return match &e.metric {
                Metric::Histogram(h) => Ok(h.clone()),
                other => Err(other.kind_error(name, MetricKind::Histogram)),
            };
        }
        let desc = Desc::new(name, help, label_names, true)?;
        let metric = self.insert_or_existing(name, Metric::Histogram(Histogram::new(desc, buckets)?));
        match metric {
            Metric::Histogram(h) => Ok(h),
            other => Err(other.kind_error(name, MetricKind::Histogram)),
        }
    }

    /// Lookup-or-insert under the map's entry lock. When two callers race on
    /// the same name, the loser's candidate is discarded.
    fn insert_or_existing(&self, name: &str, candidate: Metric) -> Metric {
        let entry = self.metrics.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!(metric = %name, kind = candidate.kind().as_str(), "metric registered");
            Entry {
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                metric: candidate.clone(),
            }
        });
        entry.metric.clone()
    }

    /// Kind of the metric registered under `name`, if any.
    pub fn kind_of(&self, name: &str) -> Option<MetricKind> {
        self.metrics.get(name).map(|e| e.metric.kind())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Returns `true` for exactly one caller over the registry's lifetime.
    ///
    /// Wiring code checks this before pre-populating series so that building
    /// the application twice against one registry seeds it only once.
    pub fn first_init(&self) -> bool {
        self.initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Add a collector that refreshes its metrics before every serialization.
    pub fn register_collector(&self, collector: Arc<dyn Collector>) {
        self.collectors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(collector);
    }

    /// Render every metric and every touched series in Prometheus text
    /// exposition format (version 0.0.4).
    pub fn serialize(&self) -> String {
        let collectors: Vec<Arc<dyn Collector>> = self
            .collectors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        for c in &collectors {
            c.collect();
        }

        let mut entries: Vec<(u64, Metric)> = self
            .metrics
            .iter()
            .map(|e| (e.seq, e.metric.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);

        let mut out = String::with_capacity(4096);
        for (_, metric) in entries {
            metric.render(&mut out);
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_clash_is_an_error() {
        let r = Registry::new();
        r.get_or_create_counter("user_signups_total", "Total user signups", &["locale"])
            .unwrap();
        let err = r
            .get_or_create_histogram("user_signups_total", "x", &["locale"], &[1.0])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            KorakError::MetricKind { expected: "histogram", found: "counter", .. }
        ));
        assert_eq!(r.kind_of("user_signups_total"), Some(MetricKind::Counter));
    }

    #[test]
    fn invalid_definition_registers_nothing() {
        let r = Registry::new();
        assert!(r.get_or_create_counter("bad-name", "", &[]).is_err());
        assert!(r
            .get_or_create_histogram("h", "", &[], &[2.0, 1.0])
            .is_err());
        assert!(r.is_empty());
    }

    #[test]
    fn first_init_fires_once() {
        let r = Registry::new();
        assert!(r.first_init());
        assert!(!r.first_init());
        assert!(!r.first_init());
    }

    #[test]
    fn serialize_uses_registration_order() {
        let r = Registry::new();
        r.get_or_create_counter("zeta_total", "z", &[]).unwrap().labels(&[]).unwrap().inc();
        r.get_or_create_counter("alpha_total", "a", &[]).unwrap().labels(&[]).unwrap().inc();

        let out = r.serialize();
        let zeta = out.find("zeta_total").unwrap();
        let alpha = out.find("alpha_total").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn untouched_metric_renders_header_only() {
        let r = Registry::new();
        r.get_or_create_counter("email_errors_total", "Failed email sends", &["template"])
            .unwrap();
        assert_eq!(
            r.serialize(),
            "# HELP email_errors_total Failed email sends\n# TYPE email_errors_total counter\n"
        );
    }
}
