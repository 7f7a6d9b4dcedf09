use std::fmt::Write;
use std::sync::Arc;

use dashmap::DashMap;

use super::atomic::AtomicF64;
use super::labels::{format_value, Desc};
use crate::error::Result;

/// Metric that can move in both directions. Used for runtime figures
/// refreshed by collectors right before a scrape.
#[derive(Clone)]
pub struct Gauge {
    inner: Arc<GaugeCore>,
}

struct GaugeCore {
    desc: Desc,
    series: DashMap<Vec<String>, Arc<AtomicF64>>,
}

impl Gauge {
    pub(crate) fn new(desc: Desc) -> Self {
        Self {
            inner: Arc::new(GaugeCore {
                desc,
                series: DashMap::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.desc.name
    }

    pub fn labels(&self, values: &[(&str, &str)]) -> Result<GaugeSeries> {
        let key = self.inner.desc.series_key(values)?;
        let value = self
            .inner
            .series
            .entry(key)
            .or_insert_with(|| Arc::new(AtomicF64::new(0.0)))
            .clone();
        Ok(GaugeSeries { value })
    }

    pub fn same_as(&self, other: &Gauge) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn render(&self, out: &mut String) {
        let desc = &self.inner.desc;
        desc.render_header("gauge", out);

        let mut rows: Vec<(Vec<String>, f64)> = self
            .inner
            .series
            .iter()
            .map(|r| (r.key().clone(), r.value().get()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, val) in rows {
            let _ = writeln!(out, "{}{} {}", desc.name, desc.label_block(&key, None), format_value(val));
        }
    }
}

/// One label series of a [`Gauge`].
#[derive(Clone)]
pub struct GaugeSeries {
    value: Arc<AtomicF64>,
}

impl GaugeSeries {
    pub fn set(&self, v: f64) {
        self.value.set(v);
    }

    /// Add a signed delta.
    pub fn add(&self, v: f64) {
        self.value.add(v);
    }

    pub fn get(&self) -> f64 {
        self.value.get()
    }
}
