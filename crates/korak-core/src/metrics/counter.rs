use std::fmt::Write;
use std::sync::Arc;

use dashmap::DashMap;

use super::atomic::AtomicF64;
use super::labels::{format_value, Desc};
use crate::error::Result;

/// Monotonically non-decreasing metric with a fixed label schema.
///
/// Cloning is cheap and every clone refers to the same series map, so a
/// handle obtained from [`super::Registry::get_or_create_counter`] can be
/// stored in any number of request handlers.
#[derive(Clone)]
pub struct Counter {
    inner: Arc<CounterCore>,
}

struct CounterCore {
    desc: Desc,
    series: DashMap<Vec<String>, Arc<AtomicF64>>,
}

impl Counter {
    pub(crate) fn new(desc: Desc) -> Self {
        Self {
            inner: Arc::new(CounterCore {
                desc,
                series: DashMap::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.desc.name
    }

    pub fn help(&self) -> &str {
        &self.inner.desc.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.inner.desc.label_names
    }

    /// Return the series for `values`, creating it at 0 if absent.
    pub fn labels(&self, values: &[(&str, &str)]) -> Result<CounterSeries> {
        let key = self.inner.desc.series_key(values)?;
        let value = self
            .inner
            .series
            .entry(key)
            .or_insert_with(|| Arc::new(AtomicF64::new(0.0)))
            .clone();
        Ok(CounterSeries { value })
    }

    /// Read a series without creating it.
    pub fn get(&self, values: &[(&str, &str)]) -> Option<f64> {
        let key = self.inner.desc.series_key(values).ok()?;
        self.inner.series.get(&key).map(|v| v.get())
    }

    /// Number of series touched so far.
    pub fn series_len(&self) -> usize {
        self.inner.series.len()
    }

    /// Whether both handles point at the same registered counter.
    pub fn same_as(&self, other: &Counter) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn render(&self, out: &mut String) {
        let desc = &self.inner.desc;
        desc.render_header("counter", out);

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

/// One label series of a [`Counter`].
#[derive(Clone)]
pub struct CounterSeries {
    value: Arc<AtomicF64>,
}

impl CounterSeries {
    /// Increment by 1.
    pub fn inc(&self) {
        self.inc_by(1.0);
    }

    /// Increment by an arbitrary non-negative value. `0.0` is valid and only
    /// makes sure the series exists.
    pub fn inc_by(&self, v: f64) {
        if v.is_nan() || v < 0.0 {
            tracing::warn!(amount = v, "counter increment must be non-negative; ignored");
            return;
        }
        if v > 0.0 {
            self.value.add(v);
        }
    }

    pub fn get(&self) -> f64 {
        self.value.get()
    }
}
