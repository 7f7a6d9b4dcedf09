//! Histogram with caller-supplied bucket bounds (seconds for timers).
//!
//! Buckets are cumulative at write time: an observation increments every
//! bucket whose upper bound it does not exceed. The `+Inf` bucket is the
//! observation count and is not stored separately.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use super::atomic::AtomicF64;
use super::labels::{format_value, Desc};
use crate::error::{KorakError, Result};

#[derive(Clone)]
pub struct Histogram {
    inner: Arc<HistogramCore>,
}

struct HistogramCore {
    desc: Desc,
    bounds: Arc<[f64]>,
    series: DashMap<Vec<String>, Arc<SeriesState>>,
}

struct SeriesState {
    bounds: Arc<[f64]>,
    buckets: Vec<AtomicU64>,
    count: AtomicU64,
    sum: AtomicF64,
}

impl SeriesState {
    fn new(bounds: Arc<[f64]>) -> Self {
        let buckets = bounds.iter().map(|_| AtomicU64::new(0)).collect();
        Self {
            bounds,
            buckets,
            count: AtomicU64::new(0),
            sum: AtomicF64::new(0.0),
        }
    }

    /// Bucket counts and total count for one scrape.
    ///
    /// Observations land in several atomics, so a concurrent read can catch
    /// one half-applied. `count` is read first and each bucket is clamped to
    /// `[previous bucket, count]`, which keeps the exposition cumulative with
    /// `+Inf == _count`.
    fn snapshot(&self) -> (Vec<u64>, u64) {
        let count = self.count.load(Ordering::Acquire);
        let mut floor = 0;
        let buckets = self
            .buckets
            .iter()
            .map(|b| {
                floor = b.load(Ordering::Acquire).min(count).max(floor);
                floor
            })
            .collect();
        (buckets, count)
    }
}

impl Histogram {
    /// Bounds must be non-empty, finite and strictly ascending.
    pub(crate) fn new(desc: Desc, bounds: &[f64]) -> Result<Self> {
        if bounds.is_empty() {
            return Err(KorakError::InvalidMetric(format!("{}: no buckets", desc.name)));
        }
        if bounds.iter().any(|b| !b.is_finite()) {
            return Err(KorakError::InvalidMetric(format!(
                "{}: bucket bounds must be finite (+Inf is implicit)",
                desc.name
            )));
        }
        if bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(KorakError::InvalidMetric(format!(
                "{}: bucket bounds must be strictly ascending",
                desc.name
            )));
        }
        Ok(Self {
            inner: Arc::new(HistogramCore {
                desc,
                bounds: bounds.into(),
                series: DashMap::new(),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.desc.name
    }

    pub fn buckets(&self) -> &[f64] {
        &self.inner.bounds
    }

    pub fn labels(&self, values: &[(&str, &str)]) -> Result<HistogramSeries> {
        let key = self.inner.desc.series_key(values)?;
        let state = self
            .inner
            .series
            .entry(key)
            .or_insert_with(|| Arc::new(SeriesState::new(Arc::clone(&self.inner.bounds))))
            .clone();
        Ok(HistogramSeries { state })
    }

    /// Start timing an operation against the series for `values`.
    pub fn start_timer(&self, values: &[(&str, &str)]) -> Result<HistogramTimer> {
        Ok(self.labels(values)?.start_timer())
    }

    /// Observation count of a series, without creating it.
    pub fn get_count(&self, values: &[(&str, &str)]) -> Option<u64> {
        let key = self.inner.desc.series_key(values).ok()?;
        self.inner
            .series
            .get(&key)
            .map(|s| s.count.load(Ordering::Relaxed))
    }

    pub fn same_as(&self, other: &Histogram) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn render(&self, out: &mut String) {
        let desc = &self.inner.desc;
        desc.render_header("histogram", out);

        let mut rows: Vec<(Vec<String>, Arc<SeriesState>)> = self
            .inner
            .series
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, hist) in rows {
            let (buckets, count) = hist.snapshot();
            for (&le, bucket) in hist.bounds.iter().zip(buckets) {
                let le = format_value(le);
                let _ = writeln!(
                    out,
                    "{}_bucket{} {}",
                    desc.name,
                    desc.label_block(&key, Some(("le", &le))),
                    bucket
                );
            }
            let _ = writeln!(
                out,
                "{}_bucket{} {}",
                desc.name,
                desc.label_block(&key, Some(("le", "+Inf"))),
                count
            );

            let labels = desc.label_block(&key, None);
            let _ = writeln!(out, "{}_sum{} {}", desc.name, labels, format_value(hist.sum.get()));
            let _ = writeln!(out, "{}_count{} {}", desc.name, labels, count);
        }
    }
}

/// One label series of a [`Histogram`].
#[derive(Clone)]
pub struct HistogramSeries {
    state: Arc<SeriesState>,
}

impl HistogramSeries {
    pub fn observe(&self, v: f64) {
        let s = &self.state;
        for (i, &b) in s.bounds.iter().enumerate() {
            if v <= b {
                s.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
        s.sum.add(v);
        s.count.fetch_add(1, Ordering::Release);
    }

    pub fn start_timer(&self) -> HistogramTimer {
        HistogramTimer {
            series: self.clone(),
            start: Instant::now(),
            observed: false,
        }
    }

    pub fn count(&self) -> u64 {
        self.state.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> f64 {
        self.state.sum.get()
    }
}

/// Running duration measurement for one histogram series.
///
/// [`HistogramTimer::stop`] consumes the timer, so a measurement is recorded
/// at most once. A timer dropped without being stopped records on drop, which
/// keeps early returns and `?` paths timed as well.
#[must_use = "the timer records when stopped or dropped"]
pub struct HistogramTimer {
    series: HistogramSeries,
    start: Instant,
    observed: bool,
}

impl HistogramTimer {
    /// Record elapsed seconds and return them.
    pub fn stop(mut self) -> f64 {
        self.record()
    }

    fn record(&mut self) -> f64 {
        let elapsed = self.start.elapsed().as_secs_f64();
        if !self.observed {
            self.observed = true;
            self.series.observe(elapsed);
        }
        elapsed
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        if !self.observed {
            self.record();
        }
    }
}
