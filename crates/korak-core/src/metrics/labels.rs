//! Metric descriptors, label validation and text-format helpers.

use std::fmt::Write;

use crate::error::{KorakError, Result};

/// Identity of a metric: name, help text and the ordered label schema.
#[derive(Debug)]
pub(crate) struct Desc {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) label_names: Vec<String>,
}

impl Desc {
    /// Validate `name` and `label_names` against the Prometheus grammar.
    /// `le` is reserved on histograms because it names the bucket bound.
    pub(crate) fn new(name: &str, help: &str, label_names: &[&str], reserve_le: bool) -> Result<Self> {
        if !is_valid_metric_name(name) {
            return Err(KorakError::InvalidMetric(format!("bad metric name: {name:?}")));
        }
        let mut names: Vec<String> = Vec::with_capacity(label_names.len());
        for &l in label_names {
            if !is_valid_label_name(l) {
                return Err(KorakError::InvalidMetric(format!("{name}: bad label name {l:?}")));
            }
            if reserve_le && l == "le" {
                return Err(KorakError::InvalidMetric(format!(
                    "{name}: label `le` is reserved for histogram buckets"
                )));
            }
            if names.iter().any(|n| n == l) {
                return Err(KorakError::InvalidMetric(format!("{name}: duplicate label {l:?}")));
            }
            names.push(l.to_string());
        }
        Ok(Self {
            name: name.to_string(),
            help: help.to_string(),
            label_names: names,
        })
    }

    /// Resolve a `(name, value)` assignment into label values in declared order.
    ///
    /// The supplied names must match the declared schema exactly: no missing,
    /// no extra, no repeated keys. Order of the pairs does not matter.
    pub(crate) fn series_key(&self, values: &[(&str, &str)]) -> Result<Vec<String>> {
        let mismatch = || KorakError::LabelMismatch {
            metric: self.name.clone(),
            expected: self.label_names.clone(),
            found: values.iter().map(|(k, _)| k.to_string()).collect(),
        };

        if values.len() != self.label_names.len() {
            return Err(mismatch());
        }
        let mut key = Vec::with_capacity(self.label_names.len());
        for declared in &self.label_names {
            let mut hits = values.iter().filter(|(k, _)| *k == declared.as_str());
            match (hits.next(), hits.next()) {
                (Some((_, v)), None) => key.push(v.to_string()),
                _ => return Err(mismatch()),
            }
        }
        Ok(key)
    }

    /// Write the `# HELP` and `# TYPE` header lines.
    pub(crate) fn render_header(&self, kind: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {} {}", self.name, escape_help(&self.help));
        let _ = writeln!(out, "# TYPE {} {}", self.name, kind);
    }

    /// Render `{k="v",...}` for a series, optionally followed by one extra pair
    /// (used for the histogram `le` label). Empty label sets render as nothing.
    pub(crate) fn label_block(&self, values: &[String], extra: Option<(&str, &str)>) -> String {
        let mut pairs: Vec<String> = self
            .label_names
            .iter()
            .zip(values)
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect();
        if let Some((k, v)) = extra {
            pairs.push(format!("{}=\"{}\"", k, escape_label(v)));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("{{{}}}", pairs.join(","))
        }
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Helper to escape label values.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a sample value the way Prometheus parsers expect (`+Inf`, `NaN`, ...).
pub(crate) fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}
