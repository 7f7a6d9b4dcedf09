//! Scrape-time collectors.
//!
//! A collector owns a few gauges and refreshes them whenever the registry is
//! serialized. `ProcessCollector` provides the standard `process_*` runtime
//! metrics; on Linux it reads `/proc/self`, elsewhere only the start time and
//! uptime are reported.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use super::gauge::GaugeSeries;
use super::registry::Registry;
use crate::error::Result;

pub trait Collector: Send + Sync {
    /// Refresh owned metrics. Must not fail; read errors are logged and skipped.
    fn collect(&self);
}

pub struct ProcessCollector {
    started: Instant,
    uptime: GaugeSeries,
    #[cfg(target_os = "linux")]
    linux: linux::ProcGauges,
}

impl ProcessCollector {
    /// Register the process gauges in `registry` and set the start time.
    pub fn register(registry: &Registry) -> Result<Self> {
        let start_time = registry
            .get_or_create_gauge(
                "process_start_time_seconds",
                "Start time of the process since unix epoch in seconds.",
                &[],
            )?
            .labels(&[])?;
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        start_time.set(since_epoch.floor());

        let uptime = registry
            .get_or_create_gauge("process_uptime_seconds", "Seconds since the process started.", &[])?
            .labels(&[])?;

        Ok(Self {
            started: Instant::now(),
            uptime,
            #[cfg(target_os = "linux")]
            linux: linux::ProcGauges::register(registry)?,
        })
    }
}

impl Collector for ProcessCollector {
    fn collect(&self) {
        self.uptime.set(self.started.elapsed().as_secs_f64());
        #[cfg(target_os = "linux")]
        self.linux.refresh();
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use super::GaugeSeries;
    use crate::error::Result;
    use crate::metrics::Registry;

    pub(super) struct ProcGauges {
        resident: GaugeSeries,
        virtual_mem: GaugeSeries,
        open_fds: GaugeSeries,
    }

    impl ProcGauges {
        pub(super) fn register(registry: &Registry) -> Result<Self> {
            Ok(Self {
                resident: registry
                    .get_or_create_gauge(
                        "process_resident_memory_bytes",
                        "Resident memory size in bytes.",
                        &[],
                    )?
                    .labels(&[])?,
                virtual_mem: registry
                    .get_or_create_gauge(
                        "process_virtual_memory_bytes",
                        "Virtual memory size in bytes.",
                        &[],
                    )?
                    .labels(&[])?,
                open_fds: registry
                    .get_or_create_gauge("process_open_fds", "Number of open file descriptors.", &[])?
                    .labels(&[])?,
            })
        }

        pub(super) fn refresh(&self) {
            match std::fs::read_to_string("/proc/self/status") {
                Ok(status) => {
                    if let Some(kb) = status_kb(&status, "VmRSS:") {
                        self.resident.set((kb * 1024) as f64);
                    }
                    if let Some(kb) = status_kb(&status, "VmSize:") {
                        self.virtual_mem.set((kb * 1024) as f64);
                    }
                }
                Err(e) => tracing::debug!(error = %e, "read /proc/self/status failed"),
            }
            match std::fs::read_dir("/proc/self/fd") {
                Ok(dir) => self.open_fds.set(dir.count() as f64),
                Err(e) => tracing::debug!(error = %e, "read /proc/self/fd failed"),
            }
        }
    }

    /// Parse a `Key:   1234 kB` line of `/proc/self/status`.
    pub(super) fn status_kb(status: &str, key: &str) -> Option<u64> {
        status
            .lines()
            .find_map(|l| l.strip_prefix(key))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|n| n.parse().ok())
    }

}
