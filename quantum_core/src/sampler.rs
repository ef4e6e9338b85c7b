//! Local telemetry: CPU busy share, memory use and load averages of this host.

#[cfg(target_os = "linux")]
use std::fs;

use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};
#[cfg(target_os = "linux")]
use tracing::warn;

use crate::types::MetricSample;

/// Load averages are carried ×10 so one unit of load spans ten gauge steps.
pub const LOAD_SCALE: f64 = 10.0;

/// Aggregate CPU jiffies from the first line of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub busy: u64,
    pub total: u64,
}

impl CpuTimes {
    /// Parses `cpu  user nice system idle iowait irq softirq steal ...`.
    ///
    /// Only the first eight counters are summed: guest time is already
    /// folded into user/nice by the kernel.
    pub fn parse(line: &str) -> Option<Self> {
        let mut it = line.split_whitespace();
        if it.next()? != "cpu" {
            return None;
        }
        let fields: Vec<u64> = it.take(8).map_while(|t| t.parse().ok()).collect();
        if fields.len() < 4 {
            return None;
        }
        let total: u64 = fields.iter().fold(0u64, |acc, v| acc.saturating_add(*v));
        let idle = fields[3].saturating_add(fields.get(4).copied().unwrap_or(0));
        Some(Self {
            busy: total.saturating_sub(idle),
            total,
        })
    }

    /// Busy percentage over the interval between `prev` and `self`.
    pub fn busy_percent_since(&self, prev: &CpuTimes) -> f64 {
        let dt = self.total.saturating_sub(prev.total);
        if dt == 0 {
            return 0.0;
        }
        let db = self.busy.saturating_sub(prev.busy);
        (db as f64 / dt as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(target_os = "linux")]
fn read_cpu_times() -> Option<CpuTimes> {
    let s = match fs::read_to_string("/proc/stat") {
        Ok(s) => s,
        Err(e) => {
            warn!("reading /proc/stat failed: {e}");
            return None;
        }
    };
    s.lines().next().and_then(CpuTimes::parse)
}

/// `(total - available) / total` as a percentage; 0 when the total is unknown.
pub fn mem_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    total.saturating_sub(available) as f64 / total as f64 * 100.0
}

/// Reads host counters on demand. Holds the previous CPU counters so each
/// sample reports the busy share since the last one.
pub struct LocalSampler {
    sys: System,
    #[cfg(target_os = "linux")]
    last_cpu: CpuTimes,
}

impl Default for LocalSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSampler {
    pub fn new() -> Self {
        let refresh_kind = RefreshKind::nothing()
            .with_cpu(CpuRefreshKind::nothing().with_cpu_usage())
            .with_memory(MemoryRefreshKind::nothing().with_ram());
        Self {
            sys: System::new_with_specifics(refresh_kind),
            // zero baseline: the first sample covers the time since boot
            #[cfg(target_os = "linux")]
            last_cpu: CpuTimes::default(),
        }
    }

    pub fn sample(&mut self) -> MetricSample {
        let cpu = self.cpu_percent();

        self.sys.refresh_memory();
        let mem = mem_percent(self.sys.total_memory(), self.sys.available_memory());

        let load = System::load_average();
        MetricSample {
            cpu,
            mem,
            la1: load.one * LOAD_SCALE,
            la5: load.five * LOAD_SCALE,
            la15: load.fifteen * LOAD_SCALE,
        }
    }

    #[cfg(target_os = "linux")]
    fn cpu_percent(&mut self) -> f64 {
        match read_cpu_times() {
            Some(now) => {
                let pct = now.busy_percent_since(&self.last_cpu);
                self.last_cpu = now;
                pct
            }
            None => self.sysinfo_cpu_percent(),
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn cpu_percent(&mut self) -> f64 {
        self.sysinfo_cpu_percent()
    }

    fn sysinfo_cpu_percent(&mut self) -> f64 {
        self.sys.refresh_cpu_usage();
        self.sys.global_cpu_usage() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_proc_stat_cpu_line() {
        let t = CpuTimes::parse("cpu  100 20 30 800 50 0 0 0 0 0").unwrap();
        assert_eq!(t.total, 1000);
        assert_eq!(t.busy, 150);
    }

    #[test]
    fn parse_tolerates_short_lines() {
        let t = CpuTimes::parse("cpu 10 0 10 80").unwrap();
        assert_eq!(t.total, 100);
        assert_eq!(t.busy, 20);
    }

    #[test]
    fn parse_rejects_per_core_and_garbage() {
        assert!(CpuTimes::parse("cpu0 1 2 3 4 5").is_none());
        assert!(CpuTimes::parse("intr 1 2 3").is_none());
        assert!(CpuTimes::parse("cpu 1 2").is_none());
    }

    #[test]
    fn busy_percent_uses_deltas() {
        let prev = CpuTimes {
            busy: 100,
            total: 1000,
        };
        let now = CpuTimes {
            busy: 175,
            total: 1100,
        };
        assert!((now.busy_percent_since(&prev) - 75.0).abs() < 1e-9);
        assert_eq!(prev.busy_percent_since(&prev), 0.0);
        // counters going backwards never produce a negative share
        assert_eq!(prev.busy_percent_since(&now), 0.0);
    }

    #[test]
    fn mem_percent_bounds() {
        assert_eq!(mem_percent(0, 0), 0.0);
        assert_eq!(mem_percent(1000, 250), 75.0);
        assert_eq!(mem_percent(1000, 2000), 0.0);
    }

    #[test]
    fn local_sample_is_in_gauge_domain() {
        let mut s = LocalSampler::new();
        let m = s.sample();
        assert!((0.0..=100.0).contains(&m.cpu), "cpu {}", m.cpu);
        assert!((0.0..=100.0).contains(&m.mem), "mem {}", m.mem);
        assert!(m.la1 >= 0.0 && m.la5 >= 0.0 && m.la15 >= 0.0);
    }
}
