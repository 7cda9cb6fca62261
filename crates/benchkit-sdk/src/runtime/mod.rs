//! Process-level counters sampled at collection time.
//!
//! The platform layer supplies a `RuntimeSampler`; this module only turns its
//! counters into named metrics.

pub mod procfs;

use indexmap::IndexMap;

use benchkit_core::MetricValue;

pub use procfs::ProcfsSampler;

pub const MEMORY_PSS_KB: &str = "memoryPssKb";
pub const MEMORY_USED_BYTES: &str = "memoryUsedBytes";
pub const MEMORY_HEAP_MAX_BYTES: &str = "memoryHeapMaxBytes";
pub const PROCESS_CPU_TIME_MS: &str = "processCpuTimeMs";
pub const MEMORY_USAGE_PERCENT: &str = "memoryUsagePercent";
/// Copy of a caller-recorded `measuredNetworkLatencyMs`.
pub const NETWORK_LATENCY: &str = "networkLatencyMs";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeCounters {
    pub heap_used_bytes: u64,
    pub heap_max_bytes: u64,
    /// Proportional (or, failing that, resident) set size in KiB.
    pub resident_kb: u64,
    pub process_cpu_time_ms: u64,
}

pub trait RuntimeSampler: Send + Sync {
    fn sample(&self) -> RuntimeCounters;
}

/// Returns the same counters every time. For platforms without a native
/// sampler and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedSampler(pub RuntimeCounters);

impl RuntimeSampler for FixedSampler {
    fn sample(&self) -> RuntimeCounters {
        self.0
    }
}

/// `used / max * 100`, rounded to two decimals; `0.0` when `max` is zero.
pub fn memory_usage_percent(used: u64, max: u64) -> f64 {
    if max == 0 {
        return 0.0;
    }
    let percent = used as f64 / max as f64 * 100.0;
    (percent * 100.0).round() / 100.0
}

pub fn runtime_metrics(c: &RuntimeCounters) -> IndexMap<String, MetricValue> {
    let mut out = IndexMap::with_capacity(6);
    out.insert(MEMORY_PSS_KB.to_string(), MetricValue::from(c.resident_kb));
    out.insert(MEMORY_USED_BYTES.to_string(), MetricValue::from(c.heap_used_bytes));
    out.insert(MEMORY_HEAP_MAX_BYTES.to_string(), MetricValue::from(c.heap_max_bytes));
    out.insert(PROCESS_CPU_TIME_MS.to_string(), MetricValue::from(c.process_cpu_time_ms));
    out.insert(
        MEMORY_USAGE_PERCENT.to_string(),
        MetricValue::from(memory_usage_percent(c.heap_used_bytes, c.heap_max_bytes)),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_to_two_decimals() {
        assert_eq!(memory_usage_percent(1, 3), 33.33);
        assert_eq!(memory_usage_percent(2, 3), 66.67);
        assert_eq!(memory_usage_percent(5, 0), 0.0);
    }

    #[test]
    fn counters_map_to_named_metrics() {
        let m = runtime_metrics(&RuntimeCounters {
            heap_used_bytes: 10,
            heap_max_bytes: 40,
            resident_kb: 3,
            process_cpu_time_ms: 9,
        });
        assert_eq!(m[MEMORY_USED_BYTES], MetricValue::from(10));
        assert_eq!(m[MEMORY_USAGE_PERCENT], MetricValue::from(25.0));
        assert_eq!(m.len(), 5);
    }
}
