//! Linux `/proc` backed sampler.
//!
//! Heap figures map to the data segment (`VmData`) against total physical
//! memory; resident size prefers `Pss` from `smaps_rollup` over `VmRSS`.
//! Anything unreadable samples as zero.

use std::fs;

use super::{RuntimeCounters, RuntimeSampler};

/// Kernel clock ticks per second. 100 on every mainstream Linux target.
const CLOCK_TICKS_PER_SEC: u64 = 100;

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcfsSampler;

impl ProcfsSampler {
    pub fn new() -> Self {
        Self
    }
}

impl RuntimeSampler for ProcfsSampler {
    fn sample(&self) -> RuntimeCounters {
        let status = read("/proc/self/status");
        let rollup = read("/proc/self/smaps_rollup");
        let meminfo = read("/proc/meminfo");
        let stat = read("/proc/self/stat");

        let resident_kb = rollup
            .as_deref()
            .and_then(|s| field_kb(s, "Pss"))
            .or_else(|| status.as_deref().and_then(|s| field_kb(s, "VmRSS")))
            .unwrap_or(0);
        let heap_used_kb = status.as_deref().and_then(|s| field_kb(s, "VmData")).unwrap_or(0);
        let heap_max_kb = meminfo.as_deref().and_then(|s| field_kb(s, "MemTotal")).unwrap_or(0);
        let cpu_ticks = stat.as_deref().and_then(cpu_ticks).unwrap_or(0);

        RuntimeCounters {
            heap_used_bytes: heap_used_kb.saturating_mul(1024),
            heap_max_bytes: heap_max_kb.saturating_mul(1024),
            resident_kb,
            process_cpu_time_ms: cpu_ticks.saturating_mul(1000) / CLOCK_TICKS_PER_SEC,
        }
    }
}

fn read(path: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::warn!(path, error = %e, "runtime counter unavailable");
            None
        }
    }
}

/// Value of a `Key:   1234 kB` line.
pub(crate) fn field_kb(text: &str, key: &str) -> Option<u64> {
    text.lines().find_map(|line| {
        let (k, rest) = line.split_once(':')?;
        if k.trim() != key {
            return None;
        }
        rest.split_whitespace().next()?.parse().ok()
    })
}

/// `utime + stime` from `/proc/<pid>/stat`. The command name may contain
/// spaces and parentheses, so fields are counted from the last `)`.
pub(crate) fn cpu_ticks(stat: &str) -> Option<u64> {
    let (_, tail) = stat.rsplit_once(')')?;
    let fields: Vec<&str> = tail.split_whitespace().collect();
    // tail starts at field 3 (state); utime is field 14, stime 15
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;
    Some(utime.saturating_add(stime))
}
