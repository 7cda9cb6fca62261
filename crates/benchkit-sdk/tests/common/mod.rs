//! Shared helpers for sdk integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use benchkit_sdk::clock::ManualClock;
use benchkit_sdk::config::BenchConfig;
use benchkit_sdk::runtime::{FixedSampler, RuntimeCounters};
use benchkit_sdk::BenchContext;

pub fn counters() -> RuntimeCounters {
    RuntimeCounters {
        heap_used_bytes: 64 * 1024 * 1024,
        heap_max_bytes: 256 * 1024 * 1024,
        resident_kb: 90_000,
        process_cpu_time_ms: 1_500,
    }
}

pub fn config_in(dir: &Path) -> BenchConfig {
    let mut cfg = BenchConfig::default();
    cfg.output.dir = dir.to_path_buf();
    cfg
}

pub fn context(cfg: BenchConfig, epoch_millis: i64) -> (Arc<ManualClock>, BenchContext) {
    let clock = Arc::new(ManualClock::new(epoch_millis));
    let ctx = BenchContext::with_collaborators(cfg, clock.clone(), Arc::new(FixedSampler(counters())));
    (clock, ctx)
}
