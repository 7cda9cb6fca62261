//! Session metric store.
//!
//! - `name -> value` for explicitly recorded measurements (last write wins)
//! - `name -> provider` for lazily computed values, evaluated on collect
//! - the session scenario label
//!
//! Entries remember the sequence number of their first insertion so a
//! snapshot lists metrics in the order they were first recorded, even though
//! the maps themselves are sharded and unordered.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indexmap::IndexMap;

use benchkit_core::{MetricValue, Number, Snapshot};

use crate::clock::{Clock, SystemClock};
use crate::runtime::{self, RuntimeSampler};

/// Name under which callers report the latency they measured themselves.
pub const MEASURED_NETWORK_LATENCY: &str = "measuredNetworkLatencyMs";

/// Suffix of the sentinel entry written when a provider fails.
pub const ERROR_SUFFIX: &str = "__error";

/// Sentinel recorded for a NaN or infinite value, which JSON cannot carry.
pub const NON_FINITE: &str = "NonFinite";

type ProviderFn = dyn Fn() -> std::result::Result<Number, String> + Send + Sync;

struct Slot<T> {
    seq: u64,
    value: T,
}

pub struct MetricStore {
    clock: Arc<dyn Clock>,
    metrics: DashMap<String, Slot<MetricValue>>,
    providers: DashMap<String, Slot<Arc<ProviderFn>>>,
    scenario: RwLock<Option<String>>,
    seq: AtomicU64,
}

impl MetricStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            metrics: DashMap::new(),
            providers: DashMap::new(),
            scenario: RwLock::new(None),
            seq: AtomicU64::new(1),
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Unconditional upsert.
    pub fn record_metric(&self, name: impl Into<String>, value: impl Into<MetricValue>) {
        let value = value.into();
        match self.metrics.entry(name.into()) {
            Entry::Occupied(mut e) => e.get_mut().value = value,
            Entry::Vacant(e) => {
                e.insert(Slot {
                    seq: self.next_seq(),
                    value,
                });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.metrics.get(name).map(|r| r.value().value.clone())
    }

    /// Recorded metrics in first-insertion order. Providers are not evaluated.
    pub fn recorded(&self) -> IndexMap<String, MetricValue> {
        let mut entries: Vec<(u64, String, MetricValue)> = self
            .metrics
            .iter()
            .map(|r| (r.value().seq, r.key().clone(), r.value().value.clone()))
            .collect();
        entries.sort_by_key(|(seq, _, _)| *seq);
        entries.into_iter().map(|(_, k, v)| (k, v)).collect()
    }

    /// Register an infallible provider. A panic inside it is still contained
    /// at collection time.
    pub fn register_metric_provider<F, N>(&self, name: impl Into<String>, provider: F)
    where
        F: Fn() -> N + Send + Sync + 'static,
        N: Into<Number>,
    {
        self.insert_provider(
            name.into(),
            Arc::new(move || -> std::result::Result<Number, String> { Ok(provider().into()) }),
        );
    }

    /// Register a provider that may fail. The failure is recorded as
    /// `<name>__error = <error type name>` when collected.
    pub fn register_fallible_provider<F, N, E>(&self, name: impl Into<String>, provider: F)
    where
        F: Fn() -> std::result::Result<N, E> + Send + Sync + 'static,
        N: Into<Number>,
        E: 'static,
    {
        self.insert_provider(
            name.into(),
            Arc::new(move || -> std::result::Result<Number, String> {
                match provider() {
                    Ok(n) => Ok(n.into()),
                    Err(_) => Err(short_type_name::<E>().to_string()),
                }
            }),
        );
    }

    fn insert_provider(&self, name: String, provider: Arc<ProviderFn>) {
        match self.providers.entry(name) {
            Entry::Occupied(mut e) => e.get_mut().value = provider,
            Entry::Vacant(e) => {
                e.insert(Slot {
                    seq: self.next_seq(),
                    value: provider,
                });
            }
        }
    }

    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<(u64, String)> = self
            .providers
            .iter()
            .map(|r| (r.value().seq, r.key().clone()))
            .collect();
        names.sort_by_key(|(seq, _)| *seq);
        names.into_iter().map(|(_, n)| n).collect()
    }

    /// Invoke every provider, in registration order. Failures (errors or
    /// panics) become `<name>__error` entries and never stop the others.
    pub fn evaluate_providers(&self) -> IndexMap<String, MetricValue> {
        // Clone out first: a provider may itself record into this store.
        let mut providers: Vec<(u64, String, Arc<ProviderFn>)> = self
            .providers
            .iter()
            .map(|r| (r.value().seq, r.key().clone(), Arc::clone(&r.value().value)))
            .collect();
        providers.sort_by_key(|(seq, _, _)| *seq);

        let mut out = IndexMap::with_capacity(providers.len());
        for (_, name, provider) in providers {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| provider())) {
                Ok(r) => r,
                Err(_) => Err("Panic".to_string()),
            };
            match outcome {
                Ok(n) => {
                    out.insert(name, MetricValue::Number(n));
                }
                Err(kind) => {
                    tracing::warn!(provider = %name, error = %kind, "metric provider failed");
                    out.insert(format!("{name}{ERROR_SUFFIX}"), MetricValue::Text(kind));
                }
            }
        }
        out
    }

    pub fn set_scenario(&self, label: impl Into<String>) {
        let mut guard = self.scenario.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(label.into());
    }

    pub fn scenario(&self) -> Option<String> {
        self.scenario
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current process counters plus the caller-measured network latency, if
    /// one was recorded. Reads only.
    pub fn actual_runtime_metrics(&self, sampler: &dyn RuntimeSampler) -> IndexMap<String, MetricValue> {
        let mut out = runtime::runtime_metrics(&sampler.sample());
        if let Some(latency) = self.get(MEASURED_NETWORK_LATENCY) {
            out.insert(runtime::NETWORK_LATENCY.to_string(), latency);
        }
        out
    }

    /// Merge runtime counters, provider values and recorded metrics into one
    /// snapshot. Recorded values win over providers of the same name. A NaN
    /// or infinite value is replaced by `<name>__error = NonFinite`.
    pub fn collect(&self, now_millis: i64, sampler: &dyn RuntimeSampler) -> Snapshot {
        let mut merged = self.actual_runtime_metrics(sampler);
        merged.extend(self.evaluate_providers());
        merged.extend(self.recorded());
        let metrics = replace_non_finite(merged);

        let snapshot = Snapshot::new(now_millis, metrics);
        match self.scenario() {
            Some(label) => snapshot.with_scenario(label),
            None => snapshot,
        }
    }

    /// Drop all metrics, providers and the scenario label.
    pub fn clear(&self) {
        self.metrics.clear();
        self.providers.clear();
        *self.scenario.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock::new()))
    }
}

fn replace_non_finite(metrics: IndexMap<String, MetricValue>) -> IndexMap<String, MetricValue> {
    let mut out = IndexMap::with_capacity(metrics.len());
    for (name, value) in metrics {
        if value.is_finite() {
            out.insert(name, value);
        } else {
            tracing::warn!(metric = %name, value = %value, "non-finite metric value");
            out.insert(format!("{name}{ERROR_SUFFIX}"), MetricValue::from(NON_FINITE));
        }
    }
    out
}

/// `std::io::error::Error` -> `Error`, `my::Wrapper<u8>` -> `Wrapper`.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{FixedSampler, RuntimeCounters};

    #[derive(Debug)]
    struct DiskFull;

    fn sampler() -> FixedSampler {
        FixedSampler(RuntimeCounters {
            heap_used_bytes: 50,
            heap_max_bytes: 200,
            resident_kb: 1024,
            process_cpu_time_ms: 30,
        })
    }

    #[test]
    fn last_write_wins_and_keeps_first_position() {
        let s = MetricStore::default();
        s.record_metric("a", 1);
        s.record_metric("b", 2);
        s.record_metric("a", 3.5);
        let rec = s.recorded();
        assert_eq!(rec.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(rec["a"], MetricValue::from(3.5));
    }

    #[test]
    fn short_names_strip_paths_and_generics() {
        assert_eq!(short_type_name::<std::io::Error>(), "Error");
        assert_eq!(short_type_name::<DiskFull>(), "DiskFull");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }

    #[test]
    fn failing_provider_becomes_sentinel() {
        let s = MetricStore::default();
        s.register_metric_provider("ok", || 7);
        s.register_fallible_provider("bad", || Err::<u32, _>(DiskFull));
        s.register_metric_provider("boom", || -> i32 { panic!("provider blew up") });

        let out = s.evaluate_providers();
        assert_eq!(out.get("ok"), Some(&MetricValue::from(7)));
        assert!(out.get("bad").is_none());
        assert_eq!(out.get("bad__error"), Some(&MetricValue::from("DiskFull")));
        assert_eq!(out.get("boom__error"), Some(&MetricValue::from("Panic")));
    }

    #[test]
    fn provider_reregistration_replaces_supplier() {
        let s = MetricStore::default();
        s.register_metric_provider("p", || 1);
        s.register_metric_provider("p", || 2);
        assert_eq!(s.provider_names(), ["p"]);
        assert_eq!(s.evaluate_providers()["p"], MetricValue::from(2));
    }

    #[test]
    fn collect_merges_all_sources() {
        let s = MetricStore::default();
        s.set_scenario("baseline");
        s.record_metric("cpuHeavyLoopMs", 12);
        s.record_metric(MEASURED_NETWORK_LATENCY, 88);
        s.register_metric_provider("cacheEntries", || 4u32);

        let snap = s.collect(1_234, &sampler());
        assert_eq!(snap.timestamp_millis, 1_234);
        assert_eq!(snap.scenario.as_deref(), Some("baseline"));
        assert_eq!(snap.numeric("memoryUsagePercent"), Some(25.0));
        assert_eq!(snap.numeric("cacheEntries"), Some(4.0));
        assert_eq!(snap.numeric("cpuHeavyLoopMs"), Some(12.0));
        assert_eq!(snap.numeric(runtime::NETWORK_LATENCY), Some(88.0));
    }

    #[test]
    fn recorded_value_overrides_provider_of_same_name() {
        let s = MetricStore::default();
        s.register_metric_provider("x", || 1);
        s.record_metric("x", 9);
        assert_eq!(s.collect(0, &sampler()).numeric("x"), Some(9.0));
    }

    #[test]
    fn non_finite_values_become_sentinels_in_place() {
        let s = MetricStore::default();
        s.record_metric("before", 1);
        s.register_metric_provider("cacheHitRate", || 0.0f64 / 0.0);
        s.record_metric("fps", f64::INFINITY);
        s.record_metric("after", 2);

        let snap = s.collect(0, &sampler());
        assert!(snap.get("cacheHitRate").is_none());
        assert!(snap.get("fps").is_none());
        assert_eq!(snap.get("cacheHitRate__error"), Some(&MetricValue::from(NON_FINITE)));
        assert_eq!(snap.get("fps__error"), Some(&MetricValue::from(NON_FINITE)));
        let names: Vec<_> = snap.metrics.keys().skip_while(|k| k.as_str() != "cacheHitRate__error").collect();
        assert_eq!(names, ["cacheHitRate__error", "before", "fps__error", "after"]);
    }

    #[test]
    fn clear_resets_everything() {
        let s = MetricStore::default();
        s.record_metric("a", 1);
        s.register_metric_provider("p", || 1);
        s.set_scenario("heavy");
        s.clear();
        assert!(s.recorded().is_empty());
        assert!(s.provider_names().is_empty());
        assert!(s.scenario().is_none());
    }
}
