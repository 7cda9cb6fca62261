//! Benchmark session context.
//!
//! One `BenchContext` per process or test run owns the store, the registry
//! and the platform collaborators, and is handed to every caller by
//! reference (or cloned; clones share state).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use benchkit_core::error::{BenchError, Result};
use benchkit_core::Snapshot;

use crate::clock::{Clock, SystemClock};
use crate::config::BenchConfig;
use crate::registry::MetricRegistry;
use crate::report::compare::{polarity_for, scenario_file_name};
use crate::report::{html, json};
use crate::runtime::{ProcfsSampler, RuntimeSampler};
use crate::startup::{StartupTracker, STARTUP_TIME};
use crate::store::MetricStore;

/// File name of the per-collect HTML diff.
pub const LATEST_HTML: &str = "benchmark-latest.html";

/// Label used for the scenario file when none was set.
pub const DEFAULT_SCENARIO: &str = "scenario";

#[derive(Clone)]
pub struct BenchContext {
    inner: Arc<BenchContextInner>,
}

struct BenchContextInner {
    cfg: BenchConfig,
    clock: Arc<dyn Clock>,
    sampler: Arc<dyn RuntimeSampler>,
    store: MetricStore,
    registry: MetricRegistry,
    startup: StartupTracker,
}

/// Files produced by one collect-and-persist call.
#[derive(Debug, Clone)]
pub struct PersistedReport {
    pub snapshot: Snapshot,
    pub json_path: PathBuf,
    pub html_path: Option<PathBuf>,
}

impl BenchContext {
    /// Session with the system clock and the `/proc` sampler.
    pub fn new(cfg: BenchConfig) -> Self {
        Self::with_collaborators(cfg, Arc::new(SystemClock::new()), Arc::new(ProcfsSampler::new()))
    }

    pub fn with_collaborators(
        cfg: BenchConfig,
        clock: Arc<dyn Clock>,
        sampler: Arc<dyn RuntimeSampler>,
    ) -> Self {
        let store = MetricStore::new(Arc::clone(&clock));
        if let Some(label) = &cfg.scenario.label {
            store.set_scenario(label.clone());
        }
        let startup = StartupTracker::start(clock.as_ref());

        Self {
            inner: Arc::new(BenchContextInner {
                cfg,
                clock,
                sampler,
                store,
                registry: MetricRegistry::new(),
                startup,
            }),
        }
    }

    pub fn cfg(&self) -> &BenchConfig {
        &self.inner.cfg
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    pub fn store(&self) -> &MetricStore {
        &self.inner.store
    }

    pub fn registry(&self) -> &MetricRegistry {
        &self.inner.registry
    }

    /// Record `startupTimeMs` the first time the app reports ready.
    pub fn on_app_ready(&self) {
        if let Some(ms) = self.inner.startup.mark_ready(self.clock()) {
            tracing::debug!(startup_ms = ms, "startup time captured");
            self.store().record_metric(STARTUP_TIME, ms);
        }
    }

    /// Snapshot the session: runtime counters, providers, recorded metrics,
    /// plus registry metadata when anything is registered.
    pub fn collect(&self) -> Snapshot {
        self.store()
            .collect(self.clock().epoch_millis(), self.inner.sampler.as_ref())
            .with_metadata(self.registry().snapshot_metadata())
    }

    /// Write `benchmark-<timestamp>.json` and, when enabled,
    /// `benchmark-latest.html` diffed against the most recent other snapshot.
    pub fn collect_and_persist(&self) -> Result<PersistedReport> {
        let snapshot = self.collect();
        let file_name = format!("benchmark-{}.json", snapshot.timestamp_millis);
        let json_path = self.write_snapshot(&file_name, &snapshot)?;

        let html_path = if self.cfg().output.write_latest_html {
            Some(self.write_latest_html(&json_path, &snapshot)?)
        } else {
            None
        };

        tracing::info!(
            json = %json_path.display(),
            html = ?html_path.as_ref().map(|p| p.display().to_string()),
            metrics = snapshot.metrics.len(),
            "benchmark results written"
        );
        Ok(PersistedReport {
            snapshot,
            json_path,
            html_path,
        })
    }

    /// `collect_and_persist`, then the same snapshot again as
    /// `benchmark-<label>.json` next to it.
    pub fn collect_scenario_and_persist(&self) -> Result<PathBuf> {
        let report = self.collect_and_persist()?;
        let label = self
            .store()
            .scenario()
            .unwrap_or_else(|| DEFAULT_SCENARIO.to_string());
        let dir = parent_dir(&report.json_path);
        let tagged = dir.join(scenario_file_name(&label));
        json::write(&tagged, &report.snapshot)?;
        tracing::info!(scenario = %label, path = %tagged.display(), "scenario snapshot written");
        Ok(tagged)
    }

    /// Write into the output directory, retrying once in the fallback
    /// directory when the primary cannot be created or written.
    fn write_snapshot(&self, file_name: &str, snapshot: &Snapshot) -> Result<PathBuf> {
        let mut last_err = None;
        for dir in self.cfg().output.candidate_dirs() {
            let attempt = fs::create_dir_all(&dir)
                .map_err(|e| BenchError::io(&dir, e))
                .and_then(|()| {
                    let path = dir.join(file_name);
                    json::write(&path, snapshot).map(|()| path)
                });
            match attempt {
                Ok(path) => return Ok(path),
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "output directory unusable");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| BenchError::Internal("no output directory configured".into())))
    }

    fn write_latest_html(&self, json_path: &Path, snapshot: &Snapshot) -> Result<PathBuf> {
        let dir = parent_dir(json_path);
        let previous = json::find_previous(&dir, json_path);
        let doc = html::render(snapshot, previous.as_ref(), polarity_for(self.cfg()));
        let path = dir.join(LATEST_HTML);
        fs::write(&path, doc).map_err(|e| BenchError::io(&path, e))?;
        Ok(path)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
