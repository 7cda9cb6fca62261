//! Scoped timing of a unit of work.
//!
//! `idle -> running -> {completed | failed} -> idle`
//!
//! A completed run records its duration (whole milliseconds, monotonic clock)
//! into the store. A failed run, an `Err` or a panic from the work, records
//! nothing and hands the failure back to the caller unchanged: an aborted
//! scenario must not show up as a fast one.

use std::convert::Infallible;
use std::panic::{self, AssertUnwindSafe};

use crate::store::MetricStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { started_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOutcome {
    Completed { duration_ms: u64 },
    Failed,
}

/// A reusable timer bound to one metric name. Each run keeps its own start
/// and end readings; concurrent timers only meet in `record_metric`.
pub struct ScenarioTimer<'a> {
    store: &'a MetricStore,
    name: String,
    state: TimerState,
    last: Option<TimerOutcome>,
}

impl<'a> ScenarioTimer<'a> {
    pub fn new(store: &'a MetricStore, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
            state: TimerState::Idle,
            last: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Outcome of the most recent run.
    pub fn last_outcome(&self) -> Option<TimerOutcome> {
        self.last
    }

    /// Time infallible work. Panics propagate after the timer resets.
    pub fn run<T>(&mut self, work: impl FnOnce() -> T) -> T {
        match self.try_run(|| Ok::<T, Infallible>(work())) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    /// Time fallible work. `Err` is returned as is, with no metric recorded.
    pub fn try_run<T, E>(&mut self, work: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let store = self.store;
        let clock = store.clock();
        let started_ms = clock.monotonic_ms();
        self.state = TimerState::Running { started_ms };

        let result = match panic::catch_unwind(AssertUnwindSafe(work)) {
            Ok(r) => r,
            Err(payload) => {
                self.finish(TimerOutcome::Failed);
                panic::resume_unwind(payload);
            }
        };

        match result {
            Ok(v) => {
                let duration_ms = clock.monotonic_ms().saturating_sub(started_ms);
                store.record_metric(self.name.clone(), duration_ms);
                self.finish(TimerOutcome::Completed { duration_ms });
                Ok(v)
            }
            Err(e) => {
                tracing::debug!(metric = %self.name, "timed work failed; duration discarded");
                self.finish(TimerOutcome::Failed);
                Err(e)
            }
        }
    }

    fn finish(&mut self, outcome: TimerOutcome) {
        self.last = Some(outcome);
        self.state = TimerState::Idle;
    }
}

impl MetricStore {
    /// Run `work`, record its wall-clock duration under `name`, return its
    /// result. A panic in `work` propagates and records nothing.
    pub fn time_scenario<T>(&self, name: impl Into<String>, work: impl FnOnce() -> T) -> T {
        ScenarioTimer::new(self, name).run(work)
    }

    /// Like `time_scenario` for work that returns `Result`; an `Err`
    /// propagates and records nothing.
    pub fn try_time_scenario<T, E>(
        &self,
        name: impl Into<String>,
        work: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        ScenarioTimer::new(self, name).try_run(work)
    }
}
