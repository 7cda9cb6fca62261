//! benchkit SDK library entry.
//!
//! This crate wires the session store, the metadata registry, scenario
//! timing, runtime sampling and the JSON/HTML report writers into one
//! `BenchContext`. It is consumed by instrumented test suites, by the
//! `benchkit-report` binary and by integration tests.

pub mod clock;
pub mod config;
pub mod context;
pub mod network;
pub mod registry;
pub mod report;
pub mod runtime;
pub mod startup;
pub mod store;
pub mod timer;
pub mod upload;

pub use context::{BenchContext, PersistedReport};
pub use registry::MetricRegistry;
pub use store::MetricStore;
pub use timer::ScenarioTimer;
