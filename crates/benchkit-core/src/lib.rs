//! benchkit core: the metric data model and the persisted snapshot format.
//!
//! This crate defines the value types, metric/category metadata and the JSON
//! document shared by the SDK, the report writers and any external tooling
//! that consumes benchmark results. It carries no runtime, clock or
//! filesystem dependencies so the format can be parsed anywhere.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Malformed input is
//! reported as `BenchError` (or skipped, for tolerant legacy reads) instead of
//! crashing the benchmark session that is trying to compare against it.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metadata;
pub mod metric;
pub mod schema;

/// Shared result type.
pub use error::{BenchError, Result};
pub use metadata::{CategoryMetadata, MetricMetadata, MetricThresholds};
pub use metric::{MetricValue, Number};
pub use schema::snapshot::{Snapshot, SnapshotMetadata, SCHEMA_VERSION};
