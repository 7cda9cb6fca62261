//! Persisted snapshot format.
//!
//! Two shapes are understood:
//! - Versioned: `{schema_version, timestamp, metrics, metadata?}`, written by
//!   this crate.
//! - Legacy: a flat `{name: number}` object, or `{timestamp, metrics}` without
//!   a schema version. Read-only.
//!
//! Decoding goes through `serde_json::Value` so that a single odd entry in an
//! old file does not discard the whole history.

pub mod legacy;
pub mod snapshot;
