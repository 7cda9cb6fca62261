//! Tolerant decoding of versioned and legacy snapshot documents.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{BenchError, Result};
use crate::metric::MetricValue;
use crate::schema::snapshot::{Snapshot, SnapshotMetadata};

/// Schema version reported for documents that carry none.
pub const LEGACY_SCHEMA_VERSION: &str = "legacy";

/// Which shape a document was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    Versioned,
    /// `{timestamp?, metrics}` without a schema version.
    Wrapped,
    /// Metrics at the top level.
    Flat,
}

pub fn detect_shape(root: &Map<String, Value>) -> DocumentShape {
    if root.contains_key("schema_version") {
        DocumentShape::Versioned
    } else if matches!(root.get("metrics"), Some(Value::Object(_))) {
        DocumentShape::Wrapped
    } else {
        DocumentShape::Flat
    }
}

pub fn decode(s: &str) -> Result<Snapshot> {
    let root: Value = serde_json::from_str(s)?;
    let Value::Object(root) = root else {
        return Err(BenchError::Internal("snapshot root is not an object".into()));
    };

    match detect_shape(&root) {
        DocumentShape::Versioned => decode_versioned(&root),
        DocumentShape::Wrapped => {
            let mut snap = Snapshot::new(timestamp_of(&root), metrics_of(root.get("metrics")));
            snap.schema_version = LEGACY_SCHEMA_VERSION.to_string();
            Ok(snap)
        }
        DocumentShape::Flat => {
            let mut snap = Snapshot::new(0, collect_metrics(&root));
            snap.schema_version = LEGACY_SCHEMA_VERSION.to_string();
            Ok(snap)
        }
    }
}

fn decode_versioned(root: &Map<String, Value>) -> Result<Snapshot> {
    let schema_version = match root.get("schema_version") {
        Some(Value::String(v)) => v.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            return Err(BenchError::Internal(
                "schema_version must be a string".into(),
            ))
        }
    };

    // Versioned documents without a nested metrics object keep their
    // top-level scalars, matching how older writers were read.
    let metrics = match root.get("metrics") {
        Some(Value::Object(m)) => collect_metrics(m),
        _ => collect_metrics(root),
    };

    let metadata = match root.get("metadata") {
        None | Some(Value::Null) => None,
        Some(v) => match serde_json::from_value::<SnapshotMetadata>(v.clone()) {
            Ok(mut m) => {
                m.restore_keys();
                Some(m)
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed snapshot metadata");
                None
            }
        },
    };

    let scenario = root
        .get("scenario")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Snapshot {
        schema_version,
        timestamp_millis: timestamp_of(root),
        scenario,
        metrics,
        metadata: metadata.filter(|m| !m.is_empty()),
    })
}

fn timestamp_of(root: &Map<String, Value>) -> i64 {
    root.get("timestamp").and_then(Value::as_i64).unwrap_or(0)
}

fn metrics_of(v: Option<&Value>) -> IndexMap<String, MetricValue> {
    match v {
        Some(Value::Object(m)) => collect_metrics(m),
        _ => IndexMap::new(),
    }
}

fn collect_metrics(m: &Map<String, Value>) -> IndexMap<String, MetricValue> {
    let mut out = IndexMap::with_capacity(m.len());
    for (k, v) in m {
        match MetricValue::from_json(v) {
            Some(value) => {
                out.insert(k.clone(), value);
            }
            None if v.is_null() => tracing::warn!(key = %k, "dropping null metric value"),
            None => tracing::trace!(key = %k, "skipping non-scalar entry"),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::metric::Number;

    #[test]
    fn flat_document_is_read_as_metrics() {
        let snap = decode(r#"{"a": 1, "b": 2.5, "c__error": "Boom"}"#).unwrap();
        assert_eq!(snap.schema_version, LEGACY_SCHEMA_VERSION);
        assert_eq!(snap.metrics.len(), 3);
        assert_eq!(snap.get("a"), Some(&MetricValue::Number(Number::Int(1))));
        assert_eq!(snap.get("c__error").and_then(MetricValue::as_text), Some("Boom"));
    }

    #[test]
    fn wrapped_document_keeps_timestamp() {
        let snap = decode(r#"{"timestamp": 42, "metrics": {"x": 3}}"#).unwrap();
        assert_eq!(snap.timestamp_millis, 42);
        assert_eq!(snap.numeric("x"), Some(3.0));
        assert!(!snap.metrics.contains_key("timestamp"));
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(decode("[1,2,3]").is_err());
        assert!(decode("not json").is_err());
    }
}
