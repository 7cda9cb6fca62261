//! Versioned snapshot document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::metadata::{CategoryMetadata, MetricMetadata};
use crate::metric::MetricValue;

/// Schema version written by this crate.
pub const SCHEMA_VERSION: &str = "1.0";

/// One collected set of metric values. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: String,
    /// Epoch milliseconds.
    #[serde(rename = "timestamp")]
    pub timestamp_millis: i64,
    /// Scenario label the snapshot was collected under, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    /// Insertion-ordered metrics.
    pub metrics: IndexMap<String, MetricValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SnapshotMetadata>,
}

/// Registered metadata attached to a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_metrics: IndexMap<String, MetricMetadata>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_categories: IndexMap<String, CategoryMetadata>,
}

impl SnapshotMetadata {
    pub fn is_empty(&self) -> bool {
        self.custom_metrics.is_empty() && self.custom_categories.is_empty()
    }

    /// Copy map keys back into the entries (keys are not serialized inside).
    pub(crate) fn restore_keys(&mut self) {
        for (name, m) in self.custom_metrics.iter_mut() {
            m.name = name.clone();
        }
        for (id, c) in self.custom_categories.iter_mut() {
            c.id = id.clone();
        }
    }

    /// Metadata for `metric`: exact registrations first, then patterns.
    pub fn lookup(&self, metric: &str) -> Option<&MetricMetadata> {
        self.custom_metrics.get(metric).or_else(|| {
            self.custom_metrics
                .values()
                .find(|m| m.is_pattern && m.matches(metric))
        })
    }
}

impl Snapshot {
    pub fn new(timestamp_millis: i64, metrics: IndexMap<String, MetricValue>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            timestamp_millis,
            scenario: None,
            metrics,
            metadata: None,
        }
    }

    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    /// Attach metadata; empty metadata is dropped so the section stays absent.
    pub fn with_metadata(mut self, metadata: SnapshotMetadata) -> Self {
        self.metadata = (!metadata.is_empty()).then_some(metadata);
        self
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(MetricValue::as_f64)
    }

    pub fn metric_metadata(&self, name: &str) -> Option<&MetricMetadata> {
        self.metadata.as_ref().and_then(|m| m.lookup(name))
    }

    /// Serialize to the versioned document.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse either the versioned or a legacy document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        super::legacy::decode(s)
    }
}
