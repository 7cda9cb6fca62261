//! Metric and category metadata registry.
//!
//! Lets application code declare new metrics without touching the snapshot
//! schema. Registrations are upserts: re-declaring the same name on every
//! launch is expected and silently replaces the previous entry.

use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;

use benchkit_core::metadata::ordered_categories;
use benchkit_core::{CategoryMetadata, MetricMetadata, SnapshotMetadata};

#[derive(Default)]
pub struct MetricRegistry {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    metrics: IndexMap<String, MetricMetadata>,
    categories: IndexMap<String, CategoryMetadata>,
}

impl MetricRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_metric(&self, metadata: MetricMetadata) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        tracing::trace!(metric = %metadata.name, category = %metadata.category, "metric registered");
        inner.metrics.insert(metadata.name.clone(), metadata);
    }

    pub fn register_category(&self, metadata: CategoryMetadata) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.categories.insert(metadata.id.clone(), metadata);
    }

    /// Copy of every registered metric.
    pub fn custom_metrics(&self) -> IndexMap<String, MetricMetadata> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .metrics
            .clone()
    }

    /// Copy of every registered category.
    pub fn custom_categories(&self) -> IndexMap<String, CategoryMetadata> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .categories
            .clone()
    }

    /// Categories in display order.
    pub fn ordered_categories(&self) -> Vec<CategoryMetadata> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        ordered_categories(inner.categories.values())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Metadata for a metric name: exact match, then wildcard patterns.
    /// Ad hoc names (e.g. `network_<prefix>_requestMs` without a pattern
    /// registration) have none.
    pub fn metric_metadata(&self, name: &str) -> Option<MetricMetadata> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner
            .metrics
            .get(name)
            .or_else(|| inner.metrics.values().find(|m| m.is_pattern && m.matches(name)))
            .cloned()
    }

    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.metrics.is_empty() && inner.categories.is_empty()
    }

    /// Metadata section for a snapshot.
    pub fn snapshot_metadata(&self) -> SnapshotMetadata {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        SnapshotMetadata {
            custom_metrics: inner.metrics.clone(),
            custom_categories: inner.categories.clone(),
        }
    }

    /// Wipe all registrations. Test harnesses only.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.metrics.clear();
        inner.categories.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reregistration_overwrites() {
        let r = MetricRegistry::new();
        r.register_metric(MetricMetadata::new("q", "db", "Query", "ms"));
        r.register_metric(MetricMetadata::new("q", "db", "Query Time", "ms"));
        let m = r.custom_metrics();
        assert_eq!(m.len(), 1);
        assert_eq!(m["q"].display_name, "Query Time");
    }

    #[test]
    fn returned_maps_are_copies() {
        let r = MetricRegistry::new();
        r.register_category(CategoryMetadata::new("db", "Database"));
        let mut copy = r.custom_categories();
        copy.clear();
        assert_eq!(r.custom_categories().len(), 1);
    }

    #[test]
    fn pattern_lookup_falls_back_after_exact() {
        let r = MetricRegistry::new();
        r.register_metric(MetricMetadata::new("network_*_requestMs", "network", "Request", "ms").pattern());
        r.register_metric(MetricMetadata::new("network_google_requestMs", "network", "Google", "ms"));
        assert_eq!(r.metric_metadata("network_google_requestMs").unwrap().display_name, "Google");
        assert_eq!(r.metric_metadata("network_aviation_requestMs").unwrap().display_name, "Request");
        assert!(r.metric_metadata("network_aviation_responseCode").is_none());
    }

    #[test]
    fn clear_wipes_and_metadata_reflects_state() {
        let r = MetricRegistry::new();
        assert!(r.snapshot_metadata().is_empty());
        r.register_category(CategoryMetadata::new("ui", "UI").with_order(1));
        r.register_category(CategoryMetadata::new("cpu", "CPU").with_order(1));
        let ids: Vec<_> = r.ordered_categories().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, ["cpu", "ui"]);
        r.clear();
        assert!(r.is_empty());
    }
}
