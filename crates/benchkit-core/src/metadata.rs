//! Metric and category metadata.
//!
//! Metadata describes how a metric is displayed and judged, independently of
//! any recorded value. The serde shape matches the `metadata` section of the
//! snapshot document: the metric name / category id is the map key there, so
//! it is not serialized inside the entry itself.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::metric::Number;

/// Default display order for categories that do not set one.
pub const DEFAULT_CATEGORY_ORDER: i32 = 999;

/// Severity boundaries in the metric's native unit. Presentation only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricThresholds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub good: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<Number>,
}

impl MetricThresholds {
    pub fn new(good: impl Into<Number>, warning: impl Into<Number>, critical: impl Into<Number>) -> Self {
        Self {
            good: Some(good.into()),
            warning: Some(warning.into()),
            critical: Some(critical.into()),
        }
    }
}

/// Severity of a value against its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    /// Past `good` but not yet at `warning`.
    Fair,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Good => "good",
            Severity::Fair => "fair",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricMetadata {
    /// Unique metric identifier, e.g. `cpuHeavyLoopMs`.
    #[serde(skip)]
    pub name: String,
    /// Category id, e.g. `cpu`, `memory`, `network`.
    pub category: String,
    pub display_name: String,
    /// Unit of measurement, e.g. `ms`, `bytes`, `%`.
    pub unit: String,
    #[serde(default = "default_lower_is_better")]
    pub lower_is_better: bool,
    #[serde(default, with = "empty_as_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<MetricThresholds>,
    /// Name is a wildcard pattern such as `network_*_requestMs`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_pattern: bool,
    /// Rows for this metric are highlighted as error indicators.
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlight_error: bool,
    /// Descriptive value rather than a performance measurement.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_metadata: bool,
}

fn default_lower_is_better() -> bool {
    true
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// Optional text written as `""` when absent; `""` and `null` read back as `None`.
mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(v.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let v = Option::<String>::deserialize(d)?;
        Ok(v.filter(|s| !s.is_empty()))
    }
}

impl MetricMetadata {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        display_name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            display_name: display_name.into(),
            unit: unit.into(),
            lower_is_better: true,
            description: None,
            thresholds: None,
            is_pattern: false,
            highlight_error: false,
            is_metadata: false,
        }
    }

    pub fn higher_is_better(mut self) -> Self {
        self.lower_is_better = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_thresholds(mut self, thresholds: MetricThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn pattern(mut self) -> Self {
        self.is_pattern = true;
        self
    }

    pub fn highlight_error(mut self) -> Self {
        self.highlight_error = true;
        self
    }

    /// Whether this metadata applies to `metric`. Patterns support one or more
    /// `*` wildcards, each matching any (possibly empty) run of characters.
    pub fn matches(&self, metric: &str) -> bool {
        if !self.is_pattern {
            return self.name == metric;
        }
        wildcard_match(&self.name, metric)
    }

    /// Classify `value` against the thresholds, honoring `lower_is_better`.
    /// `good` is inclusive: with `lower_is_better` a value at or below it is
    /// good, a value above it but short of `warning` is fair. Returns `None`
    /// when no thresholds are declared.
    pub fn severity(&self, value: f64) -> Option<Severity> {
        let t = self.thresholds.as_ref()?;
        let crosses = |bound: Option<Number>| {
            bound.map(|b| {
                let b = b.as_f64();
                if self.lower_is_better {
                    value >= b
                } else {
                    value <= b
                }
            })
        };
        let within_good = t.good.map(|b| {
            let b = b.as_f64();
            if self.lower_is_better {
                value <= b
            } else {
                value >= b
            }
        });
        if crosses(t.critical) == Some(true) {
            return Some(Severity::Critical);
        }
        if crosses(t.warning) == Some(true) {
            return Some(Severity::Warning);
        }
        if within_good == Some(false) {
            return Some(Severity::Fair);
        }
        Some(Severity::Good)
    }
}

fn wildcard_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return text.is_empty(),
    };
    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };
    for part in middle {
        match remaining.find(part) {
            Some(idx) => remaining = &remaining[idx + part.len()..],
            None => return false,
        }
    }
    remaining.len() >= last.len() && remaining.ends_with(last)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMetadata {
    #[serde(skip)]
    pub id: String,
    pub display_name: String,
    /// Icon or emoji shown next to the category heading.
    #[serde(default, with = "empty_as_none")]
    pub icon: Option<String>,
    #[serde(default, with = "empty_as_none")]
    pub description: Option<String>,
    /// Lower numbers are displayed first.
    #[serde(default = "default_order")]
    pub order: i32,
}

fn default_order() -> i32 {
    DEFAULT_CATEGORY_ORDER
}

impl CategoryMetadata {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            icon: None,
            description: None,
            order: DEFAULT_CATEGORY_ORDER,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Display precedence: ascending `order`, ties broken by `id`.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        self.order
            .cmp(&other.order)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Categories sorted for display.
pub fn ordered_categories<'a, I>(categories: I) -> Vec<&'a CategoryMetadata>
where
    I: IntoIterator<Item = &'a CategoryMetadata>,
{
    let mut out: Vec<_> = categories.into_iter().collect();
    out.sort_by(|a, b| a.display_cmp(b));
    out
}
