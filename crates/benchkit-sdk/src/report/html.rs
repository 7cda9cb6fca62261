//! Current-vs-previous diff and its HTML rendering.
//!
//! Rows cover the union of metric names of both snapshots, sorted by name.
//! `delta = current - previous` when both sides are numeric, otherwise the
//! delta cell shows `-`.
//!
//! Classification defaults to a fixed rule, `delta <= 0` is better, which
//! misreads metrics where higher is better (FPS, hit rates). Whether that is
//! intended is unconfirmed, so it stays the default and
//! `DeltaPolarity::RespectMetadata` is opt-in.

use std::collections::BTreeSet;
use std::fmt::Write;

use benchkit_core::metadata::Severity;
use benchkit_core::{MetricMetadata, MetricValue, Snapshot};

/// Placeholder for a missing value or delta.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaPolarity {
    /// `delta <= 0` is better, for every metric.
    #[default]
    Fixed,
    /// Use the metric's `lowerIsBetter`; unregistered metrics use `Fixed`.
    RespectMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Better,
    Worse,
    Neutral,
}

impl RowClass {
    pub fn css(self) -> &'static str {
        match self {
            RowClass::Better => "better",
            RowClass::Worse => "worse",
            RowClass::Neutral => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow {
    pub name: String,
    pub current: Option<MetricValue>,
    pub previous: Option<MetricValue>,
    pub delta: Option<f64>,
    pub class: RowClass,
    pub metadata: Option<MetricMetadata>,
}

impl DiffRow {
    pub fn delta_text(&self) -> String {
        match self.delta {
            Some(d) => format!("{d:.2}"),
            None => PLACEHOLDER.to_string(),
        }
    }

    fn severity(&self) -> Option<Severity> {
        let value = self.current.as_ref()?.as_f64()?;
        self.metadata.as_ref()?.severity(value)
    }
}

pub fn diff_rows(current: &Snapshot, previous: Option<&Snapshot>, polarity: DeltaPolarity) -> Vec<DiffRow> {
    let mut names: BTreeSet<&str> = current.metrics.keys().map(String::as_str).collect();
    if let Some(prev) = previous {
        names.extend(prev.metrics.keys().map(String::as_str));
    }

    names
        .into_iter()
        .map(|name| {
            let cur = current.get(name).cloned();
            let prev = previous.and_then(|p| p.get(name)).cloned();
            let delta = match (cur.as_ref().and_then(MetricValue::as_f64), prev.as_ref().and_then(MetricValue::as_f64)) {
                (Some(c), Some(p)) => Some(c - p),
                _ => None,
            };
            let metadata = current
                .metric_metadata(name)
                .or_else(|| previous.and_then(|p| p.metric_metadata(name)))
                .cloned();
            let class = classify(delta, metadata.as_ref(), polarity);
            DiffRow {
                name: name.to_string(),
                current: cur,
                previous: prev,
                delta,
                class,
                metadata,
            }
        })
        .collect()
}

fn classify(delta: Option<f64>, metadata: Option<&MetricMetadata>, polarity: DeltaPolarity) -> RowClass {
    let Some(d) = delta else {
        return RowClass::Neutral;
    };
    let lower_is_better = match polarity {
        DeltaPolarity::Fixed => true,
        DeltaPolarity::RespectMetadata => metadata.map_or(true, |m| m.lower_is_better),
    };
    let better = if lower_is_better { d <= 0.0 } else { d >= 0.0 };
    if better {
        RowClass::Better
    } else {
        RowClass::Worse
    }
}

pub(crate) fn escape_html(v: &str) -> String {
    let mut out = String::with_capacity(v.len());
    for c in v.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn cell(v: Option<&MetricValue>) -> String {
    match v {
        Some(v) => escape_html(&v.to_string()),
        None => PLACEHOLDER.to_string(),
    }
}

/// Provider sentinels end in `__error`, network probe errors in `_error`.
fn is_error_metric(name: &str) -> bool {
    name.ends_with("_error")
}

const STYLE: &str = "body{font-family:Arial;margin:16px;} table{border-collapse:collapse;} \
th,td{border:1px solid #ccc;padding:4px 8px;} th{background:#eee;} \
.better{color:green;} .worse{color:#b00;} .sev-fair{background:#f4f8e0;} .sev-warning{background:#fff4cc;} \
.sev-critical{background:#ffd2d2;} .error{background:#ffd2d2;} .unit{color:#777;font-size:smaller;}";

pub fn render(current: &Snapshot, previous: Option<&Snapshot>, polarity: DeltaPolarity) -> String {
    render_rows(current, previous, &diff_rows(current, previous, polarity))
}

pub fn render_rows(current: &Snapshot, previous: Option<&Snapshot>, rows: &[DiffRow]) -> String {
    let mut out = String::new();
    out.push_str("<html><head><meta charset='utf-8'><title>Benchmark Report</title>");
    let _ = write!(out, "<style>{STYLE}</style>");
    out.push_str("</head><body><h1>Benchmark Report</h1>");
    let _ = write!(out, "<p>Generated: {}</p>", current.timestamp_millis);
    if let Some(label) = &current.scenario {
        let _ = write!(out, "<p>Scenario: {}</p>", escape_html(label));
    }
    match previous {
        Some(prev) => {
            let _ = write!(
                out,
                "<p>Previous: {}{}</p>",
                prev.timestamp_millis,
                prev.scenario
                    .as_deref()
                    .map(|s| format!(" ({})", escape_html(s)))
                    .unwrap_or_default()
            );
        }
        None => out.push_str("<p>Previous: none</p>"),
    }

    out.push_str("<table><tr><th>Metric</th><th>Current</th><th>Previous</th><th>Delta</th></tr>");
    for row in rows {
        let error_row = is_error_metric(&row.name)
            || row.metadata.as_ref().is_some_and(|m| m.highlight_error);
        let tr_class = if error_row { " class='error'" } else { "" };

        let label = match &row.metadata {
            Some(m) if !m.display_name.is_empty() => format!(
                "{} <span class='unit'>{} [{}]</span>",
                escape_html(&row.name),
                escape_html(&m.display_name),
                escape_html(&m.unit)
            ),
            _ => escape_html(&row.name),
        };
        let cur_class = row
            .severity()
            .map(|s| format!(" class='sev-{}'", s.as_str()))
            .unwrap_or_default();

        let _ = write!(
            out,
            "<tr{tr_class}><td>{label}</td><td{cur_class}>{}</td><td>{}</td><td class='{}'>{}</td></tr>",
            cell(row.current.as_ref()),
            cell(row.previous.as_ref()),
            row.class.css(),
            row.delta_text(),
        );
    }
    out.push_str("</table></body></html>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchkit_core::SnapshotMetadata;
    use indexmap::IndexMap;

    fn snap(entries: &[(&str, MetricValue)]) -> Snapshot {
        let metrics: IndexMap<String, MetricValue> =
            entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        Snapshot::new(1, metrics)
    }

    #[test]
    fn union_of_names_sorted_alphabetically() {
        let cur = snap(&[("b", 5.into()), ("a", 10.into())]);
        let prev = snap(&[("a", 12.into()), ("c", 1.into())]);
        let rows = diff_rows(&cur, Some(&prev), DeltaPolarity::Fixed);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(rows[0].delta, Some(-2.0));
        assert_eq!(rows[0].class, RowClass::Better);
        assert_eq!(rows[1].delta_text(), "-");
        assert_eq!(rows[1].class, RowClass::Neutral);
        assert!(rows[2].current.is_none());
    }

    #[test]
    fn zero_delta_counts_as_better() {
        let cur = snap(&[("a", 3.into())]);
        let rows = diff_rows(&cur, Some(&cur), DeltaPolarity::Fixed);
        assert_eq!(rows[0].class, RowClass::Better);
    }

    #[test]
    fn text_values_have_no_delta() {
        let cur = snap(&[("p__error", "Timeout".into())]);
        let prev = snap(&[("p__error", "Timeout".into())]);
        let rows = diff_rows(&cur, Some(&prev), DeltaPolarity::Fixed);
        assert_eq!(rows[0].delta, None);
    }

    #[test]
    fn fixed_polarity_ignores_higher_is_better() {
        let mut meta = SnapshotMetadata::default();
        meta.custom_metrics.insert(
            "fps".into(),
            MetricMetadata::new("fps", "ui", "Frame rate", "fps").higher_is_better(),
        );
        let cur = snap(&[("fps", 60.into())]).with_metadata(meta);
        let prev = snap(&[("fps", 50.into())]);

        let fixed = diff_rows(&cur, Some(&prev), DeltaPolarity::Fixed);
        assert_eq!(fixed[0].class, RowClass::Worse);

        let aware = diff_rows(&cur, Some(&prev), DeltaPolarity::RespectMetadata);
        assert_eq!(aware[0].class, RowClass::Better);
    }

    #[test]
    fn only_error_suffixed_rows_are_highlighted() {
        let cur = snap(&[
            ("mirror", 1.into()),
            ("cache__error", "Panic".into()),
            ("network_api_error", "timeout".into()),
        ]);
        let html = render(&cur, None, DeltaPolarity::Fixed);
        assert!(html.contains("<tr><td>mirror</td>"));
        assert!(html.contains("<tr class='error'><td>cache__error</td>"));
        assert!(html.contains("<tr class='error'><td>network_api_error</td>"));
    }

    #[test]
    fn fair_band_gets_its_own_class() {
        let mut meta = SnapshotMetadata::default();
        meta.custom_metrics.insert(
            "queryMs".into(),
            MetricMetadata::new("queryMs", "db", "Query", "ms")
                .with_thresholds(benchkit_core::MetricThresholds::new(50, 150, 300)),
        );
        let cur = snap(&[("queryMs", 100.into())]).with_metadata(meta);
        let html = render(&cur, None, DeltaPolarity::Fixed);
        assert!(html.contains("<td class='sev-fair'>100</td>"));
    }

    #[test]
    fn names_are_escaped() {
        let cur = snap(&[("<script>", 1.into())]);
        let html = render(&cur, None, DeltaPolarity::Fixed);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<td><script>"));
        assert!(html.contains("Previous: none"));
    }
}
