//! Baseline vs candidate comparison over the per-scenario snapshot files.

use std::fs;
use std::path::{Path, PathBuf};

use benchkit_core::error::{BenchError, Result};
use benchkit_core::Snapshot;

use crate::config::BenchConfig;
use crate::report::{html, json, DeltaPolarity};

/// File name of the comparison report.
pub const REPORT_FILE: &str = "report.html";

/// `benchmark-<label>.json`, with the label reduced to file-name-safe characters.
pub fn scenario_file_name(label: &str) -> String {
    let safe: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    format!("benchmark-{safe}.json")
}

pub fn polarity_for(cfg: &BenchConfig) -> DeltaPolarity {
    if cfg.report.respect_lower_is_better {
        DeltaPolarity::RespectMetadata
    } else {
        DeltaPolarity::Fixed
    }
}

#[derive(Debug)]
pub struct Comparison {
    pub baseline: Snapshot,
    pub candidate: Snapshot,
    pub report_path: PathBuf,
}

/// Load one scenario snapshot, or explain how to produce it.
pub fn load_scenario(dir: &Path, label: &str) -> Result<Snapshot> {
    let path = dir.join(scenario_file_name(label));
    let hint = format!(
        "run the instrumented benchmark suite with scenario '{label}' and copy {} into {}",
        scenario_file_name(label),
        dir.display()
    );

    let empty = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
    if empty {
        return Err(BenchError::MissingInput { path, hint });
    }
    match json::read(&path) {
        Some(s) if !s.metrics.is_empty() => Ok(s),
        _ => Err(BenchError::MissingInput {
            path,
            hint: format!("file is unreadable or has no metrics; {hint}"),
        }),
    }
}

/// Render `report.html` with the candidate as current and the baseline as
/// previous.
pub fn compare_scenarios(cfg: &BenchConfig) -> Result<Comparison> {
    let dir = &cfg.output.dir;
    let baseline = load_scenario(dir, &cfg.scenario.baseline)?;
    let candidate = load_scenario(dir, &cfg.scenario.candidate)?;

    let doc = html::render(&candidate, Some(&baseline), polarity_for(cfg));
    let report_path = dir.join(REPORT_FILE);
    fs::write(&report_path, doc).map_err(|e| BenchError::io(&report_path, e))?;
    tracing::info!(
        report = %report_path.display(),
        baseline = %cfg.scenario.baseline,
        candidate = %cfg.scenario.candidate,
        "comparison report written"
    );

    Ok(Comparison {
        baseline,
        candidate,
        report_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_made_file_safe() {
        assert_eq!(scenario_file_name("heavy"), "benchmark-heavy.json");
        assert_eq!(scenario_file_name("../etc/x y"), "benchmark-.._etc_x_y.json");
    }
}
