use std::path::PathBuf;

use serde::Deserialize;

use benchkit_core::error::{BenchError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchConfig {
    pub version: u32,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub scenario: ScenarioSection,

    #[serde(default)]
    pub report: ReportSection,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            version: 1,
            output: OutputSection::default(),
            scenario: ScenarioSection::default(),
            report: ReportSection::default(),
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BenchError::UnsupportedVersion);
        }

        self.output.validate()?;
        self.scenario.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Retried once when `dir` cannot be created or written.
    #[serde(default)]
    pub fallback_dir: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub write_latest_html: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            fallback_dir: None,
            write_latest_html: true,
        }
    }
}

impl OutputSection {
    pub fn validate(&self) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(BenchError::InvalidConfig("output.dir must not be empty".into()));
        }
        if let Some(fallback) = &self.fallback_dir {
            if fallback.as_os_str().is_empty() {
                return Err(BenchError::InvalidConfig(
                    "output.fallback_dir must not be empty when set".into(),
                ));
            }
            if *fallback == self.dir {
                return Err(BenchError::InvalidConfig(
                    "output.fallback_dir must differ from output.dir".into(),
                ));
            }
        }
        Ok(())
    }

    /// Primary directory first, then the fallback if configured.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.dir.clone()];
        dirs.extend(self.fallback_dir.clone());
        dirs
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioSection {
    /// Initial session label; may be replaced at runtime.
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default = "default_baseline")]
    pub baseline: String,

    #[serde(default = "default_candidate")]
    pub candidate: String,
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self {
            label: None,
            baseline: default_baseline(),
            candidate: default_candidate(),
        }
    }
}

impl ScenarioSection {
    pub fn validate(&self) -> Result<()> {
        if self.baseline.trim().is_empty() || self.candidate.trim().is_empty() {
            return Err(BenchError::InvalidConfig(
                "scenario.baseline and scenario.candidate must not be empty".into(),
            ));
        }
        if self.baseline == self.candidate {
            return Err(BenchError::InvalidConfig(
                "scenario.baseline must differ from scenario.candidate".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    /// Classify deltas with each metric's `lowerIsBetter` instead of the
    /// fixed "lower is better" rule.
    #[serde(default)]
    pub respect_lower_is_better: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from("benchmark-results")
}
fn default_true() -> bool {
    true
}
fn default_baseline() -> String {
    "baseline".into()
}
fn default_candidate() -> String {
    "heavy".into()
}
