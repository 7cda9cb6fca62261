//! benchkit report
//!
//! Compares the baseline and candidate scenario snapshots pulled off a device
//! and writes `report.html` next to them.
//!
//! Usage: `benchkit-report [config.yaml]` (default `benchkit.yaml`; built-in
//! defaults when that file does not exist).

use std::path::Path;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use benchkit_core::error::Result;
use benchkit_sdk::config::{self, BenchConfig};
use benchkit_sdk::report::compare;
use benchkit_sdk::upload::{NoOpResultsUploader, ResultsUploader};

const DEFAULT_CONFIG: &str = "benchkit.yaml";

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code().as_str(), "{e}");
            eprintln!("benchkit-report: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cfg = load_config(std::env::args().nth(1))?;
    let comparison = compare::compare_scenarios(&cfg)?;
    println!("Report generated: {}", comparison.report_path.display());

    let payload = comparison.candidate.to_json_pretty()?;
    NoOpResultsUploader.upload(&payload).await
}

fn load_config(arg: Option<String>) -> Result<BenchConfig> {
    match arg {
        Some(path) => config::load_from_file(path),
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_from_file(DEFAULT_CONFIG),
        None => {
            tracing::debug!("no {DEFAULT_CONFIG}; using defaults");
            Ok(BenchConfig::default())
        }
    }
}
