//! Baseline vs candidate comparison report.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::fs;

use benchkit_core::error::BenchError;
use benchkit_sdk::report::compare::{self, REPORT_FILE};

#[test]
fn missing_candidate_names_file_and_step() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("benchmark-baseline.json"), r#"{"a": 1}"#).unwrap();
    let cfg = common::config_in(dir.path());

    let err = compare::compare_scenarios(&cfg).unwrap_err();
    assert_eq!(err.code().as_str(), "MISSING_INPUT");
    match err {
        BenchError::MissingInput { path, hint } => {
            assert!(path.ends_with("benchmark-heavy.json"));
            assert!(hint.contains("scenario 'heavy'"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dir.path().join(REPORT_FILE).exists());
}

#[test]
fn empty_baseline_is_missing_input() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("benchmark-baseline.json"), "").unwrap();
    fs::write(dir.path().join("benchmark-heavy.json"), r#"{"a": 1}"#).unwrap();

    let err = compare::compare_scenarios(&common::config_in(dir.path())).unwrap_err();
    assert_eq!(err.code().as_str(), "MISSING_INPUT");
}

#[test]
fn report_uses_candidate_as_current() {
    let dir = tempfile::tempdir().unwrap();

    // baseline written by the SDK, heavy in the legacy flat format
    let (_clock, ctx) = common::context(common::config_in(dir.path()), 5_000);
    ctx.store().set_scenario("baseline");
    ctx.store().record_metric("cpuHeavyLoopMs", 12);
    ctx.collect_scenario_and_persist().unwrap();
    fs::write(
        dir.path().join("benchmark-heavy.json"),
        r#"{"cpuHeavyLoopMs": 80, "extraMs": 3}"#,
    )
    .unwrap();

    let cmp = compare::compare_scenarios(&common::config_in(dir.path())).unwrap();
    assert_eq!(cmp.report_path, dir.path().join(REPORT_FILE));
    let html = fs::read_to_string(&cmp.report_path).unwrap();
    assert!(html.contains("<tr><td>cpuHeavyLoopMs</td><td>80</td><td>12</td><td class='worse'>68.00</td></tr>"));
    assert!(html.contains("<tr><td>extraMs</td><td>3</td><td>-</td><td class=''>-</td></tr>"));
    // runtime metrics only in the baseline still get a row
    assert!(html.contains("<tr><td>memoryPssKb</td><td>-</td><td>90000</td>"));
}
