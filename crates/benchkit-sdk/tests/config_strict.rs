#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::PathBuf;

use benchkit_sdk::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
output:
  dir: "out"
  fallbak_dir: "/tmp/x" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.output.dir, PathBuf::from("benchmark-results"));
    assert!(cfg.output.write_latest_html);
    assert_eq!(cfg.scenario.baseline, "baseline");
    assert_eq!(cfg.scenario.candidate, "heavy");
    assert!(!cfg.report.respect_lower_is_better);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
output:
  dir: "/sdcard/bench"
  fallback_dir: "/data/local/tmp/bench"
  write_latest_html: false
scenario:
  label: "heavy"
  baseline: "v1"
  candidate: "v2"
report:
  respect_lower_is_better: true
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(
        cfg.output.candidate_dirs(),
        vec![PathBuf::from("/sdcard/bench"), PathBuf::from("/data/local/tmp/bench")]
    );
    assert_eq!(cfg.scenario.label.as_deref(), Some("heavy"));
    assert!(cfg.report.respect_lower_is_better);
}

#[test]
fn rejects_wrong_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_same_baseline_and_candidate() {
    let bad = r#"
version: 1
scenario:
  baseline: "heavy"
  candidate: "heavy"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "INVALID_CONFIG");
}

#[test]
fn rejects_fallback_equal_to_dir() {
    let bad = r#"
version: 1
output:
  dir: "out"
  fallback_dir: "out"
"#;
    assert!(config::load_from_str(bad).is_err());
}

#[test]
fn missing_file_is_io_error() {
    let err = config::load_from_file("/definitely/not/here/benchkit.yaml").expect_err("must fail");
    assert_eq!(err.code().as_str(), "IO");
}
