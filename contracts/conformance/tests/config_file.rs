mod common;

use common::init_tracing;
use modelkit_conformance::{
    CheckKind, ConformanceConfig, ConformanceError, ConformanceRunner, ReferenceModel,
};
use std::io::Write;

#[test]
fn runner_honors_config_file() {
    init_tracing();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
run_version = false
run_adjustment_sweep = true
latency_warning_ms = 5000

[sampling]
threshold = 1
stride = 2
"#
    )
    .unwrap();

    let config = ConformanceConfig::load(file.path()).unwrap();
    assert_eq!(config.latency_warning_ms, 5000);
    assert_eq!(config.sampling.threshold, 1);

    let fixtures = ReferenceModel::fixtures();
    let report = ConformanceRunner::new(config).run("reference", &ReferenceModel, &fixtures);
    assert!(report.is_conformant(), "{}", report.to_text());
    assert!(report.result(CheckKind::Version).is_none());

    // Two greetings exceed a threshold of one; only index 0 is dispatched.
    let inputs = report.result(CheckKind::Inputs).unwrap();
    assert_eq!(inputs.details["dispatched"], "1");
    assert_eq!(inputs.warnings.len(), 1);
    assert!(report.result(CheckKind::AdjustmentSweep).is_some());
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConformanceConfig::load(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, ConformanceConfig::default());
}

#[test]
fn malformed_file_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "run_inputs = \"yes\"").unwrap();
    let err = ConformanceConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConformanceError::Config(_)));
}
