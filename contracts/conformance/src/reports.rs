//! Conformance test reporting

use crate::error::{ConformanceError, ErrorKind};
use crate::suite::CheckOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Test status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// The independent checks, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Version,
    Inputs,
    Validation,
    Execution,
    AdjustmentSweep,
}

impl CheckKind {
    pub const ALL: [CheckKind; 5] = [
        CheckKind::Version,
        CheckKind::Inputs,
        CheckKind::Validation,
        CheckKind::Execution,
        CheckKind::AdjustmentSweep,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::Version => "version",
            CheckKind::Inputs => "inputs",
            CheckKind::Validation => "validation",
            CheckKind::Execution => "execution",
            CheckKind::AdjustmentSweep => "adjustment_sweep",
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Individual test result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub check: CheckKind,
    pub status: TestStatus,
    pub duration: Duration,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub warnings: Vec<String>,
    pub details: BTreeMap<String, String>,
}

impl TestResult {
    /// Create a passed test result from a check outcome
    pub fn passed(outcome: CheckOutcome, duration: Duration) -> Self {
        Self {
            check: outcome.check,
            status: TestStatus::Passed,
            duration,
            error: None,
            error_kind: None,
            warnings: outcome.warnings,
            details: outcome.details,
        }
    }

    /// Create a failed test result
    pub fn failed(check: CheckKind, error: &ConformanceError, duration: Duration) -> Self {
        Self {
            check,
            status: TestStatus::Failed,
            duration,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            warnings: Vec::new(),
            details: BTreeMap::new(),
        }
    }

    /// Create a skipped test result
    pub fn skipped(check: CheckKind, reason: impl Into<String>) -> Self {
        Self {
            check,
            status: TestStatus::Skipped,
            duration: Duration::ZERO,
            error: None,
            error_kind: None,
            warnings: vec![reason.into()],
            details: BTreeMap::new(),
        }
    }

    pub fn from_outcome(
        check: CheckKind,
        outcome: Result<CheckOutcome, ConformanceError>,
        duration: Duration,
    ) -> Self {
        match outcome {
            Ok(outcome) => Self::passed(outcome, duration),
            Err(error) => Self::failed(check, &error, duration),
        }
    }
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub conformant: bool,
}

/// Complete conformance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub model_name: String,
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
    pub results: Vec<TestResult>,
    pub summary: ReportSummary,
}

impl ConformanceReport {
    /// Create a new report
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            timestamp: Utc::now(),
            duration: Duration::ZERO,
            results: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Finalize the report and compute summary
    pub fn finalize(&mut self) {
        let mut summary = ReportSummary::default();

        for result in &self.results {
            summary.total += 1;
            match result.status {
                TestStatus::Passed => {
                    summary.passed += 1;
                    summary.warnings += result.warnings.len();
                }
                TestStatus::Failed => summary.failed += 1,
                TestStatus::Skipped => summary.skipped += 1,
            }
        }
        summary.conformant = summary.failed == 0;

        self.summary = summary;
    }

    /// Result for one check, if it was recorded
    pub fn result(&self, check: CheckKind) -> Option<&TestResult> {
        self.results.iter().find(|r| r.check == check)
    }

    pub fn passed_count(&self) -> usize {
        self.summary.passed
    }

    pub fn failed_count(&self) -> usize {
        self.summary.failed
    }

    pub fn skipped_count(&self) -> usize {
        self.summary.skipped
    }

    /// Check if conformant
    pub fn is_conformant(&self) -> bool {
        self.summary.conformant
    }

    /// Generate a text report
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("╔════════════════════════════════════════════════════════════╗\n");
        output.push_str("║  Model Conformance Report                                  ║\n");
        output.push_str("╠════════════════════════════════════════════════════════════╣\n");
        output.push_str(&format!("║  Model: {:<50} ║\n", self.model_name));
        output.push_str(&format!(
            "║  Timestamp: {:<46} ║\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str(&format!(
            "║  Duration: {:<47} ║\n",
            format!("{:?}", self.duration)
        ));
        output.push_str("╠════════════════════════════════════════════════════════════╣\n");

        for result in &self.results {
            let status_icon = match result.status {
                TestStatus::Passed => "✓",
                TestStatus::Failed => "✗",
                TestStatus::Skipped => "○",
            };

            output.push_str(&format!(
                "║  {} {:<45} {:>8?}\n",
                status_icon,
                result.check.name(),
                result.duration
            ));

            if let Some(error) = &result.error {
                match result.error_kind {
                    Some(kind) => output.push_str(&format!("║      {}: {}\n", kind, error)),
                    None => output.push_str(&format!("║      Error: {}\n", error)),
                }
            }

            for warning in &result.warnings {
                output.push_str(&format!("║      Warning: {}\n", warning));
            }

            for (key, value) in &result.details {
                output.push_str(&format!("║      {}: {}\n", key, value));
            }
        }

        output.push_str("╠════════════════════════════════════════════════════════════╣\n");
        output.push_str("║  Summary:                                                  ║\n");
        output.push_str(&format!(
            "║    Total: {:<5}  Passed: {:<5}  Failed: {:<5}  Skipped: {:<3} ║\n",
            self.summary.total, self.summary.passed, self.summary.failed, self.summary.skipped
        ));
        output.push_str("║                                                            ║\n");

        if self.summary.conformant {
            output.push_str("║  Result: ✓ CONFORMANT                                      ║\n");
        } else {
            output.push_str("║  Result: ✗ NON-CONFORMANT                                  ║\n");
        }

        output.push_str("╚════════════════════════════════════════════════════════════╝\n");

        output
    }

    /// Generate JSON report
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
