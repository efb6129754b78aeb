//! Conformance report generation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::runner::VerificationResult;

/// One failed case, kept verbatim for the report consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureDetail {
    pub case_name: String,
    pub expected: String,
    pub actual: String,
}

/// Machine-readable summary of a harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    /// Name of the test campaign.
    pub campaign: String,
    /// Total cases executed.
    pub total: usize,
    /// Cases whose observation matched.
    pub passed: usize,
    /// Cases whose observation did not match.
    pub failed: usize,
    /// SHA-256 of the fixture JSON the run was driven by.
    pub fixture_sha256: String,
    /// Verbatim details for every failed case.
    pub failures: Vec<FailureDetail>,
}

impl ConformanceReport {
    /// Build a report from runner results and the fixture JSON they ran on.
    #[must_use]
    pub fn from_results(
        campaign: impl Into<String>,
        fixture_json: &str,
        results: &[VerificationResult],
    ) -> Self {
        let failures: Vec<FailureDetail> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| FailureDetail {
                case_name: r.case_name.clone(),
                expected: r.expected.clone(),
                actual: r.actual.clone(),
            })
            .collect();
        Self {
            campaign: campaign.into(),
            total: results.len(),
            passed: results.len() - failures.len(),
            failed: failures.len(),
            fixture_sha256: fixture_digest(fixture_json),
            failures,
        }
    }

    /// Whether every case passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Serialize the report to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Hex-encoded SHA-256 of the fixture JSON.
#[must_use]
pub fn fixture_digest(json: &str) -> String {
    let digest = Sha256::digest(json.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
