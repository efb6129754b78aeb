//! Fixture execution engine.

use envtap_core::{Interceptor, RewriteMode};

use crate::fixtures::{ABSENT, FixtureCase, FixtureSet};

/// Outcome of one fixture case.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Case identifier.
    pub case_name: String,
    /// Whether the observation matched the expectation.
    pub passed: bool,
    /// Expected observation.
    pub expected: String,
    /// Actual observation.
    pub actual: String,
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    #[must_use]
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| {
                let actual = execute_case(case);
                VerificationResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expected,
                    expected: case.expected.clone(),
                    actual,
                }
            })
            .collect()
    }
}

/// Execute one case on a fresh interceptor and render the observation.
fn execute_case(case: &FixtureCase) -> String {
    let entries: Vec<&[u8]> = case.env.iter().map(String::as_bytes).collect();
    let mut interceptor = Interceptor::new(RewriteMode::from_str_loose(&case.mode));
    match interceptor.lookup(&entries, case.query.as_bytes()) {
        Some(value) => String::from_utf8_lossy(value).into_owned(),
        None => ABSENT.to_string(),
    }
}
