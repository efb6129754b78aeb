//! Fixture loading and management.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel used in [`FixtureCase::expected`] for a not-found outcome.
pub const ABSENT: &str = "<absent>";

/// Errors raised while loading fixture files.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse fixture JSON")]
    Json(#[from] serde_json::Error),
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Environment vector, `NAME=VALUE` entries in authoritative order.
    pub env: Vec<String>,
    /// Variable name handed to the lookup.
    pub query: String,
    /// Rewrite mode the case runs under (`replace` or `prepend`).
    pub mode: String,
    /// Expected observation: the value, or [`ABSENT`].
    pub expected: String,
}

/// A collection of fixture cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// UTC timestamp of authoring.
    pub captured_at: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load a fixture set from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the fixture set to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a fixture set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, FixtureError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// Built-in smoke fixture covering the headline lookup behaviors.
#[must_use]
pub fn smoke_set() -> FixtureSet {
    FixtureSet {
        version: "v1".to_string(),
        captured_at: "2026-08-07T00:00:00Z".to_string(),
        cases: vec![
            FixtureCase {
                name: "target_absent_gets_fragment".to_string(),
                env: vec!["PATH=/usr/bin".to_string()],
                query: "JAVA_TOOL_OPTIONS".to_string(),
                mode: "replace".to_string(),
                expected: " -javaagent:/otel-auto-instrumentation-injector/javaagent.jar"
                    .to_string(),
            },
            FixtureCase {
                name: "target_present_replace_discards".to_string(),
                env: vec!["JAVA_TOOL_OPTIONS=-Xmx512m".to_string()],
                query: "JAVA_TOOL_OPTIONS".to_string(),
                mode: "replace".to_string(),
                expected: " -javaagent:/otel-auto-instrumentation-injector/javaagent.jar"
                    .to_string(),
            },
            FixtureCase {
                name: "target_present_prepend_keeps".to_string(),
                env: vec!["JAVA_TOOL_OPTIONS=-Xmx512m".to_string()],
                query: "JAVA_TOOL_OPTIONS".to_string(),
                mode: "prepend".to_string(),
                expected:
                    " -javaagent:/otel-auto-instrumentation-injector/javaagent.jar -Xmx512m"
                        .to_string(),
            },
            FixtureCase {
                name: "non_target_passthrough".to_string(),
                env: vec!["PATH=/usr/bin:/bin".to_string()],
                query: "PATH".to_string(),
                mode: "replace".to_string(),
                expected: "/usr/bin:/bin".to_string(),
            },
            FixtureCase {
                name: "prefix_is_not_a_match".to_string(),
                env: vec!["FOO=1".to_string(), "FOOBAR=2".to_string()],
                query: "FOO".to_string(),
                mode: "replace".to_string(),
                expected: "1".to_string(),
            },
            FixtureCase {
                name: "empty_key_is_absent".to_string(),
                env: vec!["X=1".to_string()],
                query: "=X".to_string(),
                mode: "replace".to_string(),
                expected: ABSENT.to_string(),
            },
        ],
    }
}
