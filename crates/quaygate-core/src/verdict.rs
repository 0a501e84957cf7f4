//! Normalized interpreter verdicts.
//!
//! Every output interpreter returns a [`Verdict`]: a validity flag, an
//! optional failure description, and a bag of extracted metrics. Validity is
//! decoupled from the raw exit status: a command can exit non-zero and still
//! be judged valid, or exit zero and be judged invalid (e.g. zero tests
//! actually ran).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known metric keys lifted into the suite summary.
pub mod metrics {
    /// Number of unit tests that passed.
    pub const UNIT_TESTS_PASSED: &str = "unit_tests_passed";

    /// Total number of unit tests that ran.
    pub const UNIT_TESTS_TOTAL: &str = "unit_tests_total";

    /// Per-file test breakdown: `[{ "file": .., "count": .. }]`.
    pub const TEST_FILES: &str = "test_files";

    /// Set when counts were estimated from text heuristics, not parsed.
    pub const ESTIMATED: &str = "estimated";

    /// Statement coverage percentage in `[0, 100]`.
    pub const COVERAGE: &str = "coverage";
}

/// Normalized judgment of one step's output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    /// Whether the property under test held.
    pub valid: bool,

    /// Failure description (None when valid).
    pub error: Option<String>,

    /// Extracted metrics keyed by name.
    #[serde(default)]
    pub metrics: BTreeMap<String, Value>,
}

impl Verdict {
    /// A passing verdict with no metrics.
    pub fn pass() -> Self {
        Self {
            valid: true,
            error: None,
            metrics: BTreeMap::new(),
        }
    }

    /// A failing verdict with the given error message.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            metrics: BTreeMap::new(),
        }
    }

    /// Exit-status-only verdict, used when a step has no interpreter.
    pub fn from_exit_status(succeeded: bool) -> Self {
        if succeeded {
            Self::pass()
        } else {
            Self {
                valid: false,
                error: None,
                metrics: BTreeMap::new(),
            }
        }
    }

    /// Attach a metric, consuming and returning the verdict.
    pub fn with_metric(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metrics.insert(key.to_string(), value.into());
        self
    }

    /// Read a metric as an unsigned integer.
    pub fn metric_u64(&self, key: &str) -> Option<u64> {
        self.metrics.get(key).and_then(Value::as_u64)
    }

    /// Read a metric as a float.
    pub fn metric_f64(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_has_no_error() {
        let verdict = Verdict::pass();
        assert!(verdict.valid);
        assert!(verdict.error.is_none());
        assert!(verdict.metrics.is_empty());
    }

    #[test]
    fn test_fail_carries_message() {
        let verdict = Verdict::fail("2 unit test(s) failed");
        assert!(!verdict.valid);
        assert_eq!(verdict.error.as_deref(), Some("2 unit test(s) failed"));
    }

    #[test]
    fn test_from_exit_status() {
        assert!(Verdict::from_exit_status(true).valid);
        let failed = Verdict::from_exit_status(false);
        assert!(!failed.valid);
        assert!(failed.error.is_none());
    }

    #[test]
    fn test_metric_accessors() {
        let verdict = Verdict::pass()
            .with_metric(metrics::UNIT_TESTS_PASSED, 8u64)
            .with_metric(metrics::COVERAGE, 72.5);

        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_PASSED), Some(8));
        assert_eq!(verdict.metric_f64(metrics::COVERAGE), Some(72.5));
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), None);
    }

    #[test]
    fn test_verdict_serde_roundtrip() {
        let verdict = Verdict::fail("boom").with_metric(metrics::ESTIMATED, true);
        let json = serde_json::to_string(&verdict).expect("serialize");
        let back: Verdict = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(verdict, back);
    }
}
