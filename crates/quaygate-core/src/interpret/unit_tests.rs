//! Unit-test outcome interpretation.
//!
//! Fallback order:
//! 1. structured JSON report file written by the test runner (authoritative)
//! 2. per-file checkmark markers in console text
//! 3. aggregate "Tests N passed / M failed" summary line
//! 4. heuristic estimation from positive/negative indicator words
//! 5. explicit failure default

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::exec::ExecutionResult;
use crate::step::OutputInterpreter;
use crate::verdict::{metrics, Verdict};

/// Interprets unit-test runner output into a [`Verdict`] with
/// `unit_tests_passed` / `unit_tests_total` / `test_files` metrics.
#[derive(Debug, Clone)]
pub struct UnitTestInterpreter {
    report_path: PathBuf,
}

impl UnitTestInterpreter {
    /// Interpreter reading the structured report at `report_path`.
    pub fn new(report_path: impl Into<PathBuf>) -> Self {
        Self {
            report_path: report_path.into(),
        }
    }

    /// Location of the structured report this interpreter looks for.
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }
}

impl Default for UnitTestInterpreter {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("quaygate-test-report.json"))
    }
}

impl OutputInterpreter for UnitTestInterpreter {
    fn interpret(&self, output: &str, execution: &ExecutionResult) -> Verdict {
        from_report_file(&self.report_path)
            .or_else(|| from_file_markers(output))
            .or_else(|| from_summary_line(output))
            .or_else(|| from_heuristics(output, execution))
            .unwrap_or_else(|| failure_default(execution))
    }
}

// ---------------------------------------------------------------------------
// Strategy 1: structured report file
// ---------------------------------------------------------------------------

/// Structured test report as written by the test runner's JSON reporter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestReport {
    num_total_tests: u64,
    num_passed_tests: u64,
    num_failed_tests: u64,
    #[serde(default)]
    test_results: Vec<SuiteFileReport>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuiteFileReport {
    name: String,
    #[serde(default)]
    assertion_results: Vec<Value>,
}

fn from_report_file(path: &Path) -> Option<Verdict> {
    let raw = fs::read_to_string(path).ok()?;
    let report: TestReport = match serde_json::from_str(&raw) {
        Ok(report) => report,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Test report file is malformed, falling back to console parsing"
            );
            return None;
        }
    };

    debug!(path = %path.display(), "Using structured test report");

    let test_files: Vec<Value> = report
        .test_results
        .iter()
        .map(|suite| json!({ "file": suite.name, "count": suite.assertion_results.len() }))
        .collect();

    let verdict = if report.num_failed_tests > 0 {
        Verdict::fail(format!("{} unit test(s) failed", report.num_failed_tests))
    } else {
        Verdict::pass()
    };

    Some(
        verdict
            .with_metric(metrics::UNIT_TESTS_PASSED, report.num_passed_tests)
            .with_metric(metrics::UNIT_TESTS_TOTAL, report.num_total_tests)
            .with_metric(metrics::TEST_FILES, Value::Array(test_files)),
    )
}

// ---------------------------------------------------------------------------
// Strategy 2: per-file checkmark markers
// ---------------------------------------------------------------------------

fn file_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^\s*[✓√]\s+(\S+)\s+\((\d+)(?:\s+tests?)?\)").expect("file marker regex")
    })
}

fn failed_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s+failed").expect("failed count regex"))
}

fn passed_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s+passed").expect("passed count regex"))
}

fn from_file_markers(output: &str) -> Option<Verdict> {
    let mut files: Vec<Value> = Vec::new();
    let mut passed: u64 = 0;

    for caps in file_marker_re().captures_iter(output) {
        let file = caps[1].to_string();
        let count: u64 = caps[2].parse().unwrap_or(0);
        passed += count;
        files.push(json!({ "file": file, "count": count }));
    }

    if files.is_empty() {
        return None;
    }

    // A failure counter elsewhere in the output trumps the pass markers.
    let failed = capture_count(failed_count_re(), output).unwrap_or(0);

    let verdict = if failed > 0 {
        Verdict::fail(format!("{} unit test(s) failed", failed))
    } else {
        Verdict::pass()
    };

    Some(
        verdict
            .with_metric(metrics::UNIT_TESTS_PASSED, passed)
            .with_metric(metrics::UNIT_TESTS_TOTAL, passed + failed)
            .with_metric(metrics::TEST_FILES, Value::Array(files)),
    )
}

// ---------------------------------------------------------------------------
// Strategy 3: aggregate summary line
// ---------------------------------------------------------------------------

fn from_summary_line(output: &str) -> Option<Verdict> {
    let line = output.lines().find(|l| {
        l.contains("Tests") && (l.contains("passed") || l.contains("failed"))
    })?;

    let passed = capture_count(passed_count_re(), line).unwrap_or(0);
    let failed = capture_count(failed_count_re(), line).unwrap_or(0);
    if passed == 0 && failed == 0 {
        return None;
    }

    let verdict = if failed > 0 {
        Verdict::fail(format!("{} unit test(s) failed", failed))
    } else {
        Verdict::pass()
    };

    Some(
        verdict
            .with_metric(metrics::UNIT_TESTS_PASSED, passed)
            .with_metric(metrics::UNIT_TESTS_TOTAL, passed + failed),
    )
}

fn capture_count(re: &Regex, text: &str) -> Option<u64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

// ---------------------------------------------------------------------------
// Strategy 4: heuristic estimation
// ---------------------------------------------------------------------------

/// Last resort before declaring failure: a successful exit plus a clear
/// positive indicator and no negative one yields an estimated 1/1 count,
/// so the pipeline still reports something actionable.
fn from_heuristics(output: &str, execution: &ExecutionResult) -> Option<Verdict> {
    if !execution.succeeded {
        return None;
    }

    let lower = output.to_ascii_lowercase();
    if lower.contains("passed") && !lower.contains("failed") && !lower.contains("error") {
        Some(
            Verdict::pass()
                .with_metric(metrics::UNIT_TESTS_PASSED, 1u64)
                .with_metric(metrics::UNIT_TESTS_TOTAL, 1u64)
                .with_metric(metrics::ESTIMATED, true),
        )
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Strategy 5: failure default
// ---------------------------------------------------------------------------

fn failure_default(execution: &ExecutionResult) -> Verdict {
    let message = execution
        .error
        .clone()
        .unwrap_or_else(|| "unit test output could not be interpreted".to_string());
    Verdict::fail(message)
        .with_metric(metrics::UNIT_TESTS_PASSED, 0u64)
        .with_metric(metrics::UNIT_TESTS_TOTAL, 0u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn interpret_with_report(report_json: &str, output: &str, succeeded: bool) -> Verdict {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(report_json.as_bytes()).expect("write report");
        let interpreter = UnitTestInterpreter::new(file.path());
        let execution = if succeeded {
            ExecutionResult::success(output)
        } else {
            ExecutionResult::failed(1, output)
        };
        interpreter.interpret(output, &execution)
    }

    fn interpret_without_report(output: &str, succeeded: bool) -> Verdict {
        // Point at a path that does not exist so the chain falls through.
        let dir = tempfile::tempdir().expect("temp dir");
        let interpreter = UnitTestInterpreter::new(dir.path().join("missing-report.json"));
        let execution = if succeeded {
            ExecutionResult::success(output)
        } else {
            ExecutionResult::failed(1, output)
        };
        interpreter.interpret(output, &execution)
    }

    #[test]
    fn test_report_file_all_passing() {
        let report = r#"{
            "numTotalTests": 10,
            "numPassedTests": 10,
            "numFailedTests": 0,
            "testResults": [
                { "name": "src/a.test.ts", "assertionResults": [{}, {}, {}] },
                { "name": "src/b.test.ts", "assertionResults": [{}, {}, {}, {}, {}, {}, {}] }
            ]
        }"#;
        let verdict = interpret_with_report(report, "", true);

        assert!(verdict.valid);
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_PASSED), Some(10));
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(10));
        let files = verdict.metrics.get(metrics::TEST_FILES).expect("test_files");
        assert_eq!(files.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_report_file_overrides_console_text() {
        let report = r#"{
            "numTotalTests": 10,
            "numPassedTests": 8,
            "numFailedTests": 2
        }"#;
        // Console claims everything passed; the report is authoritative.
        let verdict = interpret_with_report(report, "Tests  10 passed (10)", true);

        assert!(!verdict.valid);
        assert!(verdict.error.as_deref().unwrap().contains("2"));
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_PASSED), Some(8));
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(10));
    }

    #[test]
    fn test_malformed_report_falls_back_to_console() {
        let verdict = interpret_with_report("{ not json", "Tests  4 passed (4)", true);
        assert!(verdict.valid);
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(4));
    }

    #[test]
    fn test_file_markers_summed() {
        let output = "\
 ✓ src/parser.test.ts (3)
 ✓ src/lexer.test.ts (5)
";
        let verdict = interpret_without_report(output, true);

        assert!(verdict.valid);
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_PASSED), Some(8));
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(8));
        let files = verdict.metrics.get(metrics::TEST_FILES).expect("test_files");
        assert_eq!(files.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_file_markers_with_test_word() {
        let output = " √ lib/util.test.js (12 tests)\n";
        let verdict = interpret_without_report(output, true);
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(12));
    }

    #[test]
    fn test_file_markers_respect_failure_counter() {
        let output = "\
 ✓ src/parser.test.ts (3)
 Tests  2 failed | 3 passed (5)
";
        let verdict = interpret_without_report(output, false);
        assert!(!verdict.valid);
        assert!(verdict.error.as_deref().unwrap().contains("2"));
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(5));
    }

    #[test]
    fn test_summary_line_passing() {
        let verdict = interpret_without_report("Test Files  2 passed (2)\nTests  9 passed (9)\n", true);
        assert!(verdict.valid);
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_PASSED), Some(9));
    }

    #[test]
    fn test_summary_line_with_failures() {
        let verdict = interpret_without_report("Tests:  2 failed, 8 passed, 10 total\n", false);
        assert!(!verdict.valid);
        assert!(verdict.error.as_deref().unwrap().contains("2"));
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(10));
    }

    #[test]
    fn test_heuristic_estimation() {
        let verdict = interpret_without_report("All specs passed.\n", true);
        assert!(verdict.valid);
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(1));
        assert_eq!(
            verdict.metrics.get(metrics::ESTIMATED).and_then(Value::as_bool),
            Some(true)
        );
    }

    #[test]
    fn test_heuristic_requires_successful_exit() {
        let verdict = interpret_without_report("passed maybe?\n", false);
        assert!(!verdict.valid);
    }

    #[test]
    fn test_heuristic_blocked_by_negative_indicator() {
        let verdict = interpret_without_report("passed... but 1 error occurred\n", true);
        assert!(!verdict.valid);
    }

    #[test]
    fn test_failure_default_uses_execution_error() {
        let verdict = interpret_without_report("gibberish", false);
        assert!(!verdict.valid);
        assert!(verdict.error.as_deref().unwrap().contains("code 1"));
        assert_eq!(verdict.metric_u64(metrics::UNIT_TESTS_TOTAL), Some(0));
    }
}
