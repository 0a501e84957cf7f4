//! Suite orchestration with stop-on-failure semantics.
//!
//! Runs an ordered list of steps strictly sequentially (later steps may
//! depend on filesystem artifacts written by earlier ones, and interleaved
//! console output would make text-based interpretation unreliable), then
//! folds the step results into one [`SuiteSummary`].

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::exec::CommandExecutor;
use crate::runner::{run_step, StepResult};
use crate::step::{StepDefinition, StepOptions};
use crate::verdict::metrics;

/// Options for a suite run.
#[derive(Debug, Clone)]
pub struct SuiteOptions {
    /// Halt at the first failing step instead of running all steps.
    pub stop_on_failure: bool,

    /// Per-step options.
    pub step: StepOptions,
}

impl Default for SuiteOptions {
    fn default() -> Self {
        Self {
            stop_on_failure: true,
            step: StepOptions::default(),
        }
    }
}

/// Unit-test counts lifted from the unit-test step's verdict.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitTestCounts {
    pub passed: u64,
    pub total: u64,
}

/// Aggregated outcome of one suite run.
///
/// One summary per invocation; never mutated after construction. Persistence
/// is a collaborator concern (see the report module).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuiteSummary {
    /// Unique ID for this run.
    pub run_id: Uuid,

    /// Whether every executed step succeeded.
    pub success: bool,

    /// Length of the supplied definitions list (callers can detect
    /// stop-on-failure truncation by comparing against `results.len()`).
    pub total_steps: usize,

    /// Executed steps that passed.
    pub passed_steps: usize,

    /// Executed steps that failed.
    pub failed_steps: usize,

    /// Sum of executed step durations in seconds.
    pub duration_secs: f64,

    /// Per-step results in execution order.
    pub results: Vec<StepResult>,

    /// Statement coverage lifted from the coverage step, when it ran.
    pub coverage_percent: Option<f64>,

    /// Unit-test counts lifted from the unit-test step.
    pub unit_tests: UnitTestCounts,

    /// First failure message encountered, for a single actionable summary.
    pub first_error: Option<String>,
}

/// Run `definitions` in order and aggregate into a [`SuiteSummary`].
///
/// With `stop_on_failure`, steps after the first failure never start and are
/// excluded from `results`. No step is ever retried; callers retry by
/// re-invoking with a narrowed step list.
pub async fn run_suite(
    executor: &dyn CommandExecutor,
    definitions: &[StepDefinition],
    options: &SuiteOptions,
) -> SuiteSummary {
    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, steps = definitions.len(), "Starting verification suite");

    let mut results: Vec<StepResult> = Vec::new();
    let mut first_error: Option<String> = None;

    for definition in definitions {
        let result = run_step(executor, definition, &options.step).await;
        let failed = !result.succeeded;

        if failed && first_error.is_none() {
            first_error = result.error.clone();
        }
        results.push(result);

        if failed && options.stop_on_failure {
            warn!(run_id = %run_id, "Stopping suite at first failure");
            break;
        }
    }

    let passed_steps = results.iter().filter(|r| r.succeeded).count();
    let failed_steps = results.len() - passed_steps;
    let success = failed_steps == 0;
    let duration_secs: f64 = results.iter().map(|r| r.elapsed_secs).sum();

    let (unit_tests, coverage_percent) = lift_metrics(&results);

    if success {
        info!(run_id = %run_id, passed = passed_steps, "Suite passed");
    } else {
        warn!(
            run_id = %run_id,
            passed = passed_steps,
            failed = failed_steps,
            error = first_error.as_deref().unwrap_or(""),
            "Suite failed"
        );
    }

    SuiteSummary {
        run_id,
        success,
        total_steps: definitions.len(),
        passed_steps,
        failed_steps,
        duration_secs,
        results,
        coverage_percent,
        unit_tests,
        first_error,
    }
}

/// Copy well-known metrics out of the unit-test and coverage steps.
///
/// Matching is by case-insensitive step name. The orchestrator does not know
/// how the numbers were derived, only which metric keys to read.
fn lift_metrics(results: &[StepResult]) -> (UnitTestCounts, Option<f64>) {
    let mut unit_tests = UnitTestCounts::default();
    let mut coverage_percent = None;

    for result in results {
        let name = result.name.to_ascii_lowercase();
        if name.contains("unit test") {
            if let (Some(passed), Some(total)) = (
                result.verdict.metric_u64(metrics::UNIT_TESTS_PASSED),
                result.verdict.metric_u64(metrics::UNIT_TESTS_TOTAL),
            ) {
                unit_tests = UnitTestCounts { passed, total };
            }
        } else if name.contains("coverage") {
            if let Some(percent) = result.verdict.metric_f64(metrics::COVERAGE) {
                coverage_percent = Some(percent);
            }
        }
    }

    (unit_tests, coverage_percent)
}
