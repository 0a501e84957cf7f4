//! Single-step execution: command, timing, interpretation.
//!
//! The step runner owns the meaning of "failure": it always lets the command
//! run to a captured result, then applies the step's interpreter (if any),
//! whose verdict overrides the raw exit status. Interpreter panics are
//! contained here and converted to failed verdicts; a crashing interpreter
//! must never take the suite down.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::exec::{CommandExecutor, ExecutionResult};
use crate::step::{StepDefinition, StepOptions};
use crate::verdict::Verdict;

/// Fallback error message when a failed step produced no description.
const GENERIC_FAILURE: &str = "Test failed";

/// Final, post-interpretation result of one step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepResult {
    /// Step name.
    pub name: String,

    /// Whether the step passed (verdict validity, not raw exit status).
    pub succeeded: bool,

    /// Command duration in seconds.
    pub elapsed_secs: f64,

    /// Merged stdout/stderr as seen by the interpreter.
    pub output: String,

    /// Failure description (None when succeeded).
    pub error: Option<String>,

    /// The interpreter's verdict (exit-status-derived when no interpreter).
    pub verdict: Verdict,
}

/// Execute one step and fold command outcome and interpretation into a
/// [`StepResult`].
///
/// Executor refusal to start the process (command not found at the OS level)
/// is caught here and converted to a failed execution, never propagated.
pub async fn run_step(
    executor: &dyn CommandExecutor,
    definition: &StepDefinition,
    options: &StepOptions,
) -> StepResult {
    info!(step = %definition.name, "Running step");

    let execution = match executor.execute(&definition.command, &options.exec).await {
        Ok(result) => result,
        Err(e) => ExecutionResult::aborted(e.to_string(), 0.0),
    };

    let output = execution.combined_output();
    if options.verbose && !output.is_empty() {
        debug!(step = %definition.name, output = %output, "Captured output");
    }

    let verdict = match &definition.interpreter {
        Some(interpreter) => {
            match catch_unwind(AssertUnwindSafe(|| interpreter.interpret(&output, &execution))) {
                Ok(verdict) => verdict,
                Err(panic) => Verdict::fail(format!(
                    "Validator function threw an error: {}",
                    panic_message(panic.as_ref())
                )),
            }
        }
        None => Verdict::from_exit_status(execution.succeeded),
    };

    let succeeded = verdict.valid;
    let error = if succeeded {
        None
    } else {
        verdict
            .error
            .clone()
            .or_else(|| execution.error.clone())
            .or_else(|| Some(GENERIC_FAILURE.to_string()))
    };

    if succeeded {
        info!(step = %definition.name, elapsed_secs = execution.elapsed_secs, "Step passed");
    } else {
        warn!(
            step = %definition.name,
            error = error.as_deref().unwrap_or(GENERIC_FAILURE),
            "Step failed"
        );
    }

    StepResult {
        name: definition.name.clone(),
        succeeded,
        elapsed_secs: execution.elapsed_secs,
        output,
        error,
        verdict,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
