//! Step definitions and per-step options.

use std::fmt;
use std::sync::Arc;

use crate::exec::{ExecOptions, ExecutionResult};
use crate::verdict::Verdict;

/// Interprets raw tool output into a normalized [`Verdict`].
///
/// Implementations must be pure with respect to the data model: they may read
/// artifact files the wrapped tool left on disk, but never write them.
pub trait OutputInterpreter: Send + Sync {
    fn interpret(&self, output: &str, execution: &ExecutionResult) -> Verdict;
}

impl<F> OutputInterpreter for F
where
    F: Fn(&str, &ExecutionResult) -> Verdict + Send + Sync,
{
    fn interpret(&self, output: &str, execution: &ExecutionResult) -> Verdict {
        self(output, execution)
    }
}

/// One named verification step: a shell command plus optional interpretation.
///
/// Immutable once constructed; names must be unique within a run.
#[derive(Clone)]
pub struct StepDefinition {
    /// Human-readable step name.
    pub name: String,

    /// Shell command to execute.
    pub command: String,

    /// Optional output interpreter. When absent, validity defaults to the
    /// command's exit status.
    pub interpreter: Option<Arc<dyn OutputInterpreter>>,
}

impl StepDefinition {
    /// Create a step validated by exit status only.
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            interpreter: None,
        }
    }

    /// Attach an output interpreter.
    pub fn with_interpreter(mut self, interpreter: Arc<dyn OutputInterpreter>) -> Self {
        self.interpreter = Some(interpreter);
        self
    }
}

impl fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDefinition")
            .field("name", &self.name)
            .field("command", &self.command)
            .field("interpreter", &self.interpreter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Options for running a single step.
#[derive(Debug, Clone, Default)]
pub struct StepOptions {
    /// Log captured output at debug level.
    pub verbose: bool,

    /// Execution options forwarded to the command executor.
    pub exec: ExecOptions,
}
