//! Quaygate core - build-pipeline quality gate
//!
//! Provides a verification-suite orchestrator that:
//! - Executes named verification steps (tests, coverage, lint, ...) as
//!   subprocesses
//! - Interprets heterogeneous tool output through ordered fallback strategies
//! - Aggregates everything into one suite-level pass/fail verdict with
//!   extracted metrics

pub mod error;
pub mod exec;
pub mod fakes;
pub mod interpret;
pub mod preset;
pub mod report;
pub mod runner;
pub mod spec;
pub mod step;
pub mod suite;
pub mod telemetry;
pub mod verdict;

// Re-export key types
pub use error::{GateError, Result};
pub use exec::{CommandExecutor, ExecOptions, ExecutionResult, ProcessExecutor};
pub use interpret::{CoverageInterpreter, UnitTestInterpreter};
pub use preset::{full_gate, verification_suite, BuiltinStep, PresetConfig};
pub use report::{write_report, ReportArtifact};
pub use runner::{run_step, StepResult};
pub use spec::SuiteSpec;
pub use step::{OutputInterpreter, StepDefinition, StepOptions};
pub use suite::{run_suite, SuiteOptions, SuiteSummary, UnitTestCounts};
pub use telemetry::init_tracing;
pub use verdict::{metrics, Verdict};
