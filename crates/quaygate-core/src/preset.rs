//! Builtin step catalog and suite presets.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::interpret::{CoverageInterpreter, UnitTestInterpreter};
use crate::step::StepDefinition;

/// Builtin verification steps.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStep {
    /// Unit-test runner with JSON reporter.
    UnitTests,

    /// Coverage instrumenter.
    Coverage,

    /// Linter.
    Lint,

    /// Static type-checker.
    TypeCheck,

    /// Dependency vulnerability audit.
    DependencyAudit,

    /// Documentation lint.
    DocLint,
}

impl BuiltinStep {
    /// All builtin steps in canonical gate order.
    pub fn all() -> [BuiltinStep; 6] {
        [
            BuiltinStep::Lint,
            BuiltinStep::TypeCheck,
            BuiltinStep::UnitTests,
            BuiltinStep::Coverage,
            BuiltinStep::DependencyAudit,
            BuiltinStep::DocLint,
        ]
    }

    /// Display name; the orchestrator lifts metrics by matching on the
    /// unit-test and coverage names.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinStep::UnitTests => "unit tests",
            BuiltinStep::Coverage => "coverage",
            BuiltinStep::Lint => "lint",
            BuiltinStep::TypeCheck => "type check",
            BuiltinStep::DependencyAudit => "dependency audit",
            BuiltinStep::DocLint => "doc lint",
        }
    }

    /// Default shell command.
    pub fn default_command(&self) -> &'static str {
        match self {
            BuiltinStep::UnitTests => "npx vitest run --reporter=json",
            BuiltinStep::Coverage => "npx vitest run --coverage",
            BuiltinStep::Lint => "npx eslint .",
            BuiltinStep::TypeCheck => "npx tsc --noEmit",
            BuiltinStep::DependencyAudit => "npm audit --audit-level=high",
            BuiltinStep::DocLint => "npx typedoc --emit none",
        }
    }

    /// Build the step definition, attaching the unit-test/coverage
    /// interpreters where they apply. The remaining steps are validated by
    /// exit status only.
    pub fn to_definition(self, config: &PresetConfig) -> StepDefinition {
        let command = config
            .command_overrides
            .get(self.name())
            .cloned()
            .unwrap_or_else(|| self.default_command().to_string());

        let definition = StepDefinition::new(self.name(), command);
        match self {
            BuiltinStep::UnitTests => definition.with_interpreter(Arc::new(
                UnitTestInterpreter::new(config.report_path.clone()),
            )),
            BuiltinStep::Coverage => definition.with_interpreter(Arc::new(
                CoverageInterpreter::new(config.coverage_dir.clone()),
            )),
            _ => definition,
        }
    }
}

/// Configuration shared by the preset builders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresetConfig {
    /// Location of the structured test report the runner writes.
    pub report_path: PathBuf,

    /// Directory the coverage tool writes its artifacts to.
    pub coverage_dir: PathBuf,

    /// Per-step command overrides keyed by step name.
    pub command_overrides: BTreeMap<String, String>,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            report_path: std::env::temp_dir().join("quaygate-test-report.json"),
            coverage_dir: PathBuf::from("coverage"),
            command_overrides: BTreeMap::new(),
        }
    }
}

/// The canonical verification pair: unit tests, then coverage.
pub fn verification_suite(config: &PresetConfig) -> Vec<StepDefinition> {
    vec![
        BuiltinStep::UnitTests.to_definition(config),
        BuiltinStep::Coverage.to_definition(config),
    ]
}

/// The whole gate: lint, type check, unit tests, coverage, dependency audit,
/// doc lint.
pub fn full_gate(config: &PresetConfig) -> Vec<StepDefinition> {
    BuiltinStep::all()
        .into_iter()
        .map(|step| step.to_definition(config))
        .collect()
}
