//! Coverage percentage interpretation.
//!
//! Fallback order:
//! 1. statement-level coverage data file (`coverage-final.json` style)
//! 2. any pre-aggregated summary file in the coverage directory exposing
//!    `total.statements.pct`
//! 3. explicit failure with `coverage = 0` rather than an absent percentage,
//!    so downstream consumers only consult the `valid` flag.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::exec::ExecutionResult;
use crate::step::OutputInterpreter;
use crate::verdict::{metrics, Verdict};

const FINAL_FILE: &str = "coverage-final.json";
const SUMMARY_FILE: &str = "coverage-summary.json";

/// Interprets coverage tool artifacts into a [`Verdict`] with a `coverage`
/// metric in `[0, 100]`.
#[derive(Debug, Clone)]
pub struct CoverageInterpreter {
    coverage_dir: PathBuf,
}

impl CoverageInterpreter {
    /// Interpreter reading artifacts from `coverage_dir`.
    pub fn new(coverage_dir: impl Into<PathBuf>) -> Self {
        Self {
            coverage_dir: coverage_dir.into(),
        }
    }

    /// Directory this interpreter searches for coverage artifacts.
    pub fn coverage_dir(&self) -> &Path {
        &self.coverage_dir
    }
}

impl Default for CoverageInterpreter {
    fn default() -> Self {
        Self::new("coverage")
    }
}

/// What the artifact search produced.
enum Reading {
    /// Statement-level counts aggregated across all files.
    Statements { covered: u64, total: u64 },

    /// Pre-aggregated percentage from a summary document.
    Summary { percent: f64 },
}

impl OutputInterpreter for CoverageInterpreter {
    fn interpret(&self, _output: &str, execution: &ExecutionResult) -> Verdict {
        let reading = read_statement_map(&self.coverage_dir.join(FINAL_FILE))
            .or_else(|| read_summary_total(&self.coverage_dir));

        let (percent, mut valid, mut error) = match reading {
            Some(Reading::Statements { covered, total }) => {
                if total == 0 {
                    // An empty statement map must not read as 100% covered.
                    (
                        0.0,
                        false,
                        Some("coverage data contains no statements".to_string()),
                    )
                } else {
                    (100.0 * covered as f64 / total as f64, true, None)
                }
            }
            Some(Reading::Summary { percent }) => (percent, true, None),
            None => (
                0.0,
                false,
                Some("Coverage output file not found".to_string()),
            ),
        };

        // Parsed data from a failed command may be partial.
        if valid && !execution.succeeded {
            valid = false;
            error = Some(
                execution
                    .error
                    .clone()
                    .unwrap_or_else(|| "coverage command failed".to_string()),
            );
        }

        let verdict = if valid {
            Verdict::pass()
        } else {
            Verdict::fail(error.unwrap_or_else(|| "coverage interpretation failed".to_string()))
        };
        verdict.with_metric(metrics::COVERAGE, percent)
    }
}

// ---------------------------------------------------------------------------
// Strategy 1: statement-level data file
// ---------------------------------------------------------------------------

/// Per-file entry in the statement-level coverage document.
#[derive(Debug, Deserialize)]
struct FileCoverage {
    /// Statement id -> hit count.
    #[serde(rename = "s", default)]
    statement_hits: BTreeMap<String, u64>,
}

fn read_statement_map(path: &Path) -> Option<Reading> {
    let raw = fs::read_to_string(path).ok()?;
    let files: BTreeMap<String, FileCoverage> = match serde_json::from_str(&raw) {
        Ok(files) => files,
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Coverage data file is malformed, trying summary files"
            );
            return None;
        }
    };

    let mut covered = 0u64;
    let mut total = 0u64;
    for file in files.values() {
        total += file.statement_hits.len() as u64;
        covered += file.statement_hits.values().filter(|hits| **hits > 0).count() as u64;
    }

    debug!(path = %path.display(), covered, total, "Using statement-level coverage data");
    Some(Reading::Statements { covered, total })
}

// ---------------------------------------------------------------------------
// Strategy 2: pre-aggregated summary files
// ---------------------------------------------------------------------------

fn read_summary_total(dir: &Path) -> Option<Reading> {
    // Canonical summary file first, then any other JSON document in the
    // directory that exposes the same total.
    if let Some(percent) = summary_percent(&dir.join(SUMMARY_FILE)) {
        return Some(Reading::Summary { percent });
    }

    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json")
            && path.file_name().is_some_and(|name| name != FINAL_FILE)
        {
            if let Some(percent) = summary_percent(&path) {
                debug!(path = %path.display(), "Using alternate coverage summary file");
                return Some(Reading::Summary { percent });
            }
        }
    }
    None
}

fn summary_percent(path: &Path) -> Option<f64> {
    let raw = fs::read_to_string(path).ok()?;
    let doc: Value = serde_json::from_str(&raw).ok()?;
    doc.get("total")?
        .get("statements")?
        .get("pct")?
        .as_f64()
}
