//! Report artifact for downstream dashboards.
//!
//! Serializes a [`SuiteSummary`] plus run identity to a JSON file. Read-side
//! consumers (rendering, dashboards) are external to this crate.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::suite::SuiteSummary;

/// The document written for the reporting layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportArtifact {
    /// Digest of the suite shape (see [`crate::spec::SuiteSpec`]).
    pub suite_digest: String,

    /// When the artifact was generated.
    pub generated_at: DateTime<Utc>,

    /// The full suite outcome.
    pub summary: SuiteSummary,
}

impl ReportArtifact {
    /// Wrap a summary for persistence.
    pub fn new(summary: SuiteSummary, suite_digest: impl Into<String>) -> Self {
        Self {
            suite_digest: suite_digest.into(),
            generated_at: Utc::now(),
            summary,
        }
    }
}

/// Write the suite outcome as pretty-printed JSON at `path`.
pub fn write_report(summary: &SuiteSummary, suite_digest: &str, path: &Path) -> Result<()> {
    let artifact = ReportArtifact::new(summary.clone(), suite_digest);
    let json = serde_json::to_string_pretty(&artifact)?;
    fs::write(path, json)?;
    info!(path = %path.display(), success = summary.success, "Wrote suite report");
    Ok(())
}
