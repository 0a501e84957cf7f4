//! Suite identity.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identity of a suite shape: where it runs and which steps, in order.
///
/// The digest tags report artifacts and log lines so runs of the same suite
/// can be correlated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuiteSpec {
    /// Workspace root the suite runs in.
    pub workspace_path: PathBuf,

    /// SHA-256 digest of the ordered step names (deterministic).
    pub steps_digest: String,
}

impl SuiteSpec {
    /// Create a suite specification from the ordered step names.
    pub fn new(workspace_path: PathBuf, step_names: &[String]) -> Self {
        Self {
            workspace_path,
            steps_digest: compute_steps_digest(step_names),
        }
    }
}

/// Deterministic, order-sensitive digest of step names.
fn compute_steps_digest(step_names: &[String]) -> String {
    let mut hasher = Sha256::new();
    for name in step_names {
        hasher.update(name.as_bytes());
        hasher.update(b"\0");
    }
    hex::encode(hasher.finalize())
}
