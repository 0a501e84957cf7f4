//! Error taxonomy for the quality gate.
//!
//! Step and suite failures are captured as data (`StepResult`/`SuiteSummary`),
//! never as errors; this enum covers the remaining fallible surface:
//! process spawning and report artifact IO.

/// Quaygate errors.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("failed to spawn command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for quaygate operations.
pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_display() {
        let err = GateError::Spawn {
            command: "npx vitest run".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("npx vitest run"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: GateError = io.into();
        assert!(err.to_string().contains("io error"));
    }
}
