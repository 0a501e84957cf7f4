//! Scripted executor fake (testing only)
//!
//! Provides `ScriptedExecutor`, a [`CommandExecutor`] that replays canned
//! [`ExecutionResult`]s keyed by command string, without spawning anything.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GateError, Result};
use crate::exec::{CommandExecutor, ExecOptions, ExecutionResult};

/// In-memory executor backed by a `HashMap<command, ExecutionResult>`.
///
/// Commands with no scripted response behave like a spawn refusal, which
/// exercises the step runner's conversion path.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    responses: Mutex<HashMap<String, ExecutionResult>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the result to replay for `command`.
    pub fn script(&self, command: impl Into<String>, result: ExecutionResult) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(command.into(), result);
    }

    /// Commands executed so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, command: &str, _options: &ExecOptions) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(command.to_string());
        let responses = self.responses.lock().unwrap();
        responses
            .get(command)
            .cloned()
            .ok_or_else(|| GateError::Spawn {
                command: command.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no scripted response"),
            })
    }
}
