//! Server-side sandboxed execution of user submissions
//!
//! The browser never evaluates user code. Submissions are executed in
//! disposable Docker containers with no network access and bounded
//! memory, CPU, and wall-clock time.

mod docker;
mod language;

pub use docker::DockerSandbox;
pub use language::Language;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::SandboxError;

/// Outcome of running one submission.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
    pub duration_ms: u64,
    pub timed_out: bool,
}

impl ExecutionOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Executes a submission in an isolated environment.
#[async_trait]
pub trait CodeExecutor: Send + Sync {
    async fn execute(&self, language: Language, code: &str)
        -> Result<ExecutionOutcome, SandboxError>;
}
