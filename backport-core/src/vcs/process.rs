use super::{CommandInvocation, CommandOutput, CommandRunner, VcsError};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::{process::Command, time::timeout};
use tracing::trace;

/// Runs commands as child processes with piped output and a deadline.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(120))
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput, VcsError> {
        let rendered = invocation.display();
        trace!(command = %rendered, cwd = %invocation.cwd.display(), "Running command");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| VcsError::Timeout {
                command: rendered.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| VcsError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
