//! Version-control capability used to move the working tree to a tag.

mod git;
mod process;

pub use git::{GitRepository, RecoveryStrategy, discover_toplevel};
pub use process::ProcessRunner;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    /// The command ran and failed; `message` is its diagnostic output verbatim.
    #[error("`{command}` failed: {message}")]
    Command { command: String, message: String },

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },
}

impl VcsError {
    /// Diagnostic text of a failed command, if it got that far
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            VcsError::Command { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Program, arguments and working directory of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandInvocation {
    pub fn new<I, S>(program: impl Into<String>, args: I, cwd: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: cwd.into(),
        }
    }

    /// Shell-like rendering for messages and logs
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(quote_argument)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_argument(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    if arg
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || "-_./:@".contains(ch))
    {
        return arg.to_string();
    }

    let mut quoted = String::from("'");
    for ch in arg.chars() {
        if ch == '\'' {
            quoted.push_str("'\"'\"'");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Text worth showing a user when the command failed
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) => format!("exited with status {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Runs external commands. Split out so git behaviour can be scripted in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput, VcsError>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutput, VcsError> {
        (**self).run(invocation).await
    }
}

/// What the backport workflow needs from version control.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Fetch every tag from every remote
    async fn fetch_tags(&self) -> Result<(), VcsError>;

    /// Move the working tree to `tag`
    async fn checkout_tag(&self, tag: &str) -> Result<(), VcsError>;
}
