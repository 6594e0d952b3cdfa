use super::{CommandInvocation, CommandOutput, CommandRunner, VcsError, VersionControl};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A known git failure together with the command that clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// "detected dubious ownership": the repository is owned by another user.
    /// Recovered by adding the working tree to `safe.directory`.
    SafeDirectory,
}

impl RecoveryStrategy {
    pub fn matches(self, diagnostic: &str) -> bool {
        match self {
            RecoveryStrategy::SafeDirectory => diagnostic.contains("dubious ownership"),
        }
    }

    fn remediation_args(self, root: &Path) -> Vec<String> {
        match self {
            RecoveryStrategy::SafeDirectory => vec![
                "config".to_string(),
                "--global".to_string(),
                "--add".to_string(),
                "safe.directory".to_string(),
                root.to_string_lossy().into_owned(),
            ],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RecoveryStrategy::SafeDirectory => "safe-directory",
        }
    }
}

/// Git working tree driven through the `git` binary.
pub struct GitRepository<R> {
    runner: R,
    program: String,
    root: PathBuf,
    recovery: Vec<RecoveryStrategy>,
}

impl<R: CommandRunner> GitRepository<R> {
    pub fn new(runner: R, root: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            program: "git".to_string(),
            root: root.into(),
            recovery: vec![RecoveryStrategy::SafeDirectory],
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_recovery(mut self, recovery: Vec<RecoveryStrategy>) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn invocation(&self, args: Vec<String>) -> CommandInvocation {
        CommandInvocation::new(self.program.clone(), args, self.root.clone())
    }

    async fn run_checked(&self, args: Vec<String>) -> Result<CommandOutput, VcsError> {
        let invocation = self.invocation(args);
        let output = self.runner.run(&invocation).await?;
        if output.success {
            Ok(output)
        } else {
            Err(VcsError::Command {
                command: invocation.display(),
                message: output.diagnostic(),
            })
        }
    }

    /// Run `args`; on a failure some recovery strategy recognizes, run its
    /// remediation once and retry once.
    async fn run_with_recovery(&self, args: Vec<String>) -> Result<CommandOutput, VcsError> {
        let err = match self.run_checked(args.clone()).await {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };

        let strategy = err
            .diagnostic()
            .and_then(|text| self.recovery.iter().copied().find(|s| s.matches(text)));
        let Some(strategy) = strategy else {
            return Err(err);
        };

        warn!(
            strategy = strategy.name(),
            root = %self.root.display(),
            "Git refused the working tree; attempting remediation"
        );
        self.run_checked(strategy.remediation_args(&self.root)).await?;
        info!(strategy = strategy.name(), "Remediation applied; retrying");
        self.run_checked(args).await
    }
}

#[async_trait]
impl<R: CommandRunner> VersionControl for GitRepository<R> {
    async fn fetch_tags(&self) -> Result<(), VcsError> {
        debug!(root = %self.root.display(), "Fetching tags");
        self.run_with_recovery(strings(["fetch", "--all", "--tags"]))
            .await
            .map(drop)
    }

    async fn checkout_tag(&self, tag: &str) -> Result<(), VcsError> {
        debug!(root = %self.root.display(), tag, "Checking out tag");
        self.run_with_recovery(vec!["checkout".to_string(), format!("tags/{tag}")])
            .await
            .map(drop)
    }
}

/// Top-level directory of the git working tree containing `cwd`, if any.
pub async fn discover_toplevel<R: CommandRunner + ?Sized>(
    runner: &R,
    program: &str,
    cwd: &Path,
) -> Option<PathBuf> {
    let invocation = CommandInvocation::new(program, ["rev-parse", "--show-toplevel"], cwd);
    match runner.run(&invocation).await {
        Ok(output) if output.success => {
            let top = output.stdout.trim();
            (!top.is_empty()).then(|| PathBuf::from(top))
        }
        Ok(output) => {
            debug!(
                cwd = %cwd.display(),
                reason = %output.diagnostic(),
                "Not inside a git working tree"
            );
            None
        }
        Err(err) => {
            debug!(cwd = %cwd.display(), error = %err, "Could not query git top-level");
            None
        }
    }
}

fn strings<const N: usize>(args: [&str; N]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}
