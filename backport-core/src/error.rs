use backport_remote::RemoteError;
use thiserror::Error;

use crate::patch::PatchError;
use crate::vcs::VcsError;

/// Every way a backport can stop short of applying its patch.
#[derive(Debug, Error)]
pub enum BackportError {
    #[error("No GitHub token stored. Run `backport set-token` first.")]
    MissingCredential,

    #[error("No workspace is open: run inside a git working tree or pass --workspace")]
    NoWorkspaceOpen,

    #[error("Failed to list tags: {0}")]
    TagListing(#[source] RemoteError),

    #[error("No tags found for the configured repository")]
    NoTags,

    #[error("Git: {0}")]
    VersionControl(#[from] VcsError),

    #[error("Patch service failed: {0}")]
    RemoteService(#[source] RemoteError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("Credential store: {0:#}")]
    Credentials(anyhow::Error),

    #[error("Prompt failed: {0:#}")]
    Prompt(anyhow::Error),
}

impl BackportError {
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, BackportError::Patch(err) if err.is_invalid_range())
    }
}

pub type Result<T> = std::result::Result<T, BackportError>;
