//! Core library for backport.
//!
//! - [`patch`]: line-range replacement with indentation propagation
//! - [`vcs`]: git fetch/checkout with recovery from known failures
//! - [`credentials`]: persistent token storage
//! - [`workflow`]: the prompt-driven "backport to version" sequence

pub mod credentials;
pub mod demo;
pub mod error;
pub mod patch;
pub mod vcs;
pub mod workflow;

pub use credentials::{
    CredentialStore, FileCredentialStore, GITHUB_TOKEN_KEY, MemoryCredentialStore,
};
pub use demo::demo_instruction;
pub use error::{BackportError, Result};
pub use patch::{PatchError, apply_line_range, splice_range};
pub use vcs::{
    CommandRunner, GitRepository, ProcessRunner, RecoveryStrategy, VcsError, VersionControl,
};
pub use workflow::{
    AppliedPatch, BackportFlow, BackportOutcome, PatchSource, Preselection, Prompter, Workspace,
};
