//! The "backport to version" sequence.
//!
//! Each step either produces a value, stops the run because the user backed
//! out of a prompt, or fails with a [`BackportError`]:
//!
//! credential → commit → tag list → tag → fetch + checkout → patch → apply

use std::path::PathBuf;
use std::sync::Arc;

use backport_remote::{PatchInstruction, PatchProvider, PatchRequest, RemoteError, TagProvider};
use tracing::{debug, info, warn};

use crate::credentials::{CredentialStore, GITHUB_TOKEN_KEY};
use crate::error::{BackportError, Result};
use crate::patch::{apply_line_range, resolve_target};
use crate::vcs::VersionControl;

/// Interactive questions asked during a run. `Ok(None)` means the user
/// dismissed the prompt.
pub trait Prompter: Send + Sync {
    fn commit_hash(&self) -> anyhow::Result<Option<String>>;

    fn select_tag(&self, tags: &[String]) -> anyhow::Result<Option<String>>;

    /// Asked when the patch service failed and a demonstration patch exists.
    fn confirm_fallback(&self, error: &RemoteError) -> anyhow::Result<bool>;
}

/// Checked-out repository the patch lands in
pub struct Workspace {
    pub root: PathBuf,
    pub vcs: Box<dyn VersionControl>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, vcs: Box<dyn VersionControl>) -> Self {
        Self {
            root: root.into(),
            vcs,
        }
    }
}

/// Where the patch instruction comes from
pub enum PatchSource {
    /// Ask the patch-generation service
    Remote(Arc<dyn PatchProvider>),
    /// Offline mode: use this instruction without any remote call
    Demo(PatchInstruction),
}

/// Values supplied up front instead of prompting
#[derive(Debug, Clone, Default)]
pub struct Preselection {
    pub commit: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedPatch {
    pub request: PatchRequest,
    pub instruction: PatchInstruction,
    pub path: PathBuf,
    pub demo: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackportOutcome {
    Applied(AppliedPatch),
    /// The user dismissed the named prompt
    Cancelled(&'static str),
}

pub struct BackportFlow {
    credentials: Arc<dyn CredentialStore>,
    tags: Arc<dyn TagProvider>,
    source: PatchSource,
    fallback: Option<PatchInstruction>,
    workspace: Option<Workspace>,
    prompter: Arc<dyn Prompter>,
    preselection: Preselection,
}

impl BackportFlow {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        tags: Arc<dyn TagProvider>,
        source: PatchSource,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            credentials,
            tags,
            source,
            fallback: None,
            workspace: None,
            prompter,
            preselection: Preselection::default(),
        }
    }

    pub fn with_workspace(mut self, workspace: Option<Workspace>) -> Self {
        self.workspace = workspace;
        self
    }

    /// Instruction offered when the remote call fails
    pub fn with_fallback(mut self, fallback: Option<PatchInstruction>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_preselection(mut self, preselection: Preselection) -> Self {
        self.preselection = preselection;
        self
    }

    pub async fn run(&self) -> Result<BackportOutcome> {
        let token = self.token()?;

        let Some(commit) = self.commit()? else {
            return Ok(BackportOutcome::Cancelled("commit"));
        };

        let Some(tag) = self.tag(&token).await? else {
            return Ok(BackportOutcome::Cancelled("tag"));
        };

        let workspace = self
            .workspace
            .as_ref()
            .ok_or(BackportError::NoWorkspaceOpen)?;

        info!(tag = %tag, root = %workspace.root.display(), "Checking out target version");
        workspace.vcs.fetch_tags().await?;
        workspace.vcs.checkout_tag(&tag).await?;

        let request = PatchRequest::new(commit, tag);
        let (instruction, demo) = self.instruction(&request).await?;

        let path = resolve_target(&workspace.root, &instruction.file_path)?;
        apply_line_range(
            &path,
            instruction.start_line,
            instruction.end_line,
            &instruction.patch_text,
        )
        .await?;

        info!(
            path = %path.display(),
            start = instruction.start_line,
            end = instruction.end_line,
            demo,
            "Backport patch applied"
        );

        Ok(BackportOutcome::Applied(AppliedPatch {
            request,
            instruction,
            path,
            demo,
        }))
    }

    fn token(&self) -> Result<String> {
        self.credentials
            .get(GITHUB_TOKEN_KEY)
            .map_err(BackportError::Credentials)?
            .filter(|token| !token.trim().is_empty())
            .ok_or(BackportError::MissingCredential)
    }

    fn commit(&self) -> Result<Option<String>> {
        let commit = match &self.preselection.commit {
            Some(commit) => Some(commit.clone()),
            None => self
                .prompter
                .commit_hash()
                .map_err(BackportError::Prompt)?,
        };
        Ok(commit
            .map(|commit| commit.trim().to_string())
            .filter(|commit| !commit.is_empty()))
    }

    async fn tag(&self, token: &str) -> Result<Option<String>> {
        if let Some(tag) = &self.preselection.tag {
            debug!(tag = %tag, "Using preselected tag");
            return Ok(Some(tag.clone()));
        }

        let tags = self
            .tags
            .list_tags(token)
            .await
            .map_err(BackportError::TagListing)?;
        if tags.is_empty() {
            return Err(BackportError::NoTags);
        }

        self.prompter
            .select_tag(&tags)
            .map_err(BackportError::Prompt)
    }

    async fn instruction(&self, request: &PatchRequest) -> Result<(PatchInstruction, bool)> {
        let provider = match &self.source {
            PatchSource::Demo(instruction) => return Ok((instruction.clone(), true)),
            PatchSource::Remote(provider) => provider,
        };

        let error = match provider.generate(request).await {
            Ok(instruction) => return Ok((instruction, false)),
            Err(error) => error,
        };

        warn!(error = %error, "Patch service call failed");
        let Some(fallback) = &self.fallback else {
            return Err(BackportError::RemoteService(error));
        };

        let accepted = self
            .prompter
            .confirm_fallback(&error)
            .map_err(BackportError::Prompt)?;
        if accepted {
            Ok((fallback.clone(), true))
        } else {
            Err(BackportError::RemoteService(error))
        }
    }
}
