use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use backport_config::{BackportConfig, user_config_dir};
use backport_core::{
    BackportError, BackportFlow, BackportOutcome, CredentialStore, FileCredentialStore,
    GITHUB_TOKEN_KEY, GitRepository, PatchSource, Preselection, ProcessRunner, Workspace,
    demo_instruction,
};
use backport_remote::{
    PatchInstruction, PatchProvider, PatchRequest, PatchServiceClientBuilder, RemoteError,
    RemoteResult, TagClientBuilder, TagProvider,
};
use console::style;
use tracing::debug;

use super::RunArgs;
use crate::prompts::DialoguerPrompter;
use crate::workspace::{current_dir, resolve_workspace};

pub async fn handle_run_command(config: &BackportConfig, args: RunArgs) -> Result<()> {
    let dir = user_config_dir().context("Could not determine a configuration directory")?;
    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::in_dir(&dir));

    // Workspace discovery spawns git; a missing token has to stop the run first.
    let token = credentials.get(GITHUB_TOKEN_KEY)?;
    if token.is_none_or(|token| token.trim().is_empty()) {
        return Err(BackportError::MissingCredential.into());
    }

    let fallback = fallback_instruction(config);
    let source = if args.demo {
        PatchSource::Demo(fallback.clone())
    } else {
        PatchSource::Remote(patch_provider(config))
    };

    let runner = ProcessRunner::new(Duration::from_secs(config.git_timeout_secs));
    let root = resolve_workspace(
        args.workspace.as_deref(),
        &current_dir()?,
        &runner,
        &config.git_program,
    )
    .await?;
    let workspace = root.map(|root| {
        let git = GitRepository::new(runner.clone(), root.clone())
            .with_program(config.git_program.clone());
        Workspace::new(root, Box::new(git))
    });

    let flow = BackportFlow::new(
        credentials,
        tag_provider(config),
        source,
        Arc::new(DialoguerPrompter),
    )
    .with_workspace(workspace)
    .with_fallback(Some(fallback))
    .with_preselection(Preselection {
        commit: args.commit,
        tag: args.tag,
    });

    match flow.run().await? {
        BackportOutcome::Applied(applied) => {
            let label = if applied.demo {
                "Demonstration patch applied"
            } else {
                "Backport patch applied"
            };
            println!(
                "{} {label}: {} onto {} ({} lines {}-{})",
                style("✓").green(),
                applied.request.commit_hash,
                applied.request.target_version,
                applied.path.display(),
                applied.instruction.start_line,
                applied.instruction.end_line,
            );
        }
        BackportOutcome::Cancelled(step) => {
            println!("{} Cancelled at the {step} prompt", style("!").yellow());
        }
    }
    Ok(())
}

fn fallback_instruction(config: &BackportConfig) -> PatchInstruction {
    match &config.demo_patch {
        Some(demo) => PatchInstruction {
            file_path: demo.file_path.clone(),
            start_line: demo.start_line,
            end_line: demo.end_line,
            patch_text: demo.patch_text.clone(),
        },
        None => demo_instruction(),
    }
}

/// Tag client for the configured endpoint. A missing or invalid setting is
/// only reported once tags are actually requested, so an absent token is
/// still the first thing a run complains about.
fn tag_provider(config: &BackportConfig) -> Arc<dyn TagProvider> {
    let client = config.resolved_tags_endpoint().and_then(|endpoint| {
        TagClientBuilder::new(endpoint)
            .with_per_page(config.per_page)
            .with_timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(anyhow::Error::from)
    });
    match client {
        Ok(client) => Arc::new(client),
        Err(err) => {
            debug!(error = %err, "Tag listing is not configured");
            Arc::new(Unconfigured(format!("{err:#}")))
        }
    }
}

fn patch_provider(config: &BackportConfig) -> Arc<dyn PatchProvider> {
    let client = config.resolved_patch_service_url().and_then(|url| {
        PatchServiceClientBuilder::new(url)
            .with_timeout(Duration::from_secs(config.http_timeout_secs))
            .with_bypass_header(config.bypass_header.as_pair())
            .build()
            .map_err(anyhow::Error::from)
    });
    match client {
        Ok(client) => Arc::new(client),
        Err(err) => {
            debug!(error = %err, "Patch service is not configured");
            Arc::new(Unconfigured(format!("{err:#}")))
        }
    }
}

/// Stand-in for a remote collaborator whose settings are missing.
struct Unconfigured(String);

#[async_trait]
impl TagProvider for Unconfigured {
    async fn list_tags(&self, _token: &str) -> RemoteResult<Vec<String>> {
        Err(RemoteError::Config(self.0.clone()))
    }
}

#[async_trait]
impl PatchProvider for Unconfigured {
    async fn generate(&self, _request: &PatchRequest) -> RemoteResult<PatchInstruction> {
        Err(RemoteError::Config(self.0.clone()))
    }
}
