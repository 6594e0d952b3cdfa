use std::time::Duration;

use anyhow::{Context, Result};
use backport_config::{BackportConfig, user_config_dir};
use backport_core::{CredentialStore, FileCredentialStore, GITHUB_TOKEN_KEY};
use backport_remote::{TagClientBuilder, TagProvider};

/// Print every tag of the configured repository, one per line.
pub async fn handle_tags_command(config: &BackportConfig) -> Result<()> {
    let dir = user_config_dir().context("Could not determine a configuration directory")?;
    let token = FileCredentialStore::in_dir(&dir)
        .get(GITHUB_TOKEN_KEY)?
        .filter(|token| !token.trim().is_empty())
        .context("No GitHub token stored. Run `backport set-token` first.")?;

    let client = TagClientBuilder::new(config.resolved_tags_endpoint()?)
        .with_per_page(config.per_page)
        .with_timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let tags = client
        .list_tags(&token)
        .await
        .context("Failed to list tags")?;
    for tag in tags {
        println!("{tag}");
    }
    Ok(())
}
