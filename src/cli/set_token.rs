use anyhow::{Context, Result};
use backport_config::user_config_dir;
use backport_core::credentials::normalize_token;
use backport_core::{CredentialStore, FileCredentialStore, GITHUB_TOKEN_KEY};
use console::style;

use crate::prompts::prompt_token;

/// Persist the tag API token, prompting for it when `--token` is absent.
pub fn handle_set_token_command(token: Option<String>) -> Result<()> {
    let raw = match token {
        Some(token) => token,
        None => prompt_token()?,
    };
    let token = normalize_token(&raw)?;

    let dir = user_config_dir().context("Could not determine a configuration directory")?;
    let store = FileCredentialStore::in_dir(&dir);
    store.set(GITHUB_TOKEN_KEY, token)?;

    println!(
        "{} Token saved to {}",
        style("✓").green(),
        store.path().display()
    );
    Ok(())
}
