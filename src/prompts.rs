use anyhow::{Result, bail};
use backport_core::Prompter;
use backport_remote::RemoteError;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use is_terminal::IsTerminal;

/// Terminal prompts backed by dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    fn ensure_interactive(what: &str) -> Result<()> {
        if !std::io::stdin().is_terminal() {
            bail!("Cannot prompt for {what}: stdin is not a terminal");
        }
        Ok(())
    }
}

impl Prompter for DialoguerPrompter {
    fn commit_hash(&self) -> Result<Option<String>> {
        Self::ensure_interactive("a commit (pass --commit)")?;
        let commit: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Commit hash to backport")
            .allow_empty(true)
            .interact_text()?;
        let commit = commit.trim();
        Ok((!commit.is_empty()).then(|| commit.to_string()))
    }

    fn select_tag(&self, tags: &[String]) -> Result<Option<String>> {
        Self::ensure_interactive("a tag (pass --tag)")?;
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Target version")
            .items(tags)
            .default(0)
            .interact_opt()?;
        Ok(choice.and_then(|idx| tags.get(idx).cloned()))
    }

    fn confirm_fallback(&self, error: &RemoteError) -> Result<bool> {
        Self::ensure_interactive("the fallback decision")?;
        let accepted = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Patch service failed ({error}). Apply the demonstration patch instead?"
            ))
            .default(false)
            .interact_opt()?;
        Ok(accepted.unwrap_or(false))
    }
}

/// Masked token entry for `set-token`.
pub fn prompt_token() -> Result<String> {
    DialoguerPrompter::ensure_interactive("a token (pass --token)")?;
    let token = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("GitHub token")
        .interact()?;
    Ok(token)
}
