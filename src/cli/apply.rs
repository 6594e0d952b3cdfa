use anyhow::{Context, Result};
use backport_core::apply_line_range;
use console::style;
use std::path::Path;
use tokio::io::AsyncReadExt;

use super::ApplyArgs;

pub async fn handle_apply_command(args: ApplyArgs) -> Result<()> {
    let text = match args.text {
        Some(text) => text,
        None => {
            let path = args
                .text_file
                .as_deref()
                .context("Pass --text or --text-file")?;
            read_replacement(path).await?
        }
    };

    apply_line_range(&args.file, args.start, args.end, &text).await?;

    println!(
        "{} Replaced lines {}-{} of {}",
        style("✓").green(),
        args.start,
        args.end,
        args.file.display()
    );
    Ok(())
}

/// Replacement text from a file or stdin, minus the final line terminator a
/// text file normally ends with.
async fn read_replacement(path: &Path) -> Result<String> {
    let mut text = if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read replacement text from stdin")?;
        text
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read replacement text from {}", path.display()))?
    };

    if text.ends_with('\n') {
        text.pop();
        if text.ends_with('\r') {
            text.pop();
        }
    }
    Ok(text)
}
