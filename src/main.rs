//! `backport`: apply a service-generated patch for a commit onto a release tag.

use std::process::ExitCode;

use anyhow::Result;
use backport_config::BackportConfig;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod prompts;
mod workspace;

use cli::{Cli, Commands};

const LOG_ENV: &str = "BACKPORT_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        // Storing a token must work even when the config file is broken.
        Commands::SetToken { token } => cli::handle_set_token_command(token),
        Commands::Apply(args) => cli::handle_apply_command(args).await,
        Commands::Run(args) => {
            let config = BackportConfig::load(cli.config.as_deref())?;
            cli::handle_run_command(&config, args).await
        }
        Commands::Tags => {
            let config = BackportConfig::load(cli.config.as_deref())?;
            cli::handle_tags_command(&config).await
        }
    }
}

/// Logs go to stderr. `BACKPORT_LOG` (or `RUST_LOG`) wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
