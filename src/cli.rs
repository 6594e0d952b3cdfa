use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

mod apply;
mod run;
mod set_token;
mod tags;

pub use apply::handle_apply_command;
pub use run::handle_run_command;
pub use set_token::handle_set_token_command;
pub use tags::handle_tags_command;

#[derive(Debug, Parser)]
#[command(
    name = "backport",
    version,
    about = "Backport a commit onto a release tag using a generated line-range patch"
)]
pub struct Cli {
    /// Configuration file (defaults to ./backport.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Store the API token used for tag listing
    SetToken {
        /// Token value; prompted for (masked) when omitted
        #[arg(long)]
        token: Option<String>,
    },

    /// Pick a commit and a tag, check the tag out and apply the generated patch
    Run(RunArgs),

    /// List the tags of the configured repository
    Tags,

    /// Replace a line range of a file directly, without any remote call
    Apply(ApplyArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Commit to backport (prompted for when omitted)
    #[arg(long)]
    pub commit: Option<String>,

    /// Target tag (chosen from the tag list when omitted)
    #[arg(long)]
    pub tag: Option<String>,

    /// Working tree to check out and patch (defaults to the enclosing git repository)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Use the demonstration patch instead of calling the patch service
    #[arg(long)]
    pub demo: bool,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("replacement").required(true).args(["text", "text_file"])))]
pub struct ApplyArgs {
    /// File to patch
    #[arg(long)]
    pub file: PathBuf,

    /// First line to replace (1-based)
    #[arg(long, allow_negative_numbers = true)]
    pub start: i64,

    /// Last line to replace (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub end: i64,

    /// Replacement text
    #[arg(long)]
    pub text: Option<String>,

    /// Read the replacement text from a file (`-` for stdin)
    #[arg(long, value_name = "PATH")]
    pub text_file: Option<PathBuf>,
}
