use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatchError {
    #[error(
        "invalid line range {start}..={end} for {} ({line_count} lines)",
        path.display()
    )]
    InvalidRange {
        path: PathBuf,
        start: i64,
        end: i64,
        line_count: usize,
    },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid patch path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl PatchError {
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, PatchError::InvalidRange { .. })
    }
}
