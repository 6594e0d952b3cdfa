//! Wire types exchanged with the patch service and the tag API

use serde::{Deserialize, Serialize};

/// Body of the patch-generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRequest {
    /// Commit to backport
    pub commit_hash: String,

    /// Tag the patch should target
    pub target_version: String,
}

impl PatchRequest {
    pub fn new(commit_hash: impl Into<String>, target_version: impl Into<String>) -> Self {
        Self {
            commit_hash: commit_hash.into(),
            target_version: target_version.into(),
        }
    }
}

/// Which lines of which file to replace, and with what.
///
/// Line numbers are 1-based and inclusive. They are kept signed so that a
/// nonsensical range coming back from the service is rejected by the patcher's
/// range check rather than by deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchInstruction {
    /// Path relative to the workspace root
    pub file_path: String,

    pub start_line: i64,

    pub end_line: i64,

    /// Replacement text, flush-left
    pub patch_text: String,
}

/// One element of a tag-listing page. Other fields the API returns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    pub name: String,
}
