//! Remote collaborators of the backport workflow
//!
//! This crate provides:
//! - Paginated tag listing against a GitHub-compatible tags endpoint
//! - The patch-generation service client
//! - Wire types shared with `backport-core`

pub mod client;
pub mod error;
pub mod messages;
pub mod tags;

#[cfg(test)]
mod test_support;

pub use client::{PatchProvider, PatchServiceClient, PatchServiceClientBuilder};
pub use error::{RemoteError, RemoteResult};
pub use messages::{PatchInstruction, PatchRequest, TagEntry};
pub use tags::{TagClient, TagClientBuilder, TagPageSource, TagProvider, collect_all_tags};
