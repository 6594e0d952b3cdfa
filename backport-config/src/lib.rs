//! Configuration loading for backport.
//!
//! Settings come from a `backport.toml` file, `.env` and a handful of
//! `BACKPORT_*` environment variables, in that order of increasing priority.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "backport.toml";

/// Directory name under the user config directory
pub const APP_DIR_NAME: &str = "backport";

pub const ENV_PATCH_SERVICE_URL: &str = "BACKPORT_PATCH_SERVICE_URL";
pub const ENV_TAGS_ENDPOINT: &str = "BACKPORT_TAGS_ENDPOINT";
pub const ENV_REPOSITORY: &str = "BACKPORT_REPOSITORY";
pub const ENV_CONFIG_DIR: &str = "BACKPORT_CONFIG_DIR";

const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Header used to skip an interstitial warning page in front of the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BypassHeader {
    pub enabled: bool,
    pub name: String,
    pub value: String,
}

impl Default for BypassHeader {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "ngrok-skip-browser-warning".to_string(),
            value: "true".to_string(),
        }
    }
}

impl BypassHeader {
    /// `(name, value)` when the header should be sent
    pub fn as_pair(&self) -> Option<(String, String)> {
        self.enabled.then(|| (self.name.clone(), self.value.clone()))
    }
}

/// Replacement for the built-in demonstration patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoPatchConfig {
    pub file_path: String,
    pub start_line: i64,
    pub end_line: i64,
    pub patch_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackportConfig {
    /// `owner/name` of the repository whose tags are offered
    pub repository: Option<String>,

    /// Full tags endpoint; overrides the one derived from `repository`
    pub tags_endpoint: Option<String>,

    pub per_page: u32,

    /// Patch-generation service receiving `{commitHash, targetVersion}`
    pub patch_service_url: Option<String>,

    pub bypass_header: BypassHeader,

    pub http_timeout_secs: u64,

    pub git_program: String,

    pub git_timeout_secs: u64,

    pub demo_patch: Option<DemoPatchConfig>,
}

impl Default for BackportConfig {
    fn default() -> Self {
        Self {
            repository: None,
            tags_endpoint: None,
            per_page: 100,
            patch_service_url: None,
            bypass_header: BypassHeader::default(),
            http_timeout_secs: 30,
            git_program: "git".to_string(),
            git_timeout_secs: 120,
            demo_patch: None,
        }
    }
}

impl BackportConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse backport configuration")
    }

    /// Read and parse a config file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load configuration the way the CLI does: explicit path, then
    /// `./backport.toml`, then the user config directory, then defaults.
    /// Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match explicit {
            Some(path) => Self::from_path(path)?,
            None => match discover_config_path() {
                Some(path) => {
                    debug!(path = %path.display(), "Loading configuration");
                    Self::from_path(&path)?
                }
                None => {
                    debug!("No configuration file found; using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `BACKPORT_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = non_empty(ENV_PATCH_SERVICE_URL) {
            self.patch_service_url = Some(url);
        }
        if let Some(endpoint) = non_empty(ENV_TAGS_ENDPOINT) {
            self.tags_endpoint = Some(endpoint);
        }
        if let Some(repository) = non_empty(ENV_REPOSITORY) {
            self.repository = Some(repository);
        }
    }

    /// Endpoint used for tag listing
    pub fn resolved_tags_endpoint(&self) -> Result<String> {
        if let Some(endpoint) = self.tags_endpoint.as_deref() {
            return Ok(endpoint.to_string());
        }

        let repository = self.repository.as_deref().ok_or_else(|| {
            anyhow!(
                "No tag source configured: set `repository` or `tags_endpoint` in {CONFIG_FILE_NAME} \
                 (or {ENV_REPOSITORY})"
            )
        })?;

        let (owner, name) = repository
            .trim()
            .trim_matches('/')
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| anyhow!("`repository` must look like owner/name, got '{repository}'"))?;

        Ok(format!("{DEFAULT_GITHUB_API}/repos/{owner}/{name}/tags"))
    }

    /// URL of the patch-generation service
    pub fn resolved_patch_service_url(&self) -> Result<String> {
        self.patch_service_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow!(
                    "No patch service configured: set `patch_service_url` in {CONFIG_FILE_NAME} \
                     (or {ENV_PATCH_SERVICE_URL}), or use --demo"
                )
            })
    }
}

/// Directory holding user-level config and the credential file.
/// `BACKPORT_CONFIG_DIR` replaces the platform default.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR).filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

fn discover_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    let user = user_config_dir()?.join("config.toml");
    if user.is_file() {
        Some(user)
    } else {
        if user.exists() {
            warn!(path = %user.display(), "Config path exists but is not a file; ignoring");
        }
        None
    }
}
