//! Tool configuration.
//!
//! Handles loading, validating, and merging `content-desk.toml`. Every value has
//! a stock default tuned for Astro-style sites, so the file is optional and only
//! needs the keys a repository wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [scan]
//! ignored_dirs = ["node_modules", ".git", ".github", "dist", "build", "vendor", ".vscode"]
//!
//! [posts]
//! root = "src"              # Where the post-directory scan starts
//! max_depth = 3             # Directory levels listed below (and including) root
//! extensions = ["md", "mdx"]
//! preferred = ["posts", "post", "blog", "content", "data", "articles"]
//! extra_ignored = ["pages", "page"]
//! fallback = "src/data/post"
//!
//! [images]
//! root = ""                 # Repository root
//! max_depth = 4
//! extensions = ["jpg", "jpeg", "png", "gif", "webp", "svg"]
//! preferred = ["images", "img", "assets", "media", "uploads", "static"]
//! pin = "public/images"
//!
//! [github]
//! api_base = "https://api.github.com"
//! token_env = "GITHUB_TOKEN"
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Posts live under content/ in this repository
//! [posts]
//! root = "content"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::scan::{IGNORED_DIRS, IMAGE_EXTENSIONS, POST_EXTENSIONS, POST_IGNORED_DIRS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when `--config` isn't given.
pub const CONFIG_FILE: &str = "content-desk.toml";

/// Deepest scan the tool allows. Each extra level multiplies remote calls by
/// the branching factor of the tree.
pub const MAX_SCAN_DEPTH: usize = 6;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `content-desk.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeskConfig {
    /// Settings shared by every scan.
    pub scan: ScanConfig,
    /// Post directory discovery.
    pub posts: PostsConfig,
    /// Image directory discovery.
    pub images: ImagesConfig,
    /// Remote access.
    pub github: GithubConfig,
}

impl DeskConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (section, depth) in [
            ("posts", self.posts.max_depth),
            ("images", self.images.max_depth),
        ] {
            if depth == 0 || depth > MAX_SCAN_DEPTH {
                return Err(ConfigError::Validation(format!(
                    "{section}.max_depth must be 1-{MAX_SCAN_DEPTH}"
                )));
            }
        }
        if self.posts.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "posts.extensions must not be empty".into(),
            ));
        }
        if self.images.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "images.extensions must not be empty".into(),
            ));
        }
        if self.github.api_base.trim().is_empty() {
            return Err(ConfigError::Validation(
                "github.api_base must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Settings shared by post and image scans.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Directory names never descended into (compared lower-cased).
    pub ignored_dirs: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            ignored_dirs: strings(IGNORED_DIRS),
        }
    }
}

/// Post directory discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PostsConfig {
    /// Directory the scan starts from.
    pub root: String,
    /// Directory levels listed, counting the root as the first.
    pub max_depth: usize,
    /// Post file extensions, without the dot. Matched case-sensitively.
    pub extensions: Vec<String>,
    /// Directory names ranked first when several candidates are found.
    pub preferred: Vec<String>,
    /// Directories skipped by the post scan on top of `scan.ignored_dirs`.
    pub extra_ignored: Vec<String>,
    /// Suggested when the scan finds nothing but this directory exists.
    pub fallback: String,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            root: "src".to_string(),
            max_depth: 3,
            extensions: strings(POST_EXTENSIONS),
            preferred: strings(&["posts", "post", "blog", "content", "data", "articles"]),
            extra_ignored: strings(POST_IGNORED_DIRS),
            fallback: "src/data/post".to_string(),
        }
    }
}

/// Image directory discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Directory the scan starts from; empty for the repository root.
    pub root: String,
    /// Directory levels listed, counting the root as the first.
    pub max_depth: usize,
    /// Image file extensions, without the dot. Matched case-insensitively.
    pub extensions: Vec<String>,
    /// Directory names ranked first when several candidates are found.
    pub preferred: Vec<String>,
    /// Always ranked first when discovered, and suggested when nothing is.
    pub pin: String,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            max_depth: 4,
            extensions: strings(IMAGE_EXTENSIONS),
            preferred: strings(&["images", "img", "assets", "media", "uploads", "static"]),
            pin: "public/images".to_string(),
        }
    }
}

/// Remote access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    /// REST API base URL (GitHub Enterprise uses `https://host/api/v3`).
    pub api_base: String,
    /// Environment variable holding the personal access token.
    pub token_env: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(DeskConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<DeskConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: DeskConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from a specific file. The file must exist.
pub fn load_config_file(path: &Path) -> Result<DeskConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Load `content-desk.toml` from `dir`, falling back to stock defaults when the
/// file doesn't exist.
pub fn load_config(dir: &Path) -> Result<DeskConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return resolve_config(None);
    }
    load_config_file(&config_path)
}

/// Returns a fully-commented stock `content-desk.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# content-desk configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Shared scan settings
# ---------------------------------------------------------------------------
[scan]
# Directory names never descended into (compared lower-cased).
ignored_dirs = ["node_modules", ".git", ".github", "dist", "build", "vendor", ".vscode"]

# ---------------------------------------------------------------------------
# Post directory discovery
# ---------------------------------------------------------------------------
[posts]
# Directory the scan starts from.
root = "src"

# Directory levels listed, counting the root as the first (1-6).
# Every level multiplies the number of API calls, keep it small.
max_depth = 3

# Post file extensions (case-sensitive, without the dot).
extensions = ["md", "mdx"]

# Directory names ranked first when several candidates are found.
preferred = ["posts", "post", "blog", "content", "data", "articles"]

# Skipped by the post scan only (routing folders, not content).
extra_ignored = ["pages", "page"]

# Suggested when the scan finds nothing but this directory exists.
fallback = "src/data/post"

# ---------------------------------------------------------------------------
# Image directory discovery
# ---------------------------------------------------------------------------
[images]
# Directory the scan starts from; empty for the repository root.
root = ""

# Directory levels listed, counting the root as the first (1-6).
max_depth = 4

# Image file extensions (case-insensitive, without the dot).
extensions = ["jpg", "jpeg", "png", "gif", "webp", "svg"]

# Directory names ranked first when several candidates are found.
preferred = ["images", "img", "assets", "media", "uploads", "static"]

# Always ranked first when discovered, and suggested when nothing is.
pin = "public/images"

# ---------------------------------------------------------------------------
# GitHub access
# ---------------------------------------------------------------------------
[github]
api_base = "https://api.github.com"

# Environment variable holding a personal access token.
token_env = "GITHUB_TOKEN"
"##
}
