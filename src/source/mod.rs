//! Read access to a repository's content tree.
//!
//! Everything that discovers or reads posts goes through [`ContentSource`]: list
//! one directory, read one file. The scanner and URL detector don't know whether
//! the tree lives on disk, in memory or behind the GitHub Contents API.
//!
//! | Implementation | Backing store |
//! |----------------|---------------|
//! | [`LocalSource`] | A checkout on disk |
//! | [`MemorySource`] | An in-memory file map (tests, previews) |
//! | [`GithubSource`] | GitHub REST Contents API |
//!
//! Paths are repository-relative, `/`-separated, and the root is `""`.

mod github;
mod local;
mod memory;

pub use github::{GithubSource, RepoRef, parse_repo_url};
pub use local::LocalSource;
pub use memory::MemorySource;

use crate::types::Entry;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("File is not valid UTF-8 text: {0}")]
    Decode(String),
    #[error("Path escapes the repository: {0}")]
    InvalidPath(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

/// Directory listing and file reads against some repository tree.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Entries directly inside `path`, in the order the backend returns them.
    async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, SourceError>;

    /// UTF-8 contents of the file at `path`.
    async fn read_file(&self, path: &str) -> Result<String, SourceError>;
}

/// Normalize a caller-supplied repository path: trim slashes, reject `..`.
pub(crate) fn normalize_path(path: &str) -> Result<String, SourceError> {
    let trimmed = path.trim().trim_matches('/');
    let mut parts = Vec::new();
    for part in trimmed.split('/') {
        match part {
            "" | "." => continue,
            ".." => return Err(SourceError::InvalidPath(path.to_string())),
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}
