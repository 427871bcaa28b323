use super::{ContentSource, SourceError, normalize_path};
use crate::types::{Entry, join_path};
use async_trait::async_trait;
use std::io::ErrorKind;
use tokio::io::AsyncWriteExt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A repository checkout on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a repository path, plus its normalized form.
    fn resolve(&self, path: &str) -> Result<(PathBuf, String), SourceError> {
        let rel = normalize_path(path)?;
        let full = if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&rel)
        };
        Ok((full, rel))
    }

    /// Write a file back into the checkout. Parent directories must exist.
    pub async fn write_file(&self, path: &str, contents: &str) -> Result<(), SourceError> {
        let (full, rel) = self.resolve(path)?;
        tokio::fs::write(&full, contents).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound(rel),
            _ => SourceError::Io(e),
        })
    }

    /// Write a new file, refusing to replace one that is already there.
    pub async fn create_file(&self, path: &str, contents: &str) -> Result<(), SourceError> {
        let (full, rel) = self.resolve(path)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => SourceError::AlreadyExists(rel.clone()),
                ErrorKind::NotFound => SourceError::NotFound(rel.clone()),
                _ => SourceError::Io(e),
            })?;
        file.write_all(contents.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn remove_file(&self, path: &str) -> Result<(), SourceError> {
        let (full, rel) = self.resolve(path)?;
        tokio::fs::remove_file(&full).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound(rel),
            _ => SourceError::Io(e),
        })
    }
}

fn list_blocking(full: &Path, rel: &str) -> Result<Vec<Entry>, SourceError> {
    if !full.exists() {
        return Err(SourceError::NotFound(rel.to_string()));
    }
    if !full.is_dir() {
        return Err(SourceError::NotADirectory(rel.to_string()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(full)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(std::io::Error::from)?;
        let name = entry.file_name().to_string_lossy().to_string();
        let path = join_path(rel, &name);
        entries.push(if entry.file_type().is_dir() {
            Entry::dir(name, path)
        } else {
            Entry::file(name, path)
        });
    }
    Ok(entries)
}

#[async_trait]
impl ContentSource for LocalSource {
    async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, SourceError> {
        let (full, rel) = self.resolve(path)?;
        tokio::task::spawn_blocking(move || list_blocking(&full, &rel))
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?
    }

    async fn read_file(&self, path: &str) -> Result<String, SourceError> {
        let (full, rel) = self.resolve(path)?;
        let bytes = tokio::fs::read(&full).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => SourceError::NotFound(rel.clone()),
            _ => SourceError::Io(e),
        })?;
        String::from_utf8(bytes).map_err(|_| SourceError::Decode(rel))
    }
}
