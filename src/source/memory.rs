use super::{ContentSource, SourceError, normalize_path};
use crate::types::{Entry, EntryKind, join_path};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// An in-memory repository tree.
///
/// Directories exist implicitly through the files below them; empty ones can be
/// added with [`MemorySource::with_dir`]. Listings come back sorted by name.
/// Paths registered with [`MemorySource::with_failure`] fail to list, which is
/// how tests simulate a flaky remote.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
    dirs: BTreeSet<String>,
    failures: BTreeSet<String>,
    list_calls: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.trim_matches('/').to_string(), contents.to_string());
        self
    }

    /// Add several files with the same placeholder contents.
    pub fn with_files(self, paths: &[&str]) -> Self {
        paths.iter().fold(self, |source, path| source.with_file(path, ""))
    }

    pub fn with_dir(mut self, path: &str) -> Self {
        self.dirs.insert(path.trim_matches('/').to_string());
        self
    }

    /// Make listings of `path` fail with [`SourceError::Unavailable`].
    pub fn with_failure(mut self, path: &str) -> Self {
        self.failures.insert(path.trim_matches('/').to_string());
        self
    }

    /// Number of `list_directory` calls served so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn known_paths(&self) -> impl Iterator<Item = (&str, EntryKind)> {
        self.files
            .keys()
            .map(|p| (p.as_str(), EntryKind::File))
            .chain(self.dirs.iter().map(|p| (p.as_str(), EntryKind::Dir)))
    }

    fn is_dir(&self, path: &str) -> bool {
        path.is_empty()
            || self.dirs.contains(path)
            || self
                .known_paths()
                .any(|(p, _)| p.strip_prefix(path).is_some_and(|rest| rest.starts_with('/')))
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, SourceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let dir = normalize_path(path)?;

        if self.failures.contains(&dir) {
            return Err(SourceError::Unavailable(dir));
        }
        if !self.is_dir(&dir) {
            return Err(if self.files.contains_key(&dir) {
                SourceError::NotADirectory(dir)
            } else {
                SourceError::NotFound(dir)
            });
        }

        let mut children: BTreeMap<String, EntryKind> = BTreeMap::new();
        for (known, kind) in self.known_paths() {
            let rest = if dir.is_empty() {
                known
            } else {
                match known.strip_prefix(dir.as_str()).and_then(|r| r.strip_prefix('/')) {
                    Some(rest) => rest,
                    None => continue,
                }
            };
            if rest.is_empty() {
                continue;
            }
            match rest.split_once('/') {
                Some((child, _)) => {
                    children.insert(child.to_string(), EntryKind::Dir);
                }
                None => {
                    children.entry(rest.to_string()).or_insert(kind);
                }
            }
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| {
                let path = join_path(&dir, &name);
                Entry { name, path, kind }
            })
            .collect())
    }

    async fn read_file(&self, path: &str) -> Result<String, SourceError> {
        let path = normalize_path(path)?;
        self.files
            .get(&path)
            .cloned()
            .ok_or(SourceError::NotFound(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> MemorySource {
        MemorySource::new()
            .with_file("README.md", "readme")
            .with_file("src/content/posts/a.md", "# A")
            .with_file("src/content/posts/b.mdx", "# B")
            .with_dir("public/images")
    }

    #[tokio::test]
    async fn root_listing_has_implicit_dirs() {
        let entries = tree().list_directory("").await.unwrap();
        assert_eq!(
            entries,
            vec![
                Entry::file("README.md", "README.md"),
                Entry::dir("public", "public"),
                Entry::dir("src", "src"),
            ]
        );
    }

    #[tokio::test]
    async fn empty_dir_lists_empty() {
        let entries = tree().list_directory("public/images").await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn nested_listing_uses_full_paths() {
        let entries = tree().list_directory("src/content/posts").await.unwrap();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["src/content/posts/a.md", "src/content/posts/b.mdx"]);
    }

    #[tokio::test]
    async fn prefix_of_a_name_is_not_a_directory() {
        let err = tree().list_directory("src/cont").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn listing_a_file_fails() {
        let err = tree().list_directory("README.md").await.unwrap_err();
        assert!(matches!(err, SourceError::NotADirectory(_)));
    }

    #[tokio::test]
    async fn injected_failure_and_call_count() {
        let source = tree().with_failure("src");
        assert!(matches!(
            source.list_directory("src").await,
            Err(SourceError::Unavailable(_))
        ));
        source.list_directory("").await.unwrap();
        assert_eq!(source.list_calls(), 2);
    }

    #[tokio::test]
    async fn read_file_by_path() {
        let source = tree();
        assert_eq!(source.read_file("/src/content/posts/a.md").await.unwrap(), "# A");
        assert!(source.read_file("missing.md").await.unwrap_err().is_not_found());
    }
}
