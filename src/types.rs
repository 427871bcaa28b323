//! Shared types passed between the content sources, the scanner and the CLI.
//!
//! These are serialized as JSON by `content-desk --json` output, so field names
//! are part of the tool's external surface.

use serde::{Deserialize, Serialize};

/// Whether a directory listing entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One item of a directory listing.
///
/// `path` is always relative to the repository root and uses `/` separators,
/// matching what the GitHub Contents API returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl Entry {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: EntryKind::Dir,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Candidate content directories offered as setup defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    /// Ranked candidates, best first.
    pub paths: Vec<String>,
    /// True when nothing was discovered and `paths` holds a conventional default
    /// instead of a scan result.
    #[serde(default)]
    pub is_default: bool,
}

impl Suggestions {
    /// The path a setup screen should preselect.
    pub fn best(&self) -> Option<&str> {
        self.paths.first().map(String::as_str)
    }
}

/// Join a directory path and a child name the way repository paths are written.
///
/// The repository root is the empty string, so its children have no leading `/`.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Last `/`-separated segment of a repository path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_path_at_root_has_no_leading_slash() {
        assert_eq!(join_path("", "src"), "src");
        assert_eq!(join_path("src", "content"), "src/content");
        assert_eq!(join_path("src/", "content"), "src/content");
    }

    #[test]
    fn base_name_of_nested_path() {
        assert_eq!(base_name("src/content/posts"), "posts");
        assert_eq!(base_name("posts"), "posts");
    }

    #[test]
    fn entry_serializes_kind_as_type() {
        let json = serde_json::to_string(&Entry::dir("posts", "src/posts")).unwrap();
        assert_eq!(json, r#"{"name":"posts","path":"src/posts","type":"dir"}"#);
    }

    #[test]
    fn suggestions_best_is_first_path() {
        let s = Suggestions {
            paths: vec!["a".into(), "b".into()],
            is_default: false,
        };
        assert_eq!(s.best(), Some("a"));
        assert_eq!(Suggestions::default().best(), None);
    }
}
