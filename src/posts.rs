//! Post listing and preview.
//!
//! Reads every post in a content directory, parses its frontmatter and orders
//! the result newest first. Posts are read concurrently; one unreadable file
//! is logged and left out rather than failing the whole listing.

use crate::frontmatter::{ParsedDocument, parse_document};
use crate::naming::{file_stem, title_from_stem};
use crate::scan::ScanTarget;
use crate::source::{ContentSource, SourceError};
use futures::future::join_all;
use pulldown_cmark::{Options, Parser, html as md_html};
use serde::Serialize;
use std::cmp::Reverse;
use tracing::warn;

/// Frontmatter keys holding a publication date, in lookup order.
pub const DATE_KEYS: &[&str] = &["publishDate", "date", "pubDate"];

/// One post file with its parsed contents.
#[derive(Debug, Clone, Serialize)]
pub struct PostEntry {
    pub name: String,
    pub path: String,
    pub document: ParsedDocument,
    /// File text as read, kept so edits can be applied to the original.
    #[serde(skip)]
    pub raw: String,
}

impl PostEntry {
    pub fn new(name: impl Into<String>, path: impl Into<String>, raw: String) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            document: parse_document(&raw),
            raw,
        }
    }

    /// First non-empty date scalar among [`DATE_KEYS`].
    pub fn published(&self) -> Option<&str> {
        DATE_KEYS.iter().find_map(|key| {
            self.document
                .frontmatter
                .get(*key)
                .and_then(|v| v.as_scalar())
                .filter(|s| !s.is_empty())
        })
    }

    /// `title` from frontmatter, or one derived from the file name.
    pub fn title(&self) -> String {
        match self
            .document
            .frontmatter
            .get("title")
            .and_then(|v| v.as_scalar())
            .filter(|s| !s.is_empty())
        {
            Some(title) => title.to_string(),
            None => title_from_stem(file_stem(&self.name)),
        }
    }
}

/// Read and parse every post file directly inside `dir`, newest first.
///
/// Dates are compared as strings, which orders ISO dates correctly. Undated
/// posts go last and keep their listing order. Failing to list `dir` is an
/// error; failing to read one post only drops that post.
pub async fn list_posts<S>(
    source: &S,
    dir: &str,
    target: &ScanTarget,
) -> Result<Vec<PostEntry>, SourceError>
where
    S: ContentSource + ?Sized,
{
    let entries = source.list_directory(dir).await?;
    let files: Vec<_> = entries
        .into_iter()
        .filter(|e| e.is_file() && target.matches(&e.name))
        .collect();

    let reads = files.iter().map(|e| source.read_file(&e.path));
    let contents = join_all(reads).await;

    let mut posts: Vec<PostEntry> = files
        .into_iter()
        .zip(contents)
        .filter_map(|(entry, result)| match result {
            Ok(raw) => Some(PostEntry::new(entry.name, entry.path, raw)),
            Err(e) => {
                warn!(path = %entry.path, error = %e, "skipping unreadable post");
                None
            }
        })
        .collect();

    sort_newest_first(&mut posts);
    Ok(posts)
}

fn sort_newest_first(posts: &mut [PostEntry]) {
    // Stable: `None` sorts after every `Some` under `Reverse`.
    posts.sort_by(|a, b| Reverse(a.published()).cmp(&Reverse(b.published())));
}

/// Render a post body to HTML for previewing.
pub fn render_preview(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(body, options);
    let mut html = String::new();
    md_html::push_html(&mut html, parser);
    html
}
