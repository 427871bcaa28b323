//! Content directory discovery.
//!
//! Walks a repository tree through a [`ContentSource`] and collects every
//! directory that directly contains at least one file of interest. Used to seed
//! the "where do posts live" and "where do images go" setup defaults.
//!
//! ## Depth
//!
//! The root sits at depth 0 and a directory at depth `d` is listed only while
//! `d < max_depth`. Against the GitHub API every listed directory is one
//! request, so a tree with branching factor B costs up to B^max_depth calls.
//! Keep the bound small (the stock config uses 3 for posts and 4 for images).
//!
//! ```text
//! max_depth = 3, root = "src"
//!
//! src/                       depth 0  listed
//! ├── content/               depth 1  listed
//! │   └── posts/             depth 2  listed   -> match
//! │       └── 2024/          depth 3  not listed
//! └── pages/                 ignored for posts
//! ```
//!
//! ## Failures
//!
//! A failure listing the root is returned to the caller, so "root missing" is
//! distinguishable from "nothing found". A failure anywhere below the root is
//! logged and that subtree contributes no matches.
//!
//! ## Concurrency
//!
//! Sibling subdirectories are scanned concurrently. Each call returns its own
//! result set and the parent merges them.

use crate::config::DeskConfig;
use crate::rank::rank_paths;
use crate::source::{ContentSource, SourceError};
use crate::types::{Entry, Suggestions};
use futures::future::{BoxFuture, FutureExt, join_all};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Directory names skipped by every scan.
pub const IGNORED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".github",
    "dist",
    "build",
    "vendor",
    ".vscode",
];

/// Routing folders skipped by the post scan on top of [`IGNORED_DIRS`].
pub const POST_IGNORED_DIRS: &[&str] = &["pages", "page"];

pub const POST_EXTENSIONS: &[&str] = &["md", "mdx"];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
enum Matcher {
    Extensions {
        extensions: Vec<String>,
        case_sensitive: bool,
    },
    Custom(Predicate),
}

impl Matcher {
    fn matches(&self, name: &str) -> bool {
        match self {
            Matcher::Extensions {
                extensions,
                case_sensitive: true,
            } => extensions
                .iter()
                .any(|ext| name.strip_suffix(ext.as_str()).is_some_and(|s| s.ends_with('.'))),
            Matcher::Extensions {
                extensions,
                case_sensitive: false,
            } => name.rsplit_once('.').is_some_and(|(_, ext)| {
                extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
            }),
            Matcher::Custom(predicate) => predicate(name),
        }
    }
}

/// What a scan looks for and which directories it never enters.
#[derive(Clone)]
pub struct ScanTarget {
    matcher: Matcher,
    ignored: BTreeSet<String>,
}

impl fmt::Debug for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ScanTarget");
        match &self.matcher {
            Matcher::Extensions {
                extensions,
                case_sensitive,
            } => s
                .field("extensions", extensions)
                .field("case_sensitive", case_sensitive),
            Matcher::Custom(_) => s.field("predicate", &"<fn>"),
        };
        s.field("ignored", &self.ignored).finish()
    }
}

impl ScanTarget {
    fn from_parts<E, I>(extensions: E, case_sensitive: bool, ignored: I) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            matcher: Matcher::Extensions {
                extensions: extensions
                    .into_iter()
                    .map(|e| e.as_ref().trim_start_matches('.').to_string())
                    .collect(),
                case_sensitive,
            },
            ignored: ignored
                .into_iter()
                .map(|d| d.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Markdown and MDX posts (`.md`, `.mdx`, case-sensitive).
    pub fn posts() -> Self {
        Self::from_parts(
            POST_EXTENSIONS,
            true,
            IGNORED_DIRS.iter().chain(POST_IGNORED_DIRS),
        )
    }

    /// Common web image formats, extension compared case-insensitively.
    pub fn images() -> Self {
        Self::from_parts(IMAGE_EXTENSIONS, false, IGNORED_DIRS)
    }

    /// Post target with extensions and ignore lists taken from config.
    pub fn posts_from(config: &DeskConfig) -> Self {
        Self::from_parts(
            &config.posts.extensions,
            true,
            config
                .scan
                .ignored_dirs
                .iter()
                .chain(&config.posts.extra_ignored),
        )
    }

    /// Image target with extensions and ignore list taken from config.
    pub fn images_from(config: &DeskConfig) -> Self {
        Self::from_parts(&config.images.extensions, false, &config.scan.ignored_dirs)
    }

    /// Match files with an arbitrary predicate, skipping the standard ignore set.
    pub fn with_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            matcher: Matcher::Custom(Arc::new(predicate)),
            ignored: IGNORED_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Replace the ignore set.
    pub fn ignoring<I>(mut self, dirs: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.ignored = dirs.into_iter().map(|d| d.as_ref().to_lowercase()).collect();
        self
    }

    /// Does a file with this name count toward a match?
    pub fn matches(&self, file_name: &str) -> bool {
        self.matcher.matches(file_name)
    }

    /// Is a directory with this name skipped? Compared lower-cased.
    pub fn ignores(&self, dir_name: &str) -> bool {
        self.ignored.contains(&dir_name.to_lowercase())
    }
}

/// Collect every directory below `root` that directly contains a matching file.
///
/// `root` may be `""` for the repository root, which is itself never reported.
/// Returns `Ok` with an empty set when nothing matches; only a failure to list
/// `root` itself is an error.
pub async fn scan_for_matching_directories<S>(
    source: &S,
    root: &str,
    max_depth: usize,
    target: &ScanTarget,
) -> Result<BTreeSet<String>, SourceError>
where
    S: ContentSource + ?Sized,
{
    if max_depth == 0 {
        return Ok(BTreeSet::new());
    }
    let root = root.trim_matches('/');
    let entries = source.list_directory(root).await?;
    let found = collect_matches(source, root, entries, 0, max_depth, target).await;
    debug!(root, max_depth, found = found.len(), "scan finished");
    Ok(found)
}

fn scan_subtree<'a, S>(
    source: &'a S,
    path: String,
    depth: usize,
    max_depth: usize,
    target: &'a ScanTarget,
) -> BoxFuture<'a, BTreeSet<String>>
where
    S: ContentSource + ?Sized,
{
    async move {
        match source.list_directory(&path).await {
            Ok(entries) => collect_matches(source, &path, entries, depth, max_depth, target).await,
            Err(e) => {
                warn!(path = %path, error = %e, "skipping directory that failed to list");
                BTreeSet::new()
            }
        }
    }
    .boxed()
}

async fn collect_matches<S>(
    source: &S,
    path: &str,
    entries: Vec<Entry>,
    depth: usize,
    max_depth: usize,
    target: &ScanTarget,
) -> BTreeSet<String>
where
    S: ContentSource + ?Sized,
{
    let mut found = BTreeSet::new();
    if !path.is_empty() && entries.iter().any(|e| e.is_file() && target.matches(&e.name)) {
        found.insert(path.to_string());
    }

    let child_depth = depth + 1;
    if child_depth >= max_depth {
        return found;
    }

    let children = entries
        .into_iter()
        .filter(|e| e.is_dir() && !target.ignores(&e.name))
        .map(|e| scan_subtree(source, e.path, child_depth, max_depth, target));
    for child in join_all(children).await {
        found.extend(child);
    }
    found
}

// =============================================================================
// Setup defaults
// =============================================================================

/// Ranked candidate post directories for a repository.
///
/// Scans from `posts.root`. When nothing is found but the conventional
/// `posts.fallback` directory exists, that is offered with `is_default` set.
/// A missing scan root counts as "nothing found".
pub async fn suggest_post_directories<S>(
    source: &S,
    config: &DeskConfig,
) -> Result<Suggestions, SourceError>
where
    S: ContentSource + ?Sized,
{
    let target = ScanTarget::posts_from(config);
    let found = scan_or_empty(source, &config.posts.root, config.posts.max_depth, &target).await?;
    if !found.is_empty() {
        return Ok(Suggestions {
            paths: rank_paths(found, &config.posts.preferred, None),
            is_default: false,
        });
    }

    let fallback = config.posts.fallback.trim_matches('/');
    if fallback.is_empty() {
        return Ok(Suggestions::default());
    }
    match source.list_directory(fallback).await {
        Ok(_) => Ok(Suggestions {
            paths: vec![fallback.to_string()],
            is_default: true,
        }),
        Err(e) if e.is_not_found() => Ok(Suggestions::default()),
        Err(e) => Err(e),
    }
}

/// Ranked candidate image directories, with `images.pin` forced first.
///
/// When the scan finds nothing the pin path itself is suggested as a default,
/// whether or not it exists yet (uploads create it).
pub async fn suggest_image_directories<S>(
    source: &S,
    config: &DeskConfig,
) -> Result<Suggestions, SourceError>
where
    S: ContentSource + ?Sized,
{
    let target = ScanTarget::images_from(config);
    let found = scan_or_empty(source, &config.images.root, config.images.max_depth, &target).await?;
    let pin = config.images.pin.trim_matches('/');
    let pin = (!pin.is_empty()).then_some(pin);

    if found.is_empty() {
        return Ok(Suggestions {
            paths: pin.map(str::to_string).into_iter().collect(),
            is_default: pin.is_some(),
        });
    }
    Ok(Suggestions {
        paths: rank_paths(found, &config.images.preferred, pin),
        is_default: false,
    })
}

async fn scan_or_empty<S>(
    source: &S,
    root: &str,
    max_depth: usize,
    target: &ScanTarget,
) -> Result<BTreeSet<String>, SourceError>
where
    S: ContentSource + ?Sized,
{
    match scan_for_matching_directories(source, root, max_depth, target).await {
        Err(e) if e.is_not_found() => {
            debug!(root, "scan root does not exist");
            Ok(BTreeSet::new())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::test_helpers::{astro_blog, set};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Barrier;

    /// Listings of `gated` directories wait until all of them have started.
    struct GatedSource {
        inner: MemorySource,
        gated: Vec<String>,
        barrier: Barrier,
    }

    impl GatedSource {
        fn new(inner: MemorySource, gated: &[&str]) -> Self {
            Self {
                inner,
                gated: gated.iter().map(|g| g.to_string()).collect(),
                barrier: Barrier::new(gated.len()),
            }
        }
    }

    #[async_trait]
    impl ContentSource for GatedSource {
        async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, SourceError> {
            if self.gated.iter().any(|g| g == path) {
                self.barrier.wait().await;
            }
            self.inner.list_directory(path).await
        }

        async fn read_file(&self, path: &str) -> Result<String, SourceError> {
            self.inner.read_file(path).await
        }
    }

    // =========================================================================
    // ScanTarget
    // =========================================================================

    #[test]
    fn post_target_matches_markdown_only() {
        let target = ScanTarget::posts();
        assert!(target.matches("hello.md"));
        assert!(target.matches("hello.mdx"));
        assert!(!target.matches("hello.MD"));
        assert!(!target.matches("readme.txt"));
        assert!(!target.matches("md"));
        assert!(!target.matches("notes.amd"));
    }

    #[test]
    fn image_target_is_case_insensitive() {
        let target = ScanTarget::images();
        assert!(target.matches("logo.svg"));
        assert!(target.matches("PHOTO.JPG"));
        assert!(target.matches("a.b.WebP"));
        assert!(!target.matches("photo.tiff"));
        assert!(!target.matches("png"));
    }

    #[test]
    fn post_target_ignores_pages() {
        let posts = ScanTarget::posts();
        assert!(posts.ignores("pages"));
        assert!(posts.ignores("Node_Modules"));
        assert!(!ScanTarget::images().ignores("pages"));
    }

    #[test]
    fn config_target_uses_config_lists() {
        let mut config = DeskConfig::default();
        config.posts.extensions = vec!["markdown".into()];
        config.posts.extra_ignored = vec!["Drafts".into()];
        let target = ScanTarget::posts_from(&config);
        assert!(target.matches("a.markdown"));
        assert!(!target.matches("a.md"));
        assert!(target.ignores("drafts"));
        assert!(target.ignores(".git"));
    }

    #[test]
    fn custom_predicate() {
        let target = ScanTarget::with_predicate(|name| name.starts_with("index."));
        assert!(target.matches("index.html"));
        assert!(!target.matches("about.html"));
        assert!(target.ignores("dist"));
    }

    // =========================================================================
    // scan_for_matching_directories
    // =========================================================================

    #[tokio::test]
    async fn finds_post_directories() {
        let source = astro_blog();
        let found = scan_for_matching_directories(&source, "src", 3, &ScanTarget::posts())
            .await
            .unwrap();
        assert_eq!(found, set(&["src/content/posts"]));
    }

    #[tokio::test]
    async fn ignored_directories_are_not_entered() {
        let source = MemorySource::new()
            .with_files(&["node_modules/pkg/README.md", "src/pages/index.md", "docs/a.md"]);
        let found = scan_for_matching_directories(&source, "", 4, &ScanTarget::posts())
            .await
            .unwrap();
        assert_eq!(found, set(&["docs"]));
        // Root, docs, src. Neither node_modules nor src/pages is listed.
        assert_eq!(source.list_calls(), 3);
    }

    #[tokio::test]
    async fn root_is_never_reported() {
        let source = MemorySource::new().with_files(&["README.md", "blog/a.md"]);
        let found = scan_for_matching_directories(&source, "", 2, &ScanTarget::posts())
            .await
            .unwrap();
        assert_eq!(found, set(&["blog"]));
    }

    #[tokio::test]
    async fn depth_bound_is_respected() {
        // The matching directory sits at depth 3 below the root.
        let source = MemorySource::new().with_files(&["a/b/c/post.md"]);
        let target = ScanTarget::posts();

        let shallow = scan_for_matching_directories(&source, "", 3, &target)
            .await
            .unwrap();
        assert!(shallow.is_empty());

        let deep = scan_for_matching_directories(&source, "", 4, &target)
            .await
            .unwrap();
        assert_eq!(deep, set(&["a/b/c"]));
    }

    #[tokio::test]
    async fn depth_one_lists_only_the_root() {
        let source = MemorySource::new().with_files(&["posts/a.md"]);
        let found = scan_for_matching_directories(&source, "", 1, &ScanTarget::posts())
            .await
            .unwrap();
        assert!(found.is_empty());
        assert_eq!(source.list_calls(), 1);
    }

    #[tokio::test]
    async fn depth_zero_lists_nothing() {
        let source = MemorySource::new().with_files(&["posts/a.md"]);
        let found = scan_for_matching_directories(&source, "", 0, &ScanTarget::posts())
            .await
            .unwrap();
        assert!(found.is_empty());
        assert_eq!(source.list_calls(), 0);
    }

    #[tokio::test]
    async fn failing_subtree_is_skipped() {
        let source = MemorySource::new()
            .with_files(&["blog/a.md", "broken/deep/b.md", "notes/c.mdx"])
            .with_failure("broken");
        let found = scan_for_matching_directories(&source, "", 3, &ScanTarget::posts())
            .await
            .unwrap();
        assert_eq!(found, set(&["blog", "notes"]));
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let source = MemorySource::new().with_files(&["blog/a.md"]);
        let err = scan_for_matching_directories(&source, "src", 3, &ScanTarget::posts())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let source = MemorySource::new().with_files(&["src/index.ts"]);
        let found = scan_for_matching_directories(&source, "src", 3, &ScanTarget::posts())
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn image_scan_collects_every_level() {
        let source = astro_blog();
        let found = scan_for_matching_directories(&source, "", 4, &ScanTarget::images())
            .await
            .unwrap();
        assert_eq!(found, set(&["public/images", "src/assets/img"]));
    }

    #[tokio::test]
    async fn sibling_directories_are_listed_concurrently() {
        let tree = MemorySource::new().with_files(&[
            "src/blog/a.md",
            "src/notes/b.md",
            "src/wiki/c.md",
        ]);
        let source = GatedSource::new(tree, &["src/blog", "src/notes", "src/wiki"]);

        let target = ScanTarget::posts();
        let scan = scan_for_matching_directories(&source, "src", 3, &target);
        let found = tokio::time::timeout(Duration::from_secs(5), scan)
            .await
            .expect("sibling listings must all be in flight at once")
            .unwrap();
        assert_eq!(found, set(&["src/blog", "src/notes", "src/wiki"]));
    }

    // =========================================================================
    // Suggestions
    // =========================================================================

    #[tokio::test]
    async fn post_suggestions_are_ranked() {
        let source = MemorySource::new().with_files(&[
            "src/content/a.md",
            "src/content/blog/b.md",
            "src/data/post/c.md",
        ]);
        let suggestions = suggest_post_directories(&source, &DeskConfig::default())
            .await
            .unwrap();
        assert_eq!(
            suggestions.paths,
            vec!["src/content", "src/content/blog", "src/data/post"]
        );
        assert!(!suggestions.is_default);
    }

    #[tokio::test]
    async fn post_fallback_when_nothing_found() {
        let source = MemorySource::new()
            .with_file("src/index.ts", "")
            .with_dir("src/data/post");
        let suggestions = suggest_post_directories(&source, &DeskConfig::default())
            .await
            .unwrap();
        assert_eq!(suggestions.paths, vec!["src/data/post"]);
        assert!(suggestions.is_default);
    }

    #[tokio::test]
    async fn no_post_suggestions_for_empty_repo() {
        let source = MemorySource::new().with_file("README.md", "");
        let suggestions = suggest_post_directories(&source, &DeskConfig::default())
            .await
            .unwrap();
        assert!(suggestions.paths.is_empty());
        assert_eq!(suggestions.best(), None);
    }

    #[tokio::test]
    async fn image_suggestions_pin_public_images() {
        let source = MemorySource::new().with_files(&[
            "assets/img/a.png",
            "public/images/b.jpg",
            "static/c.gif",
        ]);
        let suggestions = suggest_image_directories(&source, &DeskConfig::default())
            .await
            .unwrap();
        assert_eq!(
            suggestions.paths,
            vec!["public/images", "static", "assets/img"]
        );
    }

    #[tokio::test]
    async fn image_default_is_pin() {
        let source = MemorySource::new().with_file("README.md", "");
        let suggestions = suggest_image_directories(&source, &DeskConfig::default())
            .await
            .unwrap();
        assert_eq!(suggestions.best(), Some("public/images"));
        assert!(suggestions.is_default);
    }
}
