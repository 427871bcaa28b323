//! Shared test utilities for the content-desk test suite.
//!
//! Provides an on-disk fixture site, an equivalent in-memory tree, and small
//! collection builders for assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = astro_blog();
//! let found = scan_for_matching_directories(&source, "src", 3, &ScanTarget::posts())
//!     .await
//!     .unwrap();
//! assert_eq!(found, set(&["src/content/posts"]));
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;

use crate::source::MemorySource;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/site/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// In-memory trees
// =========================================================================

/// A small Astro blog: posts under `src/content/posts`, images in two places,
/// routing pages and a vendored package that scans must skip.
pub fn astro_blog() -> MemorySource {
    MemorySource::new()
        .with_file(
            "astro.config.mjs",
            "export default defineConfig({\n  site: 'https://blog.example.com/',\n});\n",
        )
        .with_file("package.json", r#"{"name": "blog", "homepage": "https://pkg.example.com"}"#)
        .with_file(
            "src/content/posts/hello-world.md",
            "---\ntitle: Hello World\npublishDate: 2024-03-01\ntags: [astro, rust]\n---\nFirst post.",
        )
        .with_file(
            "src/content/posts/second-post.mdx",
            "---\ntitle: Second Post\npublishDate: 2024-04-12\nimage: /images/cover.png\n---\nSecond.",
        )
        .with_file("src/pages/index.md", "# Home")
        .with_file("src/assets/img/logo.svg", "<svg/>")
        .with_file("public/images/cover.png", "")
        .with_file("node_modules/pkg/readme.md", "# pkg")
}

// =========================================================================
// Collection builders
// =========================================================================

/// Build an owned path set from string literals.
pub fn set(paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| p.to_string()).collect()
}
