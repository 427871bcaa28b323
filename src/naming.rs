//! File naming for posts and uploaded images.
//!
//! Post files are named after a slug of their title: `My First Post!` becomes
//! `my-first-post.md`. Renaming a post keeps its directory and extension and
//! swaps only the stem.
//!
//! ## Slugs
//!
//! - Accented and non-Latin letters are transliterated (`Café` → `cafe`)
//! - Whitespace runs become a single `-`
//! - Anything other than ASCII letters, digits, `_` and `-` is dropped
//! - Repeated dashes collapse to one
//!
//! ## Image URLs
//!
//! Files under `public/` are served from the site root, so an image uploaded to
//! `public/images/cover.png` is referenced as `/images/cover.png`.

use deunicode::deunicode;

/// Convert a title into a filename-safe slug.
///
/// - `"Hello World"` → `"hello-world"`
/// - `"  Crème brûlée  "` → `"creme-brulee"`
/// - `"What's new?"` → `"whats-new"`
/// - `"a - b"` → `"a-b"`
pub fn slugify(text: &str) -> String {
    let ascii = deunicode(text).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut in_space = false;

    for c in ascii.trim().chars() {
        if c.is_whitespace() {
            in_space = true;
            continue;
        }
        if in_space {
            slug.push('-');
            in_space = false;
        }
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            slug.push(c);
        }
    }

    collapse_dashes(&slug)
}

fn collapse_dashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out
}

/// A file name without its last extension. Names without a dot are returned whole.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(pos) => &name[..pos],
    }
}

/// Human-readable title from a file stem: dashes and underscores become spaces.
///
/// Used when a post has no `title` in its frontmatter.
pub fn title_from_stem(stem: &str) -> String {
    stem.replace(['-', '_'], " ").trim().to_string()
}

/// Path of a post after renaming it to `slug`, keeping directory and extension.
///
/// - `("src/content/posts/old.md", "new")` → `"src/content/posts/new.md"`
/// - `("draft", "final")` → `"final"`
pub fn renamed_path(path: &str, slug: &str) -> String {
    let (dir, name) = match path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, path),
    };
    let stem = file_stem(name);
    let ext = &name[stem.len()..];
    match dir {
        Some(dir) => format!("{dir}/{slug}{ext}"),
        None => format!("{slug}{ext}"),
    }
}

/// URL an uploaded image is served from.
///
/// A leading `public/` is dropped since that directory maps to the site root.
pub fn public_image_url(images_dir: &str, file_name: &str) -> String {
    let dir = images_dir.trim_matches('/');
    let dir = dir.strip_prefix("public/").unwrap_or(dir);
    let dir = if dir == "public" { "" } else { dir };
    if dir.is_empty() {
        format!("/{file_name}")
    } else {
        format!("/{dir}/{file_name}")
    }
}

/// Markdown snippet embedding an image, ready to paste into a post.
pub fn markdown_image(url: &str) -> String {
    format!("![alt text]({url})")
}
