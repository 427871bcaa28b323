//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! The primary line for every entity is what it *is*: a ranked directory, a
//! post title, a frontmatter key. Repository paths and derived details follow
//! as indented context lines, so the output reads as a content inventory while
//! still pointing back at the files.
//!
//! # Output Format
//!
//! ## Suggest
//!
//! ```text
//! Post directories
//! 001 src/content/posts
//! 002 src/data/post
//!
//! Image directories
//! 001 public/images (default)
//! ```
//!
//! ## Posts
//!
//! ```text
//! Posts in src/content/posts (2)
//! 001 Hello World (2024-03-01)
//!     Source: src/content/posts/hello-world.md
//!     Thumbnail: /images/cover.png
//!     Excerpt: First paragraph of the post...
//! ```
//!
//! ## Images
//!
//! ```text
//! Images in public/images (1)
//! 001 cover.png
//!     URL: /images/cover.png
//!     Markdown: ![alt text](/images/cover.png)
//! ```
//!
//! ## Show
//!
//! ```text
//! src/content/posts/hello-world.md
//!     title: Hello World
//!     tags: [astro, rust]
//!     metadata:
//!         author: Ada
//!     Thumbnail: /images/cover.png
//!     Body: 412 characters
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::classify::TemplateSpec;
use crate::frontmatter::{FrontmatterValue, ParsedDocument};
use crate::images::ImageEntry;
use crate::naming::markdown_image;
use crate::posts::{PostEntry, render_preview};
use crate::types::Suggestions;
use std::collections::BTreeSet;

const EXCERPT_LEN: usize = 60;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte, _)) => format!("{}...", &text[..byte]),
        None => text.to_string(),
    }
}

/// One-line excerpt of a post: the `excerpt` key, or the first rendered paragraph.
fn post_excerpt(post: &PostEntry) -> Option<String> {
    let explicit = post
        .document
        .frontmatter
        .get("excerpt")
        .and_then(FrontmatterValue::as_scalar)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let text = explicit.or_else(|| {
        strip_html_tags(&render_preview(&post.document.body))
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    })?;
    Some(truncate_chars(&text, EXCERPT_LEN))
}

/// Inline rendering of a frontmatter value for single-line display.
fn inline_value(value: &FrontmatterValue) -> String {
    match value {
        FrontmatterValue::Scalar(s) => s.clone(),
        FrontmatterValue::List(items) => format!("[{}]", items.join(", ")),
        FrontmatterValue::Object(map) if map.is_empty() => "{}".to_string(),
        FrontmatterValue::Object(map) => {
            let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            format!("{{{}}}", pairs.join(", "))
        }
    }
}

// ============================================================================
// Suggest / scan
// ============================================================================

/// Ranked setup suggestions under a heading.
pub fn format_suggestions(heading: &str, suggestions: &Suggestions) -> Vec<String> {
    let mut lines = vec![heading.to_string()];
    if suggestions.paths.is_empty() {
        lines.push(format!("{}(none found)", indent(1)));
        return lines;
    }
    for (i, path) in suggestions.paths.iter().enumerate() {
        let marker = if suggestions.is_default { " (default)" } else { "" };
        lines.push(format!("{} {path}{marker}", format_index(i + 1)));
    }
    lines
}

pub fn print_suggestions(heading: &str, suggestions: &Suggestions) {
    for line in format_suggestions(heading, suggestions) {
        println!("{}", line);
    }
}

/// Raw scan result, unranked, in path order.
pub fn format_scan(root: &str, max_depth: usize, found: &BTreeSet<String>) -> Vec<String> {
    let root = if root.is_empty() { "(repository root)" } else { root };
    let noun = if found.len() == 1 { "directory" } else { "directories" };
    let mut lines = vec![format!(
        "Scanned {root} (depth {max_depth}): {} {noun}",
        found.len()
    )];
    lines.extend(found.iter().map(|p| format!("{}{p}", indent(1))));
    lines
}

pub fn print_scan(root: &str, max_depth: usize, found: &BTreeSet<String>) {
    for line in format_scan(root, max_depth, found) {
        println!("{}", line);
    }
}

// ============================================================================
// Documents and templates
// ============================================================================

/// Frontmatter, thumbnail and body size of one document.
pub fn format_document(path: &str, doc: &ParsedDocument) -> Vec<String> {
    let mut lines = vec![path.to_string()];
    if doc.frontmatter.is_empty() {
        lines.push(format!("{}(no frontmatter)", indent(1)));
    }
    for (key, value) in &doc.frontmatter {
        match value {
            FrontmatterValue::Object(map) if !map.is_empty() => {
                lines.push(format!("{}{key}:", indent(1)));
                for (sub, v) in map {
                    lines.push(format!("{}{sub}: {v}", indent(2)));
                }
            }
            other => lines.push(format!("{}{key}: {}", indent(1), inline_value(other))),
        }
    }
    if let Some(url) = &doc.thumbnail_url {
        lines.push(format!("{}Thumbnail: {url}", indent(1)));
    }
    lines.push(format!(
        "{}Body: {} characters",
        indent(1),
        doc.body.chars().count()
    ));
    lines
}

pub fn print_document(path: &str, doc: &ParsedDocument) {
    for line in format_document(path, doc) {
        println!("{}", line);
    }
}

/// Field name and inferred type, one per line.
pub fn format_template(spec: &TemplateSpec) -> Vec<String> {
    spec.iter()
        .map(|(key, tag)| format!("{key}: {tag}"))
        .collect()
}

pub fn print_template(spec: &TemplateSpec) {
    for line in format_template(spec) {
        println!("{}", line);
    }
}

// ============================================================================
// Posts
// ============================================================================

/// Post listing in the order given (newest first from `list_posts`).
pub fn format_posts(dir: &str, posts: &[PostEntry]) -> Vec<String> {
    let mut lines = vec![format!("Posts in {dir} ({})", posts.len())];
    for (i, post) in posts.iter().enumerate() {
        let header = match post.published() {
            Some(date) => format!("{} {} ({date})", format_index(i + 1), post.title()),
            None => format!("{} {}", format_index(i + 1), post.title()),
        };
        lines.push(header);
        lines.push(format!("{}Source: {}", indent(1), post.path));
        if let Some(url) = &post.document.thumbnail_url {
            lines.push(format!("{}Thumbnail: {url}", indent(1)));
        }
        if let Some(excerpt) = post_excerpt(post) {
            lines.push(format!("{}Excerpt: {excerpt}", indent(1)));
        }
    }
    lines
}

pub fn print_posts(dir: &str, posts: &[PostEntry]) {
    for line in format_posts(dir, posts) {
        println!("{}", line);
    }
}

// ============================================================================
// Images
// ============================================================================

/// Image listing with the URL and Markdown snippet for each file.
pub fn format_images(dir: &str, images: &[ImageEntry]) -> Vec<String> {
    let mut lines = vec![format!("Images in {dir} ({})", images.len())];
    for (i, image) in images.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), image.name));
        lines.push(format!("{}URL: {}", indent(1), image.url));
        lines.push(format!("{}Markdown: {}", indent(1), markdown_image(&image.url)));
    }
    lines
}

pub fn print_images(dir: &str, images: &[ImageEntry]) {
    for line in format_images(dir, images) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
