//! Frontmatter parsing and serialization.
//!
//! Posts start with a `---` fenced metadata block written in a small YAML-like
//! dialect. Only the shapes this tool emits are understood:
//!
//! ```text
//! ---
//! title: "Hello"              # scalar (quotes optional)
//! tags: [astro, "rust"]       # inline list
//! categories:                 # block list
//!   - notes
//!   - drafts
//! metadata:                   # one-level object
//!   canonical: "https://example.com/hello"
//! ---
//! Body text
//! ```
//!
//! Everything is a string at the leaves. Nesting deeper than one level, anchors,
//! multi-line scalars and the rest of YAML are out of reach on purpose.
//!
//! ## Lenience
//!
//! Parsing never fails. A top-level line without `:` is skipped, an indented line
//! that doesn't fit the pending key is skipped, and whatever could be read is
//! returned. A user's half-broken post should still open in the editor.
//!
//! ## Block keys: list or object
//!
//! A key with nothing after the colon starts a block. It is recorded as an empty
//! object until the first indented line decides its shape:
//!
//! - `- item` turns a still-empty object into a list and appends to it.
//! - `key: value` adds a field while the value is an object.
//!
//! The first indented line wins. Once a block holds fields, later `- item` lines
//! are dropped, and once it is a list, later `key: value` lines are dropped. A
//! block key with no indented lines stays an empty object.

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A frontmatter value. Lists and objects are one level deep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontmatterValue {
    Scalar(String),
    List(Vec<String>),
    Object(IndexMap<String, String>),
}

impl FrontmatterValue {
    /// The string content of a scalar, `None` for lists and objects.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FrontmatterValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Parse a value as it would appear after `key:` on a single line.
    ///
    /// `[a, b]` becomes a list, anything else a scalar with one layer of quotes
    /// removed. Used both by the line parser and for values typed on the command
    /// line.
    pub fn from_inline(value: &str) -> Self {
        let value = value.trim();
        match value
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Some(inner) if inner.trim().is_empty() => FrontmatterValue::List(Vec::new()),
            Some(inner) => FrontmatterValue::List(
                inner
                    .split(',')
                    .map(|item| strip_quotes(item.trim()).to_string())
                    .collect(),
            ),
            None => FrontmatterValue::Scalar(strip_quotes(value).to_string()),
        }
    }
}

impl From<&str> for FrontmatterValue {
    fn from(value: &str) -> Self {
        FrontmatterValue::Scalar(value.to_string())
    }
}

impl From<String> for FrontmatterValue {
    fn from(value: String) -> Self {
        FrontmatterValue::Scalar(value)
    }
}

impl From<Vec<String>> for FrontmatterValue {
    fn from(value: Vec<String>) -> Self {
        FrontmatterValue::List(value)
    }
}

/// Frontmatter keys in source order.
pub type Frontmatter = IndexMap<String, FrontmatterValue>;

/// Result of [`parse_document`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub frontmatter: Frontmatter,
    /// Derived by [`resolve_thumbnail`]; never written back into the document.
    pub thumbnail_url: Option<String>,
    pub body: String,
}

/// Key updates for [`update_frontmatter`], applied in order.
///
/// `None` removes the key from the output.
pub type FrontmatterUpdates = Vec<(String, Option<FrontmatterValue>)>;

/// Location of the `---` block inside a document.
struct Block<'a> {
    /// Text between the two fence lines.
    inner: &'a str,
    /// Byte offset just past the closing `---`, before its line ending.
    end: usize,
}

/// Find a frontmatter block: the first line must be `---`, the block closes at
/// the next line that is `---`.
fn find_block(raw: &str) -> Option<Block<'_>> {
    let first_break = raw.find('\n')?;
    if raw[..first_break].trim_end() != "---" {
        return None;
    }
    let inner_start = first_break + 1;

    let mut offset = inner_start;
    for line in raw[inner_start..].split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim_end() == "---" {
            return Some(Block {
                inner: &raw[inner_start..offset],
                end: offset + 3,
            });
        }
        offset += line.len();
    }
    None
}

/// Remove one leading and one trailing quote character, independently.
fn strip_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix(['"', '\''])
        .unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}

/// Parse the text between the fences into an ordered mapping.
pub fn parse_frontmatter(text: &str) -> Frontmatter {
    let mut metadata = Frontmatter::new();
    // Key whose value is being filled by indented lines, if any.
    let mut block_key: Option<String> = None;

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let indent = line.len() - line.trim_start().len();

        if indent == 0 {
            block_key = None;
            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim().to_string();
            let value = value.trim();

            if value.is_empty() {
                metadata.insert(key.clone(), FrontmatterValue::Object(IndexMap::new()));
                block_key = Some(key);
            } else {
                metadata.insert(key, FrontmatterValue::from_inline(value));
            }
            continue;
        }

        let Some(current) = block_key.as_ref().and_then(|k| metadata.get_mut(k)) else {
            continue;
        };

        if let Some(item) = trimmed.strip_prefix("- ") {
            if matches!(current, FrontmatterValue::Object(fields) if fields.is_empty()) {
                *current = FrontmatterValue::List(Vec::new());
            }
            if let FrontmatterValue::List(items) = current {
                items.push(strip_quotes(item.trim()).to_string());
            }
        } else if let Some((key, value)) = trimmed.split_once(':')
            && let FrontmatterValue::Object(fields) = current
        {
            fields.insert(
                key.trim().to_string(),
                strip_quotes(value.trim()).to_string(),
            );
        }
    }

    metadata
}

static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").expect("valid image regex"));

/// URL of the first Markdown image (`![alt](url)`) in `body`.
pub fn find_thumbnail(body: &str) -> Option<String> {
    MARKDOWN_IMAGE
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

const THUMBNAIL_KEYS: [&str; 3] = ["image", "thumbnail", "cover"];

/// Pick a post thumbnail: `image`, `thumbnail` or `cover` (any letter case, in
/// that order), falling back to the first image in the body.
///
/// Only non-empty scalars count. When two keys differ only by case, the later
/// one in the block wins.
pub fn resolve_thumbnail(frontmatter: &Frontmatter, body: &str) -> Option<String> {
    THUMBNAIL_KEYS
        .iter()
        .find_map(|wanted| {
            frontmatter
                .iter()
                .filter(|(key, _)| key.eq_ignore_ascii_case(wanted))
                .last()
                .and_then(|(_, value)| value.as_scalar())
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .or_else(|| find_thumbnail(body))
}

/// Split a document into frontmatter and body.
///
/// Without a complete `---` block the whole input is the body, untouched.
/// Otherwise the body is whatever follows the closing fence, trimmed.
pub fn parse_document(raw: &str) -> ParsedDocument {
    let (frontmatter, body) = match find_block(raw) {
        Some(block) => (
            parse_frontmatter(block.inner),
            raw[block.end..].trim().to_string(),
        ),
        None => (Frontmatter::new(), raw.to_string()),
    };
    let thumbnail_url = resolve_thumbnail(&frontmatter, &body);
    ParsedDocument {
        frontmatter,
        thumbnail_url,
        body,
    }
}

/// JSON string quoting for scalar leaves.
fn quote(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Render a mapping as a `---` block, including the trailing newline.
///
/// List items are written bare; scalars and object fields are JSON-quoted so
/// colons, `#` and quotes inside values survive. An empty list is written
/// inline as `[]`, since a bare `key:` line reads back as an empty object.
pub fn serialize_frontmatter(frontmatter: &Frontmatter) -> String {
    let mut out = String::from("---\n");
    for (key, value) in frontmatter {
        match value {
            FrontmatterValue::List(items) if items.is_empty() => {
                out.push_str(&format!("{key}: []\n"));
            }
            FrontmatterValue::List(items) => {
                out.push_str(&format!("{key}:\n"));
                for item in items {
                    out.push_str(&format!("  - {item}\n"));
                }
            }
            FrontmatterValue::Object(fields) => {
                out.push_str(&format!("{key}:\n"));
                for (field, field_value) in fields {
                    out.push_str(&format!("  {field}: {}\n", quote(field_value)));
                }
            }
            FrontmatterValue::Scalar(s) => {
                out.push_str(&format!("{key}: {}\n", quote(s)));
            }
        }
    }
    out.push_str("---\n");
    out
}

/// Shallow-merge `updates` over a document's frontmatter and write it back.
///
/// Existing keys keep their position, new keys are appended, `None` drops a key.
/// An existing block is replaced in place and the rest of the document is kept
/// byte for byte; a document without a block gets one prepended, followed by a
/// blank line.
pub fn update_frontmatter<I, K>(raw: &str, updates: I) -> String
where
    I: IntoIterator<Item = (K, Option<FrontmatterValue>)>,
    K: Into<String>,
{
    let block = find_block(raw);
    let mut frontmatter = block
        .as_ref()
        .map(|b| parse_frontmatter(b.inner))
        .unwrap_or_default();

    for (key, value) in updates {
        let key = key.into();
        match value {
            Some(value) => {
                frontmatter.insert(key, value);
            }
            None => {
                frontmatter.shift_remove(&key);
            }
        }
    }

    let serialized = serialize_frontmatter(&frontmatter);
    match block {
        Some(block) => format!("{}{}", serialized.trim(), &raw[block.end..]),
        None => format!("{serialized}\n{raw}"),
    }
}
