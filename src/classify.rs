//! Coarse type inference for frontmatter values, and post templates built on it.
//!
//! A template records which fields a post is expected to carry and the rough
//! shape of each: `string`, `date`, `array` or `object`. Templates are inferred
//! from an example post and used to produce a sample document for authors.

use crate::frontmatter::{Frontmatter, FrontmatterValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inferred shape of a frontmatter field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Date,
    Array,
    Object,
}

impl TypeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Date => "date",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to inferred type, in frontmatter order.
pub type TemplateSpec = IndexMap<String, TypeTag>;

pub fn infer_type(value: &FrontmatterValue) -> TypeTag {
    match value {
        FrontmatterValue::List(_) => TypeTag::Array,
        FrontmatterValue::Object(_) => TypeTag::Object,
        FrontmatterValue::Scalar(s) => infer_scalar_type(s),
    }
}

pub fn infer_scalar_type(value: &str) -> TypeTag {
    if looks_like_date(value) {
        TypeTag::Date
    } else {
        TypeTag::String
    }
}

/// Same inference for arbitrary JSON values, e.g. a template read back from disk.
///
/// Numbers, booleans and null are not strings, so they can't be dates and fall
/// through to `string`.
pub fn infer_json_type(value: &serde_json::Value) -> TypeTag {
    match value {
        serde_json::Value::Array(_) => TypeTag::Array,
        serde_json::Value::Object(_) => TypeTag::Object,
        serde_json::Value::String(s) => infer_scalar_type(s),
        _ => TypeTag::String,
    }
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Best-effort calendar date recognition.
///
/// Covers the forms that show up in blog frontmatter: RFC 3339 / ISO 8601,
/// RFC 2822, slash dates, written month names and bare four-digit years.
fn looks_like_date(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
}

/// Infer a template from an example post's frontmatter.
pub fn build_template(frontmatter: &Frontmatter) -> TemplateSpec {
    frontmatter
        .iter()
        .map(|(key, value)| (key.clone(), infer_type(value)))
        .collect()
}

/// Template used until a repository provides its own example post.
pub fn default_template() -> TemplateSpec {
    [
        ("publishDate", TypeTag::Date),
        ("title", TypeTag::String),
        ("author", TypeTag::String),
        ("excerpt", TypeTag::String),
        ("image", TypeTag::String),
        ("category", TypeTag::String),
        ("tags", TypeTag::Array),
        ("metadata", TypeTag::Object),
    ]
    .into_iter()
    .map(|(k, t)| (k.to_string(), t))
    .collect()
}

/// A ready-to-edit post skeleton with placeholder values for every field.
pub fn sample_document(template: &TemplateSpec, today: NaiveDate) -> String {
    let mut out = String::from("---\n");
    for (key, tag) in template {
        match tag {
            TypeTag::Date => out.push_str(&format!("{key}: {}\n", today.format("%Y-%m-%d"))),
            TypeTag::Array => out.push_str(&format!("{key}:\n  - item1\n  - item2\n")),
            TypeTag::Object => out.push_str(&format!("{key}:\n  subKey: \"sub value\"\n")),
            TypeTag::String => out.push_str(&format!("{key}: \"Your {key} here\"\n")),
        }
    }
    out.push_str("---\n\nYour content here...");
    out
}
