//! Production URL detection.
//!
//! Pre-fills the "site URL" setting by looking for a `site:` declaration in
//! a short, fixed list of config files. This is a regex heuristic, not a
//! parser for JavaScript, TypeScript or YAML: a URL built from variables or
//! spread over several lines will not be found, and a commented-out
//! declaration will be. A miss just leaves the setting empty for the user
//! to fill in.
//!
//! Candidates are tried in order and the first hit wins:
//!
//! | File | Pattern |
//! |------|---------|
//! | `astro.config.mjs`, `astro.config.ts`, `astro.config.js` | `site: "https://..."` |
//! | `src/config.yaml`, `src/config.yml` | `site: https://...` or `url: https://...` at line start |
//! | `src/config.ts`, `src/config.js` | `site: "https://..."` |
//! | `package.json` | `"homepage"` starting with `http` |

use crate::source::ContentSource;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::debug;

/// Config files checked for a site URL, in priority order.
pub const CANDIDATES: &[&str] = &[
    "astro.config.mjs",
    "astro.config.ts",
    "astro.config.js",
    "src/config.yaml",
    "src/config.yml",
    "src/config.ts",
    "src/config.js",
];

/// Read last, only when no candidate matched.
pub const PACKAGE_MANIFEST: &str = "package.json";

/// `site: 'https://...'` inside a script config object.
static SCRIPT_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"site:\s*['"](https?://[^'"]+)['"]"#).expect("valid site regex"));

/// `site:` or `url:` key at the start of a YAML line, optionally quoted.
static YAML_SITE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*(?:site|url):\s*['"]?(https?://[^\s'"]+)['"]?"#)
        .expect("valid yaml site regex")
});

#[derive(Debug, Deserialize)]
struct PackageManifest {
    homepage: Option<String>,
}

/// Find the URL a site is deployed at, if its config declares one.
///
/// Candidates that don't exist or can't be read are skipped. A URL matched in a
/// candidate has its trailing `/` removed; a `homepage` is returned as written.
pub async fn detect_production_url<S>(source: &S) -> Option<String>
where
    S: ContentSource + ?Sized,
{
    for &candidate in CANDIDATES {
        let text = match source.read_file(candidate).await {
            Ok(text) => text,
            Err(e) => {
                debug!(candidate, error = %e, "site URL candidate unavailable");
                continue;
            }
        };
        if let Some(url) = extract_site_url(candidate, &text) {
            debug!(candidate, url = %url, "site URL found");
            return Some(url);
        }
    }

    match source.read_file(PACKAGE_MANIFEST).await {
        Ok(text) => homepage_url(&text),
        Err(e) => {
            debug!(error = %e, "no package manifest");
            None
        }
    }
}

/// Pull a site URL out of one candidate file's text.
///
/// The pattern is chosen from the file extension: YAML files use the
/// line-anchored `site:`/`url:` form, everything else the script form.
pub fn extract_site_url(file_name: &str, text: &str) -> Option<String> {
    let is_yaml = file_name.ends_with(".yaml") || file_name.ends_with(".yml");
    let pattern = if is_yaml { &*YAML_SITE } else { &*SCRIPT_SITE };
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_trailing_slash(m.as_str()))
}

/// `homepage` from a `package.json` body, when it looks like a URL. Returned
/// verbatim.
pub fn homepage_url(manifest: &str) -> Option<String> {
    let manifest: PackageManifest = match serde_json::from_str(manifest) {
        Ok(m) => m,
        Err(e) => {
            debug!(error = %e, "package manifest is not valid JSON");
            return None;
        }
    };
    manifest.homepage.filter(|h| h.starts_with("http"))
}

fn strip_trailing_slash(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{LocalSource, MemorySource};
    use crate::test_helpers::setup_fixtures;

    #[test]
    fn script_site_double_and_single_quotes() {
        assert_eq!(
            extract_site_url(
                "astro.config.mjs",
                "export default defineConfig({\n  site: \"https://example.com/\",\n});"
            ),
            Some("https://example.com".to_string())
        );
        assert_eq!(
            extract_site_url("astro.config.ts", "site:'http://blog.test'"),
            Some("http://blog.test".to_string())
        );
    }

    #[test]
    fn script_without_site() {
        assert_eq!(
            extract_site_url("astro.config.mjs", "export default defineConfig({});"),
            None
        );
        // Only literal URLs are recognized
        assert_eq!(extract_site_url("astro.config.mjs", "site: SITE_URL,"), None);
    }

    #[test]
    fn yaml_site_or_url_keys() {
        let yaml = "site:\n  name: Blog\n  url: 'https://astrowind.example/'\n";
        assert_eq!(
            extract_site_url("src/config.yaml", yaml),
            Some("https://astrowind.example".to_string())
        );
        assert_eq!(
            extract_site_url("src/config.yml", "site: https://plain.example"),
            Some("https://plain.example".to_string())
        );
    }

    #[test]
    fn yaml_url_must_start_its_line() {
        assert_eq!(
            extract_site_url("src/config.yaml", "base_url: https://nope.example"),
            None
        );
    }

    #[test]
    fn only_one_trailing_slash_removed() {
        assert_eq!(strip_trailing_slash("https://a.example//"), "https://a.example/");
    }

    #[test]
    fn homepage_requires_http() {
        assert_eq!(
            homepage_url(r#"{"name": "site", "homepage": "https://home.example/"}"#),
            Some("https://home.example/".to_string())
        );
        assert_eq!(homepage_url(r#"{"homepage": "./docs"}"#), None);
        assert_eq!(homepage_url(r#"{"name": "site"}"#), None);
        assert_eq!(homepage_url("not json"), None);
    }

    #[tokio::test]
    async fn first_candidate_wins() {
        let source = MemorySource::new()
            .with_file("astro.config.ts", "site: 'https://second.example'")
            .with_file("astro.config.mjs", "site: 'https://first.example'")
            .with_file("package.json", r#"{"homepage": "https://pkg.example"}"#);
        assert_eq!(
            detect_production_url(&source).await.as_deref(),
            Some("https://first.example")
        );
    }

    #[tokio::test]
    async fn candidate_without_match_falls_through() {
        let source = MemorySource::new()
            .with_file("astro.config.mjs", "export default defineConfig({});")
            .with_file("src/config.yaml", "site:\n  site: https://yaml.example\n");
        assert_eq!(
            detect_production_url(&source).await.as_deref(),
            Some("https://yaml.example")
        );
    }

    #[tokio::test]
    async fn package_manifest_fallback() {
        let source = MemorySource::new()
            .with_file("package.json", r#"{"homepage": "https://pkg.example/"}"#);
        assert_eq!(
            detect_production_url(&source).await.as_deref(),
            Some("https://pkg.example/")
        );
    }

    #[tokio::test]
    async fn checkout_falls_back_to_homepage() {
        let tmp = setup_fixtures();
        let source = LocalSource::new(tmp.path());
        assert_eq!(
            detect_production_url(&source).await.as_deref(),
            Some("https://blog.example.com")
        );

        std::fs::remove_file(tmp.path().join("astro.config.mjs")).unwrap();
        assert_eq!(
            detect_production_url(&source).await.as_deref(),
            Some("https://github.com/example/blog")
        );
    }

    #[tokio::test]
    async fn nothing_found() {
        let source = MemorySource::new().with_file("README.md", "# site");
        assert_eq!(detect_production_url(&source).await, None);
    }
}
