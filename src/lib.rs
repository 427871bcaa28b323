//! # Content Desk
//!
//! Post and image management for static sites kept in a GitHub repository.
//! Astro-style layouts are the main target: Markdown/MDX posts with a
//! `---`-fenced frontmatter block, images under `public/`.
//!
//! The repository is the data source. Nothing is stored between runs: each
//! command lists and reads what it needs through a [`source::ContentSource`],
//! either a local checkout or the GitHub Contents API.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`frontmatter`] | Parse, serialize and update the frontmatter block of a post |
//! | [`classify`] | Infer field types (`string`, `date`, `array`, `object`) and build post templates |
//! | [`source`] | `ContentSource` trait with local, in-memory and GitHub backends |
//! | [`scan`] | Bounded, concurrent discovery of post and image directories |
//! | [`rank`] | Order discovered directories by preferred names, depth and path |
//! | [`site_url`] | Find the production URL declared in a site's config files |
//! | [`posts`] | List posts newest first and render Markdown previews |
//! | [`images`] | List the files of an image directory with their public URLs |
//! | [`edit`] | Retitle, rename and delete files in a local checkout |
//! | [`naming`] | Slugs, rename targets and public image URLs |
//! | [`config`] | `content-desk.toml` loading, validation and merging |
//! | [`types`] | Shared types (`Entry`, `Suggestions`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## A Restricted Frontmatter Dialect
//!
//! Frontmatter is read with a small line parser, not a YAML library. It covers
//! what post editors actually write (scalars, inline and block lists, one level
//! of nested keys) and never fails: a line it doesn't understand is skipped.
//! Values are a tagged union ([`frontmatter::FrontmatterValue`]) so callers
//! match on shape instead of probing it.
//!
//! ## Bounded Discovery
//!
//! Directory scans go through the GitHub API one request per directory. Scans
//! are depth-bounded and siblings are listed concurrently, so a setup screen
//! gets its defaults in a handful of round trips. A subtree that fails to list
//! is logged and skipped instead of failing the scan.
//!
//! ## Heuristics Over Parsers
//!
//! The production URL is found with regexes over a fixed list of config files.
//! It is a convenience for pre-filling a setting, so a miss is acceptable and
//! pulling in JavaScript or YAML parsers is not.

pub mod classify;
pub mod config;
pub mod edit;
pub mod frontmatter;
pub mod images;
pub mod naming;
pub mod output;
pub mod posts;
pub mod rank;
pub mod scan;
pub mod site_url;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
