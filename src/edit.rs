//! Changes to content in a local checkout.
//!
//! Renaming retitles a post and moves it to a file named after the new slug.
//! A rename never lands on an existing file: the target is checked when the
//! rename is planned and created exclusively when it is applied. Deleting is
//! limited to files a post or image scan would pick up.

use crate::config::DeskConfig;
use crate::frontmatter::{FrontmatterValue, update_frontmatter};
use crate::naming::{renamed_path, slugify};
use crate::scan::ScanTarget;
use crate::source::{ContentSource, LocalSource, SourceError, normalize_path};
use crate::types::base_name;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Title '{0}' has no usable characters for a file name")]
    EmptySlug(String),
    #[error("Rename target already exists: {0}")]
    TargetExists(String),
    #[error("Not a post or image file: {0}")]
    NotContent(String),
}

/// A rename worked out against the current tree, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePlan {
    pub from: String,
    pub to: String,
    /// The post with its `title` replaced.
    pub contents: String,
}

impl RenamePlan {
    /// False when the new slug matches the current file name.
    pub fn moves_file(&self) -> bool {
        self.from != self.to
    }
}

/// Work out the new file name and contents for retitling `file`.
///
/// The slug comes from `slug` when given, else from `title`. Fails when the
/// slug is empty or another file already sits at the new path.
pub async fn plan_rename<S>(
    source: &S,
    file: &str,
    title: &str,
    slug: Option<&str>,
) -> Result<RenamePlan, EditError>
where
    S: ContentSource + ?Sized,
{
    let slug = slugify(slug.unwrap_or(title));
    if slug.is_empty() {
        return Err(EditError::EmptySlug(title.to_string()));
    }
    let from = normalize_path(file)?;
    let raw = source.read_file(&from).await?;
    let to = renamed_path(&from, &slug);

    if to != from {
        match source.read_file(&to).await {
            Ok(_) => return Err(EditError::TargetExists(to)),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }
    }

    let contents = update_frontmatter(&raw, [("title", Some(FrontmatterValue::from(title)))]);
    Ok(RenamePlan { from, to, contents })
}

/// Retitle `file` and move it to its new slug. The old file is removed only
/// after the new one is written.
pub async fn rename_post(
    local: &LocalSource,
    file: &str,
    title: &str,
    slug: Option<&str>,
) -> Result<RenamePlan, EditError> {
    let plan = plan_rename(local, file, title, slug).await?;
    if plan.moves_file() {
        local
            .create_file(&plan.to, &plan.contents)
            .await
            .map_err(|e| match e {
                SourceError::AlreadyExists(path) => EditError::TargetExists(path),
                e => e.into(),
            })?;
        local.remove_file(&plan.from).await?;
    } else {
        local.write_file(&plan.to, &plan.contents).await?;
    }
    info!(from = %plan.from, to = %plan.to, "post renamed");
    Ok(plan)
}

/// Delete a post or image file.
///
/// Files neither the post nor the image target accepts are refused, so a
/// mistyped path can't remove a config file or a page.
pub async fn delete_content(
    local: &LocalSource,
    path: &str,
    config: &DeskConfig,
) -> Result<String, EditError> {
    let path = normalize_path(path)?;
    let name = base_name(&path);
    let is_content = ScanTarget::posts_from(config).matches(name)
        || ScanTarget::images_from(config).matches(name);
    if !is_content {
        return Err(EditError::NotContent(path));
    }
    local.remove_file(&path).await?;
    info!(path = %path, "deleted");
    Ok(path)
}
