//! Image directory listing.
//!
//! Lists the image files directly inside one directory, each with the URL it
//! is served from, so a post can link to an image that is already uploaded.

use crate::naming::public_image_url;
use crate::scan::ScanTarget;
use crate::source::{ContentSource, SourceError};
use serde::Serialize;

/// One image file and where the site serves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageEntry {
    pub name: String,
    pub path: String,
    /// Site-relative URL, `public/` mapped to the root.
    pub url: String,
}

impl ImageEntry {
    /// Case-insensitive substring match on the file name. An empty query matches.
    pub fn matches_search(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Image files directly inside `dir`, ordered by name ignoring case.
///
/// Subdirectories and files `target` doesn't accept are left out. A missing
/// `dir` is reported as [`SourceError::NotFound`].
pub async fn list_images<S>(
    source: &S,
    dir: &str,
    target: &ScanTarget,
) -> Result<Vec<ImageEntry>, SourceError>
where
    S: ContentSource + ?Sized,
{
    let mut images: Vec<ImageEntry> = source
        .list_directory(dir)
        .await?
        .into_iter()
        .filter(|e| e.is_file() && target.matches(&e.name))
        .map(|e| ImageEntry {
            url: public_image_url(dir, &e.name),
            name: e.name,
            path: e.path,
        })
        .collect();
    images.sort_by_cached_key(|image| (image.name.to_lowercase(), image.name.clone()));
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn gallery() -> MemorySource {
        MemorySource::new()
            .with_files(&[
                "public/images/b.PNG",
                "public/images/Avatar.jpg",
                "public/images/notes.txt",
                "public/images/c.webp",
                "public/images/thumbs/c-small.webp",
            ])
            .with_file("static/logo.svg", "<svg/>")
    }

    #[tokio::test]
    async fn lists_images_by_name_with_urls() {
        let images = list_images(&gallery(), "public/images", &ScanTarget::images())
            .await
            .unwrap();
        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Avatar.jpg", "b.PNG", "c.webp"]);
        assert_eq!(images[0].path, "public/images/Avatar.jpg");
        assert_eq!(images[0].url, "/images/Avatar.jpg");
    }

    #[tokio::test]
    async fn directory_outside_public_keeps_its_path() {
        let images = list_images(&gallery(), "static", &ScanTarget::images())
            .await
            .unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].url, "/static/logo.svg");
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let err = list_images(&gallery(), "public/media", &ScanTarget::images())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let images = list_images(&gallery(), "public/images", &ScanTarget::images())
            .await
            .unwrap();
        let hits: Vec<&str> = images
            .iter()
            .filter(|i| i.matches_search("AVA"))
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(hits, vec!["Avatar.jpg"]);
        assert!(images.iter().all(|i| i.matches_search("")));
    }
}
