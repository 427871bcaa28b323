//! End-to-end discovery against the checkout in `fixtures/site`.
//!
//! Exercises the same path the CLI takes for a local repository: config
//! defaults, a `LocalSource`, then suggestions, post listing and URL detection.

use content_desk::config::DeskConfig;
use content_desk::images::list_images;
use content_desk::posts::list_posts;
use content_desk::scan::{
    ScanTarget, scan_for_matching_directories, suggest_image_directories,
    suggest_post_directories,
};
use content_desk::site_url::detect_production_url;
use content_desk::source::{ContentSource, LocalSource};
use std::collections::BTreeSet;
use std::path::Path;

fn fixture_site() -> LocalSource {
    LocalSource::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site"))
}

#[tokio::test]
async fn post_directories_ranked_by_preference() {
    let suggestions = suggest_post_directories(&fixture_site(), &DeskConfig::default())
        .await
        .unwrap();
    assert_eq!(suggestions.paths, vec!["src/content/posts", "src/data/post"]);
    assert!(!suggestions.is_default);
}

#[tokio::test]
async fn pages_and_node_modules_are_skipped() {
    let found = scan_for_matching_directories(&fixture_site(), "", 4, &ScanTarget::posts())
        .await
        .unwrap();
    let expected: BTreeSet<String> = ["src/content/posts", "src/data/post"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn image_directories_pin_public_images() {
    let suggestions = suggest_image_directories(&fixture_site(), &DeskConfig::default())
        .await
        .unwrap();
    assert_eq!(suggestions.paths, vec!["public/images", "src/assets/img"]);
}

#[tokio::test]
async fn shallow_image_scan_misses_nested_assets() {
    let found = scan_for_matching_directories(&fixture_site(), "", 3, &ScanTarget::images())
        .await
        .unwrap();
    assert!(found.contains("public/images"));
    assert!(!found.contains("src/assets/img"));
}

#[tokio::test]
async fn missing_scan_root_is_not_found() {
    let err = scan_for_matching_directories(&fixture_site(), "content", 3, &ScanTarget::posts())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn production_url_from_astro_config() {
    assert_eq!(
        detect_production_url(&fixture_site()).await.as_deref(),
        Some("https://blog.example.com")
    );
}

#[tokio::test]
async fn posts_listed_newest_first_with_thumbnails() {
    let posts = list_posts(&fixture_site(), "src/content/posts", &ScanTarget::posts())
        .await
        .unwrap();
    let titles: Vec<String> = posts.iter().map(|p| p.title()).collect();
    assert_eq!(titles, vec!["Second Post", "Hello World"]);
    assert_eq!(posts[0].document.thumbnail_url, None);
    assert_eq!(
        posts[1].document.thumbnail_url.as_deref(),
        Some("/images/cover.png")
    );
}

#[tokio::test]
async fn pinned_image_directory_lists_cover() {
    let config = DeskConfig::default();
    let images = list_images(
        &fixture_site(),
        &config.images.pin,
        &ScanTarget::images_from(&config),
    )
    .await
    .unwrap();
    let urls: Vec<&str> = images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, vec!["/images/cover.png"]);
}

#[tokio::test]
async fn works_through_a_trait_object() {
    let site = fixture_site();
    let source: &dyn ContentSource = &site;
    let suggestions = suggest_post_directories(source, &DeskConfig::default())
        .await
        .unwrap();
    assert_eq!(suggestions.best(), Some("src/content/posts"));
}
