use super::{ContentSource, SourceError, normalize_path};
use crate::types::Entry;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

const LISTING_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Extract owner and repository from a `https://github.com/owner/repo` URL.
///
/// Other hosts and URLs without both segments yield `None`. A `.git` suffix on
/// the repository name is dropped.
pub fn parse_repo_url(url: &str) -> Option<RepoRef> {
    let url = Url::parse(url).ok()?;
    if url.host_str() != Some("github.com") {
        return None;
    }
    let mut parts = url.path_segments()?.filter(|p| !p.is_empty());
    let owner = parts.next()?;
    let repo = parts.next()?;
    Some(RepoRef {
        owner: owner.to_string(),
        repo: repo.replace(".git", ""),
    })
}

impl FromStr for RepoRef {
    type Err = String;

    /// Accepts either a GitHub URL or the `owner/repo` shorthand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(repo) = parse_repo_url(s) {
            return Ok(repo);
        }
        match s.trim().split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(RepoRef {
                    owner: owner.to_string(),
                    repo: repo.trim_end_matches(".git").to_string(),
                })
            }
            _ => Err(format!("expected owner/repo or a github.com URL, got '{s}'")),
        }
    }
}

/// One element of a Contents API directory listing. Unused fields are ignored.
#[derive(Debug, Deserialize)]
struct ListingItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

/// Convert a Contents API response into entries.
///
/// The API answers a directory with an array and a file with an object.
/// Symlinks and submodules are reported as files since they can't be walked.
fn entries_from_listing(body: serde_json::Value, path: &str) -> Result<Vec<Entry>, SourceError> {
    if !body.is_array() {
        return Err(SourceError::NotADirectory(path.to_string()));
    }
    let items: Vec<ListingItem> = serde_json::from_value(body)
        .map_err(|e| SourceError::Decode(format!("{path}: {e}")))?;
    Ok(items
        .into_iter()
        .map(|item| {
            if item.kind == "dir" {
                Entry::dir(item.name, item.path)
            } else {
                Entry::file(item.name, item.path)
            }
        })
        .collect())
}

/// Repository contents read through the GitHub REST Contents API.
#[derive(Debug, Clone)]
pub struct GithubSource {
    client: Client,
    api_base: Url,
    repo: RepoRef,
    token: Option<String>,
    branch: Option<String>,
}

impl GithubSource {
    pub fn new(api_base: &str, repo: RepoRef, token: Option<String>) -> Result<Self, SourceError> {
        let api_base = Url::parse(api_base)
            .map_err(|e| SourceError::Unavailable(format!("invalid API base '{api_base}': {e}")))?;
        let client = Client::builder()
            .user_agent(concat!("content-desk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base,
            repo,
            token,
            branch: None,
        })
    }

    /// Read from a branch other than the repository default.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    fn contents_url(&self, path: &str) -> Result<Url, SourceError> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SourceError::Unavailable(format!("invalid API base '{}'", self.api_base)))?;
            segments
                .pop_if_empty()
                .extend(["repos", self.repo.owner.as_str(), self.repo.repo.as_str(), "contents"]);
            if !path.is_empty() {
                segments.extend(path.split('/'));
            }
        }
        if let Some(branch) = &self.branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }
        Ok(url)
    }

    fn headers(&self, accept: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        if let Some(token) = &self.token
            && let Ok(value) = HeaderValue::from_str(&format!("token {token}"))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    async fn get(&self, path: &str, accept: &'static str) -> Result<reqwest::Response, SourceError> {
        let url = self.contents_url(path)?;
        let response = self.client.get(url).headers(self.headers(accept)).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let message = response
                .json::<ApiMessage>()
                .await
                .map(|m| m.message)
                .unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: if message.is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    message
                },
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentSource for GithubSource {
    async fn list_directory(&self, path: &str) -> Result<Vec<Entry>, SourceError> {
        let path = normalize_path(path)?;
        let body: serde_json::Value = self.get(&path, LISTING_MEDIA_TYPE).await?.json().await?;
        entries_from_listing(body, &path)
    }

    async fn read_file(&self, path: &str) -> Result<String, SourceError> {
        let path = normalize_path(path)?;
        let bytes = self.get(&path, RAW_MEDIA_TYPE).await?.bytes().await?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SourceError::Decode(path))
    }
}
