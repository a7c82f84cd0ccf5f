//! GitHub API interaction module
//!
//! Provides the [`ReleaseApi`] seam the resolver talks to and a reqwest-backed
//! implementation of it.

use crate::config::Settings;
use crate::types::{GitHubAsset, GitHubRelease, GitHubRepository, RepositorySearch};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// GitHub rejects `per_page` values above 100.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Repository {repo} not found")]
    RepositoryNotFound { repo: String },
    #[error("Release tag '{tag}' not found in {repo}")]
    TagNotFound { repo: String, tag: String },
    #[error("No releases found for {repo}")]
    LatestNotFound { repo: String },
    #[error("GitHub API request to {url} failed ({status}): {message}")]
    RequestFailed {
        url: String,
        status: StatusCode,
        message: String,
    },
    #[error("Invalid GitHub token")]
    InvalidToken,
    #[error("Invalid GitHub API URL '{0}'")]
    InvalidApiUrl(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Read-only view of a repository hosting service.
#[async_trait]
pub trait ReleaseApi: Send + Sync {
    /// Number of assets requested per page by [`ReleaseApi::list_release_assets`] callers.
    fn page_size(&self) -> u32 {
        MAX_PAGE_SIZE
    }

    async fn get_repository(&self, owner: &str, repo: &str)
        -> Result<GitHubRepository, GitHubError>;

    async fn search_repositories(&self, query: &str)
        -> Result<Vec<GitHubRepository>, GitHubError>;

    async fn get_latest_release(&self, owner: &str, repo: &str)
        -> Result<GitHubRelease, GitHubError>;

    async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<GitHubRelease, GitHubError>;

    /// One page (1-based) of a release's assets.
    async fn list_release_assets(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubAsset>, GitHubError>;
}

pub struct GitHubClient {
    client: Client,
    api_url: Url,
    per_page: u32,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHubClient {
    pub fn new(settings: &Settings) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("ghbin/", env!("CARGO_PKG_VERSION"))),
        );

        if let Some(token) = &settings.token {
            tracing::debug!("Using GITHUB_TOKEN");
            let mut auth = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|_| GitHubError::InvalidToken)?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let api_url = Url::parse(&settings.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| GitHubError::InvalidApiUrl(settings.api_url.clone()))?;

        let per_page = settings.per_page.clamp(1, MAX_PAGE_SIZE);
        if per_page != settings.per_page {
            tracing::warn!(
                "per_page {} is out of range, using {}",
                settings.per_page,
                per_page
            );
        }

        Ok(Self {
            client,
            api_url,
            per_page,
        })
    }

    /// API URL for `segments`, each percent-encoded as one path segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, GitHubError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidApiUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// The underlying HTTP client, for downloading resolved assets.
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Sends a GET and returns `Ok(None)` on 404 so callers can map it to a
    /// specific lookup error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<Option<T>, GitHubError> {
        let url = self.endpoint(segments)?;
        tracing::debug!("Fetching {}", url);

        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::RequestFailed {
                url: url.to_string(),
                status,
                message: error_message(&body),
            });
        }

        Ok(Some(response.json().await?))
    }
}

/// GitHub's `message` field from an error body, or the raw body otherwise.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) if body.trim().is_empty() => "no response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Build GitHub API path segments for fetching release information
///
/// # Arguments
/// * `owner`, `repo` - Repository coordinates
/// * `tag` - `None` for the latest release, otherwise an exact tag name. A `/`
///   in the tag stays a path separator.
pub fn build_release_path<'a>(owner: &'a str, repo: &'a str, tag: Option<&'a str>) -> Vec<&'a str> {
    let mut segments = vec!["repos", owner, repo, "releases"];
    match tag {
        Some(tag) => {
            segments.push("tags");
            segments.extend(tag.split('/'));
        }
        None => segments.push("latest"),
    }
    segments
}

#[async_trait]
impl ReleaseApi for GitHubClient {
    fn page_size(&self) -> u32 {
        self.per_page
    }

    async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<GitHubRepository, GitHubError> {
        self.get_json(&["repos", owner, repo], &[])
            .await?
            .ok_or_else(|| GitHubError::RepositoryNotFound {
                repo: format!("{}/{}", owner, repo),
            })
    }

    async fn search_repositories(
        &self,
        query: &str,
    ) -> Result<Vec<GitHubRepository>, GitHubError> {
        let result: Option<RepositorySearch> = self
            .get_json(&["search", "repositories"], &[("q", query.to_string())])
            .await?;
        Ok(result.map(|r| r.items).unwrap_or_default())
    }

    async fn get_latest_release(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<GitHubRelease, GitHubError> {
        self.get_json(&build_release_path(owner, repo, None), &[])
            .await?
            .ok_or_else(|| GitHubError::LatestNotFound {
                repo: format!("{}/{}", owner, repo),
            })
    }

    async fn get_release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<GitHubRelease, GitHubError> {
        self.get_json(&build_release_path(owner, repo, Some(tag)), &[])
            .await?
            .ok_or_else(|| GitHubError::TagNotFound {
                repo: format!("{}/{}", owner, repo),
                tag: tag.to_string(),
            })
    }

    async fn list_release_assets(
        &self,
        owner: &str,
        repo: &str,
        release_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<GitHubAsset>, GitHubError> {
        let release_id = release_id.to_string();
        let assets = self
            .get_json(
                &["repos", owner, repo, "releases", release_id.as_str(), "assets"],
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;
        Ok(assets.unwrap_or_default())
    }
}
