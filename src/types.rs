use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformInfo {
    pub os: String,
    pub arch: String,
}

impl fmt::Display for PlatformInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// A resolved, downloadable release binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Asset {
    pub owner: String,
    pub repo: String,
    pub tag: String,
    pub download_url: String,
    pub binary_name: String,
    pub os: String,
    pub arch: String,
}

impl Asset {
    /// File name of the download, taken from the last URL path segment.
    pub fn file_name(&self) -> &str {
        let path = self
            .download_url
            .split(['?', '#'])
            .next()
            .unwrap_or(&self.download_url);
        path.rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.binary_name)
    }
}

/// Statically known download location for a repository that does not publish
/// usable release assets (or publishes them somewhere else).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisteredAsset {
    pub owner: &'static str,
    pub repo: &'static str,
    pub os: &'static str,
    pub arch: &'static str,
    pub url_template: &'static str,
    pub binary_name: &'static str,
}

impl RegisteredAsset {
    pub fn matches(&self, owner: &str, repo: &str, os: &str, arch: &str) -> bool {
        self.owner == owner && self.repo == repo && self.os == os && self.arch == arch
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryOwner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubRepository {
    pub name: String,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositorySearch {
    #[serde(default)]
    pub total_count: u64,
    pub items: Vec<GitHubRepository>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubRelease {
    pub id: u64,
    pub tag_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}
