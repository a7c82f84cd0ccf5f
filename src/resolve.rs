use crate::format::{has_extension, is_archived, is_compressed};
use crate::github::{GitHubError, ReleaseApi};
use crate::platform::{find_platform, PlatformError};
use crate::registry::find_registered;
use crate::template::{render, TemplateData, TemplateError};
use crate::types::{Asset, GitHubAsset, GitHubRelease};
use thiserror::Error;

/// Upper bound on asset pages fetched for one release. GitHub allows at most
/// 1000 assets per release, which is 10 pages of 100.
pub const MAX_ASSET_PAGES: u32 = 10;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid repository '{0}', expected 'owner/repo'")]
    InvalidKeyword(String),
    #[error("no repository found for '{0}'")]
    NoSearchResults(String),
    #[error("no asset found for {os}/{arch} in {repo}@{tag}")]
    NoAssetFound {
        repo: String,
        tag: String,
        os: String,
        arch: String,
    },
    #[error("too many assets matched for {os}/{arch}: {}", .names.join(", "))]
    TooManyAssets {
        os: String,
        arch: String,
        names: Vec<String>,
    },
    #[error(transparent)]
    GitHub(#[from] GitHubError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Resolves `keyword` (`owner/repo` or a search term) at `tag` to exactly one
/// downloadable asset for `goos`/`goarch`.
///
/// An empty tag or `latest` selects the latest release. Statically registered
/// download locations take precedence over the release's own assets.
pub async fn find_asset<A: ReleaseApi + ?Sized>(
    api: &A,
    keyword: &str,
    tag: &str,
    goos: &str,
    goarch: &str,
) -> Result<Asset, ResolveError> {
    let (owner, repo) = find_repository(api, keyword).await?;
    tracing::debug!("Resolved '{}' to {}/{}", keyword, owner, repo);

    let release = if tag.is_empty() || tag == "latest" {
        api.get_latest_release(&owner, &repo).await?
    } else {
        api.get_release_by_tag(&owner, &repo, tag).await?
    };
    tracing::debug!("Using release {} (id {})", release.tag_name, release.id);

    if let Some(entry) = find_registered(&owner, &repo, goos, goarch) {
        let download_url = render(entry.url_template, &TemplateData::from_tag(&release.tag_name))?;
        tracing::info!("Using registered download location {}", download_url);
        return Ok(Asset {
            owner,
            repo,
            tag: release.tag_name,
            download_url,
            binary_name: entry.binary_name.to_string(),
            os: goos.to_string(),
            arch: goarch.to_string(),
        });
    }

    let assets = list_all_assets(api, &owner, &repo, &release).await?;
    let mut candidates = Vec::new();
    for asset in assets {
        if is_platform_candidate(&asset.name, goos, goarch)? {
            candidates.push(asset);
        }
    }

    match candidates.len() {
        0 => Err(ResolveError::NoAssetFound {
            repo: format!("{}/{}", owner, repo),
            tag: release.tag_name,
            os: goos.to_string(),
            arch: goarch.to_string(),
        }),
        1 => {
            let picked = candidates.remove(0);
            tracing::info!("Found matching asset '{}'", picked.name);
            let binary_name = if goos == "windows" {
                format!("{}.exe", repo)
            } else {
                repo.clone()
            };
            Ok(Asset {
                owner,
                repo,
                tag: release.tag_name,
                download_url: picked.browser_download_url,
                binary_name,
                os: goos.to_string(),
                arch: goarch.to_string(),
            })
        }
        _ => Err(ResolveError::TooManyAssets {
            os: goos.to_string(),
            arch: goarch.to_string(),
            names: candidates.into_iter().map(|a| a.name).collect(),
        }),
    }
}

async fn find_repository<A: ReleaseApi + ?Sized>(
    api: &A,
    keyword: &str,
) -> Result<(String, String), ResolveError> {
    if let Some((owner, repo)) = keyword.split_once('/') {
        if owner.is_empty() || repo.is_empty() {
            return Err(ResolveError::InvalidKeyword(keyword.to_string()));
        }
        let found = api.get_repository(owner, repo).await?;
        return Ok((found.owner.login, found.name));
    }

    // The first search hit is taken as-is
    let found = api
        .search_repositories(keyword)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ResolveError::NoSearchResults(keyword.to_string()))?;
    Ok((found.owner.login, found.name))
}

async fn list_all_assets<A: ReleaseApi + ?Sized>(
    api: &A,
    owner: &str,
    repo: &str,
    release: &GitHubRelease,
) -> Result<Vec<GitHubAsset>, GitHubError> {
    let per_page = api.page_size();
    let mut all = Vec::new();
    let mut page = 1;
    loop {
        let batch = api
            .list_release_assets(owner, repo, release.id, page, per_page)
            .await?;
        let done = batch.len() < per_page as usize;
        all.extend(batch);
        if done {
            break;
        }
        if page >= MAX_ASSET_PAGES {
            tracing::warn!(
                "Stopped listing assets of {} after {} pages; remaining assets are ignored",
                release.tag_name,
                MAX_ASSET_PAGES
            );
            break;
        }
        page += 1;
    }
    tracing::debug!("Release {} has {} assets", release.tag_name, all.len());
    Ok(all)
}

/// Whether a release asset looks like a binary for the requested platform.
///
/// Names whose OS cannot be inferred are skipped rather than failing the
/// whole resolution.
fn is_platform_candidate(name: &str, goos: &str, goarch: &str) -> Result<bool, PlatformError> {
    let binary_like =
        is_archived(name) || is_compressed(name) || name.ends_with(".exe") || !has_extension(name);
    if !binary_like {
        tracing::trace!("Skipping '{}': not a binary-like file", name);
        return Ok(false);
    }

    match find_platform(name) {
        Ok(platform) => {
            let matched = platform.os == goos && platform.arch == goarch;
            tracing::trace!("Asset '{}' is {} (match: {})", name, platform, matched);
            Ok(matched)
        }
        Err(PlatformError::UnknownOs(_)) => {
            tracing::trace!("Skipping '{}': no OS in name", name);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
