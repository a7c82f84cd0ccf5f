use crate::extract::extract;
use crate::format::{is_archived, is_compressed};
use crate::types::Asset;
use anyhow::{anyhow, Context, Result};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use std::fs;
use std::io::Write;
use std::path::Path;

pub async fn download_file(client: &Client, url: &str, local_path: &Path) -> Result<()> {
    let filename = local_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| url.to_string());
    tracing::info!("Downloading {}...", filename);

    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("Download of {} failed: {}", url, response.status()));
    }
    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Downloading {}", filename));

    let mut file = fs::File::create(local_path)
        .with_context(|| format!("Could not create {}", local_path.display()))?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    pb.finish_with_message("Download complete");
    Ok(())
}

/// Turns a downloaded asset into the final binary at `output`.
///
/// Archived or compressed downloads go through the extractor looking for
/// `asset.binary_name`; anything else is taken to be the binary itself. The
/// binary is staged next to `downloaded` and only moved to `output` once it is
/// complete, so a failed install leaves `output` untouched.
pub fn install_binary(asset: &Asset, downloaded: &Path, output: &Path) -> Result<()> {
    let name = asset.file_name();
    let staged = downloaded.with_file_name(format!("{}.staged", asset.binary_name));

    let result = stage_binary(asset, name, downloaded, &staged)
        .and_then(|()| make_executable(&staged, &asset.os))
        .and_then(|()| move_into_place(&staged, output));
    if result.is_err() && staged.exists() {
        let _ = fs::remove_file(&staged);
    }
    result?;

    tracing::info!("Installed {} to {}", asset.binary_name, output.display());
    Ok(())
}

fn stage_binary(asset: &Asset, name: &str, downloaded: &Path, staged: &Path) -> Result<()> {
    if is_archived(name) || is_compressed(name) {
        extract(downloaded, staged, &asset.binary_name).with_context(|| {
            format!(
                "Could not extract {} from {}",
                asset.binary_name,
                downloaded.display()
            )
        })?;
    } else {
        fs::copy(downloaded, staged)
            .with_context(|| format!("Could not copy binary to {}", staged.display()))?;
    }
    Ok(())
}

/// Renames `staged` over `output`, falling back to a copy when they live on
/// different filesystems.
fn move_into_place(staged: &Path, output: &Path) -> Result<()> {
    if fs::rename(staged, output).is_ok() {
        return Ok(());
    }
    tracing::debug!("Rename to {} failed, copying instead", output.display());
    fs::copy(staged, output)
        .with_context(|| format!("Could not write binary to {}", output.display()))?;
    fs::remove_file(staged)?;
    Ok(())
}

fn make_executable(path: &Path, os: &str) -> Result<()> {
    if os == "windows" {
        return Ok(());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
