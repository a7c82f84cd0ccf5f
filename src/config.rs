use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "ghbin";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_per_page() -> u32 {
    100
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            per_page: default_per_page(),
            timeout_secs: default_timeout_secs(),
            token: None,
        }
    }
}

pub fn get_config_file_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("GHBIN_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let path = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join(APP_NAME)
        .join(CONFIG_FILE_NAME);
    tracing::debug!("Config file path: {}", path.display());
    Ok(path)
}

/// Loads settings from the config file (defaults when it does not exist) and
/// applies environment overrides.
pub fn load_settings() -> Result<Settings> {
    let path = get_config_file_path()?;
    let mut settings = read_settings_file(&path)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn read_settings_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file at {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Could not parse config file {} as JSON", path.display()))
}

pub fn apply_env_overrides<F>(settings: &mut Settings, var: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var("GHBIN_API_URL") {
        settings.api_url = url;
    }

    if let Some(secs) = var("GHBIN_TIMEOUT_SECS") {
        match secs.parse::<u64>() {
            Ok(secs) => settings.timeout_secs = secs,
            Err(_) => tracing::warn!("Ignoring invalid GHBIN_TIMEOUT_SECS '{}'", secs),
        }
    }

    if let Some(token) = var("GITHUB_TOKEN").filter(|t| !t.is_empty()) {
        settings.token = Some(token);
    }
}
