use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::error::TokenError;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    pub url: Option<String>,
    pub token: Option<String>,
    pub format: Option<String>,
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

/// Connection and presentation settings for one run.
pub struct Settings {
    pub url: String,
    pub private_token: String,
    pub format: OutputFormat,
}

fn default_config_path() -> Result<PathBuf, TokenError> {
    let home = dirs::home_dir()
        .ok_or_else(|| TokenError::configuration("Cannot determine home directory"))?;
    Ok(home.join(".gltm").join("config.toml"))
}

pub fn load_all(path: &Path) -> Result<ConfigFile, TokenError> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path).map_err(|e| {
        TokenError::configuration(format!("Failed to read {}: {e}", path.display()))
    })?;
    toml::from_str(&content).map_err(|e| {
        TokenError::configuration(format!("Failed to parse {}: {e}", path.display()))
    })
}

pub fn load_profile(path: &Path, profile: &str) -> Result<ProfileConfig, TokenError> {
    let mut all = load_all(path)?;
    Ok(all.remove(profile).unwrap_or_default())
}

/// Resolve settings: flags and env vars first, then the config profile.
pub fn resolve_settings(cli: &Cli) -> Result<Settings, TokenError> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let profile = load_profile(&path, &cli.profile)?;
    merge(cli, profile)
}

fn merge(cli: &Cli, profile: ProfileConfig) -> Result<Settings, TokenError> {
    let url = cli
        .url
        .clone()
        .or(profile.url)
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| {
            TokenError::configuration(
                "No GitLab URL configured. Use --url, set GITLAB_URL, or add `url` to the config profile",
            )
        })?;
    url::Url::parse(&url)
        .map_err(|e| TokenError::configuration(format!("Invalid GitLab URL \"{url}\": {e}")))?;

    let private_token = cli
        .private_token
        .clone()
        .or(profile.token)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            TokenError::configuration(
                "No private token configured. Use --private-token, set GITLAB_TOKEN, or add `token` to the config profile",
            )
        })?;

    let format = match (cli.format, profile.format) {
        (Some(format), _) => format,
        (None, Some(name)) => OutputFormat::from_str(&name, true).map_err(|_| {
            TokenError::configuration(format!(
                "Unknown format \"{name}\" in config. Valid formats: plain, json, table"
            ))
        })?,
        (None, None) => OutputFormat::default(),
    };

    Ok(Settings {
        url,
        private_token,
        format,
    })
}
