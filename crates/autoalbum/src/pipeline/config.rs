use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::config::{Config, DiscoveryConfig};
use crate::error::ConfigError;
use crate::secrets::{expand_home, resolve_secret};

/// Environment variable Tesseract itself uses for its data directory.
pub const TESSDATA_ENV_VAR: &str = "TESSDATA_PREFIX";

/// Fully resolved settings: every path and credential is known.
pub struct PipelineConfig {
    pub pictures_directory: PathBuf,
    pub archive_directory: PathBuf,
    pub tessdata_path: PathBuf,
    pub ocr_language: String,
    pub discovery: DiscoveryConfig,
    pub openai_api_key: SecretString,
    pub openai_model: String,
    pub openai_base_url: String,
    pub openai_timeout: Duration,
    pub vision_api_key: SecretString,
    pub vision_endpoint: String,
    pub vision_max_results: u32,
    pub vision_timeout: Duration,
}

impl PipelineConfig {
    /// Resolves defaults, environment fallbacks and credentials.
    ///
    /// Fails on the first missing required value so nothing is scanned with
    /// a half-usable configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let pictures_directory = resolve_pictures_directory(config)?;
        let archive_directory = resolve_archive_directory(config, &pictures_directory);
        let tessdata_path = resolve_tessdata(config)?;

        let openai_api_key = resolve_secret(
            config.openai.api_key.as_deref(),
            config.openai.api_key_file.as_deref(),
            config.openai.api_key_env_var.as_deref(),
        )
        .map_err(|source| ConfigError::Credential {
            field: "openai.api_key",
            source,
        })?;

        let vision_api_key = resolve_secret(
            config.vision.api_key.as_deref(),
            config.vision.api_key_file.as_deref(),
            config.vision.api_key_env_var.as_deref(),
        )
        .map_err(|source| ConfigError::Credential {
            field: "vision.api_key",
            source,
        })?;

        Ok(Self {
            pictures_directory,
            archive_directory,
            tessdata_path,
            ocr_language: config.tesseract.language.clone(),
            discovery: config.discovery.clone(),
            openai_api_key,
            openai_model: config.openai.model.clone(),
            openai_base_url: config.openai.base_url.clone(),
            openai_timeout: Duration::from_secs(config.openai.timeout_secs),
            vision_api_key,
            vision_endpoint: config.vision.endpoint.clone(),
            vision_max_results: config.vision.max_results,
            vision_timeout: Duration::from_secs(config.vision.timeout_secs),
        })
    }
}

fn configured_path(value: Option<&str>) -> Option<PathBuf> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| PathBuf::from(expand_home(v)))
}

fn resolve_pictures_directory(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = configured_path(config.pictures_directory.as_deref()).ok_or(ConfigError::MissingValue {
            field: "pictures_directory",
        })?;

    if !path.is_dir() {
        return Err(ConfigError::Validation {
            message: format!("Pictures directory '{}' does not exist", path.display()),
        });
    }
    Ok(path)
}

fn resolve_archive_directory(config: &Config, pictures_directory: &std::path::Path) -> PathBuf {
    configured_path(config.archive_directory.as_deref())
        .or_else(|| dirs::document_dir().map(|d| d.join("by-year")))
        .unwrap_or_else(|| pictures_directory.join("by-year"))
}

fn resolve_tessdata(config: &Config) -> Result<PathBuf, ConfigError> {
    configured_path(config.tesseract.data_path.as_deref())
        .or_else(|| {
            std::env::var(TESSDATA_ENV_VAR)
                .ok()
                .and_then(|v| configured_path(Some(&v)))
        })
        .ok_or(ConfigError::MissingValue {
            field: "tesseract.data_path",
        })
}
