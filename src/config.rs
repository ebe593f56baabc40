/// Configuration system for git-revisions
///
/// Supports loading from multiple sources with priority:
/// Environment variables > Config file > Defaults
use crate::document::format_date;
use crate::error::{ConfigError, RevisionError};
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GIT_REVISIONS_CONFIG";

/// Config file looked up in the working directory when no override is set
pub const DEFAULT_CONFIG_FILE: &str = "revisions.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Revision discovery behaviour
    #[serde(default)]
    pub revisions: RevisionsConfig,

    /// Site settings shared with the host reader and writer
    #[serde(default)]
    pub site: SiteConfig,
}

/// Revision discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionsConfig {
    /// Attach revision chains at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Fill a missing live `date` from the first commit
    #[serde(default = "default_true")]
    pub infer_date: bool,

    /// Fill a missing live `modified` from the latest commit
    #[serde(default = "default_true")]
    pub infer_modified: bool,

    /// Interpret commit timestamps as UTC instead of local time
    #[serde(default)]
    pub use_utc: bool,

    /// Publish revisions of articles
    #[serde(default = "default_true")]
    pub publish_articles: bool,

    /// Publish revisions of pages
    #[serde(default = "default_true")]
    pub publish_pages: bool,
}

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Root of the site sources
    #[serde(default = "default_content_path")]
    pub content_path: PathBuf,

    /// Root the writer emits files under
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Whether the writer should emit relative URLs
    #[serde(default)]
    pub relative_urls: bool,

    /// strftime pattern for `locale_date` / `locale_modified`
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_true() -> bool {
    true
}

fn default_content_path() -> PathBuf {
    PathBuf::from("content")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output")
}

fn default_date_format() -> String {
    "%a %d %B %Y".to_string()
}

impl Default for RevisionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            infer_date: true,
            infer_modified: true,
            use_utc: false,
            publish_articles: true,
            publish_pages: true,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_path: default_content_path(),
            output_path: default_output_path(),
            relative_urls: false,
            date_format: default_date_format(),
        }
    }
}

/// Check that a strftime pattern parses and can render a commit date
///
/// Commit dates carry no offset, so `%z`, `%:z` and `%Z` parse but fail to
/// render.
pub fn is_valid_date_format(format: &str) -> bool {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return false;
    }
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .is_some_and(|sample| format_date(&sample, format).is_ok())
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, RevisionError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Path of the config file used by [`Config::load_or_default`]
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from the default location or fall back to defaults
    pub fn load_or_default() -> Result<Self, RevisionError> {
        let config_path = Self::default_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::info!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), RevisionError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::SaveFailed(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::SaveFailed(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), RevisionError> {
        if !is_valid_date_format(&self.site.date_format) {
            return Err(ConfigError::InvalidValue {
                key: "site.date_format".to_string(),
                reason: format!(
                    "'{}' is not a strftime pattern that can render commit dates",
                    self.site.date_format
                ),
            }
            .into());
        }

        if self.site.content_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "site.content_path".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        if self.site.output_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "site.output_path".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(enabled) = std::env::var("GIT_REVISIONS_ENABLED")
            && let Ok(enabled) = enabled.parse()
        {
            self.revisions.enabled = enabled;
        }

        if let Ok(use_utc) = std::env::var("GIT_REVISIONS_USE_UTC")
            && let Ok(use_utc) = use_utc.parse()
        {
            self.revisions.use_utc = use_utc;
        }

        if let Ok(format) = std::env::var("GIT_REVISIONS_DATE_FORMAT") {
            self.site.date_format = format;
        }

        if let Ok(path) = std::env::var("GIT_REVISIONS_OUTPUT_PATH") {
            self.site.output_path = PathBuf::from(path);
        }
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, RevisionError> {
        let mut config = Self::load_or_default()?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
