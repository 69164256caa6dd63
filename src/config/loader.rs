//! Configuration structures and loading logic.

use std::fmt;
use std::path::PathBuf;

use crate::config::modes::ApiVersion;
use crate::error::{Error, Result};

/// Environment key for the consumer (app) key.
pub const APP_KEY: &str = "APP_KEY";
/// Environment key for the consumer (app) secret.
pub const APP_SECRET: &str = "APP_SECRET";
/// Environment key for the user access token.
pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
/// Environment key for the user access token secret.
pub const ACCESS_SECRET: &str = "ACCESS_SECRET";
/// Environment key for the numeric id of the account to archive.
pub const TARGET_USER_ID: &str = "TARGET_USER_ID";

/// Main configuration structure.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub credentials: Credentials,

    /// Numeric id of the account whose timeline is archived.
    pub target_user_id: String,

    pub options: OptionsConfig,
}

/// OAuth 1.0a user-context credentials.
#[derive(Clone, Default)]
pub struct Credentials {
    pub app_key: String,
    pub app_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_key", &self.app_key)
            .field("app_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("access_secret", &"[REDACTED]")
            .finish()
    }
}

/// Download options configuration.
#[derive(Debug, Clone)]
pub struct OptionsConfig {
    /// API surface (and therefore media extraction strategy).
    pub api_version: ApiVersion,

    /// Base directory for downloads.
    pub download_directory: Option<PathBuf>,

    /// Upper bound on simultaneous media transfers.
    pub max_concurrent_downloads: usize,

    /// Posts requested per timeline page.
    pub page_size: u32,

    /// Number of timeline pages to walk.
    pub max_pages: u32,

    /// Whether to show the download progress bar.
    pub show_progress: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            api_version: ApiVersion::default(),
            download_directory: None,
            max_concurrent_downloads: 8,
            page_size: 100,
            max_pages: 1,
            show_progress: true,
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Required keys are checked in a fixed order and the first one that is
    /// absent or empty is reported.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| Error::MissingConfig(key.to_string()))
        };

        let credentials = Credentials {
            app_key: require(APP_KEY)?,
            app_secret: require(APP_SECRET)?,
            access_token: require(ACCESS_TOKEN)?,
            access_secret: require(ACCESS_SECRET)?,
        };
        let target_user_id = require(TARGET_USER_ID)?;

        Ok(Self {
            credentials,
            target_user_id,
            options: OptionsConfig::default(),
        })
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
