//! Error types for the tweet-media-archiver application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // API errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Rate limited, window resets in {0} seconds")]
    RateLimited(u64),

    // Extraction errors
    #[error("No playable video URL for post {post_id}")]
    UnresolvableVideoSource { post_id: String },

    #[error("Invalid media: {0}")]
    Media(String),

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Download task failed: {0}")]
    TaskFailed(String),

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map an error to the process exit code reported by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigValidation { .. } | Error::MissingConfig(_) => exit_codes::CONFIG_ERROR,
            Error::Api(_)
            | Error::Authentication(_)
            | Error::AccountNotFound(_)
            | Error::RateLimited(_)
            | Error::Http(_) => exit_codes::API_ERROR,
            Error::UnresolvableVideoSource { .. }
            | Error::Media(_)
            | Error::Download(_)
            | Error::TaskFailed(_)
            | Error::Io(_) => exit_codes::DOWNLOAD_ERROR,
            _ => exit_codes::UNEXPECTED_ERROR,
        }
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
