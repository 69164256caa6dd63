//! Configuration validation logic.

use regex::Regex;

use crate::config::loader::{Config, Credentials};
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_credentials(&config.credentials)?;
    validate_user_id(&config.target_user_id)?;
    validate_page_size(config)?;

    if config.options.max_concurrent_downloads == 0 {
        return Err(Error::ConfigValidation {
            field: "max_concurrent_downloads".to_string(),
            message: "At least one concurrent download is required".to_string(),
        });
    }

    if config.options.max_pages == 0 {
        return Err(Error::ConfigValidation {
            field: "max_pages".to_string(),
            message: "At least one timeline page must be fetched".to_string(),
        });
    }

    Ok(())
}

/// Reject credentials that were left as template placeholders.
pub fn validate_credentials(credentials: &Credentials) -> Result<()> {
    let fields = [
        ("APP_KEY", &credentials.app_key),
        ("APP_SECRET", &credentials.app_secret),
        ("ACCESS_TOKEN", &credentials.access_token),
        ("ACCESS_SECRET", &credentials.access_secret),
    ];

    for (field, value) in fields {
        if value.is_empty() {
            return Err(Error::MissingConfig(field.to_string()));
        }

        let lower = value.to_lowercase();
        if lower.contains("replaceme") || lower.starts_with("your_") || lower.starts_with("your-") {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: "Value appears to be a placeholder. Please provide your actual credentials."
                    .to_string(),
            });
        }
    }

    Ok(())
}

/// Validate the target account id.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    let user_id = user_id.trim();

    if user_id.is_empty() {
        return Err(Error::MissingConfig("TARGET_USER_ID".to_string()));
    }

    // Account ids are unsigned 64-bit snowflakes
    let id_pattern = Regex::new(r"^\d{1,20}$").unwrap();
    if !id_pattern.is_match(user_id) {
        return Err(Error::ConfigValidation {
            field: "TARGET_USER_ID".to_string(),
            message: format!(
                "Invalid user id: '{}'. Must be the numeric account id, not the @handle.",
                user_id
            ),
        });
    }

    Ok(())
}

/// Validate the page size against the selected API version.
pub fn validate_page_size(config: &Config) -> Result<()> {
    let (min, max) = config.options.api_version.page_size_range();
    let page_size = config.options.page_size;

    if page_size < min || page_size > max {
        return Err(Error::ConfigValidation {
            field: "page_size".to_string(),
            message: format!(
                "Page size must be between {} and {} for API {} (got {})",
                min, max, config.options.api_version, page_size
            ),
        });
    }

    Ok(())
}
