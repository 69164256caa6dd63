//! Configuration module for the tweet-media-archiver.
//!
//! This module handles:
//! - Loading credentials and the target account from the environment
//! - API version selection
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{Config, Credentials, OptionsConfig};
pub use modes::ApiVersion;
pub use validation::validate_config;
