//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Get the directory that receives every file of this run.
///
/// The directory is named after the target account id, under the configured
/// download directory.
pub fn target_directory(config: &Config) -> Result<PathBuf> {
    let folder = sanitize_path_component(&config.target_user_id)?;
    Ok(config.download_directory().join(folder))
}

/// Ensure a directory exists, creating it if necessary.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}
