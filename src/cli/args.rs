//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{ApiVersion, Config};

/// Twitter timeline media archiver CLI.
///
/// Credentials and the target account are read from the environment
/// (APP_KEY, APP_SECRET, ACCESS_TOKEN, ACCESS_SECRET, TARGET_USER_ID),
/// optionally through a `.env` file in the working directory.
#[derive(Parser, Debug)]
#[command(
    name = "tweet-media-archiver",
    version,
    about = "Download the pictures and videos of a Twitter user's recent posts",
    long_about = "A CLI tool that fetches a user's recent posts and saves every attached picture \
                  and video into a directory named after the account id.\n\n\
                  Files are named <YYYY-MM-DD_HH-mm-ss>_<index>.<ext> after the post's creation time."
)]
pub struct Args {
    /// API surface to read the timeline from.
    #[arg(long, value_enum, env = "ARCHIVER_API_VERSION")]
    pub api_version: Option<ApiVersionArg>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory", env = "ARCHIVER_DIRECTORY")]
    pub download_directory: Option<PathBuf>,

    /// Maximum number of simultaneous downloads.
    #[arg(short = 'j', long = "max-concurrent", env = "ARCHIVER_MAX_CONCURRENT")]
    pub max_concurrent: Option<usize>,

    /// Posts requested per timeline page.
    #[arg(long, env = "ARCHIVER_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Number of timeline pages to walk.
    #[arg(long, env = "ARCHIVER_MAX_PAGES")]
    pub max_pages: Option<u32>,

    /// Hide the progress bar.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI API version argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ApiVersionArg {
    /// v1.1 user timeline, videos downloaded from the best variant.
    V1,
    /// v2 user tweets, videos without a direct URL are skipped.
    V2,
}

impl From<ApiVersionArg> for ApiVersion {
    fn from(arg: ApiVersionArg) -> Self {
        match arg {
            ApiVersionArg::V1 => ApiVersion::V1,
            ApiVersionArg::V2 => ApiVersion::V2,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(version) = self.api_version {
            config.options.api_version = version.into();
        }

        if let Some(dir) = self.download_directory {
            config.options.download_directory = Some(dir);
        }

        if let Some(max_concurrent) = self.max_concurrent {
            config.options.max_concurrent_downloads = max_concurrent;
        }

        if let Some(page_size) = self.page_size {
            config.options.page_size = page_size;
        }

        if let Some(max_pages) = self.max_pages {
            config.options.max_pages = max_pages;
        }

        if self.quiet {
            config.options.show_progress = false;
        }
    }
}
