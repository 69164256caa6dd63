//! Tweet Media Archiver - save the media of a Twitter user's recent posts
//!
//! This library provides functionality for archiving the images and videos
//! attached to a user's timeline.
//!
//! # Features
//!
//! - v1.1 and v2 timeline support with OAuth 1.0a user-context signing
//! - Highest-bitrate video variant selection
//! - Sortable `<YYYY-MM-DD_HH-mm-ss>_<index>.<ext>` filenames
//! - Streaming downloads with a bounded number of concurrent transfers
//!
//! # Example
//!
//! ```no_run
//! use tweet_media_archiver::{
//!     api::{TwitterApi, UserTimeline},
//!     download::archive_timeline,
//!     fs::{ensure_dir, target_directory},
//!     Config,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let target_dir = target_directory(&config)?;
//!     ensure_dir(&target_dir).await?;
//!
//!     let api = TwitterApi::new(config.credentials.clone())?;
//!     let mut timeline = UserTimeline::new(api.clone(), &config);
//!     let extractor = config.options.api_version.extractor();
//!
//!     let stats =
//!         archive_timeline(&api, &config, &mut timeline, extractor.as_ref(), &target_dir).await?;
//!     println!("{} files saved", stats.total_downloaded());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::{TimelineSource, TwitterApi, UserTimeline};
pub use config::{ApiVersion, Config};
pub use download::{archive_timeline, ArchiveStats};
pub use error::{Error, Result};
pub use media::{MediaExtractor, MediaItem, MediaType, Post};
