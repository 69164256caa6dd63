//! Download module for media archiving.
//!
//! This module provides:
//! - Run statistics
//! - Timeline archiving with bounded concurrent transfers
//! - Streaming media file downloads

pub mod media;
pub mod state;
pub mod timeline;

pub use media::download_to_file;
pub use state::ArchiveStats;
pub use timeline::{archive_timeline, DownloadTask};
