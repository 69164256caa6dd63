//! Archive run statistics.

use crate::media::MediaType;

/// Counters for one archive run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArchiveStats {
    pub posts_seen: u64,
    pub posts_with_media: u64,

    pub pic_count: u64,
    pub vid_count: u64,

    /// Media items without a resolvable URL.
    pub skipped_count: u64,

    /// Files renamed with the post id to avoid a collision.
    pub renamed_count: u64,

    pub bytes_written: u64,
}

impl ArchiveStats {
    /// Record a finished download.
    pub fn record_download(&mut self, media_type: MediaType, bytes: u64) {
        match media_type {
            MediaType::Image => self.pic_count += 1,
            MediaType::Video => self.vid_count += 1,
        }
        self.bytes_written += bytes;
    }

    /// Increment skipped count.
    pub fn increment_skipped(&mut self) {
        self.skipped_count += 1;
    }

    /// Increment renamed count.
    pub fn increment_renamed(&mut self) {
        self.renamed_count += 1;
    }

    /// Get total downloaded count.
    pub fn total_downloaded(&self) -> u64 {
        self.pic_count + self.vid_count
    }
}
