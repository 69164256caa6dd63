//! Post and media item representation.

use chrono::{DateTime, Utc};

/// Container extension used for every video download.
pub const VIDEO_EXTENSION: &str = "mp4";

/// Extension used when an image URL carries no usable one.
pub const DEFAULT_IMAGE_EXTENSION: &str = "jpg";

/// Type of media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

/// A single encoded rendition of a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoVariant {
    pub url: String,
    /// Absent for adaptive playlists (HLS).
    pub bitrate: Option<u64>,
}

/// What kind of attachment a media item is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video { variants: Vec<VideoVariant> },
}

impl MediaKind {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaKind::Image => MediaType::Image,
            MediaKind::Video { .. } => MediaType::Video,
        }
    }
}

/// Media attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// API identifier (`id_str` in v1, `media_key` in v2).
    pub key: String,

    /// Direct source URL, when the API exposes one.
    pub url: Option<String>,

    pub kind: MediaKind,
}

impl MediaItem {
    pub fn media_type(&self) -> MediaType {
        self.kind.media_type()
    }
}

/// A timeline post normalized from either API version.
#[derive(Debug, Clone)]
pub struct Post {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub media: Vec<MediaItem>,
}

/// One file the extractor wants written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDownload {
    /// Position of the item within the post's media list.
    pub index: usize,
    pub url: String,
    /// File extension (without dot).
    pub extension: String,
    pub media_type: MediaType,
}

/// A media item dropped because it has no direct URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedMedia {
    pub index: usize,
    /// `<timestamp prefix>_<index>`, the name the file would have had.
    pub label: String,
    /// Post text, kept so the item can be recovered by hand.
    pub text: String,
}

/// Result of running an extraction strategy over one post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub downloads: Vec<MediaDownload>,
    pub skipped: Vec<SkippedMedia>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.downloads.is_empty() && self.skipped.is_empty()
    }
}
