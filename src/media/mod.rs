//! Media module for post representation and extraction.

pub mod item;
pub mod parser;

pub use item::{
    Extraction, MediaDownload, MediaItem, MediaKind, MediaType, Post, SkippedMedia, VideoVariant,
    VIDEO_EXTENSION,
};
pub use parser::{select_best_variant, ExpandedExtractor, LegacyExtractor, MediaExtractor};
