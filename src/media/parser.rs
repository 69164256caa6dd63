//! Media extraction strategies.

use crate::error::{Error, Result};
use crate::fs::naming::{media_stem, timestamp_prefix};
use crate::media::item::{
    Extraction, MediaDownload, MediaItem, MediaKind, MediaType, Post, SkippedMedia, VideoVariant,
    DEFAULT_IMAGE_EXTENSION, VIDEO_EXTENSION,
};

/// Turns a post into the set of files to download.
pub trait MediaExtractor: Send + Sync {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    /// Plan downloads for every media item attached to `post`.
    fn extract(&self, post: &Post) -> Result<Extraction>;
}

/// Strategy for v1.1 tweets, where media and video variants are embedded.
///
/// A video without any playable variant aborts extraction for the whole run.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyExtractor;

impl MediaExtractor for LegacyExtractor {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn extract(&self, post: &Post) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        for (index, item) in post.media.iter().enumerate() {
            let download = match &item.kind {
                MediaKind::Video { variants } => {
                    let variant = select_best_variant(variants).ok_or_else(|| {
                        Error::UnresolvableVideoSource {
                            post_id: post.id.clone(),
                        }
                    })?;

                    MediaDownload {
                        index,
                        url: variant.url.clone(),
                        extension: VIDEO_EXTENSION.to_string(),
                        media_type: MediaType::Video,
                    }
                }
                MediaKind::Image => {
                    let url = item.url.as_deref().ok_or_else(|| {
                        Error::Media(format!(
                            "Image {} in post {} has no source URL",
                            item.key, post.id
                        ))
                    })?;

                    MediaDownload {
                        index,
                        url: url.to_string(),
                        extension: image_extension(url),
                        media_type: MediaType::Image,
                    }
                }
            };

            extraction.downloads.push(download);
        }

        Ok(extraction)
    }
}

/// Strategy for v2 tweets, where media is resolved through `includes.media`.
///
/// Items without a direct URL (videos and GIFs on this surface) are reported
/// as skipped instead of failing the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandedExtractor;

impl MediaExtractor for ExpandedExtractor {
    fn name(&self) -> &'static str {
        "expanded"
    }

    fn extract(&self, post: &Post) -> Result<Extraction> {
        let mut extraction = Extraction::default();
        if post.media.is_empty() {
            return Ok(extraction);
        }

        let prefix = timestamp_prefix(&post.created_at);

        for (index, item) in post.media.iter().enumerate() {
            match direct_url(item) {
                Some(url) => {
                    let extension = match item.kind {
                        MediaKind::Video { .. } => VIDEO_EXTENSION.to_string(),
                        MediaKind::Image => image_extension(url),
                    };

                    extraction.downloads.push(MediaDownload {
                        index,
                        url: url.to_string(),
                        extension,
                        media_type: item.media_type(),
                    })
                }
                None => extraction.skipped.push(SkippedMedia {
                    index,
                    label: media_stem(&prefix, index),
                    text: post.text.clone(),
                }),
            }
        }

        Ok(extraction)
    }
}

fn direct_url(item: &MediaItem) -> Option<&str> {
    item.url.as_deref().filter(|url| !url.is_empty())
}

/// Select the variant with the highest bitrate.
///
/// Only a strictly greater bitrate replaces the current pick, so the earliest
/// listed variant wins ties. Variants without a bitrate are never chosen.
pub fn select_best_variant(variants: &[VideoVariant]) -> Option<&VideoVariant> {
    let mut best: Option<(&VideoVariant, u64)> = None;

    for variant in variants {
        let Some(bitrate) = variant.bitrate else {
            continue;
        };

        if best.map_or(true, |(_, best_bitrate)| bitrate > best_bitrate) {
            best = Some((variant, bitrate));
        }
    }

    best.map(|(variant, _)| variant)
}

/// Determine the file extension for an image URL.
fn image_extension(url: &str) -> String {
    extract_extension_from_url(url).unwrap_or_else(|| DEFAULT_IMAGE_EXTENSION.to_string())
}

/// Extract extension from URL path, verbatim.
fn extract_extension_from_url(url: &str) -> Option<String> {
    // Remove query string and fragment
    let path = url.split(['?', '#']).next()?;

    // Get the last segment
    let filename = path.rsplit('/').next()?;

    // Get extension
    let (_, ext) = filename.rsplit_once('.')?;

    // Validate it looks like an extension (1-10 chars, alphanumeric)
    if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_string())
    } else {
        None
    }
}
