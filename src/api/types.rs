//! API response type definitions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::media::{MediaItem, MediaKind, Post, VideoVariant};

// ---------------------------------------------------------------------------
// v1.1
// ---------------------------------------------------------------------------

/// A tweet from `statuses/user_timeline` (with `tweet_mode=extended`).
#[derive(Debug, Clone, Deserialize)]
pub struct TweetV1 {
    pub id_str: String,
    #[serde(with = "legacy_date")]
    pub created_at: DateTime<Utc>,
    pub full_text: Option<String>,
    pub text: Option<String>,
    pub extended_entities: Option<ExtendedEntities>,
}

/// Native media attached to a tweet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtendedEntities {
    #[serde(default)]
    pub media: Vec<MediaEntityV1>,
}

/// Media entity.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaEntityV1 {
    pub id_str: String,
    pub media_url_https: String,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
    pub video_info: Option<VideoInfo>,
}

/// Video metadata, present on videos and animated GIFs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub variants: Vec<VariantV1>,
}

/// Video variant.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantV1 {
    pub bitrate: Option<u64>,
    pub url: String,
}

impl From<MediaEntityV1> for MediaItem {
    fn from(entity: MediaEntityV1) -> Self {
        // Anything carrying video_info is a video, everything else an image
        let kind = match entity.video_info {
            Some(info) => MediaKind::Video {
                variants: info
                    .variants
                    .into_iter()
                    .map(|v| VideoVariant {
                        url: v.url,
                        bitrate: v.bitrate,
                    })
                    .collect(),
            },
            None => MediaKind::Image,
        };

        MediaItem {
            key: entity.id_str,
            url: Some(entity.media_url_https),
            kind,
        }
    }
}

impl From<TweetV1> for Post {
    fn from(tweet: TweetV1) -> Self {
        let media = tweet
            .extended_entities
            .map(|entities| entities.media.into_iter().map(MediaItem::from).collect())
            .unwrap_or_default();

        Post {
            id: tweet.id_str,
            created_at: tweet.created_at,
            text: tweet.full_text.or(tweet.text).unwrap_or_default(),
            media,
        }
    }
}

/// v1.1 `created_at` format, e.g. "Wed Oct 10 20:19:24 +0000 2018".
mod legacy_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_str(&s, FORMAT)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// v2
// ---------------------------------------------------------------------------

/// Response from `GET /2/users/:id/tweets`.
#[derive(Debug, Default, Deserialize)]
pub struct TimelineV2Response {
    #[serde(default)]
    pub data: Vec<TweetV2>,
    #[serde(default)]
    pub includes: IncludesV2,
    #[serde(default)]
    pub meta: MetaV2,
    #[serde(default)]
    pub errors: Vec<ApiErrorV2>,
}

/// A tweet.
#[derive(Debug, Clone, Deserialize)]
pub struct TweetV2 {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub text: String,
    pub attachments: Option<AttachmentsV2>,
}

/// Tweet attachments.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentsV2 {
    #[serde(default)]
    pub media_keys: Vec<String>,
}

/// Expanded objects referenced by the tweets in `data`.
#[derive(Debug, Default, Deserialize)]
pub struct IncludesV2 {
    #[serde(default)]
    pub media: Vec<MediaV2>,
}

/// Media object.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaV2 {
    pub media_key: String,
    #[serde(rename = "type")]
    pub media_type: String,
    /// Only set for photos.
    pub url: Option<String>,
}

/// Pagination metadata.
#[derive(Debug, Default, Deserialize)]
pub struct MetaV2 {
    pub next_token: Option<String>,
}

/// Partial error entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorV2 {
    pub title: Option<String>,
    pub detail: Option<String>,
}

impl std::fmt::Display for ApiErrorV2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.title, &self.detail) {
            (Some(title), Some(detail)) => write!(f, "{}: {}", title, detail),
            (Some(title), None) => write!(f, "{}", title),
            (None, Some(detail)) => write!(f, "{}", detail),
            (None, None) => write!(f, "unknown error"),
        }
    }
}

impl From<&MediaV2> for MediaItem {
    fn from(media: &MediaV2) -> Self {
        let kind = if media.media_type == "photo" {
            MediaKind::Image
        } else {
            MediaKind::Video {
                variants: Vec::new(),
            }
        };

        MediaItem {
            key: media.media_key.clone(),
            url: media.url.clone(),
            kind,
        }
    }
}

/// Lookup from `media_key` to the expanded media object.
#[derive(Debug, Default)]
pub struct MediaLookup {
    by_key: HashMap<String, MediaV2>,
}

impl MediaLookup {
    pub fn from_includes(includes: IncludesV2) -> Self {
        let by_key = includes
            .media
            .into_iter()
            .map(|media| (media.media_key.clone(), media))
            .collect();

        Self { by_key }
    }

    pub fn get(&self, media_key: &str) -> Option<&MediaV2> {
        self.by_key.get(media_key)
    }

    /// Resolve a tweet's media keys, in attachment order.
    ///
    /// Keys missing from the lookup become items without a URL.
    pub fn media_for(&self, tweet: &TweetV2) -> Vec<MediaItem> {
        let Some(attachments) = &tweet.attachments else {
            return Vec::new();
        };

        attachments
            .media_keys
            .iter()
            .map(|key| match self.get(key) {
                Some(media) => MediaItem::from(media),
                None => MediaItem {
                    key: key.clone(),
                    url: None,
                    kind: MediaKind::Image,
                },
            })
            .collect()
    }
}

impl TimelineV2Response {
    /// Convert into normalized posts plus the next pagination token.
    pub fn into_page(self) -> (Vec<Post>, Option<String>) {
        let lookup = MediaLookup::from_includes(self.includes);

        let posts = self
            .data
            .into_iter()
            .map(|tweet| {
                let media = lookup.media_for(&tweet);
                Post {
                    id: tweet.id,
                    created_at: tweet.created_at,
                    text: tweet.text,
                    media,
                }
            })
            .collect();

        (posts, self.meta.next_token)
    }
}
