//! API version definitions.

use std::fmt;

use crate::media::{ExpandedExtractor, LegacyExtractor, MediaExtractor};

/// Twitter API surface used to fetch the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiVersion {
    /// v1.1 `statuses/user_timeline`, media embedded in each tweet (default).
    #[default]
    V1,
    /// v2 `users/:id/tweets`, media resolved through `includes.media`.
    V2,
}

impl ApiVersion {
    /// Media extraction strategy matching this API surface.
    pub fn extractor(&self) -> Box<dyn MediaExtractor> {
        match self {
            ApiVersion::V1 => Box::new(LegacyExtractor),
            ApiVersion::V2 => Box::new(ExpandedExtractor),
        }
    }

    /// Inclusive page size bounds accepted by the endpoint.
    pub fn page_size_range(&self) -> (u32, u32) {
        match self {
            ApiVersion::V1 => (1, 200),
            ApiVersion::V2 => (5, 100),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => write!(f, "v1"),
            ApiVersion::V2 => write!(f, "v2"),
        }
    }
}
