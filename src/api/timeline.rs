//! Paginated timeline access.

use async_trait::async_trait;

use crate::api::client::TwitterApi;
use crate::config::{ApiVersion, Config};
use crate::error::Result;
use crate::media::Post;

/// A forward-only sequence of timeline pages.
#[async_trait]
pub trait TimelineSource: Send {
    /// Fetch the next page, or `None` once the sequence is exhausted.
    async fn next_page(&mut self) -> Result<Option<Vec<Post>>>;
}

/// Where the next request should resume.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    /// v1.1 `max_id`.
    MaxId(String),
    /// v2 `pagination_token`.
    Token(String),
    Exhausted,
}

/// A user's timeline, fetched one page at a time.
pub struct UserTimeline {
    api: TwitterApi,
    version: ApiVersion,
    user_id: String,
    page_size: u32,
    max_pages: u32,
    pages_fetched: u32,
    cursor: Cursor,
}

impl UserTimeline {
    pub fn new(api: TwitterApi, config: &Config) -> Self {
        Self {
            api,
            version: config.options.api_version,
            user_id: config.target_user_id.clone(),
            page_size: config.options.page_size,
            max_pages: config.options.max_pages,
            pages_fetched: 0,
            cursor: Cursor::Start,
        }
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    async fn fetch_v1(&mut self, max_id: Option<String>) -> Result<Vec<Post>> {
        let tweets = self
            .api
            .user_timeline_v1(&self.user_id, self.page_size, max_id.as_deref())
            .await?;

        // max_id is inclusive, so resume just below the oldest id seen
        self.cursor = tweets
            .last()
            .and_then(|t| t.id_str.parse::<u64>().ok())
            .and_then(|id| id.checked_sub(1))
            .map(|id| Cursor::MaxId(id.to_string()))
            .unwrap_or(Cursor::Exhausted);

        Ok(tweets.into_iter().map(Post::from).collect())
    }

    async fn fetch_v2(&mut self, token: Option<String>) -> Result<Vec<Post>> {
        let response = self
            .api
            .user_tweets_v2(&self.user_id, self.page_size, token.as_deref())
            .await?;

        let (posts, next_token) = response.into_page();
        self.cursor = next_token.map(Cursor::Token).unwrap_or(Cursor::Exhausted);

        Ok(posts)
    }
}

#[async_trait]
impl TimelineSource for UserTimeline {
    async fn next_page(&mut self) -> Result<Option<Vec<Post>>> {
        if self.pages_fetched >= self.max_pages {
            self.cursor = Cursor::Exhausted;
        }

        let resume = match std::mem::replace(&mut self.cursor, Cursor::Exhausted) {
            Cursor::Exhausted => return Ok(None),
            Cursor::Start => None,
            Cursor::MaxId(id) | Cursor::Token(id) => Some(id),
        };

        tracing::debug!(
            "Fetching {} timeline page {} for user {}",
            self.version,
            self.pages_fetched + 1,
            self.user_id
        );

        let posts = match self.version {
            ApiVersion::V1 => self.fetch_v1(resume).await?,
            ApiVersion::V2 => self.fetch_v2(resume).await?,
        };
        self.pages_fetched += 1;

        if posts.is_empty() {
            self.cursor = Cursor::Exhausted;
            return Ok(None);
        }

        Ok(Some(posts))
    }
}
