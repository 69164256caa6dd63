//! Twitter API HTTP client.

use std::sync::Arc;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::auth::authorization_header;
use crate::api::types::{TimelineV2Response, TweetV1};
use crate::config::Credentials;
use crate::error::{Error, Result};

/// Twitter API base URL.
pub const API_BASE: &str = "https://api.twitter.com";

/// Rate limit window used when the reset header is missing (15 minutes).
const DEFAULT_RATE_LIMIT_WINDOW: u64 = 15 * 60;

/// Maximum number of body bytes quoted in parse errors.
const ERROR_EXCERPT_LEN: usize = 500;

/// Twitter API client signing requests with OAuth 1.0a user context.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct TwitterApi {
    client: Client,
    credentials: Arc<Credentials>,
    base_url: Url,
}

impl TwitterApi {
    /// Create a new API client against the public API host.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_base_url(credentials, API_BASE)
    }

    /// Create a new API client against another host.
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials: Arc::new(credentials),
            base_url: Url::parse(base_url)?,
        })
    }

    /// Make an OAuth-signed GET request.
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        let mut url = self.base_url.join(path)?;
        let signing_url = url.clone();

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }

        let auth = authorization_header(
            &self.credentials,
            Method::GET.as_str(),
            signing_url.as_str(),
            query,
        )?;

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, auth)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited(rate_limit_reset_in(&response)));
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Auth error response: {}", body);
            return Err(Error::Authentication(format!(
                "HTTP {}: {}",
                status,
                if body.is_empty() {
                    "Authentication failed"
                } else {
                    body.as_str()
                }
            )));
        }

        if status == StatusCode::NOT_FOUND {
            return Err(Error::AccountNotFound(path.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "HTTP {}: {}",
                status,
                excerpt(&body)
            )));
        }

        Ok(response)
    }

    /// Make a signed GET request and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        what: &str,
    ) -> Result<T> {
        let response = self.get(path, query).await?;
        let text = response.text().await?;
        tracing::debug!("{} response length: {} bytes", what, text.len());

        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} - Response: {}",
                what,
                e,
                excerpt(&text)
            ))
        })
    }

    /// Get one page of a user's timeline from v1.1 `statuses/user_timeline`.
    ///
    /// Retweets are excluded and user objects trimmed.
    pub async fn user_timeline_v1(
        &self,
        user_id: &str,
        count: u32,
        max_id: Option<&str>,
    ) -> Result<Vec<TweetV1>> {
        let count = count.to_string();
        let mut query = vec![
            ("user_id", user_id),
            ("count", count.as_str()),
            ("trim_user", "true"),
            ("include_rts", "false"),
            ("tweet_mode", "extended"),
        ];
        if let Some(max_id) = max_id {
            query.push(("max_id", max_id));
        }

        self.get_json("/1.1/statuses/user_timeline.json", &query, "timeline")
            .await
    }

    /// Get one page of a user's tweets from v2 `users/:id/tweets`.
    ///
    /// Media attachments are expanded into `includes.media`.
    pub async fn user_tweets_v2(
        &self,
        user_id: &str,
        max_results: u32,
        pagination_token: Option<&str>,
    ) -> Result<TimelineV2Response> {
        let path = format!("/2/users/{}/tweets", user_id);
        let max_results = max_results.to_string();
        let mut query = vec![
            ("max_results", max_results.as_str()),
            ("expansions", "attachments.media_keys"),
            ("tweet.fields", "created_at,attachments"),
            ("media.fields", "media_key,type,url"),
        ];
        if let Some(token) = pagination_token {
            query.push(("pagination_token", token));
        }

        let response: TimelineV2Response = self.get_json(&path, &query, "tweets").await?;

        if response.data.is_empty() && !response.errors.is_empty() {
            let messages: Vec<String> = response.errors.iter().map(|e| e.to_string()).collect();
            return Err(Error::Api(messages.join("; ")));
        }

        for error in &response.errors {
            tracing::warn!("Partial error in timeline response: {}", error);
        }

        Ok(response)
    }

    /// Start downloading a media file.
    ///
    /// Non-2xx responses are rejected before any body is read.
    pub async fn download_file(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Download(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response)
    }
}

/// Seconds until the rate limit window resets, from `x-rate-limit-reset`.
fn rate_limit_reset_in(response: &Response) -> u64 {
    response
        .headers()
        .get("x-rate-limit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
        .map(|reset| (reset - chrono::Utc::now().timestamp()).max(0) as u64)
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW)
}

fn excerpt(text: &str) -> &str {
    match text.char_indices().nth(ERROR_EXCERPT_LEN) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{header_regex, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn test_credentials() -> Credentials {
        Credentials {
            app_key: "app-key".into(),
            app_secret: "app-secret".into(),
            access_token: "access-token".into(),
            access_secret: "access-secret".into(),
        }
    }

    async fn test_api(server: &MockServer) -> TwitterApi {
        TwitterApi::with_base_url(test_credentials(), &server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_user_timeline_v1_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/1.1/statuses/user_timeline.json"))
            .and(query_param("user_id", "783214"))
            .and(query_param("count", "100"))
            .and(query_param("trim_user", "true"))
            .and(query_param("include_rts", "false"))
            .and(header_regex(
                "authorization",
                r#"^OAuth oauth_consumer_key="app-key", oauth_nonce="[A-Za-z0-9]+", oauth_signature=".+", oauth_signature_method="HMAC-SHA1""#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id_str": "10",
                    "created_at": "Thu Jun 01 10:15:30 +0000 2023",
                    "full_text": "hello"
                }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let tweets = api.user_timeline_v1("783214", 100, None).await.unwrap();
        assert_eq!(tweets.len(), 1);
        assert_eq!(tweets[0].id_str, "10");
    }

    #[tokio::test]
    async fn test_user_tweets_v2_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2/users/783214/tweets"))
            .and(query_param("expansions", "attachments.media_keys"))
            .and(query_param("pagination_token", "next-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    {"id": "20", "created_at": "2023-06-01T10:15:30.000Z", "text": "hi"}
                ],
                "meta": {"result_count": 1}
            })))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let response = api
            .user_tweets_v2("783214", 100, Some("next-1"))
            .await
            .unwrap();
        assert_eq!(response.data.len(), 1);
        assert!(response.meta.next_token.is_none());
    }

    #[tokio::test]
    async fn test_auth_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Could not authenticate you"))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let err = api.user_timeline_v1("783214", 100, None).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(err.to_string().contains("Could not authenticate you"));
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2/users/999/tweets"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let err = api.user_tweets_v2("999", 100, None).await.unwrap_err();
        assert!(matches!(err, Error::AccountNotFound(_)));
        assert!(err.to_string().contains("/2/users/999/tweets"));
        assert_eq!(err.exit_code(), crate::error::exit_codes::API_ERROR);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let err = api.user_timeline_v1("783214", 100, None).await.unwrap_err();
        assert!(matches!(err, Error::RateLimited(DEFAULT_RATE_LIMIT_WINDOW)));
    }

    #[tokio::test]
    async fn test_v2_errors_without_data() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errors": [{"title": "Authorization Error", "detail": "Sorry, you are not authorized"}]
            })))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let err = api.user_tweets_v2("783214", 100, None).await.unwrap_err();
        assert!(err.to_string().contains("Authorization Error"));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let err = api.user_timeline_v1("783214", 100, None).await.unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    #[tokio::test]
    async fn test_download_file_rejects_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/media/missing.jpg"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let api = test_api(&server).await;
        let err = api
            .download_file(&format!("{}/media/missing.jpg", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Download(_)));
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(ERROR_EXCERPT_LEN + 10);
        assert_eq!(excerpt(&long).len(), ERROR_EXCERPT_LEN);
        assert_eq!(excerpt("short"), "short");
    }
}
