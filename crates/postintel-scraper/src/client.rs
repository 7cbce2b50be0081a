use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;
use crate::types::{RawPost, RawProfile, RawUrlItem};

/// Actor handle for profile-targeted collection (posts and account details).
const PROFILE_ACTOR: &str = "RB9HEZitC8hIUXAha";

/// Actor handle for keyword discovery (hashtag feed, URL-only items).
const HASHTAG_ACTOR: &str = "reGe1ST3OBgYZSsZJ";

/// Actor handle for resolving full post details from direct URLs.
const DETAILS_ACTOR: &str = "shu8hvrXbJbY3Eb9W";

/// HTTP client for the collector platform's synchronous run API.
///
/// Each fetch starts an actor run via `run-sync-get-dataset-items`, which
/// blocks until the run finishes and returns the dataset items directly, so
/// one logical fetch is one HTTP round-trip.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx responses
/// as typed errors. Transient errors (429, network failures) are
/// automatically retried with exponential backoff up to `max_retries`
/// additional attempts.
pub struct SourceClient {
    client: Client,
    base_url: String,
    token: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl std::fmt::Debug for SourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .field("backoff_base_secs", &self.backoff_base_secs)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRunInput {
    direct_urls: Vec<String>,
    results_type: &'static str,
    results_limit: u32,
    search_type: &'static str,
    search_limit: u32,
    add_parent_data: bool,
}

impl ProfileRunInput {
    fn new(username: &str, results_type: &'static str, results_limit: u32) -> Self {
        Self {
            direct_urls: vec![format!("https://www.instagram.com/{username}/")],
            results_type,
            results_limit,
            search_type: "hashtag",
            search_limit: 1,
            add_parent_data: false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HashtagRunInput {
    hashtags: Vec<String>,
    results_type: &'static str,
    results_limit: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DirectUrlsRunInput {
    direct_urls: Vec<String>,
    results_type: &'static str,
    results_limit: u32,
}

impl SourceClient {
    /// Creates a `SourceClient` with configured timeout and retry policy.
    ///
    /// The request timeout covers an entire synchronous actor run, so it is
    /// much longer than a typical HTTP timeout (default 180 s).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        token: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches up to `count` of a profile's most recent posts,
    /// most-recent-first.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] — HTTP 429 after all retries exhausted.
    /// - [`ScraperError::NotFound`] — HTTP 404 (not retried).
    /// - [`ScraperError::UnexpectedStatus`] — any other non-2xx status (not retried).
    /// - [`ScraperError::Http`] — network failure after all retries exhausted.
    /// - [`ScraperError::Deserialize`] — dataset items do not parse (not retried).
    pub async fn fetch_recent(
        &self,
        username: &str,
        count: u32,
    ) -> Result<Vec<RawPost>, ScraperError> {
        let input = ProfileRunInput::new(username, "posts", count);
        self.run_actor(PROFILE_ACTOR, &input, &format!("posts for {username}"))
            .await
    }

    /// Fetches a profile's account details.
    ///
    /// # Errors
    ///
    /// Same surface as [`Self::fetch_recent`]; additionally
    /// [`ScraperError::EmptyRun`] if the run produced no details item.
    pub async fn fetch_profile(&self, username: &str) -> Result<RawProfile, ScraperError> {
        let input = ProfileRunInput::new(username, "details", 1);
        let mut items: Vec<RawProfile> = self
            .run_actor(PROFILE_ACTOR, &input, &format!("details for {username}"))
            .await?;
        if items.is_empty() {
            return Err(ScraperError::EmptyRun {
                target: username.to_owned(),
            });
        }
        Ok(items.swap_remove(0))
    }

    /// Discovery pass of a keyword search: returns post URLs from the
    /// keyword's feed, skipping items without a URL.
    ///
    /// # Errors
    ///
    /// Same surface as [`Self::fetch_recent`].
    pub async fn fetch_hashtag_urls(
        &self,
        keyword: &str,
        limit: u32,
    ) -> Result<Vec<String>, ScraperError> {
        let input = HashtagRunInput {
            hashtags: vec![keyword.to_owned()],
            results_type: "posts",
            results_limit: limit,
        };
        let items: Vec<RawUrlItem> = self
            .run_actor(HASHTAG_ACTOR, &input, &format!("hashtag feed for {keyword}"))
            .await?;
        Ok(items.into_iter().filter_map(|item| item.url).collect())
    }

    /// Detail pass of a keyword search: resolves full post records for the
    /// URLs returned by [`Self::fetch_hashtag_urls`].
    ///
    /// Returns an empty vec without issuing a request when `urls` is empty.
    ///
    /// # Errors
    ///
    /// Same surface as [`Self::fetch_recent`].
    pub async fn fetch_details_by_urls(
        &self,
        urls: &[String],
    ) -> Result<Vec<RawPost>, ScraperError> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        let input = DirectUrlsRunInput {
            direct_urls: urls.to_vec(),
            results_type: "posts",
            results_limit: u32::try_from(urls.len()).unwrap_or(u32::MAX),
        };
        self.run_actor(DETAILS_ACTOR, &input, "post details by URL")
            .await
    }

    /// Starts a synchronous actor run and parses the returned dataset items,
    /// with automatic retry on transient errors.
    async fn run_actor<I, T>(
        &self,
        actor: &str,
        input: &I,
        context: &str,
    ) -> Result<Vec<T>, ScraperError>
    where
        I: Serialize,
        T: DeserializeOwned,
    {
        let url = format!(
            "{}/acts/{actor}/run-sync-get-dataset-items?format=json",
            self.base_url
        );

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.token)
                    .json(input)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ScraperError::RateLimited { retry_after_secs });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ScraperError::NotFound { url });
                }

                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<Vec<T>>(&body).map_err(|e| ScraperError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
