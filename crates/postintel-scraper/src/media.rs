//! Inline media materialization.
//!
//! Downloads a media URL and returns it as a base64 payload for storage
//! alongside the post record. Materialization is best-effort by contract:
//! any failure — network error, non-2xx status, oversize video — yields
//! [`MediaBlob::Unavailable`] so a broken CDN link can never fail an
//! ingestion run. Nothing touches disk.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures::StreamExt;
use postintel_core::MediaBlob;
use reqwest::Client;

use crate::error::ScraperError;

/// Hard ceiling for a single video payload.
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

/// What kind of media a URL points at; selects timeout and fetch strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Best-effort media downloader.
///
/// Images are fetched whole-body under a short timeout. Videos are streamed
/// chunk by chunk under a long timeout, counting bytes against the size
/// ceiling; crossing the ceiling aborts the transfer and discards everything
/// already buffered, never keeping a truncated payload.
#[derive(Debug)]
pub struct MediaMaterializer {
    client: Client,
    image_timeout: Duration,
    video_timeout: Duration,
    video_max_bytes: usize,
}

impl MediaMaterializer {
    /// Creates a materializer with the given per-kind timeouts and video
    /// size ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        image_timeout_secs: u64,
        video_timeout_secs: u64,
        video_max_bytes: usize,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            image_timeout: Duration::from_secs(image_timeout_secs),
            video_timeout: Duration::from_secs(video_timeout_secs),
            video_max_bytes,
        })
    }

    /// Downloads `url` and returns its contents base64-encoded.
    ///
    /// Never fails: every error path logs and returns
    /// [`MediaBlob::Unavailable`].
    pub async fn materialize(&self, url: &str, kind: MediaKind) -> MediaBlob {
        let fetched = match kind {
            MediaKind::Image => self.fetch_image(url).await,
            MediaKind::Video => self.fetch_video(url).await,
        };

        match fetched {
            Ok(bytes) => MediaBlob::Available(BASE64.encode(bytes)),
            Err(err) => {
                tracing::warn!(url, ?kind, error = %err, "media fetch failed, storing placeholder");
                MediaBlob::Unavailable
            }
        }
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        let response = self
            .client
            .get(url)
            .timeout(self.image_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch_video(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        let response = self
            .client
            .get(url)
            .timeout(self.video_timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let mut buffer: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if buffer.len() + chunk.len() > self.video_max_bytes {
                // Discard the partial transfer entirely.
                return Err(ScraperError::Oversize {
                    limit_bytes: self.video_max_bytes,
                    url: url.to_owned(),
                });
            }
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer)
    }
}

#[cfg(test)]
#[path = "media_test.rs"]
mod tests;
