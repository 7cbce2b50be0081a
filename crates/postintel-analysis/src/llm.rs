//! Client for an OpenAI-compatible multimodal chat completions endpoint.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::AnalysisError;

/// Attempts per completion, counting the first one.
const MAX_ATTEMPTS: u32 = 3;

/// One inline media payload attached to a completion request.
///
/// The base64 data is forwarded exactly as stored; the client only wraps it
/// in a `data:` URL.
#[derive(Debug, Clone)]
pub struct MediaAttachment {
    pub mime_type: String,
    pub data_base64: String,
}

impl MediaAttachment {
    #[must_use]
    pub fn image(data_base64: String) -> Self {
        Self {
            mime_type: "image/jpeg".to_owned(),
            data_base64,
        }
    }

    #[must_use]
    pub fn video(data_base64: String) -> Self {
        Self {
            mime_type: "video/mp4".to_owned(),
            data_base64,
        }
    }

    fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

/// Multimodal completion client.
///
/// Transient failures (network errors, 429, 5xx) are retried up to
/// [`MAX_ATTEMPTS`] times with linear backoff (2 s, then 4 s); client-side
/// rejections and malformed bodies are terminal on the first hit.
pub struct CompletionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl CompletionClient {
    #[must_use]
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Runs one completion with the given prompt and media attachments and
    /// returns the response text.
    ///
    /// # Errors
    ///
    /// Returns the last [`AnalysisError`] once retriable failures exhaust
    /// their attempts, or immediately on a terminal failure.
    pub async fn complete(
        &self,
        prompt: &str,
        media: &[MediaAttachment],
    ) -> Result<String, AnalysisError> {
        let mut attempt = 0;
        loop {
            match self.request(prompt, media).await {
                Ok(text) => return Ok(text),
                Err(err) => {
                    attempt += 1;
                    if !err.is_retriable() || attempt >= MAX_ATTEMPTS {
                        return Err(err);
                    }
                    let wait = Duration::from_secs(u64::from(attempt) * 2);
                    tracing::warn!(
                        attempt,
                        wait_secs = wait.as_secs(),
                        error = %err,
                        "completion attempt failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    async fn request(
        &self,
        prompt: &str,
        media: &[MediaAttachment],
    ) -> Result<String, AnalysisError> {
        let mut content = vec![json!({"type": "text", "text": prompt})];
        for attachment in media {
            content.push(json!({
                "type": "image_url",
                "image_url": {"url": attachment.data_url()}
            }));
        }
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": content}],
            "temperature": 0.7
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message: truncate(&message, 500),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|err| AnalysisError::MalformedResponse {
                    reason: err.to_string(),
                })?;
        let text = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_owned())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(AnalysisError::MalformedResponse {
                reason: "response carried no completion text".to_owned(),
            });
        }
        Ok(text)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_owned()
    } else {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].to_owned()
    }
}

#[cfg(test)]
#[path = "llm_test.rs"]
mod tests;
