//! Best-effort translation sidecar.
//!
//! Translation rides alongside ingestion and must never hold it up: any
//! failure degrades to the untranslated input. Callers cannot tell a
//! degraded result from a no-op translation and are not supposed to.

use std::time::Duration;

use async_trait::async_trait;
use postintel_core::NormalizedPost;
use postintel_db::PostTranslations;
use serde::Deserialize;
use serde_json::json;

use crate::traits::Translator;

const SYSTEM_PROMPT: &str = "你是一个专业的翻译助手。请将用户提供的文本翻译成简体中文。\
    无论源语言是英语、阿拉伯语还是其他语言，都请翻译成简体中文。\
    只返回翻译结果，不要添加任何解释、引号或额外内容。保持简洁。";

/// Translator backed by an OpenAI-compatible chat completions endpoint.
pub struct HttpTranslator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for HttpTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTranslator")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
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

impl HttpTranslator {
    #[must_use]
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
        }
    }

    async fn request(&self, text: &str) -> Option<String> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": text}
            ],
            "temperature": 0.3,
            "max_tokens": 1000
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "translation request rejected");
            return None;
        }

        let parsed: ChatResponse = response.json().await.ok()?;
        let content = parsed.choices.first()?.message.content.trim().to_owned();
        // Models occasionally wrap the result in quotes despite instructions.
        let content = content
            .trim_matches('"')
            .trim_matches('\'')
            .trim()
            .to_owned();
        if content.is_empty() {
            None
        } else {
            Some(content)
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() || self.api_key.is_empty() {
            return text.to_owned();
        }

        match self.request(text).await {
            Some(translated) => translated,
            None => {
                tracing::warn!("translation failed, keeping original text");
                text.to_owned()
            }
        }
    }
}

/// Translates a post's user-facing text fields for storage alongside the
/// originals.
///
/// Blank fields are skipped and come back as `None`, which the store treats
/// as "leave the column alone". Hashtags are translated one tag at a time so
/// the stored list stays parallel to the source list. Like every use of
/// [`Translator`], failures degrade to the input; an untranslated copy is
/// still a usable copy.
pub async fn build_post_translations(
    translator: &dyn Translator,
    post: &NormalizedPost,
) -> PostTranslations {
    let has_text = |text: &str| !text.trim().is_empty();

    let mut out = PostTranslations::default();

    if has_text(&post.caption) {
        out.caption = Some(translator.translate(&post.caption).await);
    }
    if let Some(alt) = post.alt.as_deref().filter(|s| has_text(s)) {
        out.alt = Some(translator.translate(alt).await);
    }
    if let Some(name) = post.owner_full_name.as_deref().filter(|s| has_text(s)) {
        out.owner_full_name = Some(translator.translate(name).await);
    }
    if !post.hashtags.is_empty() {
        let mut tags = Vec::with_capacity(post.hashtags.len());
        for tag in &post.hashtags {
            tags.push(translator.translate(tag).await);
        }
        out.hashtags = Some(tags);
    }
    if let Some(comment) = post.first_comment.as_deref().filter(|s| has_text(s)) {
        out.first_comment = Some(translator.translate(comment).await);
    }

    out
}

/// Identity translator for tests and key-less deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTranslator;

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str) -> String {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat_body(content: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[tokio::test]
    async fn translates_via_chat_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&chat_body("咖啡")))
            .mount(&server)
            .await;

        let translator = HttpTranslator::new(&server.uri(), "key", "test-model");
        assert_eq!(translator.translate("coffee").await, "咖啡");
    }

    #[tokio::test]
    async fn strips_wrapping_quotes_from_model_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&chat_body("\"咖啡\"")))
            .mount(&server)
            .await;

        let translator = HttpTranslator::new(&server.uri(), "key", "test-model");
        assert_eq!(translator.translate("coffee").await, "咖啡");
    }

    #[tokio::test]
    async fn server_error_degrades_to_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let translator = HttpTranslator::new(&server.uri(), "key", "test-model");
        assert_eq!(translator.translate("coffee").await, "coffee");
    }

    #[tokio::test]
    async fn missing_api_key_skips_request() {
        // No server at all: a request attempt would hang or error loudly.
        let translator = HttpTranslator::new("http://127.0.0.1:1", "", "test-model");
        assert_eq!(translator.translate("coffee").await, "coffee");
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let translator = NoopTranslator;
        assert_eq!(translator.translate("").await, "");
        let http = HttpTranslator::new("http://127.0.0.1:1", "key", "test-model");
        assert_eq!(http.translate("   ").await, "   ");
    }

    use postintel_core::{MediaBlob, NormalizedChildren, PostKind};
    use postintel_scraper::RawPost;

    /// Appends a marker so tests can tell translated output from passthrough.
    struct MarkingTranslator;

    #[async_trait]
    impl Translator for MarkingTranslator {
        async fn translate(&self, text: &str) -> String {
            format!("{text}-译")
        }
    }

    fn stored_post(raw: RawPost) -> NormalizedPost {
        postintel_scraper::normalize_post(
            raw,
            PostKind::Image,
            MediaBlob::Unavailable,
            MediaBlob::Unavailable,
            NormalizedChildren::default(),
        )
        .expect("normalize fixture")
    }

    #[tokio::test]
    async fn post_translations_cover_every_text_field() {
        let post = stored_post(RawPost {
            id: Some("p-1".to_owned()),
            caption: Some("great coffee".to_owned()),
            alt: Some("a cup on a table".to_owned()),
            hashtags: vec!["coffee".to_owned(), "latte".to_owned()],
            owner_full_name: Some("Acme Cafe".to_owned()),
            first_comment: Some("love it".to_owned()),
            ..RawPost::default()
        });

        let t = build_post_translations(&MarkingTranslator, &post).await;

        assert_eq!(t.caption.as_deref(), Some("great coffee-译"));
        assert_eq!(t.alt.as_deref(), Some("a cup on a table-译"));
        assert_eq!(t.owner_full_name.as_deref(), Some("Acme Cafe-译"));
        assert_eq!(t.first_comment.as_deref(), Some("love it-译"));
        // Tag list stays parallel to the source list.
        assert_eq!(
            t.hashtags,
            Some(vec!["coffee-译".to_owned(), "latte-译".to_owned()])
        );
    }

    #[tokio::test]
    async fn blank_fields_are_skipped_not_translated() {
        let post = stored_post(RawPost {
            id: Some("p-2".to_owned()),
            caption: Some("   ".to_owned()),
            ..RawPost::default()
        });

        let t = build_post_translations(&MarkingTranslator, &post).await;

        assert!(t.caption.is_none());
        assert!(t.alt.is_none());
        assert!(t.owner_full_name.is_none());
        assert!(t.hashtags.is_none());
        assert!(t.first_comment.is_none());
    }

    #[tokio::test]
    async fn degraded_translator_yields_source_text_copies() {
        let post = stored_post(RawPost {
            id: Some("p-3".to_owned()),
            caption: Some("great coffee".to_owned()),
            hashtags: vec!["coffee".to_owned()],
            ..RawPost::default()
        });

        // NoopTranslator stands in for a failed HTTP pass, which also
        // returns its input unchanged.
        let t = build_post_translations(&NoopTranslator, &post).await;

        assert_eq!(t.caption.as_deref(), Some("great coffee"));
        assert_eq!(t.hashtags, Some(vec!["coffee".to_owned()]));
    }
}
