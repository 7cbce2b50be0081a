use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Base URL of the post-scraping gateway (the only upstream that serves
    /// raw posts, profiles, and hashtag searches).
    pub source_base_url: String,
    /// Base URL of the chat-completions endpoint used for analysis and
    /// translation.
    pub llm_base_url: String,
    /// Multimodal model used for post analysis.
    pub analysis_model: String,
    /// Text model used for best-effort translation.
    pub translation_model: String,
    pub analysis_request_timeout_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Timeout for one scraping-gateway request. Scrape runs on the upstream
    /// side can take minutes, so this is generous.
    pub source_request_timeout_secs: u64,
    pub source_max_retries: u32,
    pub source_retry_backoff_base_secs: u64,
    /// Image downloads are small; fail fast.
    pub image_fetch_timeout_secs: u64,
    /// Video downloads stream for a while before the size ceiling can kick in.
    pub video_fetch_timeout_secs: u64,
    pub video_max_bytes: u64,
    /// Upper bound on incremental-refresh iterations per competitor.
    pub max_refresh_iterations: u32,
    /// Worker-pool width for materializing one post's child media.
    pub child_fetch_concurrency: usize,
    /// Cron expression for the daily competitor refresh.
    pub refresh_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("source_base_url", &self.source_base_url)
            .field("llm_base_url", &self.llm_base_url)
            .field("analysis_model", &self.analysis_model)
            .field("translation_model", &self.translation_model)
            .field(
                "analysis_request_timeout_secs",
                &self.analysis_request_timeout_secs,
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "source_request_timeout_secs",
                &self.source_request_timeout_secs,
            )
            .field("source_max_retries", &self.source_max_retries)
            .field(
                "source_retry_backoff_base_secs",
                &self.source_retry_backoff_base_secs,
            )
            .field("image_fetch_timeout_secs", &self.image_fetch_timeout_secs)
            .field("video_fetch_timeout_secs", &self.video_fetch_timeout_secs)
            .field("video_max_bytes", &self.video_max_bytes)
            .field("max_refresh_iterations", &self.max_refresh_iterations)
            .field("child_fetch_concurrency", &self.child_fetch_concurrency)
            .field("refresh_cron", &self.refresh_cron)
            .finish()
    }
}
