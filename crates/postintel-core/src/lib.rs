use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod keys;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use keys::{
    ApiKeys, KeyStore, ANALYSIS_API_KEY, KNOWN_KEYS, SOURCE_API_TOKEN, TRANSLATION_API_KEY,
};
pub use types::{
    ChildKind, ChildSlot, MediaBlob, NormalizedChildren, NormalizedPost, PostKind, PostOrigin,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
