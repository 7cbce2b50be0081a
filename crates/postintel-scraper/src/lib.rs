pub mod classify;
pub mod client;
pub mod error;
pub mod media;
pub mod normalize;
mod retry;
pub mod types;

pub use classify::{classify, Classification};
pub use client::SourceClient;
pub use error::ScraperError;
pub use media::{MediaKind, MediaMaterializer, MAX_VIDEO_BYTES};
pub use normalize::{normalize_post, normalize_profile, NormalizedProfile};
pub use types::{RawChild, RawComment, RawPost, RawProfile, RawUrlItem};
