// Error types - nothing in the playback path is fatal, these exist so callers
// can log something meaningful and move on

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// The element refused to start (autoplay policy, decoder not ready, ...)
    #[error("playback rejected: {0}")]
    PlayRejected(String),

    #[error("failed to load '{source_ref}': {reason}")]
    Load { source_ref: String, reason: String },

    #[error("seek to {seconds:.2}s failed: {reason}")]
    Seek { seconds: f64, reason: String },

    #[error("no source loaded")]
    NoSource,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("playlist must contain at least one track")]
    EmptyPlaylist,

    #[error("video pool must contain at least one clip")]
    EmptyVideoPool,

    #[error("invalid trim for '{title}': {seconds}")]
    InvalidTrim { title: String, seconds: f64 },

    #[error("invalid timing for {name}: must be greater than zero")]
    InvalidTiming { name: &'static str },
}
