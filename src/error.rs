//! Censor error types

use thiserror::Error;

/// Censor error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid detector pattern
    #[error("Pattern error: {0}")]
    Pattern(String),

    /// A detector could not serve a pass
    #[error("Detector unavailable for {pass} pass: {reason}")]
    DetectorUnavailable { pass: String, reason: String },

    /// Span offsets that do not fit the text they were detected in
    #[error("Invalid span {start}..{end} for text of {len} bytes")]
    InvalidSpan { start: usize, end: usize, len: usize },

    /// A document task died before producing a result
    #[error("Batch error: {0}")]
    Batch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Input pattern error
    #[error("Glob error: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Result type alias for Censor operations
pub type Result<T> = std::result::Result<T, Error>;
