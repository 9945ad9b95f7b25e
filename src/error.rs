//! Error types for routing providers and geometry decoding.
//!
//! None of these ever escape `plan_safe_route`: a provider error only means
//! the strategy that triggered it produced no candidate.

use thiserror::Error;

/// Failure of a single routing provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {0}")]
    Status(String),

    #[error("provider returned no routes")]
    EmptyResponse,

    #[error("invalid route geometry: {0}")]
    Decode(#[from] PolylineError),

    #[error("provider unavailable: {0}")]
    Unavailable(String),
}

/// Malformed encoded polyline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("polyline ends mid-value at byte {position}")]
    Truncated { position: usize },

    #[error("invalid polyline character {byte:?} at byte {position}")]
    InvalidCharacter { position: usize, byte: char },

    #[error("polyline value overflows at byte {position}")]
    Overflow { position: usize },
}
