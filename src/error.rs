//! Crate-wide error taxonomy.
//!
//! Mirrors the taxonomy in SPEC_FULL.md §7: `Network`, `BadPayload`,
//! `OutOfOrder`, and `UnsupportedPair` are surfaced to callers (the last
//! synchronously, from the factory; the rest close the follower's output
//! streams). `Stale` is not a variant here — a stale diff is not an error,
//! it is silently discarded by the reconciler.

use thiserror::Error;

/// Errors a market follower can encounter.
#[derive(Debug, Error)]
pub enum FollowerError {
    /// Dial, read, or HTTP failure talking to the venue.
    #[error("network error: {0}")]
    Network(String),

    /// A JSON envelope or inner payload was missing fields, the wrong
    /// shape, or contained a number that failed to parse.
    #[error("bad payload: {0}")]
    BadPayload(String),

    /// The diff stream has a sequence gap relative to the book's
    /// `last_update_id`; the stream must be considered desynchronized.
    #[error("out of order: expected first_update_id <= {expected}, got {actual}")]
    OutOfOrder { expected: u64, actual: u64 },

    /// The factory was asked to follow a pair this venue/follower does
    /// not support.
    #[error("unsupported pair: {0}")]
    UnsupportedPair(String),
}

impl From<reqwest::Error> for FollowerError {
    fn from(err: reqwest::Error) -> Self {
        FollowerError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FollowerError {
    fn from(err: serde_json::Error) -> Self {
        FollowerError::BadPayload(err.to_string())
    }
}

impl From<rust_decimal::Error> for FollowerError {
    fn from(err: rust_decimal::Error) -> Self {
        FollowerError::BadPayload(format!("decimal parse error: {err}"))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for FollowerError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        FollowerError::Network(err.to_string())
    }
}

pub type FollowerResult<T> = Result<T, FollowerError>;
