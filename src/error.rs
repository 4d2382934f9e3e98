//! Error types for the map pipeline.
//!
//! Most of the pipeline fails soft: a bad polyline becomes an empty route and a
//! failed road fetch becomes an empty road layer. These errors are what those
//! boundaries see before they log and discard them.

use thiserror::Error;

/// Reasons an encoded polyline could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// The string ended in the middle of a value, or a latitude had no longitude.
    #[error("polyline truncated at byte {offset}")]
    Truncated { offset: usize },
    /// A byte outside the printable range the encoding uses (63..=126).
    #[error("invalid polyline character {character:?} at byte {offset}")]
    InvalidCharacter { offset: usize, character: char },
    /// A single value used more continuation chunks than fit in 32 bits.
    #[error("polyline value overflows at byte {offset}")]
    Overflow { offset: usize },
}

/// Errors surfaced by the map crate.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("polyline decode failed: {0}")]
    Polyline(#[from] PolylineError),

    #[cfg(feature = "http")]
    #[error("road request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("road provider returned HTTP {0}")]
    Status(u16),

    #[cfg(feature = "serde")]
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("road provider gave up after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, MapError>;
