//! The crop session error taxonomy.
//!
//! Only four classes of failure ever surface to the caller:
//! configuration, decode, composition and persistence (encoding counts as
//! the first step of persistence). Geometry and gesture misses are plain
//! values (`EdgeHandle::None`, unhandled events), never errors.

use cropframe_core::{ComposeError, DecodeError, EncodeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    /// Missing or invalid source/destination reference. Raised before any
    /// geometry session starts; fatal to the session.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The source cannot be decoded; the session aborts.
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Composition failed at commit time; the session stays interactive
    /// and the save may be retried.
    #[error("Composition failed: {0}")]
    Compose(#[from] ComposeError),

    /// The final bitmap could not be encoded for the destination.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] EncodeError),

    /// Writing the final bitmap to the destination failed; the save is
    /// reported as cancelled.
    #[error("Failed to write output: {0}")]
    Persistence(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CropError>;
