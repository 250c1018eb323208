//! Image encoding pipeline for Cropframe.
//!
//! The final composited bitmap is encoded as PNG before being handed to
//! the persistence layer. PNG keeps the alpha channel intact, which the
//! circular mask and fill-mode padding depend on.

mod png;

pub use png::{encode_png, EncodeError};
