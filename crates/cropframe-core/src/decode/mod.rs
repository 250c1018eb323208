//! Image decoding pipeline for Cropframe.
//!
//! This module provides functionality for:
//! - Probing native dimensions from the header without decoding pixels
//! - Choosing a power-of-two downsample factor to bound decode memory
//! - Decoding the source into an RGBA [`Bitmap`]
//! - Resampling bitmaps
//!
//! # Memory Strategy
//!
//! A crop session never needs the source at full resolution: the decoded
//! bitmap only has to be large enough for on-screen manipulation and the
//! requested output size. [`decode_bounded`] probes the header first and
//! downsamples past [`MIN_WORKING_SIZE`], so a 50-megapixel source costs
//! a fraction of its native footprint for the lifetime of the session.

mod resize;
mod sizer;
mod types;

pub use resize::resize;
pub use sizer::{decode_bounded, probe_dimensions, sample_size, MIN_WORKING_SIZE};
pub use types::{Bitmap, DecodeError, FilterType};
