//! Decode sizing: bound the in-memory size of the decoded source.
//!
//! Large sources are never decoded at full resolution just to be cropped
//! on screen. The sizer probes the native dimensions from the header
//! first, then picks a power-of-two downsample factor so the decoded
//! bitmap's larger side never exceeds the working-size bound. The factor
//! is only applied when the native size exceeds both the bound and the
//! requested output size.

use std::io::Cursor;

use image::ImageReader;
use tracing::debug;

use super::{resize, Bitmap, DecodeError, FilterType};

/// Largest side a bounded decode may produce, in pixels.
///
/// Sources whose larger side stays within `max(output size, this)` are
/// decoded as-is.
pub const MIN_WORKING_SIZE: u32 = 512;

/// Read the native dimensions from the image header without decoding
/// pixel data.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` when the bytes are not a
/// recognized image format, `DecodeError::CorruptedFile` when the header
/// cannot be parsed.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Choose the power-of-two downsample factor for a bounded decode.
///
/// Returns 1 unless the larger native side exceeds
/// `max(max(output_width, output_height), MIN_WORKING_SIZE)`; past that
/// threshold the factor is the smallest power of two that brings the
/// larger side down to `MIN_WORKING_SIZE` or less.
pub fn sample_size(
    native_width: u32,
    native_height: u32,
    output_width: u32,
    output_height: u32,
) -> u32 {
    let largest = native_width.max(native_height);
    let threshold = output_width.max(output_height).max(MIN_WORKING_SIZE);
    if largest <= threshold {
        return 1;
    }

    let mut factor = 1;
    while largest / factor > MIN_WORKING_SIZE {
        factor *= 2;
    }
    factor
}

/// Decode an image, downsampled so its in-memory size stays bounded.
///
/// The header is probed first so the full-size bitmap is only
/// materialized transiently during the decode itself; the returned bitmap
/// is at most `MIN_WORKING_SIZE` on its larger side whenever downsampling
/// was warranted.
///
/// # Arguments
///
/// * `bytes` - Raw image bytes (any format the `image` crate recognizes)
/// * `output_width`, `output_height` - Requested output dimensions
///   (0 = unspecified), which raise the downsampling threshold
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for unrecognized data and
/// `DecodeError::CorruptedFile` for data that fails to decode.
pub fn decode_bounded(
    bytes: &[u8],
    output_width: u32,
    output_height: u32,
) -> Result<Bitmap, DecodeError> {
    let (native_width, native_height) = probe_dimensions(bytes)?;
    let factor = sample_size(native_width, native_height, output_width, output_height);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let mut bitmap = Bitmap::from_rgba_image(img.into_rgba8());
    if factor > 1 {
        let width = (native_width / factor).max(1);
        let height = (native_height / factor).max(1);
        debug!(
            native_width,
            native_height, factor, width, height, "downsampling decoded source"
        );
        bitmap = resize(&bitmap, width, height, FilterType::Bilinear)?;
    }
    Ok(bitmap)
}
