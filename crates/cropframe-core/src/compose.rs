//! Output composition: crop extraction, circular masking and final sizing.
//!
//! Given the source bitmap, the committed crop rectangle (image space) and
//! the output options, composition runs in a fixed order:
//!
//! 1. Extract the crop subrectangle into a fresh RGBA buffer.
//! 2. Apply the circular alpha mask when requested.
//! 3. When a target size is set, either resample to exactly that size
//!    (scale-to-fit) or center the crop on a transparent canvas of that
//!    size (fill mode).
//!
//! The pipeline is deterministic: the same source, rectangle and options
//! always produce byte-identical output.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::decode::{resize, Bitmap, FilterType};
use crate::geometry::CropRect;

/// Errors that can occur while composing the output bitmap.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The committed crop rectangle encloses no pixels.
    #[error("Crop rectangle has zero area")]
    EmptyCrop,

    /// An output buffer could not be allocated.
    #[error("Cannot allocate a {width}x{height} output buffer")]
    Allocation { width: u32, height: u32 },

    /// Resampling to the target size failed.
    #[error("Resampling failed: {0}")]
    Resample(String),
}

/// Options controlling the composed output.
///
/// A zero `target_width`/`target_height` means no resize stage runs at
/// all; the output keeps the crop rectangle's own dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputOptions {
    /// Requested output width (0 = unspecified).
    pub target_width: u32,
    /// Requested output height (0 = unspecified).
    pub target_height: u32,
    /// Resample to exactly the target size; otherwise fill-and-center.
    pub scale_to_fit: bool,
    /// Permit enlarging when the crop is smaller than the target.
    pub scale_up_if_needed: bool,
    /// Clip the crop to its inscribed circle, clearing the outside.
    pub circle_crop: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            target_width: 0,
            target_height: 0,
            scale_to_fit: true,
            scale_up_if_needed: true,
            circle_crop: false,
        }
    }
}

/// Compose the final output bitmap.
///
/// # Arguments
///
/// * `source` - The decoded source bitmap
/// * `rect` - The committed crop rectangle in image space; edges are
///   rounded to whole pixels and clamped to the source bounds
/// * `options` - Output sizing and masking options
///
/// # Errors
///
/// Returns `ComposeError::EmptyCrop` when the rounded rectangle encloses
/// no pixels, `ComposeError::Allocation` when a buffer cannot be
/// allocated. Failures are never swallowed; no partial output is
/// produced.
pub fn compose(
    source: &Bitmap,
    rect: &CropRect,
    options: &OutputOptions,
) -> Result<Bitmap, ComposeError> {
    let (left, top, width, height) = pixel_rect(rect, source.width, source.height)?;
    debug!(left, top, width, height, "extracting crop rectangle");

    let mut output = extract(source, left, top, width, height)?;

    if options.circle_crop {
        apply_circle_mask(&mut output);
    }

    if options.target_width != 0 && options.target_height != 0 {
        output = if options.scale_to_fit {
            scale_to_fit(
                output,
                options.target_width,
                options.target_height,
                options.scale_up_if_needed,
            )?
        } else {
            fill_and_center(&output, options.target_width, options.target_height)?
        };
    }

    Ok(output)
}

/// Clear everything outside the bitmap's inscribed circle to transparent.
///
/// The radius is always `width / 2`, even when the bitmap is not square.
/// The width-based radius is deliberate; this is not an ellipse
/// approximation.
pub fn apply_circle_mask(bitmap: &mut Bitmap) {
    let cx = bitmap.width as f32 / 2.0;
    let cy = bitmap.height as f32 / 2.0;
    let radius = bitmap.width as f32 / 2.0;
    let width = bitmap.width as usize;

    for y in 0..bitmap.height {
        for x in 0..bitmap.width {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if (dx * dx + dy * dy).sqrt() > radius {
                let idx = (y as usize * width + x as usize) * 4;
                bitmap.pixels[idx..idx + 4].copy_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
}

/// Round the crop rectangle to whole pixels and clamp it to the source.
fn pixel_rect(rect: &CropRect, width: u32, height: u32) -> Result<(u32, u32, u32, u32), ComposeError> {
    let left = rect.left.round().clamp(0.0, width as f32) as u32;
    let top = rect.top.round().clamp(0.0, height as f32) as u32;
    let right = rect.right.round().clamp(0.0, width as f32) as u32;
    let bottom = rect.bottom.round().clamp(0.0, height as f32) as u32;

    if right <= left || bottom <= top {
        return Err(ComposeError::EmptyCrop);
    }
    Ok((left, top, right - left, bottom - top))
}

/// Allocate a cleared RGBA buffer, validating the size arithmetic.
fn alloc_rgba(width: u32, height: u32) -> Result<Vec<u8>, ComposeError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .map(|bytes| vec![0u8; bytes])
        .ok_or(ComposeError::Allocation { width, height })
}

/// Copy the crop subrectangle out of the source, row by row.
fn extract(
    source: &Bitmap,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
) -> Result<Bitmap, ComposeError> {
    let mut output = alloc_rgba(width, height)?;
    let row_len = width as usize * 4;

    for y in 0..height {
        let src_start =
            ((top + y) as usize * source.width as usize + left as usize) * 4;
        let dst_start = y as usize * row_len;
        output[dst_start..dst_start + row_len]
            .copy_from_slice(&source.pixels[src_start..src_start + row_len]);
    }

    Ok(Bitmap::new(width, height, output))
}

/// Resample to exactly the target size.
///
/// With `scale_up` off, a crop smaller than the target on both axes
/// passes through unchanged; the output is never enlarged.
fn scale_to_fit(
    bitmap: Bitmap,
    target_width: u32,
    target_height: u32,
    scale_up: bool,
) -> Result<Bitmap, ComposeError> {
    if bitmap.width == target_width && bitmap.height == target_height {
        return Ok(bitmap);
    }
    if !scale_up && bitmap.width <= target_width && bitmap.height <= target_height {
        debug!(
            width = bitmap.width,
            height = bitmap.height,
            target_width,
            target_height,
            "crop smaller than target and scale-up disabled, passing through"
        );
        return Ok(bitmap);
    }
    resize(&bitmap, target_width, target_height, FilterType::Bilinear)
        .map_err(|e| ComposeError::Resample(e.to_string()))
}

/// Center the crop on a transparent canvas of the target size.
///
/// Offsets use integer `(difference) / 2` per axis; when the crop is
/// larger than the canvas its center region is used, and uncovered canvas
/// stays transparent.
fn fill_and_center(
    source: &Bitmap,
    target_width: u32,
    target_height: u32,
) -> Result<Bitmap, ComposeError> {
    let mut canvas = alloc_rgba(target_width, target_height)?;

    let dx = (source.width as i64 - target_width as i64) / 2;
    let dy = (source.height as i64 - target_height as i64) / 2;
    let src_x = dx.max(0) as u32;
    let src_y = dy.max(0) as u32;
    let dst_x = (-dx).max(0) as u32;
    let dst_y = (-dy).max(0) as u32;
    let copy_w = (source.width - src_x).min(target_width - dst_x);
    let copy_h = (source.height - src_y).min(target_height - dst_y);

    let row_len = copy_w as usize * 4;
    for y in 0..copy_h {
        let src_start =
            ((src_y + y) as usize * source.width as usize + src_x as usize) * 4;
        let dst_start =
            ((dst_y + y) as usize * target_width as usize + dst_x as usize) * 4;
        canvas[dst_start..dst_start + row_len]
            .copy_from_slice(&source.pixels[src_start..src_start + row_len]);
    }

    Ok(Bitmap::new(target_width, target_height, canvas))
}
