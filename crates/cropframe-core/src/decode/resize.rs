//! Bitmap resampling built on the `image` crate's algorithms.

use super::{Bitmap, DecodeError, FilterType};

/// Resize a bitmap to exact dimensions.
///
/// # Arguments
///
/// * `bitmap` - The source bitmap to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Returns
///
/// A new `Bitmap` with the specified dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` when the target is empty and
/// `DecodeError::CorruptedFile` when the source buffer cannot be converted.
pub fn resize(
    bitmap: &Bitmap,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Bitmap, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if bitmap.width == width && bitmap.height == height {
        return Ok(bitmap.clone());
    }

    let rgba_image = bitmap
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))?;

    let resized = image::imageops::resize(&rgba_image, width, height, filter.to_image_filter());

    Ok(Bitmap::from_rgba_image(resized))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_bitmap(width: u32, height: u32) -> Bitmap {
        // Simple gradient so resampling has structure to work with.
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8); // R
                pixels.push(((y * 255) / height.max(1)) as u8); // G
                pixels.push(128); // B
                pixels.push(255); // A
            }
        }
        Bitmap::new(width, height, pixels)
    }

    #[test]
    fn test_resize_basic() {
        let b = create_test_bitmap(100, 50);
        let resized = resize(&b, 50, 25, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 50);
        assert_eq!(resized.height, 25);
        assert_eq!(resized.pixels.len(), 50 * 25 * 4);
    }

    #[test]
    fn test_resize_same_dimensions() {
        let b = create_test_bitmap(100, 50);
        let resized = resize(&b, 100, 50, FilterType::Bilinear).unwrap();

        assert_eq!(resized.width, 100);
        assert_eq!(resized.height, 50);
        assert_eq!(resized.pixels, b.pixels);
    }

    #[test]
    fn test_resize_upscale() {
        let b = create_test_bitmap(50, 25);
        let resized = resize(&b, 100, 50, FilterType::Lanczos3).unwrap();

        assert_eq!(resized.width, 100);
        assert_eq!(resized.height, 50);
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let b = create_test_bitmap(100, 50);

        assert!(resize(&b, 0, 50, FilterType::Bilinear).is_err());
        assert!(resize(&b, 50, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_resize_preserves_alpha() {
        let mut b = create_test_bitmap(10, 10);
        for px in b.pixels.chunks_mut(4) {
            px[3] = 0;
        }
        let resized = resize(&b, 5, 5, FilterType::Bilinear).unwrap();
        assert!(resized.pixels.chunks(4).all(|px| px[3] == 0));
    }

    #[test]
    fn test_all_filter_types() {
        let b = create_test_bitmap(100, 50);

        for filter in [
            FilterType::Nearest,
            FilterType::Bilinear,
            FilterType::Lanczos3,
        ] {
            let resized = resize(&b, 50, 25, filter).unwrap();
            assert_eq!(resized.width, 50);
            assert_eq!(resized.height, 25);
        }
    }
}
