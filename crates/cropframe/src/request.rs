//! Crop request configuration.
//!
//! [`CropRequest`] is the fluent entry point for a session: source and
//! destination locations plus the optional aspect, output-size, scaling
//! and masking settings. Presentation parameters travel through untouched
//! as [`ChromeStyle`]; the engine never interprets them.

use std::path::{Path, PathBuf};

use cropframe_core::{AspectRatio, OutputOptions};
use serde::{Deserialize, Serialize};

use crate::error::{CropError, Result};

/// Opaque presentation parameters, forwarded verbatim to whatever layer
/// draws the crop chrome. None of these affect geometry or output pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromeStyle {
    pub highlight_color: Option<u32>,
    pub highlight_selected_color: Option<u32>,
    pub vertical_icon: Option<u32>,
    pub horizontal_icon: Option<u32>,
    pub border_size: Option<u32>,
}

/// Configuration for a crop session.
///
/// # Example
///
/// ```ignore
/// use cropframe::CropRequest;
///
/// let request = CropRequest::new("portrait.jpg", "avatar.png")
///     .output_size(256, 256)
///     .circle_crop(true);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropRequest {
    source: PathBuf,
    destination: PathBuf,
    aspect_x: u32,
    aspect_y: u32,
    output_width: u32,
    output_height: u32,
    scale: bool,
    scale_up_if_needed: bool,
    circle_crop: bool,
    chrome: ChromeStyle,
}

impl CropRequest {
    /// Create a request for cropping `source` into `destination`.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            aspect_x: 0,
            aspect_y: 0,
            output_width: 0,
            output_height: 0,
            scale: true,
            scale_up_if_needed: true,
            circle_crop: false,
            chrome: ChromeStyle::default(),
        }
    }

    /// Constrain the crop rectangle to a fixed x:y ratio. Zero in either
    /// component leaves the rectangle free-form.
    pub fn aspect_ratio(mut self, x: u32, y: u32) -> Self {
        self.aspect_x = x;
        self.aspect_y = y;
        self
    }

    /// Request output dimensions. Zero in either component disables the
    /// resize stage entirely.
    pub fn output_size(mut self, width: u32, height: u32) -> Self {
        self.output_width = width;
        self.output_height = height;
        self
    }

    /// `true` (the default) scales the crop to fit the output size;
    /// `false` centers it on a padded canvas instead.
    pub fn scale(mut self, scale: bool) -> Self {
        self.scale = scale;
        self
    }

    /// Permit enlarging a crop smaller than the output size. Defaults to
    /// `true`.
    pub fn scale_up_if_needed(mut self, scale_up: bool) -> Self {
        self.scale_up_if_needed = scale_up;
        self
    }

    /// Clip the output to its inscribed circle. Implies a 1:1 aspect.
    pub fn circle_crop(mut self, circle: bool) -> Self {
        self.circle_crop = circle;
        self
    }

    /// Attach presentation parameters for the drawing layer.
    pub fn chrome(mut self, chrome: ChromeStyle) -> Self {
        self.chrome = chrome;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub(crate) fn chrome_style(&self) -> &ChromeStyle {
        &self.chrome
    }

    /// Fail fast on a missing source or destination reference.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            return Err(CropError::Configuration(
                "source path must not be empty".to_string(),
            ));
        }
        if self.destination.as_os_str().is_empty() {
            return Err(CropError::Configuration(
                "destination path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The effective aspect constraint.
    ///
    /// Circle crops are structurally 1:1. Otherwise an explicit ratio
    /// wins, and failing that a requested output size implies a
    /// `floor(long/short):1` constraint oriented like the output.
    pub(crate) fn resolved_aspect(&self) -> Option<AspectRatio> {
        if self.circle_crop {
            return AspectRatio::new(1, 1);
        }
        if let Some(aspect) = AspectRatio::new(self.aspect_x, self.aspect_y) {
            return Some(aspect);
        }
        if self.output_width != 0 && self.output_height != 0 {
            return if self.output_width > self.output_height {
                AspectRatio::new(self.output_width / self.output_height, 1)
            } else {
                AspectRatio::new(1, self.output_height / self.output_width)
            };
        }
        None
    }

    pub(crate) fn output_options(&self) -> OutputOptions {
        OutputOptions {
            target_width: self.output_width,
            target_height: self.output_height,
            scale_to_fit: self.scale,
            scale_up_if_needed: self.scale_up_if_needed,
            circle_crop: self.circle_crop,
        }
    }
}
