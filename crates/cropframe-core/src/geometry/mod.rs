//! Crop-rectangle geometry: data types and the constrained edit model.
//!
//! This module owns everything about the crop rectangle itself:
//!
//! - [`CropRect`], [`AspectRatio`], [`EdgeHandle`] and [`ModifyMode`]: the
//!   plain data types shared with the gesture and composition layers
//! - [`CropModel`]: hit-testing and the constrained move/grow operations
//!
//! # Coordinate System
//!
//! All rectangle coordinates are in image space (pixels of the decoded
//! source, origin at the top-left corner). Screen coordinates appear only
//! at the hit-test boundary, where they are mapped through the display
//! matrix.

mod model;
mod rect;

pub use model::{CropModel, MIN_CROP_SIZE};
pub use rect::{AspectRatio, CropRect, EdgeHandle, ModifyMode};
