//! Cropframe Core - interactive crop geometry and output compositing
//!
//! This crate is the pure engine behind a crop session: the crop-rectangle
//! model with hit-testing and constrained edits, the pan/zoom display
//! transform, the gesture state machine that ties the two together, and
//! the pipeline that turns a committed rectangle into the final bitmap.
//!
//! Everything here operates on in-memory buffers and byte slices; file
//! access, threading and session lifecycle live in the `cropframe` crate.
//!
//! # Module Overview
//!
//! - [`geometry`] - crop rectangle types and the constrained edit model
//! - [`viewport`] - image-to-screen transform, zoom bounds, re-centering
//! - [`gesture`] - pointer/pinch state machine driving the two above
//! - [`compose`] - crop extraction, circular masking, output sizing
//! - [`decode`] - header probe, bounded decode, resampling
//! - [`encode`] - PNG encoding of the final bitmap

pub mod compose;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod gesture;
pub mod viewport;

pub use compose::{apply_circle_mask, compose, ComposeError, OutputOptions};
pub use decode::{
    decode_bounded, probe_dimensions, sample_size, Bitmap, DecodeError, FilterType,
    MIN_WORKING_SIZE,
};
pub use encode::{encode_png, EncodeError};
pub use geometry::{AspectRatio, CropModel, CropRect, EdgeHandle, ModifyMode, MIN_CROP_SIZE};
pub use gesture::{ControllerState, GestureController, GestureEvent, TOUCH_TOLERANCE};
pub use viewport::{DisplayMatrix, Viewport};
