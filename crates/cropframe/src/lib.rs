//! Cropframe - interactive image crop sessions
//!
//! This crate binds the `cropframe-core` engine to a host application: it
//! validates the crop configuration, decodes the source from disk with a
//! bounded memory footprint, routes gesture events into the geometry
//! engine, and runs the commit pipeline (compose, PNG-encode, persist) on
//! a worker thread with a one-shot completion handoff.
//!
//! # Usage
//!
//! ```ignore
//! use cropframe::{CropRequest, CropSession, GestureEvent};
//!
//! let request = CropRequest::new("photo.jpg", "avatar.png")
//!     .output_size(256, 256)
//!     .circle_crop(true);
//!
//! let mut session = CropSession::begin(request, view_w, view_h)?;
//! session.handle_event(GestureEvent::PointerDown { x, y });
//! // ... more events ...
//! let report = session.begin_save().unwrap().wait()?;
//! println!("saved to {} ({}°)", report.path.display(), report.orientation_degrees);
//! ```
//!
//! The library installs no tracing subscriber; hosts that want the
//! session's log output configure their own.

mod error;
mod request;
mod session;

pub use error::{CropError, Result};
pub use request::{ChromeStyle, CropRequest};
pub use session::{CropSession, SaveHandle, SaveReport};

// Re-export the core types a host needs to drive and draw a session.
pub use cropframe_core::{
    AspectRatio, Bitmap, ControllerState, CropRect, DisplayMatrix, EdgeHandle, GestureEvent,
    OutputOptions,
};
