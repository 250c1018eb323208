//! The interactive crop session.
//!
//! A [`CropSession`] ties the core engine together for one source image:
//! it decodes the source (bounded), owns the geometry model, viewport and
//! gesture controller, tracks user rotation, and runs the save pipeline.
//!
//! # Threading Contract
//!
//! All gesture handling, geometry mutation and drawing state belong to
//! the single thread that owns the session; none of it is locked. Only
//! the save pipeline leaves that thread: [`CropSession::begin_save`]
//! snapshots the rectangle synchronously, flips the save guard, and hands
//! compose/encode/write to a worker. The worker resolves a bounded
//! one-shot channel exactly once, so the caller resumes once per save,
//! ordered after every event dispatched before the commit. While the
//! guard is up, gesture events are ignored and further save requests are
//! no-ops; there is no cancellation of an in-flight save.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use cropframe_core::{
    compose, decode_bounded, encode_png, Bitmap, CropModel, CropRect, DisplayMatrix,
    GestureController, GestureEvent, OutputOptions, Viewport,
};
use tracing::{debug, info, warn};

use crate::error::{CropError, Result};
use crate::request::{ChromeStyle, CropRequest};

/// The outcome of a completed save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Where the encoded bitmap was written.
    pub path: PathBuf,
    /// Net user rotation, normalized to {0, 90, 180, 270} degrees.
    pub orientation_degrees: i32,
}

/// One-shot handle to an in-flight save.
pub struct SaveHandle {
    receiver: Receiver<Result<SaveReport>>,
}

impl SaveHandle {
    /// Block until the save worker resolves. Resumes exactly once.
    pub fn wait(self) -> Result<SaveReport> {
        self.receiver.recv().unwrap_or_else(|_| {
            Err(CropError::Persistence(std::io::Error::other(
                "save worker disconnected before resolving",
            )))
        })
    }
}

/// An interactive crop session over one decoded source image.
pub struct CropSession {
    bitmap: Bitmap,
    model: CropModel,
    viewport: Viewport,
    controller: GestureController,
    options: OutputOptions,
    aspect: Option<cropframe_core::AspectRatio>,
    chrome: ChromeStyle,
    destination: PathBuf,
    view_width: u32,
    view_height: u32,
    rotation_degrees: i32,
    saving: Arc<AtomicBool>,
}

impl CropSession {
    /// Validate the request, decode the source and set up the default
    /// crop rectangle and viewport.
    ///
    /// # Errors
    ///
    /// `CropError::Configuration` for a missing/unreadable source or an
    /// empty destination; `CropError::Decode` when the source bytes
    /// cannot be decoded.
    pub fn begin(request: CropRequest, view_width: u32, view_height: u32) -> Result<Self> {
        request.validate()?;

        let bytes = std::fs::read(request.source()).map_err(|e| {
            CropError::Configuration(format!(
                "cannot read source {}: {}",
                request.source().display(),
                e
            ))
        })?;

        let options = request.output_options();
        let bitmap = decode_bounded(&bytes, options.target_width, options.target_height)?;
        let aspect = request.resolved_aspect();
        info!(
            width = bitmap.width,
            height = bitmap.height,
            output_width = options.target_width,
            output_height = options.target_height,
            ?aspect,
            "crop session started"
        );

        let model = CropModel::new(bitmap.width, bitmap.height, aspect);
        let viewport = Viewport::new(view_width, view_height, bitmap.width, bitmap.height);
        Ok(Self {
            bitmap,
            model,
            viewport,
            controller: GestureController::new(),
            options,
            aspect,
            chrome: request.chrome_style().clone(),
            destination: request.destination().to_path_buf(),
            view_width,
            view_height,
            rotation_degrees: 0,
            saving: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The decoded source bitmap the session is working on.
    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Snapshot of the current crop rectangle in image space.
    pub fn crop_rect(&self) -> CropRect {
        self.model.rect()
    }

    /// The current image-to-screen transform, for drawing.
    pub fn matrix(&self) -> DisplayMatrix {
        self.viewport.matrix()
    }

    /// Presentation parameters, exactly as configured.
    pub fn chrome(&self) -> &ChromeStyle {
        &self.chrome
    }

    /// Net user rotation so far, normalized to {0, 90, 180, 270}.
    pub fn orientation_degrees(&self) -> i32 {
        self.rotation_degrees
    }

    /// Whether a save is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Dispatch a gesture event. Returns false (unhandled) for events that
    /// hit nothing and for all input while a save is in flight.
    pub fn handle_event(&mut self, event: GestureEvent) -> bool {
        if self.is_saving() {
            return false;
        }
        self.controller
            .handle_event(event, &mut self.model, &mut self.viewport)
    }

    /// Advance viewport animation by `elapsed_ms`.
    pub fn tick(&mut self, elapsed_ms: f32) {
        self.viewport.tick(elapsed_ms);
    }

    /// Rotate the source a quarter turn counter-clockwise.
    pub fn rotate_left(&mut self) {
        self.rotate(-90);
    }

    /// Rotate the source a quarter turn clockwise.
    pub fn rotate_right(&mut self) {
        self.rotate(90);
    }

    fn rotate(&mut self, degrees: i32) {
        self.bitmap = self.bitmap.rotated_quarter(degrees > 0);
        self.rotation_degrees = (self.rotation_degrees + degrees).rem_euclid(360);
        // Dimensions swapped: rebuild the default rectangle and viewport.
        self.model = CropModel::new(self.bitmap.width, self.bitmap.height, self.aspect);
        self.viewport = Viewport::new(
            self.view_width,
            self.view_height,
            self.bitmap.width,
            self.bitmap.height,
        );
        debug!(degrees, net = self.rotation_degrees, "source rotated");
    }

    /// Commit the crop: snapshot the rectangle and hand composition,
    /// encoding and writing to a worker thread.
    ///
    /// At most one save runs at a time. The first call in a guard window
    /// returns a [`SaveHandle`]; any further call while that save is in
    /// flight is a no-op returning `None`. The guard clears when the
    /// worker finishes, whether it succeeded or failed, so a failed save
    /// can be retried.
    pub fn begin_save(&mut self) -> Option<SaveHandle> {
        if self.saving.swap(true, Ordering::SeqCst) {
            debug!("save already in progress, ignoring");
            return None;
        }

        let rect = self.model.rect();
        info!(
            width = rect.width(),
            height = rect.height(),
            "committing crop rectangle"
        );

        let bitmap = self.bitmap.clone();
        let options = self.options;
        let destination = self.destination.clone();
        let degrees = self.rotation_degrees;
        let guard = Arc::clone(&self.saving);
        let (tx, rx) = mpsc::sync_channel(1);

        thread::spawn(move || {
            let result = save_output(&bitmap, &rect, &options, destination, degrees);
            if let Err(e) = &result {
                warn!(error = %e, "save failed");
            }
            guard.store(false, Ordering::SeqCst);
            // The caller may have dropped the handle; that is not an error.
            let _ = tx.send(result);
        });

        Some(SaveHandle { receiver: rx })
    }

    #[cfg(test)]
    fn force_saving(&self, value: bool) {
        self.saving.store(value, Ordering::SeqCst);
    }
}

/// Compose, encode and persist the committed crop.
fn save_output(
    bitmap: &Bitmap,
    rect: &CropRect,
    options: &OutputOptions,
    destination: PathBuf,
    orientation_degrees: i32,
) -> Result<SaveReport> {
    let output = compose(bitmap, rect, options)?;
    let png = encode_png(&output)?;
    std::fs::write(&destination, png)?;
    info!(
        path = %destination.display(),
        width = output.width,
        height = output.height,
        "cropped image saved"
    );
    Ok(SaveReport {
        path: destination,
        orientation_degrees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Write a solid red PNG source and return (dir, source path).
    fn red_source(width: u32, height: u32) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("source.png");
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        std::fs::write(&path, bytes).unwrap();
        (dir, path)
    }

    fn session(width: u32, height: u32) -> (tempfile::TempDir, CropSession, PathBuf) {
        let (dir, source) = red_source(width, height);
        let destination = dir.path().join("out.png");
        let request = CropRequest::new(source, destination.clone());
        let session = CropSession::begin(request, 200, 200).unwrap();
        (dir, session, destination)
    }

    #[test]
    fn test_begin_rejects_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let request = CropRequest::new(dir.path().join("absent.png"), dir.path().join("out.png"));
        let result = CropSession::begin(request, 200, 200);
        assert!(matches!(result, Err(CropError::Configuration(_))));
    }

    #[test]
    fn test_begin_rejects_undecodable_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bogus.png");
        std::fs::write(&source, [0u8, 1, 2, 3]).unwrap();
        let request = CropRequest::new(source, dir.path().join("out.png"));
        let result = CropSession::begin(request, 200, 200);
        assert!(matches!(result, Err(CropError::Decode(_))));
    }

    #[test]
    fn test_begin_builds_default_rect() {
        let (_dir, session, _) = session(64, 64);
        let rect = session.crop_rect();
        // 4/5 of 64, centered.
        assert!((rect.width() - 51.2).abs() < 1e-3);
        assert_eq!(rect.center_x(), 32.0);
        assert_eq!(session.orientation_degrees(), 0);
    }

    #[test]
    fn test_save_round_trip() {
        let (_dir, mut session, destination) = session(64, 64);

        let handle = session.begin_save().expect("first save should start");
        let report = handle.wait().unwrap();

        assert_eq!(report.path, destination);
        assert_eq!(report.orientation_degrees, 0);
        assert!(!session.is_saving());

        // Default rect (6.4..57.6) rounds to 2..? -> 52x52 output.
        let bytes = std::fs::read(&destination).unwrap();
        let saved = cropframe_core::decode_bounded(&bytes, 0, 0).unwrap();
        assert_eq!(saved.width, 52);
        assert_eq!(saved.height, 52);
        assert_eq!(saved.pixel(26, 26), [255, 0, 0, 255]);
    }

    #[test]
    fn test_save_guard_window_is_at_most_once() {
        let (_dir, mut session, _) = session(64, 64);

        session.force_saving(true);
        assert!(session.begin_save().is_none());
        assert!(!session.handle_event(GestureEvent::PointerDown { x: 100.0, y: 100.0 }));
        assert!(!session.handle_event(GestureEvent::PinchBegin));

        session.force_saving(false);
        assert!(session.begin_save().is_some());
    }

    #[test]
    fn test_save_can_run_again_after_completion() {
        let (_dir, mut session, _) = session(64, 64);

        let first = session.begin_save().unwrap();
        first.wait().unwrap();
        assert!(!session.is_saving());

        let second = session.begin_save().expect("guard cleared after completion");
        second.wait().unwrap();
    }

    #[test]
    fn test_persistence_failure_clears_guard() {
        let (dir, source) = red_source(64, 64);
        // Destination directory does not exist: the write must fail.
        let destination = dir.path().join("missing").join("out.png");
        let request = CropRequest::new(source, destination);
        let mut session = CropSession::begin(request, 200, 200).unwrap();

        let handle = session.begin_save().unwrap();
        let result = handle.wait();
        assert!(matches!(result, Err(CropError::Persistence(_))));

        // Session stays interactive: the guard is down and events flow.
        assert!(!session.is_saving());
        assert!(session.handle_event(GestureEvent::PinchBegin));
    }

    #[test]
    fn test_events_mutate_geometry() {
        let (_dir, mut session, _) = session(64, 64);
        let before = session.crop_rect();

        assert!(session.handle_event(GestureEvent::PinchBegin));
        assert!(session.handle_event(GestureEvent::PinchUpdate { factor: 0.8 }));
        assert!(session.handle_event(GestureEvent::PinchEnd));

        let after = session.crop_rect();
        assert!(after.width() < before.width());
    }

    #[test]
    fn test_rotation_accumulates_and_normalizes() {
        let (_dir, mut session, _) = session(64, 32);
        assert_eq!(session.bitmap().width, 64);

        session.rotate_left();
        assert_eq!(session.orientation_degrees(), 270);
        assert_eq!(session.bitmap().width, 32);
        assert_eq!(session.bitmap().height, 64);

        session.rotate_right();
        assert_eq!(session.orientation_degrees(), 0);
        assert_eq!(session.bitmap().width, 64);

        session.rotate_right();
        session.rotate_right();
        assert_eq!(session.orientation_degrees(), 180);
    }

    #[test]
    fn test_rotation_rebuilds_rect_for_new_bounds() {
        let (_dir, mut session, _) = session(64, 32);
        session.rotate_right();
        let rect = session.crop_rect();
        // New bounds are 32x64; default rect is 4/5 of 32.
        assert!((rect.width() - 25.6).abs() < 1e-3);
        assert_eq!(rect.center_x(), 16.0);
        assert_eq!(rect.center_y(), 32.0);
    }

    #[test]
    fn test_saved_circle_crop_has_transparent_corners() {
        let (dir, source) = red_source(64, 64);
        let destination = dir.path().join("avatar.png");
        let request = CropRequest::new(source, destination.clone())
            .circle_crop(true)
            .output_size(32, 32);
        let mut session = CropSession::begin(request, 200, 200).unwrap();

        let report = session.begin_save().unwrap().wait().unwrap();
        let bytes = std::fs::read(report.path).unwrap();
        let saved = cropframe_core::decode_bounded(&bytes, 0, 0).unwrap();

        assert_eq!(saved.width, 32);
        assert_eq!(saved.height, 32);
        assert_eq!(saved.pixel(0, 0)[3], 0);
        assert_eq!(saved.pixel(16, 16), [255, 0, 0, 255]);
    }
}
