//! Display transform: mapping image space to screen space.
//!
//! The viewport owns the affine image-to-screen transform (a uniform scale
//! plus a translation), the zoom bounds, and the optional animated zoom.
//! The base scale fits the whole image inside the view; the user zoom
//! multiplies it, bounded to `[1.0, max_zoom]`. Translation is always
//! clamped so the scaled image either fills the viewport edge-to-edge or
//! sits centered when it is smaller.

use crate::geometry::CropRect;
use tracing::debug;

/// Growth factor applied over the fit scale to derive the zoom ceiling.
const MAX_ZOOM_FACTOR: f32 = 4.0;
/// Fraction of the viewport the crop rectangle should occupy after a
/// re-center.
const RECENTER_FILL: f32 = 0.6;
/// Relative zoom divergence below which a re-center is skipped.
const RECENTER_BAND: f32 = 0.10;
/// Duration of the re-center zoom animation.
const RECENTER_ANIMATION_MS: f32 = 300.0;

/// Affine image-to-screen transform: uniform scale plus translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMatrix {
    scale: f32,
    tx: f32,
    ty: f32,
}

impl DisplayMatrix {
    pub fn new(scale: f32, tx: f32, ty: f32) -> Self {
        Self { scale, tx, ty }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// The uniform image-to-screen scale factor.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Map an image-space point to screen space.
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.tx, y * self.scale + self.ty)
    }

    /// Map a screen-space point to image space (inverse transform).
    pub fn to_image(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.tx) / self.scale, (y - self.ty) / self.scale)
    }
}

/// An in-flight zoom animation.
#[derive(Debug, Clone, Copy)]
struct ZoomAnimation {
    from: f32,
    to: f32,
    center_x: f32,
    center_y: f32,
    duration_ms: f32,
    elapsed_ms: f32,
}

/// The viewport state: zoom, translation and the view/image dimensions.
#[derive(Debug, Clone)]
pub struct Viewport {
    view_width: f32,
    view_height: f32,
    image_width: f32,
    image_height: f32,
    base_scale: f32,
    zoom: f32,
    max_zoom: f32,
    tx: f32,
    ty: f32,
    animation: Option<ZoomAnimation>,
}

impl Viewport {
    /// Create a viewport with the image fitted and centered at zoom 1.
    pub fn new(view_width: u32, view_height: u32, image_width: u32, image_height: u32) -> Self {
        debug_assert!(view_width > 0 && view_height > 0, "empty viewport");
        debug_assert!(image_width > 0 && image_height > 0, "empty image");

        let vw = view_width as f32;
        let vh = view_height as f32;
        let iw = image_width as f32;
        let ih = image_height as f32;

        let base_scale = (vw / iw).min(vh / ih);
        let max_zoom = ((iw / vw).max(ih / vh) * MAX_ZOOM_FACTOR).max(1.0);

        let mut viewport = Self {
            view_width: vw,
            view_height: vh,
            image_width: iw,
            image_height: ih,
            base_scale,
            zoom: 1.0,
            max_zoom,
            tx: 0.0,
            ty: 0.0,
            animation: None,
        };
        viewport.clamp_translation();
        viewport
    }

    /// The current image-to-screen transform.
    pub fn matrix(&self) -> DisplayMatrix {
        DisplayMatrix::new(self.base_scale * self.zoom, self.tx, self.ty)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    pub fn view_width(&self) -> f32 {
        self.view_width
    }

    pub fn view_height(&self) -> f32 {
        self.view_height
    }

    /// Whether a zoom animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Zoom immediately so the image-space point (cx, cy) maps to the
    /// viewport center. The scale is clamped to `[1.0, max_zoom]` and any
    /// running animation is cancelled.
    pub fn zoom_to(&mut self, scale: f32, cx: f32, cy: f32) {
        self.animation = None;
        self.apply_zoom(scale, cx, cy);
    }

    /// Start an animated zoom toward `scale` centered on (cx, cy).
    ///
    /// A non-positive duration applies the zoom immediately.
    pub fn animate_zoom_to(&mut self, scale: f32, cx: f32, cy: f32, duration_ms: f32) {
        if duration_ms <= 0.0 {
            self.zoom_to(scale, cx, cy);
            return;
        }
        self.animation = Some(ZoomAnimation {
            from: self.zoom,
            to: scale.clamp(1.0, self.max_zoom),
            center_x: cx,
            center_y: cy,
            duration_ms,
            elapsed_ms: 0.0,
        });
    }

    /// Advance the zoom animation by `elapsed_ms`. No-op when idle.
    pub fn tick(&mut self, elapsed_ms: f32) {
        let Some(mut anim) = self.animation else {
            return;
        };
        anim.elapsed_ms += elapsed_ms;
        let t = (anim.elapsed_ms / anim.duration_ms).clamp(0.0, 1.0);
        let zoom = anim.from + (anim.to - anim.from) * t;
        self.apply_zoom(zoom, anim.center_x, anim.center_y);
        self.animation = if t < 1.0 { Some(anim) } else { None };
    }

    /// Pan by a screen-space delta, keeping the image within the viewport.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.tx += dx;
        self.ty += dy;
        self.clamp_translation();
    }

    /// Re-center heuristic, run after a resize/move commit.
    ///
    /// Computes the zoom at which the rectangle would fill 60% of the
    /// viewport and animates toward it only when it diverges from the
    /// current zoom by more than 10%, so minor edits never cause a zoom
    /// jitter. Returns whether a zoom was started.
    pub fn recenter_on(&mut self, rect: &CropRect) -> bool {
        let scale = self.base_scale * self.zoom;
        let screen_w = rect.width() * scale;
        let screen_h = rect.height() * scale;
        if screen_w <= 0.0 || screen_h <= 0.0 {
            return false;
        }

        let fill = (self.view_width / screen_w).min(self.view_height / screen_h) * RECENTER_FILL;
        let desired = (fill * self.zoom).max(1.0);

        if (desired - self.zoom).abs() / desired <= RECENTER_BAND {
            return false;
        }
        debug!(desired, current = self.zoom, "re-centering on crop rectangle");
        self.animate_zoom_to(
            desired,
            rect.center_x(),
            rect.center_y(),
            RECENTER_ANIMATION_MS,
        );
        true
    }

    fn apply_zoom(&mut self, scale: f32, cx: f32, cy: f32) {
        self.zoom = scale.clamp(1.0, self.max_zoom);
        let s = self.base_scale * self.zoom;
        self.tx = self.view_width / 2.0 - cx * s;
        self.ty = self.view_height / 2.0 - cy * s;
        self.clamp_translation();
    }

    /// Keep the scaled image inside the viewport, centering an axis on
    /// which the image is smaller than the view.
    fn clamp_translation(&mut self) {
        let s = self.base_scale * self.zoom;
        let scaled_w = self.image_width * s;
        let scaled_h = self.image_height * s;

        if scaled_w <= self.view_width {
            self.tx = (self.view_width - scaled_w) / 2.0;
        } else {
            self.tx = self.tx.clamp(self.view_width - scaled_w, 0.0);
        }
        if scaled_h <= self.view_height {
            self.ty = (self.view_height - scaled_h) / 2.0;
        } else {
            self.ty = self.ty.clamp(self.view_height - scaled_h, 0.0);
        }
    }
}
