//! The crop geometry model: hit-testing and constrained rectangle edits.
//!
//! `CropModel` owns the crop rectangle, the image bounds and the optional
//! aspect constraint, and applies every edit the gesture layer requests.
//! It performs no I/O and no drawing; screen coordinates enter only through
//! [`CropModel::hit_test`], which maps them into image space via the current
//! display matrix.
//!
//! # Clamping Rules
//!
//! - Moves translate the rectangle with per-axis clamping, preserving size.
//! - Grows are anchored at the edge/corner opposite the dragged handle and
//!   are capped so the result stays inside the image.
//! - A grow that would shrink an axis below the minimum-size floor is
//!   ignored on that axis; with an aspect constraint the axes are locked,
//!   so the whole delta is ignored instead.

use super::{AspectRatio, CropRect, EdgeHandle, ModifyMode};
use crate::viewport::DisplayMatrix;

/// Minimum crop rectangle edge length in image pixels.
///
/// Reduced to the image dimension when the image itself is smaller.
pub const MIN_CROP_SIZE: f32 = 25.0;

/// Owns the crop rectangle and applies constrained edits to it.
#[derive(Debug, Clone)]
pub struct CropModel {
    image_width: f32,
    image_height: f32,
    rect: CropRect,
    aspect: Option<AspectRatio>,
    mode: ModifyMode,
    min_size: f32,
}

impl CropModel {
    /// Create a model with the default centered rectangle.
    ///
    /// The default rectangle spans 4/5 of the smaller image dimension and is
    /// reshaped to the aspect constraint when one is present.
    pub fn new(image_width: u32, image_height: u32, aspect: Option<AspectRatio>) -> Self {
        let w = image_width as f32;
        let h = image_height as f32;

        let mut crop_w = w.min(h) * 4.0 / 5.0;
        let mut crop_h = crop_w;
        if let Some(a) = aspect {
            if a.x > a.y {
                crop_h = crop_w * a.y as f32 / a.x as f32;
            } else {
                crop_w = crop_h * a.x as f32 / a.y as f32;
            }
        }

        let left = (w - crop_w) / 2.0;
        let top = (h - crop_h) / 2.0;
        Self {
            image_width: w,
            image_height: h,
            rect: CropRect::new(left, top, left + crop_w, top + crop_h),
            aspect,
            mode: ModifyMode::None,
            min_size: MIN_CROP_SIZE.min(w).min(h),
        }
    }

    /// Read-only snapshot of the current rectangle.
    pub fn rect(&self) -> CropRect {
        self.rect
    }

    pub fn mode(&self) -> ModifyMode {
        self.mode
    }

    pub fn aspect(&self) -> Option<AspectRatio> {
        self.aspect
    }

    /// Minimum edge length enforced on the rectangle.
    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    /// Hit-test a screen-space point against the rectangle's edges.
    ///
    /// The point is mapped into image space through the inverse of `matrix`
    /// and the tolerance band is widened accordingly, so `tolerance` is
    /// always expressed in screen pixels regardless of zoom. Corners take
    /// precedence over single edges; ties between opposing edges resolve to
    /// the top/left handle. A point inside the rectangle but clear of every
    /// edge yields [`EdgeHandle::Move`], anything else [`EdgeHandle::None`].
    pub fn hit_test(&self, x: f32, y: f32, matrix: &DisplayMatrix, tolerance: f32) -> EdgeHandle {
        let (px, py) = matrix.to_image(x, y);
        let tol = tolerance / matrix.scale();
        let r = self.rect;

        let within_x = px >= r.left - tol && px < r.right + tol;
        let within_y = py >= r.top - tol && py < r.bottom + tol;

        let left = (px - r.left).abs() < tol && within_y;
        let right = (px - r.right).abs() < tol && within_y;
        let top = (py - r.top).abs() < tol && within_x;
        let bottom = (py - r.bottom).abs() < tol && within_x;

        match (left, top, right, bottom) {
            (true, true, _, _) => EdgeHandle::TopLeft,
            (_, true, true, _) => EdgeHandle::TopRight,
            (true, _, _, true) => EdgeHandle::BottomLeft,
            (_, _, true, true) => EdgeHandle::BottomRight,
            (true, _, _, _) => EdgeHandle::Left,
            (_, true, _, _) => EdgeHandle::Top,
            (_, _, true, _) => EdgeHandle::Right,
            (_, _, _, true) => EdgeHandle::Bottom,
            _ if r.contains(px, py) => EdgeHandle::Move,
            _ => EdgeHandle::None,
        }
    }

    /// Enter an edit: `Move` for the interior handle, `Grow` for any edge or
    /// corner handle. A `None` handle leaves the mode untouched.
    pub fn begin_edit(&mut self, handle: EdgeHandle) {
        self.mode = match handle {
            EdgeHandle::None => return,
            EdgeHandle::Move => ModifyMode::Move,
            _ => ModifyMode::Grow,
        };
    }

    /// Enter a pinch edit: grow mode without a specific handle.
    pub fn begin_grow(&mut self) {
        self.mode = ModifyMode::Grow;
    }

    /// Leave the current edit.
    pub fn end_edit(&mut self) {
        self.mode = ModifyMode::None;
    }

    /// Apply an image-space delta for the current edit.
    ///
    /// In `Move` mode the rectangle translates; in `Grow` mode the edges
    /// named by `handle` follow the matching delta components. Outside an
    /// edit this is a no-op.
    pub fn apply_delta(&mut self, handle: EdgeHandle, dx: f32, dy: f32) {
        match self.mode {
            ModifyMode::None => {}
            ModifyMode::Move => self.translate(dx, dy),
            ModifyMode::Grow => self.resize_by(handle, dx, dy),
        }
    }

    /// Grow symmetrically around the rectangle's center by (dx, dy) total.
    ///
    /// This is the pinch-scale path. With an aspect constraint the vertical
    /// growth follows from the horizontal one (or vice versa when only a
    /// vertical delta is supplied). The result is capped to the image size
    /// and slid back inside the bounds, preserving the final size.
    pub fn grow_by(&mut self, dx: f32, dy: f32) {
        let r = self.rect;
        let (dx, dy) = match self.aspect {
            Some(a) if dx != 0.0 => (dx, dx / a.ratio()),
            Some(a) if dy != 0.0 => (dy * a.ratio(), dy),
            _ => (dx, dy),
        };

        let mut w = r.width() + dx;
        let mut h = r.height() + dy;
        if let Some(a) = self.aspect {
            if w > self.image_width {
                w = self.image_width;
                h = w / a.ratio();
            }
            if h > self.image_height {
                h = self.image_height;
                w = h * a.ratio();
            }
            if w < self.min_size || h < self.min_size {
                return;
            }
        } else {
            w = w.min(self.image_width);
            h = h.min(self.image_height);
            if w < self.min_size {
                w = r.width();
            }
            if h < self.min_size {
                h = r.height();
            }
        }

        let mut c = CropRect::from_center(r.center_x(), r.center_y(), w, h);
        if c.left < 0.0 {
            c = c.offset(-c.left, 0.0);
        } else if c.right > self.image_width {
            c = c.offset(self.image_width - c.right, 0.0);
        }
        if c.top < 0.0 {
            c = c.offset(0.0, -c.top);
        } else if c.bottom > self.image_height {
            c = c.offset(0.0, self.image_height - c.bottom);
        }
        self.rect = c;
    }

    /// Translate the rectangle, clamping each axis independently so it stays
    /// within the image. Size is always preserved.
    fn translate(&mut self, dx: f32, dy: f32) {
        let w = self.rect.width();
        let h = self.rect.height();
        let left = (self.rect.left + dx).clamp(0.0, self.image_width - w);
        let top = (self.rect.top + dy).clamp(0.0, self.image_height - h);
        self.rect = CropRect::new(left, top, left + w, top + h);
    }

    /// Resize anchored at the edge/corner opposite the dragged handle.
    fn resize_by(&mut self, handle: EdgeHandle, dx: f32, dy: f32) {
        let horizontal = handle.moves_left() || handle.moves_right();
        let vertical = handle.moves_top() || handle.moves_bottom();
        if !horizontal && !vertical {
            return;
        }

        match self.aspect {
            None => self.resize_free(handle, dx, dy),
            Some(a) => {
                // The horizontal component drives whenever the handle has
                // one; the other dimension follows from the constraint.
                if horizontal && (dx != 0.0 || !vertical) {
                    self.resize_locked_horizontal(handle, dx, a.ratio());
                } else {
                    self.resize_locked_vertical(handle, dy, a.ratio());
                }
            }
        }
    }

    /// Free-form resize: moved edges clip to the image bounds, and an axis
    /// that would drop below the floor keeps its previous edges.
    fn resize_free(&mut self, handle: EdgeHandle, dx: f32, dy: f32) {
        let r = self.rect;
        let mut left = r.left;
        let mut top = r.top;
        let mut right = r.right;
        let mut bottom = r.bottom;

        if handle.moves_left() {
            left = (left + dx).max(0.0);
        }
        if handle.moves_right() {
            right = (right + dx).min(self.image_width);
        }
        if handle.moves_top() {
            top = (top + dy).max(0.0);
        }
        if handle.moves_bottom() {
            bottom = (bottom + dy).min(self.image_height);
        }

        if right - left < self.min_size {
            left = r.left;
            right = r.right;
        }
        if bottom - top < self.min_size {
            top = r.top;
            bottom = r.bottom;
        }
        self.rect = CropRect::new(left, top, right, bottom);
    }

    /// Aspect-locked resize driven by the horizontal delta.
    ///
    /// Width is capped by the fixed horizontal edge and by the vertical room
    /// available to the derived height, so the result never leaves the
    /// image. Floor violations discard the whole delta (the axes are
    /// locked).
    fn resize_locked_horizontal(&mut self, handle: EdgeHandle, dx: f32, ratio: f32) {
        let r = self.rect;
        let vertical = handle.moves_top() || handle.moves_bottom();

        let proposed = if handle.moves_left() {
            r.right - (r.left + dx)
        } else {
            (r.right + dx) - r.left
        };
        let x_room = if handle.moves_left() {
            r.right
        } else {
            self.image_width - r.left
        };
        let y_room = if handle.moves_top() {
            r.bottom
        } else if handle.moves_bottom() {
            self.image_height - r.top
        } else {
            2.0 * r.center_y().min(self.image_height - r.center_y())
        };

        let w = proposed.min(x_room).min(y_room * ratio);
        let h = w / ratio;
        if w < self.min_size || h < self.min_size {
            return;
        }

        let (left, right) = if handle.moves_left() {
            (r.right - w, r.right)
        } else {
            (r.left, r.left + w)
        };
        let (top, bottom) = if vertical {
            if handle.moves_top() {
                (r.bottom - h, r.bottom)
            } else {
                (r.top, r.top + h)
            }
        } else {
            (r.center_y() - h / 2.0, r.center_y() + h / 2.0)
        };
        self.rect = CropRect::new(left, top, right, bottom);
    }

    /// Aspect-locked resize driven by the vertical delta.
    fn resize_locked_vertical(&mut self, handle: EdgeHandle, dy: f32, ratio: f32) {
        let r = self.rect;
        let horizontal = handle.moves_left() || handle.moves_right();

        let proposed = if handle.moves_top() {
            r.bottom - (r.top + dy)
        } else {
            (r.bottom + dy) - r.top
        };
        let y_room = if handle.moves_top() {
            r.bottom
        } else {
            self.image_height - r.top
        };
        let x_room = if handle.moves_left() {
            r.right
        } else if handle.moves_right() {
            self.image_width - r.left
        } else {
            2.0 * r.center_x().min(self.image_width - r.center_x())
        };

        let h = proposed.min(y_room).min(x_room / ratio);
        let w = h * ratio;
        if w < self.min_size || h < self.min_size {
            return;
        }

        let (top, bottom) = if handle.moves_top() {
            (r.bottom - h, r.bottom)
        } else {
            (r.top, r.top + h)
        };
        let (left, right) = if horizontal {
            if handle.moves_left() {
                (r.right - w, r.right)
            } else {
                (r.left, r.left + w)
            }
        } else {
            (r.center_x() - w / 2.0, r.center_x() + w / 2.0)
        };
        self.rect = CropRect::new(left, top, right, bottom);
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
