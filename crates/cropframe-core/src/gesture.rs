//! Gesture controller: pointer and pinch events driving the crop geometry.
//!
//! The controller is a small state machine over {Idle, Moving, Resizing}.
//! It consumes explicit [`GestureEvent`]s, converts screen deltas into
//! image-space deltas through the viewport's inverse matrix, applies them
//! to the [`CropModel`], and keeps the rectangle visible by panning the
//! viewport. It holds no reference to any UI framework and no locks; all
//! calls happen on the thread that owns the model and viewport.

use crate::geometry::{CropModel, EdgeHandle};
use crate::viewport::Viewport;
use tracing::trace;

/// Hit-test tolerance around edges and corners, in screen pixels.
pub const TOUCH_TOLERANCE: f32 = 20.0;

/// A pointer or pinch event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    PinchBegin,
    PinchUpdate { factor: f32 },
    PinchEnd,
}

/// What the controller is currently tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Moving,
    Resizing,
}

/// Drives [`CropModel`] edits and [`Viewport`] panning from raw events.
#[derive(Debug, Default)]
pub struct GestureController {
    state: ControllerState,
    handle: EdgeHandle,
    last_x: f32,
    last_y: f32,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Dispatch one event. Returns whether the event was handled (changed
    /// geometry or viewport state, or started/ended a drag).
    pub fn handle_event(
        &mut self,
        event: GestureEvent,
        model: &mut CropModel,
        viewport: &mut Viewport,
    ) -> bool {
        match event {
            GestureEvent::PointerDown { x, y } => {
                let handle = model.hit_test(x, y, &viewport.matrix(), TOUCH_TOLERANCE);
                if handle == EdgeHandle::None {
                    return false;
                }
                trace!(?handle, "drag started");
                model.begin_edit(handle);
                self.handle = handle;
                self.state = if handle == EdgeHandle::Move {
                    ControllerState::Moving
                } else {
                    ControllerState::Resizing
                };
                self.last_x = x;
                self.last_y = y;
                true
            }
            GestureEvent::PointerMove { x, y } => {
                if self.state == ControllerState::Idle {
                    return false;
                }
                let scale = viewport.matrix().scale();
                let dx = (x - self.last_x) / scale;
                let dy = (y - self.last_y) / scale;
                model.apply_delta(self.handle, dx, dy);
                self.last_x = x;
                self.last_y = y;
                Self::ensure_visible(model, viewport);
                true
            }
            GestureEvent::PointerUp => {
                if self.state == ControllerState::Idle {
                    return false;
                }
                model.end_edit();
                self.state = ControllerState::Idle;
                self.handle = EdgeHandle::None;
                viewport.recenter_on(&model.rect());
                true
            }
            GestureEvent::PinchBegin => {
                // A pinch always grows, regardless of where the touches land.
                model.begin_grow();
                self.state = ControllerState::Resizing;
                self.handle = EdgeHandle::None;
                true
            }
            GestureEvent::PinchUpdate { factor } => {
                if self.state != ControllerState::Resizing {
                    return false;
                }
                let rect = model.rect();
                model.grow_by(
                    rect.width() * (factor - 1.0),
                    rect.height() * (factor - 1.0),
                );
                true
            }
            GestureEvent::PinchEnd => {
                if self.state == ControllerState::Idle {
                    return false;
                }
                model.end_edit();
                self.state = ControllerState::Idle;
                viewport.recenter_on(&model.rect());
                true
            }
        }
    }

    /// Pan the viewport by the minimal amount that brings the rectangle's
    /// screen projection back inside the view. Zoom never changes here.
    fn ensure_visible(model: &CropModel, viewport: &mut Viewport) {
        let rect = model.rect();
        let m = viewport.matrix();
        let (left, top) = m.to_screen(rect.left, rect.top);
        let (right, bottom) = m.to_screen(rect.right, rect.bottom);

        let dx_in = (-left).max(0.0);
        let dx_out = (viewport.view_width() - right).min(0.0);
        let dy_in = (-top).max(0.0);
        let dy_out = (viewport.view_height() - bottom).min(0.0);

        let dx = if dx_in != 0.0 { dx_in } else { dx_out };
        let dy = if dy_in != 0.0 { dy_in } else { dy_out };
        if dx != 0.0 || dy != 0.0 {
            viewport.pan_by(dx, dy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ModifyMode;

    /// 100x100 image in a 200x200 view; default rect (10,10)..(90,90),
    /// screen projection (20,20)..(180,180) at the base scale of 2.
    fn setup() -> (GestureController, CropModel, Viewport) {
        (
            GestureController::new(),
            CropModel::new(100, 100, None),
            Viewport::new(200, 200, 100, 100),
        )
    }

    #[test]
    fn test_pointer_down_on_edge_starts_resize() {
        let (mut c, mut m, mut v) = setup();
        // Screen (20, 100) is on the left edge.
        let handled = c.handle_event(GestureEvent::PointerDown { x: 20.0, y: 100.0 }, &mut m, &mut v);
        assert!(handled);
        assert_eq!(c.state(), ControllerState::Resizing);
        assert_eq!(m.mode(), ModifyMode::Grow);
    }

    #[test]
    fn test_pointer_down_inside_starts_move() {
        let (mut c, mut m, mut v) = setup();
        let handled = c.handle_event(GestureEvent::PointerDown { x: 100.0, y: 100.0 }, &mut m, &mut v);
        assert!(handled);
        assert_eq!(c.state(), ControllerState::Moving);
        assert_eq!(m.mode(), ModifyMode::Move);
    }

    #[test]
    fn test_pointer_down_outside_unhandled() {
        // Larger image so the corner sits outside the tolerance band of
        // every edge: 200x200 image, default rect (20,20)..(180,180).
        let mut c = GestureController::new();
        let mut m = CropModel::new(200, 200, None);
        let mut v = Viewport::new(400, 400, 200, 200);
        let handled = c.handle_event(GestureEvent::PointerDown { x: 398.0, y: 398.0 }, &mut m, &mut v);
        assert!(!handled);
        assert_eq!(c.state(), ControllerState::Idle);
    }

    #[test]
    fn test_move_converts_screen_delta_to_image_space() {
        let (mut c, mut m, mut v) = setup();
        c.handle_event(GestureEvent::PointerDown { x: 100.0, y: 100.0 }, &mut m, &mut v);
        c.handle_event(GestureEvent::PointerMove { x: 120.0, y: 100.0 }, &mut m, &mut v);
        // 20 screen pixels at scale 2 = 10 image pixels.
        assert_eq!(m.rect().left, 20.0);
        assert_eq!(m.rect().width(), 80.0);
    }

    #[test]
    fn test_resize_drag_grows_edge() {
        let (mut c, mut m, mut v) = setup();
        c.handle_event(GestureEvent::PointerDown { x: 180.0, y: 100.0 }, &mut m, &mut v);
        c.handle_event(GestureEvent::PointerMove { x: 190.0, y: 100.0 }, &mut m, &mut v);
        assert_eq!(m.rect().right, 95.0);
    }

    #[test]
    fn test_pointer_up_ends_edit_and_recenters() {
        let (mut c, mut m, mut v) = setup();
        // Drag the bottom-right corner in far enough that the re-center
        // heuristic fires on release: 30x30 image px = 60x60 on screen.
        c.handle_event(GestureEvent::PointerDown { x: 180.0, y: 180.0 }, &mut m, &mut v);
        c.handle_event(GestureEvent::PointerMove { x: 80.0, y: 80.0 }, &mut m, &mut v);
        assert_eq!(m.rect().width(), 30.0);

        let handled = c.handle_event(GestureEvent::PointerUp, &mut m, &mut v);
        assert!(handled);
        assert_eq!(c.state(), ControllerState::Idle);
        assert_eq!(m.mode(), ModifyMode::None);
        assert!(v.is_animating());
    }

    #[test]
    fn test_pointer_events_ignored_when_idle() {
        let (mut c, mut m, mut v) = setup();
        assert!(!c.handle_event(GestureEvent::PointerMove { x: 50.0, y: 50.0 }, &mut m, &mut v));
        assert!(!c.handle_event(GestureEvent::PointerUp, &mut m, &mut v));
        assert!(!c.handle_event(GestureEvent::PinchUpdate { factor: 1.5 }, &mut m, &mut v));
    }

    #[test]
    fn test_pinch_grows_symmetrically() {
        let (mut c, mut m, mut v) = setup();
        c.handle_event(GestureEvent::PinchBegin, &mut m, &mut v);
        assert_eq!(m.mode(), ModifyMode::Grow);
        c.handle_event(GestureEvent::PinchUpdate { factor: 1.25 }, &mut m, &mut v);
        // 80 * 1.25 = 100, capped exactly at the image size.
        let r = m.rect();
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 100.0);
        c.handle_event(GestureEvent::PinchEnd, &mut m, &mut v);
        assert_eq!(c.state(), ControllerState::Idle);
        assert_eq!(m.mode(), ModifyMode::None);
    }

    #[test]
    fn test_pinch_shrink() {
        let (mut c, mut m, mut v) = setup();
        c.handle_event(GestureEvent::PinchBegin, &mut m, &mut v);
        c.handle_event(GestureEvent::PinchUpdate { factor: 0.5 }, &mut m, &mut v);
        let r = m.rect();
        assert_eq!(r.width(), 40.0);
        assert_eq!(r.center_x(), 50.0);
    }

    #[test]
    fn test_ensure_visible_pans_rect_back_into_view() {
        let (mut c, mut m, mut v) = setup();
        // Shrink to 40x40 image px so the rect fits the view once zoomed.
        c.handle_event(GestureEvent::PinchBegin, &mut m, &mut v);
        c.handle_event(GestureEvent::PinchUpdate { factor: 0.5 }, &mut m, &mut v);
        c.handle_event(GestureEvent::PinchEnd, &mut m, &mut v);
        v.zoom_to(2.0, 50.0, 50.0);

        // Drag the rect left; its left edge would leave the view without
        // the ensure-visible pan.
        c.handle_event(GestureEvent::PointerDown { x: 100.0, y: 100.0 }, &mut m, &mut v);
        c.handle_event(GestureEvent::PointerMove { x: 60.0, y: 100.0 }, &mut m, &mut v);

        let matrix = v.matrix();
        let rect = m.rect();
        let (left, top) = matrix.to_screen(rect.left, rect.top);
        let (right, bottom) = matrix.to_screen(rect.right, rect.bottom);
        assert!(left >= -1e-3 && top >= -1e-3);
        assert!(right <= 200.0 + 1e-3 && bottom <= 200.0 + 1e-3);
    }
}
