//! Pan/zoom transform state machine.
//!
//! The controller owns the view's [`Transform`] and is its only writer. Drag
//! events pan, wheel and pinch events zoom around the pointer so the content
//! under it stays put. After every change the transform is constrained:
//! - `k` is clamped to the configured zoom range
//! - translation keeps the viewport within a padded rectangle around the
//!   content (`translate_padding` × viewport size past each edge)
//!
//! Double-click zoom is disabled.

use log::debug;

use crate::config::ZoomSettings;
use crate::projection::ScreenPoint;

/// Pan/zoom state: screen = base × k + (x, y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { k: 1.0, x: 0.0, y: 0.0 };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    /// Base-surface point to screen.
    pub fn apply(&self, p: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    /// Screen point back to the base surface.
    pub fn invert(&self, p: ScreenPoint) -> ScreenPoint {
        ScreenPoint::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// Shift by (dx, dy) base-surface units.
    fn translate_by(&self, dx: f64, dy: f64) -> Transform {
        Transform::new(self.k, self.x + self.k * dx, self.y + self.k * dy)
    }
}

/// How a wheel delta is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    fn multiplier(self) -> f64 {
        match self {
            DeltaMode::Pixel => 0.002,
            DeltaMode::Line => 0.05,
            DeltaMode::Page => 1.0,
        }
    }
}

/// Input consumed by the controller. Coordinates are logical surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    /// Positive `delta_y` zooms out.
    Wheel { x: f64, y: f64, delta_y: f64, delta_mode: DeltaMode },
    /// Relative pinch scale since the previous pinch event, centred at (x, y).
    Pinch { x: f64, y: f64, scale: f64 },
    DoubleClick { x: f64, y: f64 },
}

/// Owns and constrains the view transform.
#[derive(Debug, Clone)]
pub struct ZoomPanController {
    settings: ZoomSettings,
    width: f64,
    height: f64,
    transform: Transform,
    drag_from: Option<ScreenPoint>,
}

impl ZoomPanController {
    /// Mount on a `width` × `height` viewport at the configured initial zoom.
    pub fn mount(settings: ZoomSettings, width: f64, height: f64) -> Self {
        let mut controller = Self {
            settings,
            width,
            height,
            transform: Transform::IDENTITY,
            drag_from: None,
        };
        controller.reset();
        controller
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_from.is_some()
    }

    /// Return to the initial zoom with no translation.
    pub fn reset(&mut self) {
        let k = self.clamp_k(self.settings.initial_zoom);
        self.transform = self.constrain(Transform::new(k, 0.0, 0.0));
        self.drag_from = None;
    }

    /// Adapt to a new viewport size. Returns true if the transform changed.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.width = width;
        self.height = height;
        self.set(self.transform)
    }

    /// Feed one input event. Returns true if the transform changed and the
    /// view must re-render.
    pub fn handle(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => {
                self.drag_from = Some(ScreenPoint::new(x, y));
                false
            }
            InputEvent::PointerMove { x, y } => {
                let Some(from) = self.drag_from else {
                    return false;
                };
                self.drag_from = Some(ScreenPoint::new(x, y));
                let t = self.transform;
                self.set(Transform::new(t.k, t.x + (x - from.x), t.y + (y - from.y)))
            }
            InputEvent::PointerUp => {
                self.drag_from = None;
                false
            }
            InputEvent::Wheel { x, y, delta_y, delta_mode } => {
                let factor = 2f64.powf(-delta_y * delta_mode.multiplier());
                self.zoom_at(ScreenPoint::new(x, y), self.transform.k * factor)
            }
            InputEvent::Pinch { x, y, scale } => {
                self.zoom_at(ScreenPoint::new(x, y), self.transform.k * scale)
            }
            InputEvent::DoubleClick { .. } => false,
        }
    }

    /// Zoom to scale `k` keeping the screen point `anchor` over the same content.
    ///
    /// A scale that overflowed to infinity or underflowed to zero clamps to
    /// the zoom range; NaN and negative scales are ignored.
    pub fn zoom_at(&mut self, anchor: ScreenPoint, k: f64) -> bool {
        if k.is_nan() || k < 0.0 {
            return false;
        }
        let k = if k == f64::INFINITY {
            self.settings.max
        } else if k == 0.0 {
            self.settings.min
        } else {
            self.clamp_k(k)
        };
        let base = self.transform.invert(anchor);
        let next = Transform::new(k, anchor.x - base.x * k, anchor.y - base.y * k);
        self.set(next)
    }

    fn set(&mut self, candidate: Transform) -> bool {
        let next = self.constrain(candidate);
        if next == self.transform {
            return false;
        }
        debug!("[Zoom] k={:.3} x={:.1} y={:.1}", next.k, next.x, next.y);
        self.transform = next;
        true
    }

    fn clamp_k(&self, k: f64) -> f64 {
        k.max(self.settings.min).min(self.settings.max)
    }

    /// Content rectangle the viewport may roam over, in base-surface units.
    fn translate_extent(&self) -> (ScreenPoint, ScreenPoint) {
        let p = self.settings.translate_padding;
        (
            ScreenPoint::new(-self.width * p, -self.height * p),
            ScreenPoint::new(self.width * (1.0 + p), self.height * (1.0 + p)),
        )
    }

    /// Shift `t` so the viewport stays inside the translate extent; a viewport
    /// larger than the extent is centred on it.
    fn constrain(&self, t: Transform) -> Transform {
        let (lo, hi) = self.translate_extent();
        let view_lo = t.invert(ScreenPoint::new(0.0, 0.0));
        let view_hi = t.invert(ScreenPoint::new(self.width, self.height));

        let dx = constrain_axis(view_lo.x - lo.x, view_hi.x - hi.x);
        let dy = constrain_axis(view_lo.y - lo.y, view_hi.y - hi.y);
        t.translate_by(dx, dy)
    }
}

fn constrain_axis(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else if d0 < 0.0 {
        d0
    } else {
        d1.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ZoomPanController {
        ZoomPanController::mount(ZoomSettings::default(), 800.0, 600.0)
    }

    fn wheel(x: f64, y: f64, delta_y: f64) -> InputEvent {
        InputEvent::Wheel { x, y, delta_y, delta_mode: DeltaMode::Pixel }
    }

    #[test]
    fn test_initial_state() {
        let c = controller();
        assert_eq!(c.transform(), Transform::new(1.0, 0.0, 0.0));
        assert!(!c.is_dragging());
    }

    #[test]
    fn test_initial_zoom_is_clamped() {
        let settings = ZoomSettings { initial_zoom: 100.0, ..ZoomSettings::default() };
        let c = ZoomPanController::mount(settings, 800.0, 600.0);
        assert_eq!(c.transform().k, 20.0);
    }

    #[test]
    fn test_k_stays_in_range_under_extreme_zoom() {
        let mut c = controller();
        for _ in 0..500 {
            c.handle(wheel(400.0, 300.0, -1000.0));
            let k = c.transform().k;
            assert!((0.6..=20.0).contains(&k));
        }
        assert_eq!(c.transform().k, 20.0);

        for _ in 0..500 {
            c.handle(wheel(10.0, 590.0, 1000.0));
            c.handle(InputEvent::Pinch { x: 700.0, y: 20.0, scale: 0.01 });
            let k = c.transform().k;
            assert!((0.6..=20.0).contains(&k));
        }
        assert_eq!(c.transform().k, 0.6);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut c = controller();
        let anchor = ScreenPoint::new(400.0, 300.0);
        let before = c.transform().invert(anchor);

        assert!(c.handle(wheel(anchor.x, anchor.y, -500.0)));

        let t = c.transform();
        assert!((t.k - 2.0).abs() < 1e-12);
        let after = t.apply(before);
        assert!((after.x - anchor.x).abs() < 1e-9);
        assert!((after.y - anchor.y).abs() < 1e-9);
    }

    #[test]
    fn test_pan_is_clamped_to_padding() {
        let mut c = controller();
        c.handle(InputEvent::PointerDown { x: 100.0, y: 100.0 });
        assert!(c.handle(InputEvent::PointerMove { x: 1100.0, y: 1100.0 }));
        c.handle(InputEvent::PointerUp);

        let t = c.transform();
        assert!((t.x - 160.0).abs() < 1e-9);
        assert!((t.y - 120.0).abs() < 1e-9);

        // Pushing further does nothing
        c.handle(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        assert!(!c.handle(InputEvent::PointerMove { x: 50.0, y: 50.0 }));
    }

    #[test]
    fn test_pan_within_limits() {
        let mut c = controller();
        c.handle(InputEvent::PointerDown { x: 100.0, y: 100.0 });
        c.handle(InputEvent::PointerMove { x: 130.0, y: 80.0 });
        assert_eq!(c.transform(), Transform::new(1.0, 30.0, -20.0));
    }

    #[test]
    fn test_move_without_drag_is_ignored() {
        let mut c = controller();
        assert!(!c.handle(InputEvent::PointerMove { x: 500.0, y: 500.0 }));
        c.handle(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        c.handle(InputEvent::PointerUp);
        assert!(!c.handle(InputEvent::PointerMove { x: 50.0, y: 50.0 }));
    }

    #[test]
    fn test_double_click_disabled() {
        let mut c = controller();
        assert!(!c.handle(InputEvent::DoubleClick { x: 400.0, y: 300.0 }));
        assert_eq!(c.transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_zoomed_out_viewport_is_centred() {
        let mut c = controller();
        c.handle(wheel(0.0, 0.0, 10_000.0));
        let t = c.transform();
        assert_eq!(t.k, 0.6);
        // Extent centre (400, 300) lands on the viewport centre
        let centre = t.apply(ScreenPoint::new(400.0, 300.0));
        assert!((centre.x - 400.0).abs() < 1e-9);
        assert!((centre.y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_zoom_ignored() {
        let mut c = controller();
        assert!(!c.handle(InputEvent::Pinch { x: 0.0, y: 0.0, scale: f64::NAN }));
        assert!(!c.handle(InputEvent::Pinch { x: 0.0, y: 0.0, scale: -2.0 }));
        assert!(!c.handle(wheel(0.0, 0.0, f64::NAN)));
        assert_eq!(c.transform(), Transform::IDENTITY);
    }

    #[test]
    fn test_huge_wheel_delta_clamps() {
        let mut c = controller();
        // 2^2000 overflows to infinity
        assert!(c.handle(wheel(400.0, 300.0, -1e6)));
        assert_eq!(c.transform().k, 20.0);

        // 2^-2000 underflows to zero
        assert!(c.handle(wheel(400.0, 300.0, 1e6)));
        assert_eq!(c.transform().k, 0.6);
    }

    #[test]
    fn test_zero_pinch_zooms_to_min() {
        let mut c = controller();
        assert!(c.handle(InputEvent::Pinch { x: 400.0, y: 300.0, scale: 0.0 }));
        assert_eq!(c.transform().k, 0.6);
    }

    #[test]
    fn test_resize_reconstrains() {
        let mut c = controller();
        c.handle(InputEvent::PointerDown { x: 0.0, y: 0.0 });
        c.handle(InputEvent::PointerMove { x: 1000.0, y: 0.0 });
        assert!((c.transform().x - 160.0).abs() < 1e-9);

        assert!(c.resize(400.0, 300.0));
        assert!((c.transform().x - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut c = controller();
        c.handle(wheel(100.0, 100.0, -300.0));
        c.reset();
        assert_eq!(c.transform(), Transform::IDENTITY);
    }
}
