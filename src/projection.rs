//! Mercator projection fitted to a pixel extent.
//!
//! The projection is centred on the view bounds and scaled so the projected
//! bounds fill the surface minus a fixed pixel margin, centred on both axes.
//! Longitude maps linearly; latitude goes through the Mercator stretch
//! `ln(tan(π/4 + φ/2))`, so shapes keep their local proportions at any latitude.

use std::f64::consts::FRAC_PI_4;

use crate::{Bounds, GeoPoint};

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// A position on the drawing surface in logical pixels (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

fn mercator_y(latitude: f64) -> f64 {
    let phi = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (FRAC_PI_4 + phi / 2.0).tan().ln()
}

fn inverse_mercator_y(y: f64) -> f64 {
    (2.0 * y.exp().atan() - 2.0 * FRAC_PI_4).to_degrees()
}

/// Forward and inverse geo ↔ pixel mapping for one (bounds, surface size) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Pixels per radian
    scale: f64,
    center_lng: f64,
    center_y: f64,
    /// Pixel position of the projection centre
    origin: ScreenPoint,
}

impl Projection {
    /// Fit `bounds` inside a `width` × `height` surface leaving `margin` pixels
    /// free on every side.
    ///
    /// When the margin leaves no room the whole surface is used instead.
    /// Returns `None` for empty bounds, which have nothing to frame.
    ///
    /// # Example
    /// ```
    /// use city_roads_map::{Bounds, Projection};
    ///
    /// let b = Bounds::new(40.0, 40.2, -3.8, -3.4);
    /// let projection = Projection::fit(&b, 800.0, 600.0, 50.0).unwrap();
    ///
    /// let c = projection.project(b.center());
    /// assert!((c.x - 400.0).abs() < 1.0);
    /// ```
    pub fn fit(bounds: &Bounds, width: f64, height: f64, margin: f64) -> Option<Self> {
        if bounds.is_empty() {
            return None;
        }

        let (mut left, mut top, mut avail_w, mut avail_h) =
            (margin, margin, width - 2.0 * margin, height - 2.0 * margin);
        if avail_w <= 0.0 || avail_h <= 0.0 {
            (left, top, avail_w, avail_h) = (0.0, 0.0, width.max(0.0), height.max(0.0));
        }

        let center = bounds.center();
        let center_lng = center.longitude;

        // Projected extent relative to the centre longitude
        let x0 = (bounds.min_lng - center_lng).to_radians();
        let x1 = (bounds.max_lng - center_lng).to_radians();
        let y_top = mercator_y(bounds.max_lat);
        let y_bottom = mercator_y(bounds.min_lat);

        let dx = x1 - x0;
        let dy = y_top - y_bottom;
        let scale = [avail_w / dx, avail_h / dy]
            .into_iter()
            .filter(|s| s.is_finite() && *s > 0.0)
            .fold(f64::INFINITY, f64::min);
        let scale = if scale.is_finite() { scale } else { 1.0 };

        // Centre of the projected box, which is not the centre latitude's y
        let center_y = (y_top + y_bottom) / 2.0;
        let center_x = (x0 + x1) / 2.0;

        Some(Self {
            scale,
            center_lng: center_lng + center_x.to_degrees(),
            center_y,
            origin: ScreenPoint::new(left + avail_w / 2.0, top + avail_h / 2.0),
        })
    }

    /// Map a geographic point to surface pixels.
    pub fn project(&self, p: GeoPoint) -> ScreenPoint {
        let x = (p.longitude - self.center_lng).to_radians();
        let y = mercator_y(p.latitude) - self.center_y;
        ScreenPoint::new(self.origin.x + self.scale * x, self.origin.y - self.scale * y)
    }

    /// Map surface pixels back to a geographic point.
    pub fn invert(&self, s: ScreenPoint) -> GeoPoint {
        let x = (s.x - self.origin.x) / self.scale;
        let y = (self.origin.y - s.y) / self.scale + self.center_y;
        GeoPoint::new(inverse_mercator_y(y), self.center_lng + x.to_degrees())
    }

    /// Project a whole path.
    pub fn project_path(&self, points: &[GeoPoint]) -> Vec<ScreenPoint> {
        points.iter().map(|p| self.project(*p)).collect()
    }

    /// Pixels per radian of longitude.
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_fit_inside_margin() {
        let b = Bounds::new(40.0, 40.2, -3.8, -3.4);
        let p = Projection::fit(&b, 800.0, 600.0, 50.0).unwrap();

        for corner in [
            GeoPoint::new(b.min_lat, b.min_lng),
            GeoPoint::new(b.min_lat, b.max_lng),
            GeoPoint::new(b.max_lat, b.min_lng),
            GeoPoint::new(b.max_lat, b.max_lng),
        ] {
            let s = p.project(corner);
            assert!(s.x >= 50.0 - 1e-6 && s.x <= 750.0 + 1e-6, "x out of extent: {}", s.x);
            assert!(s.y >= 50.0 - 1e-6 && s.y <= 550.0 + 1e-6, "y out of extent: {}", s.y);
        }
    }

    #[test]
    fn test_fit_is_centred_and_tight() {
        let b = Bounds::new(40.0, 40.2, -3.8, -3.4);
        let p = Projection::fit(&b, 800.0, 600.0, 50.0).unwrap();

        let sw = p.project(GeoPoint::new(b.min_lat, b.min_lng));
        let ne = p.project(GeoPoint::new(b.max_lat, b.max_lng));

        assert!(approx((sw.x + ne.x) / 2.0, 400.0, 1e-6));
        assert!(approx((sw.y + ne.y) / 2.0, 300.0, 1e-6));
        // One dimension touches the margin
        let touches_x = approx(sw.x, 50.0, 1e-6) && approx(ne.x, 750.0, 1e-6);
        let touches_y = approx(ne.y, 50.0, 1e-6) && approx(sw.y, 550.0, 1e-6);
        assert!(touches_x || touches_y);
        // North is up
        assert!(ne.y < sw.y);
    }

    #[test]
    fn test_latitude_stretch() {
        // Equal degree spans cover more pixels further from the equator
        let b = Bounds::new(0.0, 60.0, 0.0, 10.0);
        let p = Projection::fit(&b, 500.0, 500.0, 0.0).unwrap();
        let low = p.project(GeoPoint::new(0.0, 5.0)).y - p.project(GeoPoint::new(10.0, 5.0)).y;
        let high = p.project(GeoPoint::new(50.0, 5.0)).y - p.project(GeoPoint::new(60.0, 5.0)).y;
        assert!(high > low * 1.5);
    }

    #[test]
    fn test_invert_round_trip() {
        let b = Bounds::new(51.45, 51.56, -0.25, 0.05);
        let p = Projection::fit(&b, 1024.0, 768.0, 50.0).unwrap();
        let point = GeoPoint::new(51.5074, -0.1278);
        let back = p.invert(p.project(point));
        assert!(approx(back.latitude, point.latitude, 1e-9));
        assert!(approx(back.longitude, point.longitude, 1e-9));
    }

    #[test]
    fn test_margin_too_large_uses_whole_surface() {
        let b = Bounds::new(0.0, 1.0, 0.0, 1.0);
        let p = Projection::fit(&b, 80.0, 80.0, 50.0).unwrap();
        let s = p.project(b.center());
        assert!(s.x.is_finite() && s.y.is_finite());
        let sw = p.project(GeoPoint::new(0.0, 0.0));
        assert!(sw.x >= -1e-6 && sw.y <= 80.0 + 1e-6);
    }

    #[test]
    fn test_degenerate_bounds_do_not_divide_by_zero() {
        let b = Bounds::new(40.0, 40.0, -3.0, -3.0);
        let p = Projection::fit(&b, 800.0, 600.0, 50.0).unwrap();
        let s = p.project(GeoPoint::new(40.0, -3.0));
        assert!(approx(s.x, 400.0, 1e-9));
        assert!(approx(s.y, 300.0, 1e-9));
    }

    #[test]
    fn test_empty_bounds_rejected() {
        assert!(Projection::fit(&Bounds::EMPTY, 800.0, 600.0, 50.0).is_none());
    }
}
