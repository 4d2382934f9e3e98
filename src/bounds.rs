//! # Bounds Calculation
//!
//! Raw bounding boxes over decoded routes, and the aspect-corrected, padded
//! expansion the map view is framed on.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`raw_bounds`] | Min/max fold over a point set (sentinel when empty) |
//! | [`bounds_for_routes`] | Raw bounds over all routes, `None` when there is no content |
//! | [`with_min_span`] | Widen zero-span bounds so they can be framed |
//! | [`expand`] | Grow the deficient dimension to an aspect ratio, then pad |
//!
//! ## Example
//!
//! ```rust
//! use city_roads_map::{Bounds, bounds};
//!
//! let b = Bounds::new(40.0, 40.0, -3.0, -3.0); // single point
//! let view = bounds::expand(&b, 2.0, 0.5);
//!
//! assert!(view.lat_span() > 0.0);
//! assert!((view.lng_span() / view.lat_span() - 2.0).abs() < 1e-9);
//! ```

use crate::{Bounds, DecodedRoute, GeoPoint};

/// Smallest span either dimension may have before aspect correction
/// (degrees, roughly 11 m of latitude).
pub const DEGENERATE_SPAN: f64 = 1e-4;

/// Fold over all points taking independent min/max of latitude and longitude.
///
/// Empty input yields the sentinel `Bounds::EMPTY` (see [`Bounds::is_empty`]),
/// which must never reach the projection.
pub fn raw_bounds<'a, I>(points: I) -> Bounds
where
    I: IntoIterator<Item = &'a GeoPoint>,
{
    points.into_iter().fold(Bounds::EMPTY, |b, p| Bounds {
        min_lat: b.min_lat.min(p.latitude),
        max_lat: b.max_lat.max(p.latitude),
        min_lng: b.min_lng.min(p.longitude),
        max_lng: b.max_lng.max(p.longitude),
    })
}

/// Raw bounds over every route's points, or `None` when no route has points.
pub fn bounds_for_routes(routes: &[DecodedRoute]) -> Option<Bounds> {
    let bounds = raw_bounds(routes.iter().flat_map(|r| r.points.iter()));
    if bounds.is_empty() {
        None
    } else {
        Some(bounds)
    }
}

/// Raise each span to at least [`DEGENERATE_SPAN`], keeping the centre fixed.
pub fn with_min_span(bounds: &Bounds) -> Bounds {
    let center = bounds.center();
    let lat_half = bounds.lat_span().max(DEGENERATE_SPAN) / 2.0;
    let lng_half = bounds.lng_span().max(DEGENERATE_SPAN) / 2.0;
    Bounds {
        min_lat: center.latitude - lat_half,
        max_lat: center.latitude + lat_half,
        min_lng: center.longitude - lng_half,
        max_lng: center.longitude + lng_half,
    }
}

/// Expand bounds to `aspect_ratio` (lng span / lat span) and pad both spans by
/// `padding_fraction` on each side, keeping the centre fixed.
///
/// Only the deficient dimension grows; neither span ever shrinks. A
/// non-finite or non-positive aspect ratio is treated as square.
pub fn expand(bounds: &Bounds, aspect_ratio: f64, padding_fraction: f64) -> Bounds {
    let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };
    let center = bounds.center();

    let mut lat_span = bounds.lat_span().max(DEGENERATE_SPAN);
    let mut lng_span = bounds.lng_span().max(DEGENERATE_SPAN);

    if lng_span / lat_span > aspect {
        // too wide, grow height
        lat_span = lng_span / aspect;
    } else {
        lng_span = lat_span * aspect;
    }

    let pad = 1.0 + 2.0 * padding_fraction.max(0.0);
    lat_span *= pad;
    lng_span *= pad;

    Bounds {
        min_lat: center.latitude - lat_span / 2.0,
        max_lat: center.latitude + lat_span / 2.0,
        min_lng: center.longitude - lng_span / 2.0,
        max_lng: center.longitude + lng_span / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_ratio(b: &Bounds, aspect: f64) {
        let ratio = b.lng_span() / b.lat_span();
        assert!(
            ((ratio - aspect) / aspect).abs() < 1e-9,
            "expected ratio {}, got {}",
            aspect,
            ratio
        );
    }

    #[test]
    fn test_raw_bounds() {
        let points = vec![
            GeoPoint::new(51.5074, -0.1278),
            GeoPoint::new(51.5100, -0.1310),
            GeoPoint::new(51.5050, -0.1200),
        ];
        let b = raw_bounds(&points);
        assert_eq!(b.min_lat, 51.5050);
        assert_eq!(b.max_lat, 51.5100);
        assert_eq!(b.min_lng, -0.1310);
        assert_eq!(b.max_lng, -0.1200);
        assert!(b.min_lat <= b.max_lat && b.min_lng <= b.max_lng);
    }

    #[test]
    fn test_raw_bounds_empty_is_sentinel() {
        let b = raw_bounds(&Vec::<GeoPoint>::new());
        assert!(b.is_empty());
        assert_eq!(bounds_for_routes(&[]), None);
    }

    #[test]
    fn test_bounds_for_routes_ignores_empty_routes() {
        let routes = vec![
            DecodedRoute::new(vec![]),
            DecodedRoute::new(vec![GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0)]),
        ];
        let b = bounds_for_routes(&routes).unwrap();
        assert_eq!(b, Bounds::new(1.0, 3.0, 2.0, 4.0));
    }

    #[test]
    fn test_expand_wide_grows_height() {
        let b = Bounds::new(40.0, 40.1, -3.0, -2.0);
        let e = expand(&b, 2.0, 0.0);
        assert_ratio(&e, 2.0);
        assert!((e.lng_span() - 1.0).abs() < 1e-12);
        assert!((e.lat_span() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_expand_tall_grows_width() {
        let b = Bounds::new(40.0, 41.0, -3.0, -2.9);
        let e = expand(&b, 1.5, 0.0);
        assert_ratio(&e, 1.5);
        assert!((e.lat_span() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_expand_padding_and_center() {
        let b = Bounds::new(40.0, 40.2, -3.4, -3.0);
        let e = expand(&b, 2.0, 0.5);

        assert_ratio(&e, 2.0);
        // 0.4 lng span, doubled by the padding
        assert!((e.lng_span() - 0.8).abs() < 1e-12);
        let (c, ec) = (b.center(), e.center());
        assert!((c.latitude - ec.latitude).abs() < 1e-12);
        assert!((c.longitude - ec.longitude).abs() < 1e-12);
    }

    #[test]
    fn test_expand_never_shrinks() {
        let b = Bounds::new(10.0, 12.0, 20.0, 23.0);
        for aspect in [0.25, 0.5, 1.0, 1.5, 3.0, 10.0] {
            let e = expand(&b, aspect, 0.0);
            assert!(e.lat_span() >= b.lat_span() - 1e-12);
            assert!(e.lng_span() >= b.lng_span() - 1e-12);
            assert_ratio(&e, aspect);
        }
    }

    #[test]
    fn test_expand_single_point() {
        let b = Bounds::new(40.0, 40.0, -3.0, -3.0);
        let e = expand(&b, 2.0, 0.5);

        assert!(e.lat_span() > 0.0);
        assert!(e.lng_span() > 0.0);
        assert_ratio(&e, 2.0);
        assert!((e.center().latitude - 40.0).abs() < 1e-12);
        assert!((e.center().longitude - -3.0).abs() < 1e-12);
    }

    #[test]
    fn test_with_min_span() {
        let point = with_min_span(&Bounds::new(40.0, 40.0, -3.0, -3.0));
        assert!((point.lat_span() - DEGENERATE_SPAN).abs() < 1e-12);
        assert!((point.lng_span() - DEGENERATE_SPAN).abs() < 1e-12);
        assert!((point.center().latitude - 40.0).abs() < 1e-12);

        let wide = Bounds::new(40.0, 41.0, -3.0, -2.0);
        assert_eq!(with_min_span(&wide), wide);
    }

    #[test]
    fn test_expand_bad_aspect_is_square() {
        let b = Bounds::new(0.0, 1.0, 0.0, 1.0);
        assert_ratio(&expand(&b, f64::NAN, 0.0), 1.0);
        assert_ratio(&expand(&b, 0.0, 0.0), 1.0);
    }
}
