//! Route frequency and intensity aggregation.
//!
//! Counts how often each quantized point recurs across every decoded route:
//! - Point keys are latitude/longitude rounded to 5 decimal places
//! - A route's frequency is the highest count among its own points
//! - Intensity normalizes that frequency against the most repeated point overall

use std::collections::HashMap;

use log::{debug, info};

use crate::{polyline, DecodedRoute, GeoPoint};

/// Quantized point key (coordinates scaled by 1e5 and rounded).
type PointKey = (i64, i64);

fn point_key(p: &GeoPoint) -> PointKey {
    (
        (p.latitude * polyline::PRECISION).round() as i64,
        (p.longitude * polyline::PRECISION).round() as i64,
    )
}

/// Occurrence counter over quantized points.
#[derive(Debug)]
struct FrequencyGrid {
    counts: HashMap<PointKey, u32>,
    max_count: u32,
}

impl FrequencyGrid {
    fn new() -> Self {
        Self {
            counts: HashMap::new(),
            max_count: 1,
        }
    }

    fn add_point(&mut self, p: &GeoPoint) {
        let count = self.counts.entry(point_key(p)).or_insert(0);
        *count += 1;
        self.max_count = self.max_count.max(*count);
    }

    fn count(&self, p: &GeoPoint) -> u32 {
        self.counts.get(&point_key(p)).copied().unwrap_or(1)
    }

    /// Highest count among a route's points; 1 for an empty route.
    fn route_frequency(&self, points: &[GeoPoint]) -> u32 {
        points.iter().map(|p| self.count(p)).max().unwrap_or(1)
    }

    fn intensity(&self, frequency: u32) -> f64 {
        if self.max_count <= 1 {
            return 0.0;
        }
        let value = (frequency as f64 - 1.0) / (self.max_count as f64 - 1.0);
        value.clamp(0.0, 1.0)
    }
}

/// Annotate each route with its frequency and intensity.
///
/// Every occurrence counts, including a point repeated within the same route.
///
/// # Example
/// ```
/// use city_roads_map::{GeoPoint, frequency::aggregate};
///
/// let a = vec![GeoPoint::new(40.000, -3.000), GeoPoint::new(40.001, -3.001)];
/// let b = vec![GeoPoint::new(40.001, -3.001), GeoPoint::new(40.002, -3.002)];
///
/// let routes = aggregate(vec![a, b]);
/// assert_eq!(routes[0].frequency, 2);
/// assert_eq!(routes[1].intensity, 1.0);
/// ```
pub fn aggregate(routes_raw: Vec<Vec<GeoPoint>>) -> Vec<DecodedRoute> {
    let mut grid = FrequencyGrid::new();
    for points in &routes_raw {
        for p in points {
            grid.add_point(p);
        }
    }

    debug!(
        "[Frequency] {} distinct points, global max {}",
        grid.counts.len(),
        grid.max_count
    );

    routes_raw
        .into_iter()
        .map(|points| {
            let frequency = grid.route_frequency(&points);
            DecodedRoute {
                intensity: grid.intensity(frequency),
                frequency,
                points,
            }
        })
        .collect()
}

/// Decode every polyline and aggregate the results.
///
/// Malformed polylines decode to empty routes, which keep their slot in the
/// output so indices still line up with the input.
pub fn decode_routes<S: AsRef<str> + Sync>(polylines: &[S]) -> Vec<DecodedRoute> {
    #[cfg(feature = "parallel")]
    let raw: Vec<Vec<GeoPoint>> = {
        use rayon::prelude::*;
        polylines
            .par_iter()
            .map(|line| polyline::decode(line.as_ref()))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let raw: Vec<Vec<GeoPoint>> = polylines
        .iter()
        .map(|line| polyline::decode(line.as_ref()))
        .collect();

    let empty = raw.iter().filter(|r| r.is_empty()).count();
    let routes = aggregate(raw);

    info!(
        "[Frequency] Decoded {} routes ({} empty or malformed)",
        routes.len(),
        empty
    );

    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyline::encode;

    fn pts(coords: &[(f64, f64)]) -> Vec<GeoPoint> {
        coords.iter().map(|&(lat, lng)| GeoPoint::new(lat, lng)).collect()
    }

    #[test]
    fn test_shared_point_scenario() {
        let a = pts(&[(40.000, -3.000), (40.001, -3.001)]);
        let b = pts(&[(40.001, -3.001), (40.002, -3.002)]);

        let routes = aggregate(vec![a, b]);

        assert_eq!(routes.len(), 2);
        for route in &routes {
            assert_eq!(route.frequency, 2);
            assert_eq!(route.intensity, 1.0);
        }
    }

    #[test]
    fn test_single_route_unique_points() {
        let route = pts(&[(40.0, -3.0), (40.1, -3.1), (40.2, -3.2)]);
        let routes = aggregate(vec![route]);

        assert_eq!(routes[0].frequency, 1);
        assert_eq!(routes[0].intensity, 0.0);
    }

    #[test]
    fn test_identical_routes() {
        let route = pts(&[(51.5074, -0.1278), (51.5080, -0.1290), (51.5090, -0.1300)]);

        for n in 1..=5u32 {
            let routes = aggregate(vec![route.clone(); n as usize]);
            for r in &routes {
                assert_eq!(r.frequency, n);
                let expected = if n == 1 { 0.0 } else { 1.0 };
                assert_eq!(r.intensity, expected);
            }
        }
    }

    #[test]
    fn test_repeat_within_route_counts() {
        // An out-and-back passes its turnaround neighbour twice
        let route = pts(&[(40.0, -3.0), (40.001, -3.0), (40.002, -3.0), (40.001, -3.0)]);
        let routes = aggregate(vec![route]);

        assert_eq!(routes[0].frequency, 2);
        assert_eq!(routes[0].intensity, 1.0);
    }

    #[test]
    fn test_intensity_is_relative_to_global_max() {
        let hot = pts(&[(10.0, 10.0)]);
        let one_off = pts(&[(20.0, 20.0), (10.0, 10.0)]);
        let lonely = pts(&[(30.0, 30.0)]);

        let routes = aggregate(vec![hot.clone(), hot, one_off, lonely]);

        assert_eq!(routes[0].frequency, 3);
        assert_eq!(routes[2].frequency, 3);
        assert_eq!(routes[3].frequency, 1);
        assert_eq!(routes[3].intensity, 0.0);
        assert_eq!(routes[0].intensity, 1.0);
    }

    #[test]
    fn test_quantization_merges_nearby_points() {
        let a = pts(&[(40.000001, -3.000001)]);
        let b = pts(&[(40.000002, -3.000002)]);
        let routes = aggregate(vec![a, b]);
        assert_eq!(routes[0].frequency, 2);
    }

    #[test]
    fn test_empty_route_keeps_slot() {
        let routes = aggregate(vec![vec![], pts(&[(1.0, 1.0)])]);
        assert_eq!(routes.len(), 2);
        assert!(routes[0].points.is_empty());
        assert_eq!(routes[0].frequency, 1);
        assert_eq!(routes[0].intensity, 0.0);
    }

    #[test]
    fn test_decode_routes_skips_malformed() {
        let good = encode(&pts(&[(40.0, -3.0), (40.001, -3.001)]));
        let lines = vec![good.clone(), "_p~".to_string(), good];

        let routes = decode_routes(&lines);

        assert_eq!(routes.len(), 3);
        assert!(routes[1].points.is_empty());
        assert_eq!(routes[0].frequency, 2);
        assert_eq!(routes[2].intensity, 1.0);
    }
}
