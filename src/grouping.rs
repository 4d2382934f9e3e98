//! Group activities into map regions.
//!
//! Each activity is reduced to the mean of its decoded points and bucketed
//! into a square lat/lng grid cell. Activities sharing a cell are close enough
//! to be shown on one map. One degree is taken as 111 km on both axes, so
//! cells narrow with latitude, which is fine for picking a city.

use std::collections::HashMap;

use log::info;

use crate::polyline;
use crate::GeoPoint;

/// Default cell size in kilometres.
pub const DEFAULT_GRID_SIZE_KM: f64 = 200.0;

/// Approximate kilometres per degree.
const KM_PER_DEGREE: f64 = 111.0;

/// Arithmetic mean of a track's points, `None` for an empty track.
pub fn mean_center(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();
    Some(GeoPoint::new(sum_lat / n, sum_lng / n))
}

/// Grid cell of `center` for cells `grid_degrees` wide.
fn cell_of(center: GeoPoint, grid_degrees: f64) -> (i64, i64) {
    (
        (center.longitude / grid_degrees).floor() as i64,
        (center.latitude / grid_degrees).floor() as i64,
    )
}

/// Group polylines by the grid cell of their mean centre.
///
/// Returns indices into `polylines`, one `Vec` per occupied cell. Groups are
/// ordered by the first activity seen in each cell, and indices within a group
/// keep input order. Empty or malformed polylines belong to no group. A
/// non-positive or non-finite `grid_size_km` falls back to
/// [`DEFAULT_GRID_SIZE_KM`].
///
/// # Example
/// ```
/// use city_roads_map::{group_polylines, polyline, GeoPoint};
///
/// let madrid = polyline::encode(&[GeoPoint::new(40.41, -3.70), GeoPoint::new(40.42, -3.69)]);
/// let paris = polyline::encode(&[GeoPoint::new(48.85, 2.35), GeoPoint::new(48.86, 2.34)]);
///
/// let groups = group_polylines(&[&madrid, &paris, &madrid], 200.0);
/// assert_eq!(groups, vec![vec![0, 2], vec![1]]);
/// ```
pub fn group_polylines<S: AsRef<str>>(polylines: &[S], grid_size_km: f64) -> Vec<Vec<usize>> {
    let grid_km = if grid_size_km.is_finite() && grid_size_km > 0.0 {
        grid_size_km
    } else {
        DEFAULT_GRID_SIZE_KM
    };
    let grid_degrees = grid_km / KM_PER_DEGREE;

    let mut slots: HashMap<(i64, i64), usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut skipped = 0usize;

    for (i, encoded) in polylines.iter().enumerate() {
        let points = polyline::decode(encoded.as_ref());
        let Some(center) = mean_center(&points) else {
            skipped += 1;
            continue;
        };

        let slot = *slots.entry(cell_of(center, grid_degrees)).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(i);
    }

    info!(
        "[Grouping] {} activities -> {} regions ({} km grid, {} skipped)",
        polylines.len(),
        groups.len(),
        grid_km,
        skipped
    );

    groups
}
