//! Road network geometry, zoom-based filtering and viewport culling.
//!
//! Roads are ranked by importance from their OpenStreetMap `highway` class. At
//! low zoom only major roads are kept; each zoom step admits the next rank
//! down. Because the minimum rank never rises as zoom grows, a road visible at
//! a coarse zoom stays visible at every finer one.

use geo::{BoundingRect, Coord, LineString};
use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use crate::{Bounds, GeoPoint};

/// Road importance class, following OpenStreetMap `highway` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Path,
}

impl RoadClass {
    /// Importance rank, higher is more important.
    pub fn rank(self) -> u8 {
        match self {
            RoadClass::Motorway => 7,
            RoadClass::Trunk => 6,
            RoadClass::Primary => 5,
            RoadClass::Secondary => 4,
            RoadClass::Tertiary => 3,
            RoadClass::Residential => 2,
            RoadClass::Service => 1,
            RoadClass::Path => 0,
        }
    }

    /// Classify an OSM `highway` tag value. Link roads rank with their parent.
    pub fn from_highway(tag: &str) -> Self {
        match tag {
            "motorway" | "motorway_link" => RoadClass::Motorway,
            "trunk" | "trunk_link" => RoadClass::Trunk,
            "primary" | "primary_link" => RoadClass::Primary,
            "secondary" | "secondary_link" => RoadClass::Secondary,
            "tertiary" | "tertiary_link" => RoadClass::Tertiary,
            "residential" | "unclassified" | "road" => RoadClass::Residential,
            "service" | "living_street" => RoadClass::Service,
            _ => RoadClass::Path,
        }
    }
}

/// One road way: an ordered polyline with an importance class.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadSegment {
    /// Stable identity (OSM way id for Overpass data)
    pub id: u64,
    pub points: Vec<GeoPoint>,
    pub class: RoadClass,
}

impl RoadSegment {
    pub fn new(id: u64, points: Vec<GeoPoint>, class: RoadClass) -> Self {
        Self { id, points, class }
    }
}

/// Lowest rank displayed at zoom scale `k`. Non-increasing in `k`; from
/// k = 4 every road is shown.
pub fn min_rank_for_zoom(k: f64) -> u8 {
    if k < 1.0 {
        RoadClass::Secondary.rank()
    } else if k < 2.0 {
        RoadClass::Tertiary.rank()
    } else if k < 4.0 {
        RoadClass::Residential.rank()
    } else {
        RoadClass::Path.rank()
    }
}

/// Select the roads appropriate for zoom scale `k`.
///
/// # Example
/// ```
/// use city_roads_map::{filter_by_zoom, GeoPoint, RoadClass, RoadSegment};
///
/// let line = vec![GeoPoint::new(40.0, -3.0), GeoPoint::new(40.01, -3.0)];
/// let roads = vec![
///     RoadSegment::new(1, line.clone(), RoadClass::Primary),
///     RoadSegment::new(2, line, RoadClass::Residential),
/// ];
///
/// assert_eq!(filter_by_zoom(&roads, 0.8).len(), 1);
/// assert_eq!(filter_by_zoom(&roads, 3.0).len(), 2);
/// ```
pub fn filter_by_zoom(roads: &[RoadSegment], k: f64) -> Vec<&RoadSegment> {
    let min_rank = min_rank_for_zoom(k);
    roads.iter().filter(|r| r.class.rank() >= min_rank).collect()
}

/// Envelope of one road for R-tree indexing.
#[derive(Debug, Clone)]
struct RoadEnvelope {
    index: usize,
    min: [f64; 2],
    max: [f64; 2],
}

impl RTreeObject for RoadEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Road set with a spatial index for culling roads outside the visible window.
#[derive(Default)]
pub struct RoadIndex {
    roads: Vec<RoadSegment>,
    tree: RTree<RoadEnvelope>,
}

impl std::fmt::Debug for RoadIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadIndex")
            .field("roads", &self.roads.len())
            .field("indexed", &self.tree.size())
            .finish()
    }
}

impl RoadIndex {
    /// Index `roads`. Roads with no points are dropped.
    pub fn new(roads: Vec<RoadSegment>) -> Self {
        let roads: Vec<RoadSegment> = roads.into_iter().filter(|r| !r.points.is_empty()).collect();

        let envelopes: Vec<RoadEnvelope> = roads
            .iter()
            .enumerate()
            .filter_map(|(index, road)| {
                let line: LineString<f64> = road
                    .points
                    .iter()
                    .map(|p| Coord { x: p.longitude, y: p.latitude })
                    .collect();
                let rect = line.bounding_rect()?;
                Some(RoadEnvelope {
                    index,
                    min: [rect.min().x, rect.min().y],
                    max: [rect.max().x, rect.max().y],
                })
            })
            .collect();

        debug!("[RoadIndex] Indexed {} roads", envelopes.len());

        Self {
            roads,
            tree: RTree::bulk_load(envelopes),
        }
    }

    pub fn roads(&self) -> &[RoadSegment] {
        &self.roads
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    /// Roads passing the zoom filter whose envelope touches `window`, in
    /// their original order.
    pub fn visible(&self, window: &Bounds, k: f64) -> Vec<&RoadSegment> {
        if window.is_empty() {
            return Vec::new();
        }
        let min_rank = min_rank_for_zoom(k);
        let query = AABB::from_corners(
            [window.min_lng, window.min_lat],
            [window.max_lng, window.max_lat],
        );

        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|e| e.index)
            .filter(|&i| self.roads[i].class.rank() >= min_rank)
            .collect();
        hits.sort_unstable();
        hits.into_iter().map(|i| &self.roads[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL_CLASSES: [RoadClass; 8] = [
        RoadClass::Motorway,
        RoadClass::Trunk,
        RoadClass::Primary,
        RoadClass::Secondary,
        RoadClass::Tertiary,
        RoadClass::Residential,
        RoadClass::Service,
        RoadClass::Path,
    ];

    fn sample_roads() -> Vec<RoadSegment> {
        ALL_CLASSES
            .iter()
            .enumerate()
            .map(|(i, class)| {
                let lat = 40.0 + i as f64 * 0.01;
                RoadSegment::new(
                    i as u64 + 1,
                    vec![GeoPoint::new(lat, -3.0), GeoPoint::new(lat, -2.99)],
                    *class,
                )
            })
            .collect()
    }

    fn ids(roads: &[&RoadSegment]) -> HashSet<u64> {
        roads.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_filter_is_monotonic() {
        let roads = sample_roads();
        let zooms = [0.6, 0.9, 1.0, 1.5, 2.0, 3.9, 4.0, 7.5, 8.0, 20.0];

        for (i, &k1) in zooms.iter().enumerate() {
            for &k2 in &zooms[i..] {
                let low = ids(&filter_by_zoom(&roads, k1));
                let high = ids(&filter_by_zoom(&roads, k2));
                assert!(low.is_subset(&high), "k={} not a subset of k={}", k1, k2);
            }
        }
    }

    #[test]
    fn test_filter_coarsens_when_zoomed_out() {
        let roads = sample_roads();
        let coarse = filter_by_zoom(&roads, 0.6);
        assert!(coarse.iter().all(|r| r.class.rank() >= RoadClass::Secondary.rank()));
        assert_eq!(coarse.len(), 4);
        assert_eq!(filter_by_zoom(&roads, 20.0).len(), roads.len());
        assert_eq!(filter_by_zoom(&roads, 4.0).len(), roads.len());
        assert_eq!(filter_by_zoom(&roads, 3.9).len(), 6);
    }

    #[test]
    fn test_min_rank_non_increasing() {
        let mut prev = u8::MAX;
        let mut k = 0.1;
        while k < 30.0 {
            let rank = min_rank_for_zoom(k);
            assert!(rank <= prev);
            prev = rank;
            k *= 1.1;
        }
    }

    #[test]
    fn test_from_highway() {
        assert_eq!(RoadClass::from_highway("primary_link"), RoadClass::Primary);
        assert_eq!(RoadClass::from_highway("unclassified"), RoadClass::Residential);
        assert_eq!(RoadClass::from_highway("living_street"), RoadClass::Service);
        assert_eq!(RoadClass::from_highway("cycleway"), RoadClass::Path);
    }

    #[test]
    fn test_index_culls_outside_window() {
        let index = RoadIndex::new(sample_roads());
        // Only the first three roads (lat 40.00..40.02) fall inside
        let window = Bounds::new(39.995, 40.025, -3.01, -2.98);
        let visible = index.visible(&window, 20.0);
        let got: Vec<u64> = visible.iter().map(|r| r.id).collect();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn test_index_applies_zoom_filter() {
        let index = RoadIndex::new(sample_roads());
        let window = Bounds::new(39.0, 41.0, -4.0, -2.0);
        assert_eq!(index.visible(&window, 0.6).len(), 4);
        assert_eq!(index.visible(&window, 20.0).len(), 8);
        assert!(index.visible(&Bounds::EMPTY, 20.0).is_empty());
    }

    #[test]
    fn test_index_drops_empty_roads() {
        let index = RoadIndex::new(vec![RoadSegment::new(9, vec![], RoadClass::Primary)]);
        assert!(index.is_empty());
    }
}
