//! # City Roads Map
//!
//! Heat-trail rendering of aggregated ride history over a zoomable city road network.
//!
//! This library provides:
//! - Polyline decoding (1e5 precision) with soft failure on malformed input
//! - Route frequency/intensity aggregation across many activities
//! - Aspect-corrected, padded view bounds and a Mercator fit-to-extent projection
//! - Zoom-aware road filtering and a pan/zoom transform controller
//! - A renderer that strokes roads then routes onto any [`render::Surface`]
//! - Grouping of activities into map regions
//!
//! ## Features
//!
//! - **`parallel`** - Decode polyline batches with rayon
//! - **`serde`** - Serialize/deserialize [`MapConfig`]
//! - **`http`** - Overpass road-network provider and tokio fetch glue
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use city_roads_map::{GeoPoint, MapConfig, MapView, polyline, render::DisplayList};
//!
//! let ride = polyline::encode(&[
//!     GeoPoint::new(40.4168, -3.7038),
//!     GeoPoint::new(40.4200, -3.7000),
//!     GeoPoint::new(40.4250, -3.6950),
//! ]);
//!
//! let mut view = MapView::new(MapConfig::default(), 800.0, 600.0).unwrap();
//! let request = view.set_polylines(&[ride]);
//! assert!(request.is_some()); // roads for the new bounds should be fetched
//!
//! let mut surface = DisplayList::new();
//! view.render(&mut surface, 2.0);
//! assert_eq!(surface.stroke_count(), 1);
//! ```

// Unified error handling
pub mod error;
pub use error::{MapError, PolylineError, Result};

// Map configuration (styles, zoom limits)
pub mod config;
pub use config::{MapConfig, RoadStyle, RouteStyle, Rgba, ZoomSettings};

// Encoded polyline codec
pub mod polyline;

// Point recurrence counting and route intensity
pub mod frequency;
pub use frequency::{aggregate, decode_routes};

// View bounds (raw, aspect-corrected, padded)
pub mod bounds;

// Mercator fit-to-extent projection
pub mod projection;
pub use projection::{Projection, ScreenPoint};

// Road segments, zoom filtering, spatial index
pub mod roads;
pub use roads::{filter_by_zoom, RoadClass, RoadIndex, RoadSegment};

// Road fetch orchestration with staleness guard
pub mod fetch;
pub use fetch::{RoadLayer, RoadProvider, RoadRequest, RoadResponse};

// Overpass API road provider
#[cfg(feature = "http")]
pub mod overpass;

#[cfg(feature = "http")]
pub use overpass::{OverpassClient, OverpassConfig};

// Pan/zoom state machine
pub mod zoom;
pub use zoom::{DeltaMode, InputEvent, Transform, ZoomPanController};

// Drawing surface abstraction and renderer
pub mod render;
pub use render::{BlendMode, DisplayList, StrokeStyle, Surface};

// Owned view state tying the pipeline together
pub mod view;
pub use view::MapView;

// Activity grouping into map regions
pub mod grouping;
pub use grouping::group_polylines;

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate in degrees.
///
/// # Example
/// ```
/// use city_roads_map::GeoPoint;
/// let point = GeoPoint::new(40.4168, -3.7038); // Madrid
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// An axis-aligned rectangle in latitude/longitude space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Fold identity: every real point shrinks min and grows max past it.
    pub const EMPTY: Bounds = Bounds {
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
        min_lng: f64::INFINITY,
        max_lng: f64::NEG_INFINITY,
    };

    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64) -> Self {
        Self { min_lat, max_lat, min_lng, max_lng }
    }

    /// True for the sentinel produced by folding over no points.
    pub fn is_empty(&self) -> bool {
        !(self.min_lat <= self.max_lat && self.min_lng <= self.max_lng)
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lng_span(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    /// Inclusive overlap test.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_lat <= other.max_lat
            && other.min_lat <= self.max_lat
            && self.min_lng <= other.max_lng
            && other.min_lng <= self.max_lng
    }
}

/// A decoded activity route annotated with how repeated it is.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRoute {
    /// Ordered points (empty when the polyline was malformed)
    pub points: Vec<GeoPoint>,
    /// Highest point recurrence count along this route (>= 1)
    pub frequency: u32,
    /// Frequency normalized against the dataset maximum, in [0, 1]
    pub intensity: f64,
}

impl DecodedRoute {
    /// A route that repeats nothing.
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self {
            points,
            frequency: 1,
            intensity: 0.0,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
