//! Owned map view state.
//!
//! `MapView` holds everything one mounted map needs (decoded routes, view
//! bounds, projection, pan/zoom controller, road layer) and recomputes it
//! explicitly when an input changes:
//! - new polylines → routes, bounds and projection rebuilt, road fetch requested
//! - resize → projection rebuilt, transform re-constrained
//! - input event → transform updated
//! - road response → road layer replaced if not stale
//!
//! Rendering is a pure function of the current state and can be repeated at will.

use log::info;

use crate::bounds;
use crate::config::MapConfig;
use crate::error::Result;
use crate::fetch::{RoadLayer, RoadRequest, RoadResponse};
use crate::frequency::decode_routes;
use crate::projection::{Projection, ScreenPoint};
use crate::render::{self, Frame, Surface};
use crate::roads::RoadSegment;
use crate::zoom::{InputEvent, Transform, ZoomPanController};
use crate::{Bounds, DecodedRoute};

/// State for one mounted map.
#[derive(Debug)]
pub struct MapView {
    config: MapConfig,
    width: f64,
    height: f64,
    show_road_network: bool,
    routes: Vec<DecodedRoute>,
    /// Raw bounds of the route geometry
    content: Option<Bounds>,
    /// Aspect-corrected, padded bounds used for the road fetch
    bounds: Option<Bounds>,
    projection: Option<Projection>,
    zoom: ZoomPanController,
    roads: RoadLayer,
}

impl MapView {
    /// Mount a view on a `width` × `height` surface (logical pixels).
    pub fn new(config: MapConfig, width: f64, height: f64) -> Result<Self> {
        config.validate()?;
        let zoom = ZoomPanController::mount(config.zoom.clone(), width, height);
        Ok(Self {
            config,
            width,
            height,
            show_road_network: true,
            routes: Vec::new(),
            content: None,
            bounds: None,
            projection: None,
            zoom,
            roads: RoadLayer::new(),
        })
    }

    /// Replace the displayed activities.
    ///
    /// Returns the road request to issue for the new bounds, or `None` when
    /// there is no content or the road network is hidden.
    pub fn set_polylines<S: AsRef<str> + Sync>(&mut self, polylines: &[S]) -> Option<RoadRequest> {
        self.routes = decode_routes(polylines);

        let aspect = if self.height > 0.0 { self.width / self.height } else { 1.0 };
        self.content = bounds::bounds_for_routes(&self.routes);
        self.bounds = self
            .content
            .map(|raw| bounds::expand(&raw, aspect, self.config.zoom.expanded_padding));
        self.rebuild_projection();

        match self.bounds {
            Some(b) => info!(
                "[MapView] {} routes, bounds lat {:.5}..{:.5} lng {:.5}..{:.5}",
                self.routes.len(),
                b.min_lat,
                b.max_lat,
                b.min_lng,
                b.max_lng
            ),
            None => info!("[MapView] No content to display"),
        }

        self.refresh_roads()
    }

    /// Toggle the background road network. Enabling it requests roads for
    /// the current bounds.
    pub fn set_show_road_network(&mut self, show: bool) -> Option<RoadRequest> {
        if show == self.show_road_network {
            return None;
        }
        self.show_road_network = show;
        self.refresh_roads()
    }

    fn refresh_roads(&mut self) -> Option<RoadRequest> {
        match self.bounds {
            Some(b) if self.show_road_network => Some(self.roads.request(b)),
            _ => {
                self.roads.clear();
                None
            }
        }
    }

    /// Fit the route geometry itself inside the margin. The expanded bounds
    /// share its centre but only drive the road fetch.
    fn rebuild_projection(&mut self) {
        self.projection = self.content.as_ref().and_then(|raw| {
            Projection::fit(
                &bounds::with_min_span(raw),
                self.width,
                self.height,
                self.config.zoom.initial_extent_padding,
            )
        });
    }

    /// Adapt to a new surface size. The view bounds are kept; only the
    /// projection and transform limits follow the new size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.rebuild_projection();
        self.zoom.resize(width, height);
    }

    /// Feed a pan/zoom event. Returns true when the view must re-render.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        self.zoom.handle(event)
    }

    /// Deliver a road fetch result. Returns true when the view must re-render.
    pub fn apply_roads(&mut self, response: RoadResponse) -> bool {
        self.roads.apply(response)
    }

    /// Geographic window currently visible through the transform.
    pub fn visible_bounds(&self) -> Option<Bounds> {
        let projection = self.projection.as_ref()?;
        let t = self.zoom.transform();
        let corners = [
            ScreenPoint::new(0.0, 0.0),
            ScreenPoint::new(self.width, self.height),
        ]
        .map(|s| projection.invert(t.invert(s)));
        Some(bounds::raw_bounds(&corners))
    }

    /// Roads that pass the zoom filter and fall inside the visible window.
    pub fn visible_roads(&self) -> Vec<&RoadSegment> {
        if !self.show_road_network {
            return Vec::new();
        }
        match self.visible_bounds() {
            Some(window) => self.roads.index().visible(&window, self.zoom.transform().k),
            None => Vec::new(),
        }
    }

    /// Redraw everything onto `surface`. Returns false if the surface had no
    /// drawing context.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S, display_scale: f64) -> bool {
        let roads = self.visible_roads();
        render::render(
            surface,
            &self.config,
            &Frame {
                width: self.width,
                height: self.height,
                display_scale,
                projection: self.projection.as_ref(),
                transform: self.zoom.transform(),
                routes: &self.routes,
                roads: &roads,
                show_roads: self.show_road_network,
            },
        )
    }

    pub fn routes(&self) -> &[DecodedRoute] {
        &self.routes
    }

    /// Expanded view bounds, `None` when there is no content.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn transform(&self) -> Transform {
        self.zoom.transform()
    }

    /// True while roads for the current bounds are being fetched.
    pub fn is_loading(&self) -> bool {
        self.roads.is_loading()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }
}
