//! Road fetch orchestration.
//!
//! Road data is fetched asynchronously, once per view bounds. Each request
//! carries a generation number; when the bounds change before a fetch
//! resolves, the older response arrives with a superseded generation and is
//! dropped instead of overwriting newer data. There is no cancellation, only
//! this staleness check.
//!
//! Fetch failures never propagate: they are logged here and become an empty
//! road layer for that cycle.

use std::future::Future;

use log::{debug, info, warn};

use crate::error::Result;
use crate::roads::{RoadIndex, RoadSegment};
use crate::Bounds;

/// Source of road geometry for a bounding box.
pub trait RoadProvider {
    fn fetch_roads(&self, bounds: Bounds) -> impl Future<Output = Result<Vec<RoadSegment>>> + Send;
}

/// A road fetch the view wants issued.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadRequest {
    pub generation: u64,
    pub bounds: Bounds,
}

/// Outcome of a road fetch, tagged with the request it answers.
#[derive(Debug, Clone)]
pub struct RoadResponse {
    pub generation: u64,
    pub bounds: Bounds,
    pub roads: Vec<RoadSegment>,
    pub success: bool,
    pub error: Option<String>,
}

/// Run one fetch, converting failure into an empty response.
pub async fn fetch_roads<P: RoadProvider>(provider: &P, request: RoadRequest) -> RoadResponse {
    match provider.fetch_roads(request.bounds).await {
        Ok(roads) => RoadResponse {
            generation: request.generation,
            bounds: request.bounds,
            roads,
            success: true,
            error: None,
        },
        Err(e) => {
            warn!("[RoadFetch #{}] Failed: {}", request.generation, e);
            RoadResponse {
                generation: request.generation,
                bounds: request.bounds,
                roads: Vec::new(),
                success: false,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Run a fetch on the tokio runtime and send the response back to the render
/// thread, which remains the only writer of road state.
#[cfg(feature = "http")]
pub fn spawn_fetch<P>(
    provider: std::sync::Arc<P>,
    request: RoadRequest,
    tx: tokio::sync::mpsc::UnboundedSender<RoadResponse>,
) -> tokio::task::JoinHandle<()>
where
    P: RoadProvider + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let response = fetch_roads(provider.as_ref(), request).await;
        if tx.send(response).is_err() {
            debug!("[RoadFetch #{}] View dropped before response", request.generation);
        }
    })
}

/// Road data for the current bounds plus the in-flight request, if any.
#[derive(Debug, Default)]
pub struct RoadLayer {
    generation: u64,
    pending: Option<RoadRequest>,
    index: RoadIndex,
}

impl RoadLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for new bounds. Roads for the old bounds are discarded.
    pub fn request(&mut self, bounds: Bounds) -> RoadRequest {
        self.generation += 1;
        let request = RoadRequest {
            generation: self.generation,
            bounds,
        };
        self.pending = Some(request);
        self.index = RoadIndex::default();
        debug!("[RoadLayer] Requesting roads #{} for {:?}", request.generation, bounds);
        request
    }

    /// Drop all roads and supersede any in-flight request.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.index = RoadIndex::default();
    }

    /// Accept a response if it answers the current request.
    ///
    /// Returns true when the layer changed (new roads, or loading finished
    /// with an error) and the view should re-render.
    pub fn apply(&mut self, response: RoadResponse) -> bool {
        match self.pending {
            Some(pending) if pending.generation == response.generation => {}
            _ => {
                debug!(
                    "[RoadLayer] Discarding stale response #{} (current #{})",
                    response.generation, self.generation
                );
                return false;
            }
        }

        self.pending = None;
        if response.success {
            self.index = RoadIndex::new(response.roads);
            info!("[RoadLayer] Accepted {} roads for #{}", self.index.len(), response.generation);
        } else {
            warn!(
                "[RoadLayer] No road layer this cycle: {}",
                response.error.as_deref().unwrap_or("unknown error")
            );
        }
        true
    }

    /// True while a fetch for the current bounds is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn index(&self) -> &RoadIndex {
        &self.index
    }
}
