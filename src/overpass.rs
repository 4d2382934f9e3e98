//! Overpass API road provider.
//!
//! Fetches every `highway` way inside the view bounds with full geometry
//! (`out geom`), so no second node lookup is needed. Overpass instances shed
//! load with 429 and 5xx responses; those and transport errors are retried
//! with exponential backoff, anything else fails the fetch immediately.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::fetch::RoadProvider;
use crate::roads::{RoadClass, RoadSegment};
use crate::{Bounds, GeoPoint};

/// Overpass endpoint and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverpassConfig {
    /// Interpreter URL.
    /// Default: the public overpass-api.de instance
    pub endpoint: String,

    /// Whole-request HTTP timeout in seconds.
    /// Default: 30
    pub timeout_secs: u64,

    /// Server-side query timeout passed in the query header, in seconds.
    /// Default: 25
    pub query_timeout_secs: u32,

    /// Retries after the first attempt for 429, 5xx and transport errors.
    /// Default: 3
    pub max_retries: u32,

    /// First backoff delay; doubles on each retry.
    /// Default: 500
    pub backoff_base_ms: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://overpass-api.de/api/interpreter".to_string(),
            timeout_secs: 30,
            query_timeout_secs: 25,
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

/// Overpass QL for all highway ways in `bounds` (south, west, north, east).
pub fn build_query(bounds: &Bounds, query_timeout_secs: u32) -> String {
    format!(
        "[out:json][timeout:{}];way[\"highway\"]({:.6},{:.6},{:.6},{:.6});out geom;",
        query_timeout_secs, bounds.min_lat, bounds.min_lng, bounds.max_lat, bounds.max_lng
    )
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    id: u64,
    #[serde(default)]
    geometry: Vec<Option<OverpassNode>>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct OverpassNode {
    lat: f64,
    lon: f64,
}

/// Parse an `out geom` JSON body into road segments.
///
/// Non-way elements, ways without a `highway` tag and ways with fewer than two
/// usable nodes are skipped.
pub fn parse_ways(body: &[u8]) -> Result<Vec<RoadSegment>> {
    let response: OverpassResponse = serde_json::from_slice(body)?;

    let roads = response
        .elements
        .into_iter()
        .filter(|e| e.kind == "way")
        .filter_map(|e| {
            let class = RoadClass::from_highway(e.tags.get("highway")?);
            let points: Vec<GeoPoint> = e
                .geometry
                .into_iter()
                .flatten()
                .map(|n| GeoPoint::new(n.lat, n.lon))
                .filter(GeoPoint::is_valid)
                .collect();
            (points.len() >= 2).then(|| RoadSegment::new(e.id, points, class))
        })
        .collect();

    Ok(roads)
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry number `retry` (1-based): base, 2×base, 4×base, capped at 8×base.
fn backoff(base_ms: u64, retry: u32) -> Duration {
    let exp = retry.saturating_sub(1).min(3);
    Duration::from_millis(base_ms.saturating_mul(1 << exp))
}

/// Road provider backed by an Overpass interpreter.
#[derive(Debug, Clone)]
pub struct OverpassClient {
    client: Client,
    config: OverpassConfig,
}

impl OverpassClient {
    pub fn new(config: OverpassConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(60))
            .user_agent(concat!("city-roads-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OverpassConfig {
        &self.config
    }

    async fn fetch(&self, bounds: Bounds) -> Result<Vec<RoadSegment>> {
        let query = build_query(&bounds, self.config.query_timeout_secs);
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let response = self
                .client
                .post(&self.config.endpoint)
                .form(&[("data", query.as_str())])
                .send()
                .await;

            let failure = match response {
                Ok(resp) if resp.status().is_success() => {
                    let bytes = resp.bytes().await?;
                    let roads = parse_ways(&bytes)?;
                    info!(
                        "[Overpass] {} roads ({:.1}KB) in {:?} after {} attempt(s)",
                        roads.len(),
                        bytes.len() as f64 / 1024.0,
                        start.elapsed(),
                        attempt
                    );
                    return Ok(roads);
                }
                Ok(resp) if is_retryable(resp.status()) => format!("HTTP {}", resp.status()),
                Ok(resp) => return Err(MapError::Status(resp.status().as_u16())),
                Err(e) => format!("request error: {}", e),
            };

            if attempt > self.config.max_retries {
                warn!("[Overpass] Giving up after {} attempts: {}", attempt, failure);
                return Err(MapError::RetriesExhausted { attempts: attempt });
            }

            let wait = backoff(self.config.backoff_base_ms, attempt);
            warn!("[Overpass] {}, retry {} after {:?}", failure, attempt, wait);
            tokio::time::sleep(wait).await;
            debug!("[Overpass] Retrying {}", self.config.endpoint);
        }
    }
}

impl RoadProvider for OverpassClient {
    async fn fetch_roads(&self, bounds: Bounds) -> Result<Vec<RoadSegment>> {
        self.fetch(bounds).await
    }
}
