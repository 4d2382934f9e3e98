//! Fetch the road network for a view from Overpass and render it.
//!
//! Run with: cargo run --example overpass_roads --features http

use std::sync::Arc;

use city_roads_map::fetch::spawn_fetch;
use city_roads_map::{
    polyline, DisplayList, GeoPoint, MapConfig, MapView, OverpassClient, OverpassConfig,
};

#[tokio::main]
async fn main() {
    let ride = polyline::encode(&[
        GeoPoint::new(40.4168, -3.7038),
        GeoPoint::new(40.4200, -3.7000),
        GeoPoint::new(40.4250, -3.6950),
    ]);

    let mut view = match MapView::new(MapConfig::default(), 800.0, 600.0) {
        Ok(view) => view,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            return;
        }
    };
    let client = match OverpassClient::new(OverpassConfig::default()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    let Some(request) = view.set_polylines(&[ride]) else {
        println!("Nothing to show");
        return;
    };
    println!("Fetching roads for {:?}", request.bounds);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    spawn_fetch(Arc::clone(&client), request, tx);

    if let Some(response) = rx.recv().await {
        match &response.error {
            None => println!("Received {} roads", response.roads.len()),
            Some(e) => println!("Road fetch failed: {}", e),
        }
        view.apply_roads(response);
    }

    println!("Visible at k=1: {} roads", view.visible_roads().len());

    let mut surface = DisplayList::new();
    view.render(&mut surface, 1.0);
    println!("Rendered {} strokes", surface.stroke_count());
}
