//! Group activities from several cities into map regions.
//!
//! Run with: cargo run --example region_grouping

use city_roads_map::grouping::DEFAULT_GRID_SIZE_KM;
use city_roads_map::{group_polylines, polyline, GeoPoint};

fn ride(lat: f64, lng: f64) -> String {
    polyline::encode(&[
        GeoPoint::new(lat, lng),
        GeoPoint::new(lat + 0.01, lng + 0.01),
        GeoPoint::new(lat + 0.02, lng),
    ])
}

fn main() {
    let activities = vec![
        ("Madrid morning", ride(40.41, -3.70)),
        ("Paris commute", ride(48.85, 2.35)),
        ("Madrid evening", ride(40.45, -3.68)),
        ("Toledo day trip", ride(39.86, -4.02)),
        ("Corrupt upload", "_p~".to_string()),
        ("London loop", ride(51.50, -0.12)),
    ];
    let polylines: Vec<&str> = activities.iter().map(|(_, p)| p.as_str()).collect();

    for grid in [DEFAULT_GRID_SIZE_KM, 50.0] {
        let groups = group_polylines(&polylines, grid);
        println!("Grid {} km: {} regions", grid, groups.len());
        for (i, group) in groups.iter().enumerate() {
            let names: Vec<&str> = group.iter().map(|&j| activities[j].0).collect();
            println!("  region {}: {}", i + 1, names.join(", "));
        }
        println!();
    }
}
