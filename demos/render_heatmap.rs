//! Render overlapping rides into a display list and inspect the strokes.
//!
//! Run with: cargo run --example render_heatmap

use city_roads_map::render::DrawCommand;
use city_roads_map::{
    polyline, DisplayList, GeoPoint, InputEvent, MapConfig, MapView, RoadClass, RoadResponse,
    RoadSegment,
};

fn main() {
    // Three rides around Retiro park (Madrid), two sharing the same loop
    let loop_ride = vec![
        GeoPoint::new(40.4153, -3.6845),
        GeoPoint::new(40.4180, -3.6820),
        GeoPoint::new(40.4200, -3.6800),
        GeoPoint::new(40.4175, -3.6780),
        GeoPoint::new(40.4153, -3.6845),
    ];
    let commute = vec![
        GeoPoint::new(40.4168, -3.7038),
        GeoPoint::new(40.4160, -3.6950),
        GeoPoint::new(40.4153, -3.6845),
    ];
    let polylines = vec![
        polyline::encode(&loop_ride),
        polyline::encode(&loop_ride),
        polyline::encode(&commute),
    ];

    let mut view = match MapView::new(MapConfig::default(), 800.0, 600.0) {
        Ok(view) => view,
        Err(e) => {
            eprintln!("Invalid config: {}", e);
            return;
        }
    };

    let request = view.set_polylines(&polylines);

    println!("Routes:");
    for (i, route) in view.routes().iter().enumerate() {
        println!(
            "  #{}: {} points, frequency {}, intensity {:.2}",
            i,
            route.points.len(),
            route.frequency,
            route.intensity
        );
    }

    if let Some(b) = view.bounds() {
        println!(
            "\nView bounds: lat {:.4}..{:.4}, lng {:.4}..{:.4}",
            b.min_lat, b.max_lat, b.min_lng, b.max_lng
        );
    }

    // Stand-in for a road provider: one avenue across the bounds
    if let Some(request) = request {
        let c = request.bounds.center();
        let avenue = RoadSegment::new(
            1,
            vec![
                GeoPoint::new(c.latitude, request.bounds.min_lng),
                GeoPoint::new(c.latitude, request.bounds.max_lng),
            ],
            RoadClass::Primary,
        );
        view.apply_roads(RoadResponse {
            generation: request.generation,
            bounds: request.bounds,
            roads: vec![avenue],
            success: true,
            error: None,
        });
    }

    let mut surface = DisplayList::new();
    view.render(&mut surface, 2.0);
    print_strokes("Initial frame", &surface);

    view.handle_input(InputEvent::Pinch { x: 400.0, y: 300.0, scale: 3.0 });
    view.render(&mut surface, 2.0);
    print_strokes("After 3x pinch", &surface);
}

fn print_strokes(title: &str, surface: &DisplayList) {
    println!("\n{}:", title);
    for command in surface.commands() {
        match command {
            DrawCommand::SetTransform(t) => println!("  transform k={:.2} x={:.1} y={:.1}", t.k, t.x, t.y),
            DrawCommand::Stroke { paths, style } => println!(
                "  stroke {} path(s) width={:.3} blend={:?} blur={}",
                paths.len(),
                style.width,
                style.blend,
                style.blur_radius
            ),
            _ => {}
        }
    }
}
