//! Drawing surface abstraction and the map renderer.
//!
//! A render pass is a full redraw: resize for the display scale, clear to the
//! background, apply the pan/zoom transform, stroke the filtered roads as one
//! path, then stroke every route on top. Stroke widths are divided by the zoom
//! scale so lines keep a constant on-screen width while the content grows.
//!
//! Routes are not coloured by intensity. With several routes the multiply
//! blend darkens the places where they overlap, and that overlap is how
//! repetition shows up on the map.

use log::debug;

use crate::config::{MapConfig, Rgba};
use crate::projection::{Projection, ScreenPoint};
use crate::roads::RoadSegment;
use crate::zoom::Transform;
use crate::DecodedRoute;

/// Compositing mode for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source over destination
    #[default]
    Normal,
    /// Overlaps darken
    Multiply,
}

/// Everything a surface needs to stroke one set of paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgba,
    /// Width in base-surface units (already divided by the zoom scale)
    pub width: f64,
    pub opacity: f64,
    pub blend: BlendMode,
    /// Gaussian blur radius in pixels, 0 for none
    pub blur_radius: f64,
}

/// A 2-D raster target. Backends map blend modes and blur to their own
/// primitives.
pub trait Surface {
    /// Size the backing store for a logical `width` × `height` at
    /// `display_scale` device pixels per logical pixel. Returns false when no
    /// drawing context is available, in which case nothing is drawn.
    fn resize(&mut self, width: f64, height: f64, display_scale: f64) -> bool;

    /// Fill the whole surface.
    fn clear(&mut self, color: Rgba);

    /// Set the pan/zoom transform for subsequent strokes (translate, then scale).
    fn set_transform(&mut self, transform: &Transform);

    /// Stroke every path with one style, as a single compound path.
    fn stroke_paths(&mut self, paths: &[Vec<ScreenPoint>], style: &StrokeStyle);

    /// Restore default opacity, blend mode and filter.
    fn reset_style(&mut self);
}

/// Inputs for one render pass.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Logical surface width
    pub width: f64,
    /// Logical surface height
    pub height: f64,
    pub display_scale: f64,
    /// `None` when there is no content to frame
    pub projection: Option<&'a Projection>,
    pub transform: Transform,
    pub routes: &'a [DecodedRoute],
    /// Roads already filtered for the current zoom
    pub roads: &'a [&'a RoadSegment],
    pub show_roads: bool,
}

/// Draw one frame. Returns false if the surface had no context.
pub fn render<S: Surface + ?Sized>(surface: &mut S, config: &MapConfig, frame: &Frame) -> bool {
    if !surface.resize(frame.width, frame.height, frame.display_scale) {
        debug!("[Render] Surface unavailable, skipping frame");
        return false;
    }
    surface.clear(config.background);

    let Some(projection) = frame.projection else {
        return true;
    };

    surface.set_transform(&frame.transform);
    let k = frame.transform.k;

    if frame.show_roads && !frame.roads.is_empty() {
        let paths: Vec<Vec<ScreenPoint>> = frame
            .roads
            .iter()
            .map(|road| projection.project_path(&road.points))
            .collect();
        surface.stroke_paths(
            &paths,
            &StrokeStyle {
                color: config.road.color,
                width: config.road.width / k,
                opacity: config.road.opacity,
                blend: BlendMode::Normal,
                blur_radius: 0.0,
            },
        );
        surface.reset_style();
    }

    let drawable: Vec<&DecodedRoute> = frame.routes.iter().filter(|r| r.points.len() >= 2).collect();
    let single = drawable.len() == 1;
    let base_width = if single { config.route.single_width } else { config.route.width };
    let style = StrokeStyle {
        color: config.route.color,
        width: base_width / k,
        opacity: config.route.opacity,
        blend: if single { BlendMode::Normal } else { BlendMode::Multiply },
        blur_radius: config.route.blur,
    };

    for route in &drawable {
        surface.stroke_paths(&[projection.project_path(&route.points)], &style);
        surface.reset_style();
    }

    debug!(
        "[Render] {}x{} @{} k={:.2}: {} roads, {} routes",
        frame.width,
        frame.height,
        frame.display_scale,
        k,
        if frame.show_roads { frame.roads.len() } else { 0 },
        drawable.len()
    );

    true
}

/// A recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize { width: f64, height: f64, display_scale: f64 },
    Clear(Rgba),
    SetTransform(Transform),
    Stroke { paths: Vec<Vec<ScreenPoint>>, style: StrokeStyle },
    ResetStyle,
}

/// A surface that records commands for a backend (or a test) to replay.
#[derive(Debug, Clone)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
    available: bool,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            available: true,
        }
    }

    /// A surface whose context cannot be acquired.
    pub fn unavailable() -> Self {
        Self {
            commands: Vec::new(),
            available: false,
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Stroke commands in draw order.
    pub fn strokes(&self) -> impl Iterator<Item = (&[Vec<ScreenPoint>], &StrokeStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Stroke { paths, style } => Some((paths.as_slice(), style)),
            _ => None,
        })
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes().count()
    }
}

impl Surface for DisplayList {
    fn resize(&mut self, width: f64, height: f64, display_scale: f64) -> bool {
        if !self.available || width <= 0.0 || height <= 0.0 {
            return false;
        }
        // Each frame redraws everything
        self.commands.clear();
        self.commands.push(DrawCommand::Resize { width, height, display_scale });
        true
    }

    fn clear(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Clear(color));
    }

    fn set_transform(&mut self, transform: &Transform) {
        self.commands.push(DrawCommand::SetTransform(*transform));
    }

    fn stroke_paths(&mut self, paths: &[Vec<ScreenPoint>], style: &StrokeStyle) {
        self.commands.push(DrawCommand::Stroke {
            paths: paths.to_vec(),
            style: *style,
        });
    }

    fn reset_style(&mut self) {
        self.commands.push(DrawCommand::ResetStyle);
    }
}
