//! Map configuration: colours, stroke styles and zoom limits.
//!
//! All constants are supplied by the host; `Default` carries the stock look
//! (warm paper background, faint grey roads, orange heat trails).

use crate::error::{MapError, Result};

/// An sRGB colour with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in [0, 1]
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Background road network stroke.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoadStyle {
    /// Line width in pixels at zoom 1 (default: 0.3)
    pub width: f64,
    /// Stroke colour (default: rgba(26, 26, 26, 0.5))
    pub color: Rgba,
    /// Layer opacity (default: 0.8)
    pub opacity: f64,
}

impl Default for RoadStyle {
    fn default() -> Self {
        Self {
            width: 0.3,
            color: Rgba::rgba(26, 26, 26, 0.5),
            opacity: 0.8,
        }
    }
}

/// Activity route stroke.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouteStyle {
    /// Width when exactly one route is shown (default: 2.0)
    pub single_width: f64,
    /// Width when several routes are shown (default: 1.0)
    pub width: f64,
    /// Opacity (default: 0.9)
    pub opacity: f64,
    /// Stroke colour (default: rgb(255, 115, 17))
    pub color: Rgba,
    /// Blur radius in pixels for the soft heat-trail edge (default: 0.99)
    pub blur: f64,
}

impl Default for RouteStyle {
    fn default() -> Self {
        Self {
            single_width: 2.0,
            width: 1.0,
            opacity: 0.9,
            color: Rgba::rgb(255, 115, 17),
            blur: 0.99,
        }
    }
}

/// Pan/zoom limits and framing constants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ZoomSettings {
    /// Minimum scale factor (default: 0.6)
    pub min: f64,
    /// Maximum scale factor (default: 20.0)
    pub max: f64,
    /// How far past the content the viewport may pan, as a fraction of
    /// viewport size (default: 0.2)
    pub translate_padding: f64,
    /// Padding added around all routes when framing the initial bounds,
    /// as a fraction of the span on each side (default: 0.5)
    pub expanded_padding: f64,
    /// Scale applied when the view is mounted (default: 1.0)
    pub initial_zoom: f64,
    /// Pixel margin kept free on every side when fitting the projection (default: 50)
    pub initial_extent_padding: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min: 0.6,
            max: 20.0,
            translate_padding: 0.2,
            expanded_padding: 0.5,
            initial_zoom: 1.0,
            initial_extent_padding: 50.0,
        }
    }
}

/// Complete map configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MapConfig {
    /// Surface clear colour (default: #F7F2E8)
    pub background: Rgba,
    pub road: RoadStyle,
    pub route: RouteStyle,
    pub zoom: ZoomSettings,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0xF7, 0xF2, 0xE8),
            road: RoadStyle::default(),
            route: RouteStyle::default(),
            zoom: ZoomSettings::default(),
        }
    }
}

impl MapConfig {
    /// Reject settings the controller and renderer cannot honour.
    pub fn validate(&self) -> Result<()> {
        let z = &self.zoom;
        if !(z.min.is_finite() && z.max.is_finite()) || z.min <= 0.0 || z.min > z.max {
            return Err(MapError::InvalidConfig(format!(
                "zoom range [{}, {}] must be positive and ordered",
                z.min, z.max
            )));
        }
        if !(z.min..=z.max).contains(&z.initial_zoom) {
            return Err(MapError::InvalidConfig(format!(
                "initial zoom {} outside [{}, {}]",
                z.initial_zoom, z.min, z.max
            )));
        }
        if z.translate_padding < 0.0 || z.expanded_padding < 0.0 || z.initial_extent_padding < 0.0 {
            return Err(MapError::InvalidConfig("paddings must be non-negative".to_string()));
        }
        if self.road.width < 0.0 || self.route.width < 0.0 || self.route.single_width < 0.0 {
            return Err(MapError::InvalidConfig("stroke widths must be non-negative".to_string()));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration; missing fields take defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
