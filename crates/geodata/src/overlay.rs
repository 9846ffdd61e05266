//! Overlay data drawn on top of the current boundary: markers and
//! directed flow edges.

use foundation::color::Rgba;
use foundation::coord::LngLat;

/// A single overlay marker.
///
/// Selection is ephemeral UI state owned by the rendering adapter; it is
/// deliberately not part of the marker itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMarker {
    pub id: String,
    pub coordinate: LngLat,
    pub icon: Option<String>,
    pub color: Option<Rgba>,
    pub size: Option<f64>,
    pub label: Option<String>,
}

impl PointMarker {
    pub fn new(id: impl Into<String>, coordinate: LngLat) -> Self {
        Self {
            id: id.into(),
            coordinate,
            icon: None,
            color: None,
            size: None,
            label: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// A directed edge between two coordinates.
///
/// `id` is the stable key curvature derivation hashes, so an edge keeps
/// the same bend across rebuilds.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub id: String,
    pub start: LngLat,
    pub end: LngLat,
    pub color: Option<Rgba>,
    pub width: Option<f64>,
}

impl FlowEdge {
    pub fn new(id: impl Into<String>, start: LngLat, end: LngLat) -> Self {
        Self {
            id: id.into(),
            start,
            end,
            color: None,
            width: None,
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }
}
