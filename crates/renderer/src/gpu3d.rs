//! GPU layer adapter.
//!
//! Owns the named layer slots, the icon atlas, the flow-line renderers
//! and the ephemeral point selection. Each data or selection change
//! reconstructs the affected slot's record; `advance` rewrites the
//! animated line slots every clock frame.

use std::collections::BTreeMap;

use flowlines::arcs3d::{LineRenderer3d, TimeWindow, TimedArc};
use flowlines::trail2d::{FlowCurve, LineRenderer2d, TrailDot};
use geodata::feature::FeatureCollection;
use geodata::overlay::{FlowEdge, PointMarker};
use layers::atlas::{AtlasBuilder, IconAtlas};
use layers::glyph::VectorGlyph;
use layers::manager::LayerManager;
use layers::slot::{LayerKind, LayerRecord, LayerSlot};
use navigation::context::NavigationContext;
use navigation::level::NavigationLevel;
use runtime::clock::ClockFrame;
use serde_json::{Value, json};
use tracing::debug;

use crate::backend::{BackendError, BackendKind, MapBackend};

/// Boundary fill, border and hover-highlight colors.
const GEO_FILL_COLOR: [u8; 4] = [9, 71, 119, 255];
const GEO_LINE_COLOR: [u8; 4] = [20, 128, 197, 255];
const GEO_HIGHLIGHT_COLOR: [u8; 4] = [48, 121, 200, 255];

/// Default icon and size for markers that specify none.
const DEFAULT_ICON: &str = "star";
const DEFAULT_POINT_SIZE: f64 = 24.0;
/// Scale applied to the selected marker.
const SELECTED_SCALE: f64 = 1.6;
/// Markers are lifted off the ground to avoid depth conflicts.
const POINT_ALTITUDE: f64 = 50.0;

/// How the line slots animate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderMode {
    /// Resident 2D curves plus a marching dot trail.
    Planar,
    /// Time-windowed 3D arcs.
    Perspective,
}

pub struct GpuBackend {
    mode: RenderMode,
    manager: LayerManager,
    atlas_builder: AtlasBuilder,
    atlas: IconAtlas,
    renderer2d: LineRenderer2d,
    renderer3d: LineRenderer3d,
    points: Vec<PointMarker>,
    lines: Vec<FlowEdge>,
    selected: Option<String>,
    size: (u32, u32),
    destroyed: bool,
}

impl GpuBackend {
    pub fn new(mode: RenderMode) -> Self {
        let atlas_builder = AtlasBuilder::new();
        let atlas = atlas_builder.build();
        Self {
            mode,
            manager: LayerManager::new(),
            atlas_builder,
            atlas,
            renderer2d: LineRenderer2d::default(),
            renderer3d: LineRenderer3d::default(),
            points: Vec::new(),
            lines: Vec::new(),
            selected: None,
            size: (0, 0),
            destroyed: false,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn atlas(&self) -> &IconAtlas {
        &self.atlas
    }

    pub fn selected_point(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Occupied layer records in canonical z-order.
    pub fn layers(&self) -> Vec<&LayerRecord> {
        self.manager.layers()
    }

    fn ensure_alive(&self) -> Result<(), BackendError> {
        if self.destroyed {
            return Err(BackendError::Destroyed);
        }
        Ok(())
    }

    fn rebuild_points_layer(&mut self) {
        let data: Vec<Value> = self
            .points
            .iter()
            .map(|p| {
                let base = p.size.unwrap_or(DEFAULT_POINT_SIZE);
                let size = if self.selected.as_deref() == Some(p.id.as_str()) {
                    base * SELECTED_SCALE
                } else {
                    base
                };
                json!({
                    "id": p.id,
                    "position": [p.coordinate.lng, p.coordinate.lat, POINT_ALTITUDE],
                    "icon": p.icon.as_deref().unwrap_or(DEFAULT_ICON),
                    "size": size,
                    "color": p.color.map(|c| [c.r, c.g, c.b, c.a]).unwrap_or([255, 255, 255, 255]),
                })
            })
            .collect();
        let record = LayerRecord::new(LayerSlot::Points.id(), LayerKind::Icon)
            .with_prop("data", Value::Array(data))
            .with_prop("atlasFingerprint", json!(self.atlas.fingerprint.to_hex().to_string()))
            .with_prop("pickable", json!(true));
        self.manager.add(LayerSlot::Points, record);
    }

    fn curve_value(curve: &FlowCurve) -> Value {
        json!({
            "path": curve.path,
            "color": [curve.color.r, curve.color.g, curve.color.b, curve.color.a],
            "width": curve.width,
        })
    }

    fn dot_value(dot: &TrailDot) -> Value {
        json!({
            "position": dot.position,
            "color": [dot.color.r, dot.color.g, dot.color.b, dot.color.a],
            "radius": dot.radius,
        })
    }

    fn arc_value(arc: &TimedArc) -> Value {
        json!({
            "id": arc.edge_id,
            "source": arc.source,
            "target": arc.target,
            "sourceTime": arc.source_time,
            "targetTime": arc.target_time,
            "color": [arc.color.r, arc.color.g, arc.color.b, arc.color.a],
            "height": arc.height,
        })
    }
}

impl MapBackend for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu3d
    }

    fn set_geo_data(
        &mut self,
        _ctx: &NavigationContext,
        boundary: &FeatureCollection,
    ) -> Result<(), BackendError> {
        self.ensure_alive()?;
        let record = LayerRecord::new(LayerSlot::Boundary.id(), LayerKind::GeoJson)
            .with_prop("data", serde_json::to_value(boundary).unwrap_or_default())
            .with_prop("fillColor", json!(GEO_FILL_COLOR))
            .with_prop("lineColor", json!(GEO_LINE_COLOR))
            .with_prop("highlightColor", json!(GEO_HIGHLIGHT_COLOR))
            .with_prop("pickable", json!(true))
            .with_prop("stroked", json!(true))
            .with_prop("filled", json!(true));
        self.manager.add(LayerSlot::Boundary, record);
        Ok(())
    }

    fn set_points(
        &mut self,
        _ctx: &NavigationContext,
        points: &[PointMarker],
    ) -> Result<(), BackendError> {
        self.ensure_alive()?;
        self.points = points.to_vec();
        self.rebuild_points_layer();
        Ok(())
    }

    fn set_lines(
        &mut self,
        _ctx: &NavigationContext,
        edges: &[FlowEdge],
    ) -> Result<(), BackendError> {
        self.ensure_alive()?;
        // Line slots rebuild on the next clock frame.
        self.lines = edges.to_vec();
        Ok(())
    }

    fn update_level(&mut self, level: NavigationLevel) -> Result<(), BackendError> {
        self.ensure_alive()?;
        debug!(%level, "gpu backend level change");
        Ok(())
    }

    fn register_icons(
        &mut self,
        glyphs: BTreeMap<String, VectorGlyph>,
    ) -> Result<(), BackendError> {
        self.ensure_alive()?;
        self.atlas_builder.register_all(glyphs);
        // The old atlas is discarded whole, never patched.
        self.atlas = self.atlas_builder.build();
        self.rebuild_points_layer();
        Ok(())
    }

    fn set_selected_point(&mut self, id: Option<&str>) -> Result<(), BackendError> {
        self.ensure_alive()?;
        let next = id.map(str::to_string);
        if next != self.selected {
            self.selected = next;
            self.rebuild_points_layer();
        }
        Ok(())
    }

    fn advance(&mut self, frame: ClockFrame) -> Result<(), BackendError> {
        self.ensure_alive()?;
        match self.mode {
            RenderMode::Perspective => {
                let window = TimeWindow {
                    start: frame.window_start,
                    end: frame.time,
                };
                let arcs = self.renderer3d.windowed_arcs(&self.lines, window);
                let record = LayerRecord::new(LayerSlot::Lines.id(), LayerKind::Arc)
                    .with_prop("data", Value::Array(arcs.iter().map(Self::arc_value).collect()))
                    .with_prop("timeRange", json!([window.start, window.end]));
                self.manager.add(LayerSlot::Lines, record);
            }
            RenderMode::Planar => {
                let curves = self.renderer2d.full_curves(&self.lines);
                let record = LayerRecord::new(LayerSlot::Lines.id(), LayerKind::Path)
                    .with_prop(
                        "data",
                        Value::Array(curves.iter().map(Self::curve_value).collect()),
                    );
                self.manager.add(LayerSlot::Lines, record);
                let dots = self.renderer2d.trail_dots(&self.lines, frame.progress);
                let record = LayerRecord::new(LayerSlot::LineTrails.id(), LayerKind::Scatter)
                    .with_prop("data", Value::Array(dots.iter().map(Self::dot_value).collect()));
                self.manager.add(LayerSlot::LineTrails, record);
            }
        }
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        self.ensure_alive()?;
        self.size = (width, height);
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), BackendError> {
        self.ensure_alive()?;
        self.destroyed = true;
        self.manager.clear();
        self.points.clear();
        self.lines.clear();
        self.selected = None;
        Ok(())
    }
}
