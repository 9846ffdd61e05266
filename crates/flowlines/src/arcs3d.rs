//! 3D flow-line rendering: arcs staggered along the animation clock so
//! they do not all pulse in phase.

use foundation::color::Rgba;
use geodata::overlay::FlowEdge;

/// Fallback arc color.
pub const DEFAULT_ARC_COLOR: Rgba = Rgba::opaque(200, 200, 200);

/// Arc timing and shape parameters, in logical seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ArcConfig {
    /// Start-time stagger between consecutive edges.
    pub line_offset: f64,
    /// How long each edge's arc stays alive.
    pub line_duration: f64,
    /// Altitude both endpoints are lifted to.
    pub altitude: f64,
    /// Arc height factor.
    pub height: f64,
}

impl Default for ArcConfig {
    fn default() -> Self {
        Self {
            line_offset: 300.0,
            line_duration: 1000.0,
            altitude: 100.0,
            height: 0.6,
        }
    }
}

/// Visible time window, `[start, end]` in logical seconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

/// One arc with its life span on the logical clock.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedArc {
    pub edge_id: String,
    pub source: [f64; 3],
    pub target: [f64; 3],
    pub source_time: f64,
    pub target_time: f64,
    pub color: Rgba,
    pub height: f64,
}

/// Builds the time-windowed arc set for the 3D mode.
#[derive(Debug, Default)]
pub struct LineRenderer3d {
    config: ArcConfig,
}

impl LineRenderer3d {
    pub fn new(config: ArcConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ArcConfig {
        self.config
    }

    /// Arcs whose life span intersects `window`, staggered by index.
    ///
    /// Edge `i` lives on `[i * offset, i * offset + duration]`; an arc
    /// entirely outside the window is simply not emitted.
    pub fn windowed_arcs(&self, edges: &[FlowEdge], window: TimeWindow) -> Vec<TimedArc> {
        let cfg = self.config;
        edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let source_time = index as f64 * cfg.line_offset;
                let target_time = source_time + cfg.line_duration;
                if source_time > window.end || target_time < window.start {
                    return None;
                }
                Some(TimedArc {
                    edge_id: edge.id.clone(),
                    source: [edge.start.lng, edge.start.lat, cfg.altitude],
                    target: [edge.end.lng, edge.end.lat, cfg.altitude],
                    source_time,
                    target_time,
                    color: edge.color.unwrap_or(DEFAULT_ARC_COLOR),
                    height: cfg.height,
                })
            })
            .collect()
    }
}
