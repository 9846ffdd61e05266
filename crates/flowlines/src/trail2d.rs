//! 2D flow-line rendering: a resident curve per edge plus a comet trail
//! of dots marching along it.

use foundation::color::Rgba;
use geodata::overlay::FlowEdge;

use crate::bezier::{CURVE_SEGMENTS, control_point, point_at, sample_path};
use crate::curvature::CurvatureCalculator;

/// Fallback color for resident curves.
pub const DEFAULT_CURVE_COLOR: Rgba = Rgba::new(170, 170, 170, 90);
/// Fallback color for trail dots (alpha comes from the trail gradient).
pub const DEFAULT_DOT_COLOR: Rgba = Rgba::opaque(255, 255, 255);
/// Resident curve width in pixels.
pub const DEFAULT_CURVE_WIDTH: f64 = 0.3;

/// One resident curve, sampled in lng/lat space.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowCurve {
    pub path: Vec<[f64; 2]>,
    pub color: Rgba,
    pub width: f64,
}

/// One trail dot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrailDot {
    pub position: [f64; 2],
    pub color: Rgba,
    pub radius: f64,
}

/// Trail appearance.
///
/// The parametric gap between dots is `trail_span / (dots_per_line - 1)`;
/// raise `dots_per_line` or shrink `trail_span` for a denser queue.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TrailStyle {
    pub dots_per_line: usize,
    pub head_radius: f64,
    pub tail_radius: f64,
    pub head_alpha: u8,
    pub tail_alpha: u8,
    pub trail_span: f64,
}

impl Default for TrailStyle {
    fn default() -> Self {
        Self {
            dots_per_line: 12,
            head_radius: 1.0,
            tail_radius: 0.5,
            head_alpha: 255,
            tail_alpha: 60,
            trail_span: 0.01,
        }
    }
}

/// Builds the 2D representations of a set of directed edges.
///
/// Owns the curvature calculator so every rebuild of the same edge set
/// produces identical geometry.
#[derive(Debug, Default)]
pub struct LineRenderer2d {
    curvature: CurvatureCalculator,
    style: TrailStyle,
}

impl LineRenderer2d {
    pub fn new(style: TrailStyle) -> Self {
        Self {
            curvature: CurvatureCalculator::new(),
            style,
        }
    }

    pub fn style(&self) -> TrailStyle {
        self.style
    }

    /// The resident curve for every edge.
    pub fn full_curves(&mut self, edges: &[FlowEdge]) -> Vec<FlowCurve> {
        edges
            .iter()
            .map(|edge| {
                let curvature = self.curvature.for_edge(edge);
                FlowCurve {
                    path: sample_path(edge.start, edge.end, curvature, CURVE_SEGMENTS),
                    color: edge.color.unwrap_or(DEFAULT_CURVE_COLOR),
                    width: edge.width.unwrap_or(DEFAULT_CURVE_WIDTH),
                }
            })
            .collect()
    }

    /// Trail dots for every edge at shared clock progress `p` in
    /// `[0, 1)`.
    ///
    /// Dot `j` sits at parameter `(p - j * step) mod 1`, so the whole
    /// queue marches in lock-step and wraps seamlessly. Radius lerps
    /// head to tail; alpha lerps tail to head with a power-law ease on
    /// the head weight.
    pub fn trail_dots(&mut self, edges: &[FlowEdge], progress: f64) -> Vec<TrailDot> {
        let style = self.style;
        let count = style.dots_per_line;
        let step = style.trail_span / (count.saturating_sub(1)).max(1) as f64;
        let mut dots = Vec::with_capacity(edges.len() * count);
        for edge in edges {
            let curvature = self.curvature.for_edge(edge);
            let control = control_point(edge.start, edge.end, curvature);
            let base = edge.color.unwrap_or(DEFAULT_DOT_COLOR);
            for j in 0..count {
                let weight = 1.0 - j as f64 / (count.saturating_sub(1)).max(1) as f64;
                let t = (progress - j as f64 * step).rem_euclid(1.0);
                let radius =
                    style.tail_radius + (style.head_radius - style.tail_radius) * weight;
                let alpha = f64::from(style.tail_alpha)
                    + (f64::from(style.head_alpha) - f64::from(style.tail_alpha))
                        * weight.powf(1.5);
                dots.push(TrailDot {
                    position: point_at(edge.start, control, edge.end, t),
                    color: base.with_alpha(alpha.round() as u8),
                    radius,
                });
            }
        }
        dots
    }
}

#[cfg(test)]
mod tests {
    use foundation::color::Rgba;
    use foundation::coord::LngLat;
    use geodata::overlay::FlowEdge;

    use super::{DEFAULT_CURVE_COLOR, DEFAULT_CURVE_WIDTH, LineRenderer2d, TrailStyle};

    fn edge(id: &str) -> FlowEdge {
        FlowEdge::new(id, LngLat::new(100.0, 30.0), LngLat::new(110.0, 38.0))
    }

    #[test]
    fn curves_carry_defaults_when_edges_have_none() {
        let mut renderer = LineRenderer2d::default();
        let curves = renderer.full_curves(&[edge("a")]);
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].color, DEFAULT_CURVE_COLOR);
        assert_eq!(curves[0].width, DEFAULT_CURVE_WIDTH);
        assert_eq!(curves[0].path.len(), 65);
    }

    #[test]
    fn rebuild_produces_identical_geometry() {
        let mut renderer = LineRenderer2d::default();
        let first = renderer.full_curves(&[edge("a"), edge("b")]);
        let second = renderer.full_curves(&[edge("a"), edge("b")]);
        assert_eq!(first, second);
    }

    #[test]
    fn dot_queue_marches_in_lock_step() {
        let mut renderer = LineRenderer2d::default();
        let dots = renderer.trail_dots(&[edge("a")], 0.5);
        assert_eq!(dots.len(), 12);
        // Head is the largest and most opaque; tail the smallest and
        // most transparent.
        let head = dots.first().expect("head");
        let tail = dots.last().expect("tail");
        assert!(head.radius > tail.radius);
        assert!(head.color.a > tail.color.a);
        assert_eq!(head.color.a, 255);
        assert_eq!(tail.color.a, 60);
    }

    #[test]
    fn progress_wraps_without_leaving_the_curve() {
        let mut renderer = LineRenderer2d::new(TrailStyle {
            dots_per_line: 4,
            ..TrailStyle::default()
        });
        // Progress near zero pushes trailing dots across the wrap.
        let dots = renderer.trail_dots(&[edge("a")], 0.001);
        for dot in dots {
            assert!(dot.position[0] >= 99.0 && dot.position[0] <= 111.0);
            assert!(dot.position[1] >= 29.0 && dot.position[1] <= 41.0);
        }
    }

    #[test]
    fn dot_color_keeps_the_edge_rgb() {
        let mut renderer = LineRenderer2d::default();
        let mut e = edge("a");
        e.color = Some(Rgba::opaque(10, 200, 40));
        let dots = renderer.trail_dots(&[e], 0.25);
        assert!(dots.iter().all(|d| d.color.r == 10 && d.color.g == 200 && d.color.b == 40));
    }
}
