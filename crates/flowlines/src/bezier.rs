//! Quadratic Bézier geometry for flow-line curves.

use foundation::coord::LngLat;

/// Default sample count for a rendered curve.
pub const CURVE_SEGMENTS: usize = 64;

/// Strength factor applied to the control-point offset.
const CONTROL_OFFSET_FACTOR: f64 = 0.3;

/// Control point for the edge's curve: the midpoint pushed along the
/// segment's unit perpendicular by `curvature * 0.3 * length`.
pub fn control_point(start: LngLat, end: LngLat, curvature: f64) -> LngLat {
    let mid = start.midpoint(end);
    let dx = end.lng - start.lng;
    let dy = end.lat - start.lat;
    let length = match start.planar_distance(end) {
        l if l == 0.0 => 1.0,
        l => l,
    };
    let offset = curvature * CONTROL_OFFSET_FACTOR * length;
    LngLat::new(mid.lng - dy / length * offset, mid.lat + dx / length * offset)
}

/// Point on the quadratic curve at parameter `t`.
pub fn point_at(start: LngLat, control: LngLat, end: LngLat, t: f64) -> [f64; 2] {
    let u = 1.0 - t;
    [
        u * u * start.lng + 2.0 * u * t * control.lng + t * t * end.lng,
        u * u * start.lat + 2.0 * u * t * control.lat + t * t * end.lat,
    ]
}

/// Samples the curve at `segments + 1` evenly spaced parameters.
pub fn sample_path(start: LngLat, end: LngLat, curvature: f64, segments: usize) -> Vec<[f64; 2]> {
    let control = control_point(start, end, curvature);
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| point_at(start, control, end, i as f64 / segments as f64))
        .collect()
}
