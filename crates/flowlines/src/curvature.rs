//! Deterministic per-edge curvature.
//!
//! Curvature is derived from a stable hash of the edge id, never from a
//! random source, so a given edge always bends the same way across
//! re-renders and process restarts.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use foundation::coord::LngLat;
use foundation::hash;
use geodata::overlay::FlowEdge;

/// Requested curvature bounds violate `0 <= min <= max <= 1`.
///
/// This is a configuration error: callers pass literal ranges, so a bad
/// one is a programming mistake, not a runtime condition to recover
/// from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurvatureRangeError {
    pub min: f64,
    pub max: f64,
}

impl fmt::Display for CurvatureRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid curvature range [{}, {}]: must satisfy 0 <= min <= max <= 1",
            self.min, self.max
        )
    }
}

impl Error for CurvatureRangeError {}

/// Curvature bounds for one edge.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CurvatureRange {
    pub min: f64,
    pub max: f64,
}

impl CurvatureRange {
    pub fn new(min: f64, max: f64) -> Result<Self, CurvatureRangeError> {
        if min < 0.0 || max > 1.0 || min > max {
            return Err(CurvatureRangeError { min, max });
        }
        Ok(Self { min, max })
    }

    const fn derived(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Curvature bounds fitted to an edge's shape.
///
/// Identical endpoints get a fixed narrow band. Otherwise the band
/// follows the longitude/latitude delta ratio: a long thin edge bends
/// less, a squarer edge bends more, which keeps near-straight long
/// edges from bowing wildly.
pub fn range_for_endpoints(start: LngLat, end: LngLat) -> CurvatureRange {
    if start == end {
        return CurvatureRange::derived(0.1, 0.3);
    }
    let delta_lng = (end.lng - start.lng).abs();
    let delta_lat = (end.lat - start.lat).abs();
    let ratio = (delta_lng / delta_lat).min(delta_lat / delta_lng);
    if ratio > 0.5 {
        CurvatureRange::derived(0.5, 1.0)
    } else {
        CurvatureRange::derived(0.2, 0.5)
    }
}

/// Memoizing curvature source.
///
/// The first call for a key decides its cached value for the life of
/// the calculator; later calls return it unchanged regardless of range.
#[derive(Debug, Default)]
pub struct CurvatureCalculator {
    memo: BTreeMap<String, f64>,
}

impl CurvatureCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Curvature for `key` inside an explicit `[min, max]`.
    pub fn curvature(&mut self, key: &str, min: f64, max: f64) -> Result<f64, CurvatureRangeError> {
        let range = CurvatureRange::new(min, max)?;
        Ok(self.derive(key, range))
    }

    /// Curvature for an edge, band fitted from its endpoints.
    pub fn for_edge(&mut self, edge: &FlowEdge) -> f64 {
        let range = range_for_endpoints(edge.start, edge.end);
        self.derive(&edge.id, range)
    }

    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }

    fn derive(&mut self, key: &str, range: CurvatureRange) -> f64 {
        if let Some(cached) = self.memo.get(key) {
            return *cached;
        }
        let value = hash::unit_interval(key) * (range.max - range.min) + range.min;
        self.memo.insert(key.to_string(), value);
        value
    }
}
