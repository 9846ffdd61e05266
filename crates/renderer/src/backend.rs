//! The contract both rendering backends bind to.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use geodata::feature::FeatureCollection;
use geodata::overlay::{FlowEdge, PointMarker};
use layers::glyph::VectorGlyph;
use navigation::context::NavigationContext;
use navigation::level::NavigationLevel;
use runtime::clock::ClockFrame;

/// Backend usage errors. Both variants are programmer errors and fail
/// fast rather than being recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend was destroyed; no further operation is legal.
    Destroyed,
    /// An unknown renderer kind name was requested.
    UnsupportedKind(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Destroyed => write!(f, "operation on a destroyed backend"),
            BackendError::UnsupportedKind(name) => {
                write!(f, "unsupported renderer kind \"{name}\"")
            }
        }
    }
}

impl Error for BackendError {}

/// Which rendering backend to construct.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendKind {
    /// Declarative 2D chart adapter.
    Chart2d,
    /// GPU layer adapter.
    Gpu3d,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Chart2d => "chart",
            BackendKind::Gpu3d => "gpu",
        }
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chart" => Ok(BackendKind::Chart2d),
            "gpu" => Ok(BackendKind::Gpu3d),
            other => Err(BackendError::UnsupportedKind(other.to_string())),
        }
    }
}

/// Operations a rendering backend exposes to the controller.
///
/// Both adapters bind to this contract; a caller may observe slightly
/// different visuals between them for the same data, but never a
/// different navigation or data state.
pub trait MapBackend {
    fn kind(&self) -> BackendKind;

    /// Installs a new boundary/detail geometry.
    fn set_geo_data(
        &mut self,
        ctx: &NavigationContext,
        boundary: &FeatureCollection,
    ) -> Result<(), BackendError>;

    /// Replaces the overlay markers.
    fn set_points(
        &mut self,
        ctx: &NavigationContext,
        points: &[PointMarker],
    ) -> Result<(), BackendError>;

    /// Replaces the overlay edges.
    fn set_lines(
        &mut self,
        ctx: &NavigationContext,
        edges: &[FlowEdge],
    ) -> Result<(), BackendError>;

    /// Adjusts level-dependent styling after a navigation.
    fn update_level(&mut self, level: NavigationLevel) -> Result<(), BackendError>;

    /// Registers extra icon glyphs. The 2D adapter has no icon layer
    /// and no-ops with a warning.
    fn register_icons(
        &mut self,
        glyphs: BTreeMap<String, VectorGlyph>,
    ) -> Result<(), BackendError>;

    /// Marks at most one marker as selected.
    fn set_selected_point(&mut self, id: Option<&str>) -> Result<(), BackendError>;

    /// Advances animated layers to a clock frame. Declarative trail
    /// effects make this a no-op for the 2D adapter.
    fn advance(&mut self, frame: ClockFrame) -> Result<(), BackendError>;

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError>;

    /// Releases the backend; every later call fails with `Destroyed`.
    fn destroy(&mut self) -> Result<(), BackendError>;
}
