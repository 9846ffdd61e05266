//! Animated flow-line geometry: deterministic curvature, quadratic
//! Bézier paths, 2D curve/trail rendering and 3D time-windowed arcs.

pub mod arcs3d;
pub mod bezier;
pub mod curvature;
pub mod trail2d;

pub use arcs3d::*;
pub use bezier::*;
pub use curvature::*;
pub use trail2d::*;
