pub mod bounds;
pub mod color;
pub mod coord;
pub mod hash;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use bounds::*;
pub use color::*;
pub use coord::*;
pub use time::*;
