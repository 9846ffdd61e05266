//! Rendering backends and orchestration: the shared backend contract,
//! the 2D declarative-chart adapter, the 3D GPU-layer adapter, the UI
//! event surface, and the controller that keeps them all synchronized
//! to one navigation state.

pub mod backend;
pub mod chart2d;
pub mod controller;
pub mod events;
pub mod gpu3d;

pub use backend::*;
pub use chart2d::*;
pub use controller::*;
pub use events::*;
pub use gpu3d::*;
