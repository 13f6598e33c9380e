//! cubescape core - rotating cubes rendered into a character grid
//!
//! Stateless geometry (rotation, projection, surface sampling) plus the
//! depth-buffered compositor and the frame driver that ties them together.
//! Displaying frames is left to a `FrameSink`.

pub mod config;
pub mod driver;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod projection;
pub mod transform;

// Re-export commonly used types
pub use config::RenderConfig;
pub use driver::{FrameDriver, FrameSink, FrameStats, Frames, RenderState, StopToken};
pub use error::{CubeError, CubeResult};
pub use frame::{Compositor, Grid, DEFAULT_BACKGROUND};
pub use geometry::{CubeSpec, Face, SurfaceSample, FACES};
pub use projection::{Projected, Projector};
pub use transform::{rotate_point, rotation_matrix, RotationState};
