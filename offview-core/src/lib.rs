/// offview core library - scene, geometry and picking logic
///
/// This library holds everything that does not touch a display: OFF mesh
/// loading, model transforms, cameras, lighting, the mesh/camera world and
/// ray-cast selection. Front ends drive it through `Scene` commands.

pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod lighting;
pub mod off;
pub mod picking;
pub mod projection;
pub mod transform;
pub mod world;

// Re-export commonly used types
pub use command::{Command, MeshSource, Outcome, Scene};
pub use config::ViewerConfig;
pub use error::{ViewerError, ViewerResult};
pub use geometry::{Mesh, RenderType};
pub use lighting::Light;
pub use picking::{pick, PickHit, Ray};
pub use projection::{Camera, ProjectionMode};
pub use transform::{Axis, Transform};
pub use world::{CameraId, MeshId, World};
