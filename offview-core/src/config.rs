//! Viewer configuration.
//!
//! Initial camera, lighting and the step sizes used by the edit commands.

use nalgebra::{Point3, Vector3};

use crate::geometry::{RenderType, DEFAULT_COLOR};
use crate::lighting::Light;
use crate::projection::{Camera, ProjectionMode};

/// Configuration for a viewer session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Initial eye position.
    pub eye: Point3<f32>,

    /// Point the initial camera looks at.
    pub target: Point3<f32>,

    pub projection: ProjectionMode,

    /// Field of view in radians.
    pub fov: f32,

    /// Signed near and far plane distances (negative, `|near| < |far|`).
    pub near: f32,
    pub far: f32,

    pub light: Light,

    /// Colour and style given to loaded meshes.
    pub mesh_color: Vector3<f32>,
    pub render_type: RenderType,

    /// Distance moved per translate command.
    pub translate_step: f32,

    /// Radians turned per rotate command.
    pub rotate_step: f32,

    /// Factor applied per scale-up command; scale-down uses its inverse.
    pub scale_step: f32,

    /// Camera movement per command in x/y and in z.
    pub camera_step: f32,
    pub camera_depth_step: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            eye: Point3::new(0.0, 0.0, 3.0),
            target: Point3::origin(),
            projection: ProjectionMode::Perspective,
            fov: 90f32.to_radians(),
            near: -0.5,
            far: -100.0,
            light: Light::default(),
            mesh_color: Vector3::from(DEFAULT_COLOR),
            render_type: RenderType::default(),
            translate_step: 0.1,
            rotate_step: 0.1,
            scale_step: 1.1,
            camera_step: 0.5,
            camera_depth_step: 0.1,
        }
    }
}

impl ViewerConfig {
    /// Starts in orthographic mode with the wide orthographic field of view.
    pub fn orthographic() -> Self {
        Self {
            projection: ProjectionMode::Orthographic,
            fov: 140f32.to_radians(),
            ..Default::default()
        }
    }

    /// Build the initial camera for a viewport
    pub fn camera(&self, width: u32, height: u32) -> Camera {
        Camera::new(
            self.eye,
            self.target,
            self.projection,
            width as f32 / height.max(1) as f32,
            self.near,
            self.far,
            self.fov,
        )
    }
}
