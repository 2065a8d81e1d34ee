/// Point-light shading shared by the rasterizers
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::geometry::RenderType;

/// Colour used for the selected mesh
pub const SELECTION_COLOR: [f32; 3] = [0.0, 0.0, 1.0];

/// Colour of the edge overlay drawn on flat-shaded meshes
pub const OUTLINE_COLOR: [f32; 3] = [0.0, 0.0, 0.0];

/// A white point light plus the constants of the shading model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Point3<f32>,
    pub ambient: f32,
    pub specular_strength: f32,
    pub shininess: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Point3::new(-5.0, 0.0, 10.0),
            ambient: 0.01,
            specular_strength: 0.5,
            shininess: 32.0,
        }
    }
}

/// Matrix that carries object-space normals into world space.
///
/// Inverse transpose of the model's upper 3x3; falls back to the plain 3x3
/// when it is singular.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = model.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

impl Light {
    /// Shade one world-space sample.
    ///
    /// Wireframe and flat shading use ambient plus diffuse; Phong adds a
    /// specular highlight seen from `eye`. The result is not clamped.
    pub fn shade(
        &self,
        render_type: RenderType,
        position: &Point3<f32>,
        normal: &Vector3<f32>,
        eye: &Point3<f32>,
        color: &Vector3<f32>,
    ) -> Vector3<f32> {
        let normal = normal.try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
        let to_light = (self.position - position)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros);
        let diffuse = normal.dot(&to_light).max(0.0);

        let intensity = match render_type {
            RenderType::Wireframe | RenderType::FlatShade => self.ambient + diffuse,
            RenderType::PhongShade => {
                let to_eye = (eye - position).try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
                let reflected = reflect(&-to_light, &normal);
                let specular = to_eye.dot(&reflected).max(0.0).powf(self.shininess);
                self.ambient + diffuse + self.specular_strength * specular
            }
        };
        color * intensity
    }
}

/// Reflect `incident` about the plane with unit normal `normal`
pub fn reflect(incident: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    incident - normal * (2.0 * normal.dot(incident))
}
