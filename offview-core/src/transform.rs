/// Affine transformation matrices for mesh editing
use nalgebra::{Matrix4, Vector3};

/// World axis an elementary rotation turns about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Transform builder for 3D transformations.
///
/// Every matrix here is meant to be left-multiplied onto an existing model
/// matrix, so its effect is expressed in world space.
pub struct Transform;

impl Transform {
    /// Create a translation matrix
    pub fn translation(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Create a uniform scale matrix
    pub fn scale(factor: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::repeat(factor))
    }

    /// Scale by `factor` while keeping `point` fixed
    pub fn scale_about_point(point: &Vector3<f32>, factor: f32) -> Matrix4<f32> {
        Self::translation(point) * Self::scale(factor) * Self::translation(&-point)
    }

    /// Create an elementary rotation about a world axis.
    ///
    /// All three matrices share one sign pattern: each turns by `-radians`
    /// in the usual right-handed sense. Picking and camera moves rely on it.
    pub fn rotation(axis: Axis, radians: f32) -> Matrix4<f32> {
        let (s, c) = radians.sin_cos();
        match axis {
            #[rustfmt::skip]
            Axis::X => Matrix4::new(
                1.0, 0.0, 0.0, 0.0,
                0.0, c, s, 0.0,
                0.0, -s, c, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ),
            #[rustfmt::skip]
            Axis::Y => Matrix4::new(
                c, 0.0, -s, 0.0,
                0.0, 1.0, 0.0, 0.0,
                s, 0.0, c, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ),
            #[rustfmt::skip]
            Axis::Z => Matrix4::new(
                c, s, 0.0, 0.0,
                -s, c, 0.0, 0.0,
                0.0, 0.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 1.0,
            ),
        }
    }

    /// Rotate about a world axis passing through `center`
    pub fn rotate_about_point(axis: Axis, radians: f32, center: &Vector3<f32>) -> Matrix4<f32> {
        Self::translation(center) * Self::rotation(axis, radians) * Self::translation(&-center)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}
