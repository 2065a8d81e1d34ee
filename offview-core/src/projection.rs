/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::error::{ViewerError, ViewerResult};
use crate::transform::Transform;

/// Lengths below this are treated as zero when building the camera basis
const BASIS_EPSILON: f32 = 1e-6;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
        }
    }
}

impl TryFrom<u8> for ProjectionMode {
    type Error = ViewerError;

    /// Decode the numeric projection codes (0 orthographic, 1 perspective)
    fn try_from(code: u8) -> ViewerResult<Self> {
        match code {
            0 => Ok(ProjectionMode::Orthographic),
            1 => Ok(ProjectionMode::Perspective),
            other => Err(ViewerError::InvalidProjection(other)),
        }
    }
}

/// Camera configuration for 3D rendering.
///
/// `near` and `far` are signed distances along the view axis and are expected
/// to be negative with `|near| < |far|`. Matrices are rebuilt from the current
/// parameters on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    eye: Point3<f32>,
    target: Point3<f32>,
    mode: ProjectionMode,
    aspect: f32,
    near: f32,
    far: f32,
    fov: f32,
}

impl Camera {
    pub fn new(
        eye: Point3<f32>,
        target: Point3<f32>,
        mode: ProjectionMode,
        aspect: f32,
        near: f32,
        far: f32,
        fov: f32,
    ) -> Self {
        Self {
            eye,
            target,
            mode,
            aspect,
            near,
            far,
            fov,
        }
    }

    /// Perspective camera three units in front of the origin, 90 degree FOV
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self::new(
            Point3::new(0.0, 0.0, 3.0),
            Point3::origin(),
            ProjectionMode::Perspective,
            width as f32 / height.max(1) as f32,
            -0.5,
            -100.0,
            90f32.to_radians(),
        )
    }

    /// Create the view matrix (camera transformation).
    ///
    /// `forward` points from the target back to the eye, so the camera looks
    /// along `-forward`. When looking straight up or down the right vector
    /// falls back to world +X.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let up = Vector3::y();
        let forward = (self.eye - self.target)
            .try_normalize(BASIS_EPSILON)
            .unwrap_or_else(Vector3::z);
        let right = up
            .cross(&forward)
            .try_normalize(BASIS_EPSILON)
            .unwrap_or_else(Vector3::x);
        let cam_up = forward.cross(&right);

        #[rustfmt::skip]
        let rotation = Matrix4::new(
            right.x, right.y, right.z, 0.0,
            cam_up.x, cam_up.y, cam_up.z, 0.0,
            forward.x, forward.y, forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        rotation * Transform::translation(&-self.eye.coords)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let n = self.near.abs();
        let f = self.far.abs();
        let t = (self.fov / 2.0).tan() * n;
        let b = -t;
        let r = self.aspect * t;
        let l = -r;

        match self.mode {
            #[rustfmt::skip]
            ProjectionMode::Orthographic => Matrix4::new(
                2.0 / (r - l), 0.0, 0.0, -(r + l) / (r - l),
                0.0, 2.0 / (t - b), 0.0, -(t + b) / (t - b),
                0.0, 0.0, 2.0 / (n - f), -(self.near + self.far) / (n - f),
                0.0, 0.0, 0.0, 1.0,
            ),
            #[rustfmt::skip]
            ProjectionMode::Perspective => Matrix4::new(
                2.0 * n / (r - l), 0.0, (r + l) / (r - l), 0.0,
                0.0, 2.0 * n / (t - b), (t + b) / (t - b), 0.0,
                0.0, 0.0, (f + n) / (n - f), 2.0 * f * n / (n - f),
                0.0, 0.0, -1.0, 0.0,
            ),
        }
    }

    /// Projection times view
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Map a point in normalized device coordinates back to world space
    pub fn unproject(&self, ndc_x: f32, ndc_y: f32, depth: f32) -> ViewerResult<Point3<f32>> {
        let inverse_view = self
            .view_matrix()
            .try_inverse()
            .ok_or(ViewerError::SingularMatrix("view"))?;
        let inverse_projection = self
            .projection_matrix()
            .try_inverse()
            .ok_or(ViewerError::SingularMatrix("projection"))?;

        let world = inverse_view * inverse_projection * Vector4::new(ndc_x, ndc_y, depth, 1.0);
        if world.w.abs() < f32::EPSILON {
            return Err(ViewerError::SingularMatrix("unprojection"));
        }
        Ok(Point3::from(world.xyz() / world.w))
    }

    /// Project a 3D point to 2D screen space.
    ///
    /// Returns pixel coordinates and NDC depth, or `None` for points behind
    /// the camera or outside the depth range. Points off the sides of the
    /// screen are still returned so rasterizers can clip partially visible
    /// triangles.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = Transform::mvp_matrix(model_matrix, &self.view_matrix(), &self.projection_matrix());
        Self::project_with(&mvp, point, width, height)
    }

    /// Same as `project_to_screen` with a precomputed model-view-projection
    pub fn project_with(
        mvp: &Matrix4<f32>,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero or negative w (behind the eye)
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.z < -1.0 || ndc.z > 1.0 {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }

    /// Move the eye only; the target stays put, so the gaze direction can change
    pub fn translate_by(&mut self, delta: &Vector3<f32>) {
        self.eye += *delta;
    }

    /// Switch between a 90 degree perspective and a 140 degree orthographic view
    pub fn toggle_projection(&mut self) {
        self.mode = self.mode.toggled();
        self.fov = match self.mode {
            ProjectionMode::Perspective => 90f32.to_radians(),
            ProjectionMode::Orthographic => 140f32.to_radians(),
        };
    }

    pub fn eye(&self) -> Point3<f32> {
        self.eye
    }

    pub fn set_eye(&mut self, eye: Point3<f32>) {
        self.eye = eye;
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
    }

    /// Full vertical field of view in radians
    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::for_viewport(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_camera(mode: ProjectionMode) -> Camera {
        Camera::new(
            Point3::new(0.0, 0.0, 3.0),
            Point3::origin(),
            mode,
            1.0,
            -0.5,
            -100.0,
            90f32.to_radians(),
        )
    }

    #[test]
    fn test_camera_creation() {
        let camera = Camera::for_viewport(800, 600);
        assert_eq!(camera.mode(), ProjectionMode::Perspective);
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.eye(), Point3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_view_puts_target_on_axis() {
        let camera = Camera::new(
            Point3::new(2.0, 1.5, -4.0),
            Point3::new(0.5, -1.0, 1.0),
            ProjectionMode::Perspective,
            1.0,
            -0.1,
            -50.0,
            1.0,
        );
        let target = camera.view_matrix().transform_point(&camera.target());
        assert!(target.x.abs() < 1e-5);
        assert!(target.y.abs() < 1e-5);
        // In front of the camera means negative view-space z
        assert!(target.z < 0.0);
    }

    #[test]
    fn test_view_of_default_camera_is_translation() {
        let view = square_camera(ProjectionMode::Perspective).view_matrix();
        let expected = Transform::translation(&Vector3::new(0.0, 0.0, -3.0));
        assert!((view - expected).norm() < 1e-6);
    }

    #[test]
    fn test_view_basis_is_orthonormal() {
        let camera = Camera::new(
            Point3::new(-3.0, 2.0, 5.0),
            Point3::new(1.0, 0.0, 0.0),
            ProjectionMode::Perspective,
            1.0,
            -0.1,
            -10.0,
            1.0,
        );
        let view = camera.view_matrix();
        let rotation = view.fixed_view::<3, 3>(0, 0).into_owned();
        assert!((rotation * rotation.transpose() - nalgebra::Matrix3::identity()).norm() < 1e-5);
    }

    #[test]
    fn test_straight_down_view_is_finite() {
        let camera = Camera::new(
            Point3::new(0.0, 5.0, 0.0),
            Point3::origin(),
            ProjectionMode::Perspective,
            1.0,
            -0.1,
            -10.0,
            1.0,
        );
        let view = camera.view_matrix();
        assert!(view.iter().all(|v| v.is_finite()));
        assert!(view.try_inverse().is_some());
    }

    #[test]
    fn test_perspective_maps_near_and_far() {
        let projection = square_camera(ProjectionMode::Perspective).projection_matrix();
        let near = projection * Vector4::new(0.0, 0.0, -0.5, 1.0);
        let far = projection * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
        assert_eq!(projection[(3, 2)], -1.0);
        assert_eq!(projection[(3, 3)], 0.0);
    }

    #[test]
    fn test_orthographic_maps_box_to_cube() {
        let projection = square_camera(ProjectionMode::Orthographic).projection_matrix();
        // t = tan(45deg) * 0.5 = 0.5
        let corner = projection * Vector4::new(0.5, -0.5, -0.5, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-5);
        assert!((corner.y + 1.0).abs() < 1e-5);
        assert!((corner.z + 1.0).abs() < 1e-5);
        let far = projection * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((far.z - 1.0).abs() < 1e-4);
        assert_eq!(corner.w, 1.0);
    }

    #[test]
    fn test_projection_follows_setters() {
        let mut camera = square_camera(ProjectionMode::Perspective);
        let before = camera.projection_matrix();
        camera.set_aspect(2.0);
        let after = camera.projection_matrix();
        assert!((after[(0, 0)] - before[(0, 0)] / 2.0).abs() < 1e-6);

        camera.set_mode(ProjectionMode::Orthographic);
        assert_eq!(camera.projection_matrix()[(3, 3)], 1.0);
    }

    #[test]
    fn test_translate_by_keeps_target() {
        let mut camera = square_camera(ProjectionMode::Perspective);
        camera.translate_by(&Vector3::new(0.5, 0.0, 0.0));
        assert_eq!(camera.eye(), Point3::new(0.5, 0.0, 3.0));
        assert_eq!(camera.target(), Point3::origin());
        // The gaze now swings back towards the untouched target
        let target = camera.view_matrix().transform_point(&Point3::origin());
        assert!(target.x.abs() < 1e-5);
    }

    #[test]
    fn test_toggle_projection_sets_fov() {
        let mut camera = square_camera(ProjectionMode::Perspective);
        camera.toggle_projection();
        assert_eq!(camera.mode(), ProjectionMode::Orthographic);
        assert!((camera.fov() - 140f32.to_radians()).abs() < 1e-6);
        camera.toggle_projection();
        assert_eq!(camera.mode(), ProjectionMode::Perspective);
        assert!((camera.fov() - 90f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_projection_codes() {
        assert_eq!(ProjectionMode::try_from(0).unwrap(), ProjectionMode::Orthographic);
        assert_eq!(ProjectionMode::try_from(1).unwrap(), ProjectionMode::Perspective);
        assert!(matches!(
            ProjectionMode::try_from(7),
            Err(ViewerError::InvalidProjection(7))
        ));
    }

    #[test]
    fn test_unproject_inverts_projection() {
        for mode in [ProjectionMode::Perspective, ProjectionMode::Orthographic] {
            let camera = square_camera(mode);
            let point = Point3::new(0.2, -0.1, 0.5);
            let clip = camera.view_projection() * point.to_homogeneous();
            let ndc = clip.xyz() / clip.w;
            let back = camera.unproject(ndc.x, ndc.y, ndc.z).unwrap();
            assert!((back - point).norm() < 1e-3, "{:?}: {:?}", mode, back);
        }
    }

    #[test]
    fn test_project_center_to_screen() {
        let camera = square_camera(ProjectionMode::Perspective);
        let (x, y, depth) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 100, 50)
            .unwrap();
        assert!((x - 50.0).abs() < 1e-4);
        assert!((y - 25.0).abs() < 1e-4);
        assert!(depth > -1.0 && depth < 1.0);
    }

    #[test]
    fn test_point_behind_camera_is_not_projected() {
        let camera = square_camera(ProjectionMode::Perspective);
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 100, 100)
            .is_none());
    }
}
