/// Screen-space picking by ray casting against every mesh triangle
use log::debug;
use nalgebra::{Point3, Vector3};

use crate::error::{ViewerError, ViewerResult};
use crate::projection::{Camera, ProjectionMode};
use crate::world::{MeshId, World};

/// Tolerance for parallel rays and for the accepted hit distance range
pub const EPSILON: f32 = 1e-6;

/// A half-line in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    /// `direction` is normalized here; `None` if it is too short to have one
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        let direction = direction.try_normalize(EPSILON)?;
        Some(Self { origin, direction })
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Build the world-space ray under a click.
    ///
    /// Perspective rays start at the eye, where all of them converge.
    /// Orthographic rays start on the near clip plane. Either way the ray runs
    /// towards the click's unprojection on the far plane.
    pub fn from_screen(camera: &Camera, x: f32, y: f32, width: u32, height: u32) -> ViewerResult<Self> {
        let (ndc_x, ndc_y) = screen_to_ndc(x, y, width, height);
        let far = camera.unproject(ndc_x, ndc_y, 1.0)?;
        let origin = match camera.mode() {
            ProjectionMode::Perspective => camera.eye(),
            ProjectionMode::Orthographic => camera.unproject(ndc_x, ndc_y, -1.0)?,
        };

        let direction = (far - origin)
            .try_normalize(EPSILON)
            .ok_or(ViewerError::SingularMatrix("unprojection"))?;
        Ok(Self { origin, direction })
    }
}

/// Convert device pixels (origin top-left) to normalized device coordinates
pub fn screen_to_ndc(x: f32, y: f32, width: u32, height: u32) -> (f32, f32) {
    let width = width.max(1) as f32;
    let height = height.max(1) as f32;
    let ndc_x = (x / width) * 2.0 - 1.0;
    let ndc_y = ((height - 1.0 - y) / height) * 2.0 - 1.0;
    (ndc_x, ndc_y)
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the ray parameter `t` of the hit. Rays parallel to the triangle's
/// plane, grazing misses and hits outside `(EPSILON, 1 / EPSILON)` all give
/// `None`.
pub fn ray_triangle_intersect(
    ray: &Ray,
    v0: &Point3<f32>,
    v1: &Point3<f32>,
    v2: &Point3<f32>,
) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(&edge2);
    let a = edge1.dot(&h);
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(&edge1);
    let v = f * ray.direction.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(&q);
    (t > EPSILON && t < 1.0 / EPSILON).then_some(t)
}

/// The closest triangle hit by a pick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub mesh: MeshId,
    /// Face index within the mesh
    pub triangle: usize,
    /// Distance along the ray
    pub distance: f32,
}

/// Closest hit of `ray` over every triangle of every mesh in `world`
pub fn cast_ray(world: &World, ray: &Ray) -> Option<PickHit> {
    let mut closest: Option<PickHit> = None;
    for (mesh_id, mesh) in world.meshes() {
        for (triangle, [a, b, c]) in mesh.world_triangles().enumerate() {
            let Some(distance) = ray_triangle_intersect(ray, &a, &b, &c) else {
                continue;
            };
            if closest.map_or(true, |hit| distance < hit.distance) {
                closest = Some(PickHit {
                    mesh: mesh_id,
                    triangle,
                    distance,
                });
            }
        }
    }
    closest
}

/// Resolve a click to a mesh and store it as the world's selection.
///
/// The selection is recomputed from scratch: a click that hits nothing
/// clears it. Fails only when the world has no usable camera.
pub fn pick(world: &mut World, x: f32, y: f32, width: u32, height: u32) -> ViewerResult<Option<PickHit>> {
    let ray = Ray::from_screen(world.active_camera()?, x, y, width, height)?;
    let hit = cast_ray(world, &ray);
    match hit {
        Some(hit) => debug!(
            "click ({}, {}) hit mesh {} triangle {} at {:.3}",
            x, y, hit.mesh.0, hit.triangle, hit.distance
        ),
        None => debug!("click ({}, {}) hit nothing", x, y),
    }
    world.select(hit.map(|hit| hit.mesh))?;
    Ok(hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::transform::Axis;

    fn xy_triangle() -> [Point3<f32>; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

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
    fn test_ray_along_inward_normal_hits_centroid() {
        let [a, b, c] = xy_triangle();
        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        // Normal is +z, so start above and travel down
        let ray = Ray::new(centroid + Vector3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        let t = ray_triangle_intersect(&ray, &a, &b, &c).unwrap();
        assert!((t - 2.0).abs() < 1e-6);
        assert!((ray.at(t) - centroid).norm() < 1e-6);
    }

    #[test]
    fn test_ray_in_triangle_plane_misses() {
        let [a, b, c] = xy_triangle();
        let centroid = Point3::from((a.coords + b.coords + c.coords) / 3.0);
        let ray = Ray::new(centroid + Vector3::new(0.0, 0.0, 2.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(ray_triangle_intersect(&ray, &a, &b, &c), None);

        let in_plane = Ray::new(Point3::new(-1.0, 0.2, 0.0), Vector3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(ray_triangle_intersect(&in_plane, &a, &b, &c), None);
    }

    #[test]
    fn test_ray_outside_triangle_misses() {
        let [a, b, c] = xy_triangle();
        let ray = Ray::new(Point3::new(0.9, 0.9, 1.0), Vector3::new(0.0, 0.0, -1.0)).unwrap();
        assert_eq!(ray_triangle_intersect(&ray, &a, &b, &c), None);
    }

    #[test]
    fn test_triangle_behind_origin_misses() {
        let [a, b, c] = xy_triangle();
        let ray = Ray::new(Point3::new(0.2, 0.2, 1.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(ray_triangle_intersect(&ray, &a, &b, &c), None);
    }

    #[test]
    fn test_back_face_is_still_hit() {
        let [a, b, c] = xy_triangle();
        let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(ray_triangle_intersect(&ray, &a, &b, &c).is_some());
    }

    #[test]
    fn test_zero_direction_is_not_a_ray() {
        assert_eq!(Ray::new(Point3::origin(), Vector3::zeros()), None);
        assert_eq!(Ray::new(Point3::origin(), Vector3::new(0.0, 1e-9, 0.0)), None);

        let ray = Ray::new(Point3::origin(), Vector3::new(0.0, 3.0, 0.0)).unwrap();
        assert_eq!(ray.direction, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_screen_to_ndc_flips_y() {
        let (x, y) = screen_to_ndc(0.0, 0.0, 100, 100);
        assert_eq!(x, -1.0);
        assert!((y - 0.98).abs() < 1e-6);

        let (x, y) = screen_to_ndc(50.0, 49.0, 100, 100);
        assert_eq!(x, 0.0);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_perspective_ray_starts_at_eye() {
        let camera = square_camera(ProjectionMode::Perspective);
        let ray = Ray::from_screen(&camera, 50.0, 49.0, 100, 100).unwrap();
        assert_eq!(ray.origin, camera.eye());
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-4);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let camera = square_camera(ProjectionMode::Orthographic);
        let centre = Ray::from_screen(&camera, 50.0, 49.0, 100, 100).unwrap();
        let corner = Ray::from_screen(&camera, 0.0, 0.0, 100, 100).unwrap();
        assert!((centre.direction - corner.direction).norm() < 1e-4);
        // Origins sit on the near plane, half a unit in front of the eye
        assert!((centre.origin.z - 2.5).abs() < 1e-3);
        assert!(corner.origin.x < -0.4);
    }

    #[test]
    fn test_closest_mesh_wins() {
        let mut world = World::new();
        world.add_camera(square_camera(ProjectionMode::Perspective));
        let mut far = Mesh::cube(1.0);
        far.translate(&Vector3::new(0.0, 0.0, -5.0));
        world.add_mesh(far);
        let near = world.add_mesh(Mesh::cube(1.0));

        let hit = pick(&mut world, 50.0, 49.0, 100, 100).unwrap().unwrap();
        assert_eq!(hit.mesh, near);
        assert!((hit.distance - 2.5).abs() < 1e-3);
        assert_eq!(world.selected(), Some(near));
    }

    #[test]
    fn test_picking_uses_model_matrix() {
        let mut world = World::new();
        world.add_camera(square_camera(ProjectionMode::Perspective));
        let mut cube = Mesh::cube(1.0);
        cube.translate(&Vector3::new(10.0, 0.0, 0.0));
        cube.rotate(Axis::Y, 0.3);
        world.add_mesh(cube);

        assert_eq!(pick(&mut world, 50.0, 49.0, 100, 100).unwrap(), None);
        assert_eq!(world.selected(), None);
    }

    #[test]
    fn test_pick_without_camera_fails() {
        let mut world = World::new();
        world.add_mesh(Mesh::cube(1.0));
        assert!(matches!(
            pick(&mut world, 0.0, 0.0, 10, 10),
            Err(ViewerError::NoCamera)
        ));
    }

    #[test]
    fn test_empty_world_picks_nothing() {
        let mut world = World::new();
        world.add_camera(square_camera(ProjectionMode::Perspective));
        assert_eq!(pick(&mut world, 5.0, 5.0, 10, 10).unwrap(), None);
    }
}
