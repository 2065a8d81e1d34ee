/// Triangle meshes with derived shading normals and a model transform
use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{ViewerError, ViewerResult};
use crate::transform::{Axis, Transform};

/// Colour given to meshes constructed without one
pub const DEFAULT_COLOR: [f32; 3] = [0.0, 1.1, 2.2];

/// Normals shorter than this are treated as undefined and stored as zero
const NORMAL_EPSILON: f32 = 1e-12;

/// How a mesh is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderType {
    #[default]
    Wireframe,
    FlatShade,
    PhongShade,
}

impl RenderType {
    /// The next mode in the Phong -> Wireframe -> Flat -> Phong cycle
    pub fn next(self) -> Self {
        match self {
            RenderType::PhongShade => RenderType::Wireframe,
            RenderType::Wireframe => RenderType::FlatShade,
            RenderType::FlatShade => RenderType::PhongShade,
        }
    }

    /// Whether lighting should use the per-face normals
    pub fn uses_face_normals(self) -> bool {
        match self {
            RenderType::Wireframe | RenderType::FlatShade => true,
            RenderType::PhongShade => false,
        }
    }
}

/// A triangle mesh instance.
///
/// `triangle_vertices`, `face_normals` and `vertex_normals` are flattened per
/// corner: entry `3 * face + corner` belongs to corner `corner` of `face`.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point3<f32>>,
    faces: Vec<[usize; 3]>,
    triangle_vertices: Vec<Point3<f32>>,
    face_normals: Vec<Vector3<f32>>,
    vertex_normals: Vec<Vector3<f32>>,
    model: Matrix4<f32>,
    color: Vector3<f32>,
    render_type: RenderType,
}

impl Mesh {
    /// Build a mesh with the default colour and wireframe rendering
    pub fn new(vertices: Vec<Point3<f32>>, faces: Vec<[usize; 3]>) -> ViewerResult<Self> {
        Self::with_style(
            vertices,
            faces,
            Vector3::from(DEFAULT_COLOR),
            RenderType::default(),
        )
    }

    /// Build a mesh, deriving per-corner positions and normals.
    ///
    /// Fails if any face refers to a vertex that does not exist.
    pub fn with_style(
        vertices: Vec<Point3<f32>>,
        faces: Vec<[usize; 3]>,
        color: Vector3<f32>,
        render_type: RenderType,
    ) -> ViewerResult<Self> {
        if let Some((face, index)) = faces.iter().enumerate().find_map(|(f, indices)| {
            indices
                .iter()
                .find(|&&i| i >= vertices.len())
                .map(|&i| (f, i))
        }) {
            return Err(ViewerError::InvalidMesh(format!(
                "face {} refers to vertex {} but only {} vertices exist",
                face,
                index,
                vertices.len()
            )));
        }

        debug!(
            "built mesh with {} vertices and {} faces",
            vertices.len(),
            faces.len()
        );
        Ok(Self::build(vertices, faces, color, render_type))
    }

    /// Derive the per-corner buffers for already validated faces
    fn build(
        vertices: Vec<Point3<f32>>,
        faces: Vec<[usize; 3]>,
        color: Vector3<f32>,
        render_type: RenderType,
    ) -> Self {
        let triangle_vertices = triangle_vertices(&vertices, &faces);
        let face_normals = face_normals(&triangle_vertices);
        let vertex_normals = vertex_normals(&faces, &face_normals);
        Self {
            vertices,
            faces,
            triangle_vertices,
            face_normals,
            vertex_normals,
            model: Matrix4::identity(),
            color,
            render_type,
        }
    }

    /// Create an axis-aligned cube centred at the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let vertices = vec![
            Point3::new(-half, -half, -half),
            Point3::new(half, -half, -half),
            Point3::new(half, half, -half),
            Point3::new(-half, half, -half),
            Point3::new(-half, -half, half),
            Point3::new(half, -half, half),
            Point3::new(half, half, half),
            Point3::new(-half, half, half),
        ];
        // Counter-clockwise seen from outside
        let faces = vec![
            // Front
            [4, 5, 6],
            [4, 6, 7],
            // Back
            [0, 3, 2],
            [0, 2, 1],
            // Top
            [3, 7, 6],
            [3, 6, 2],
            // Bottom
            [0, 1, 5],
            [0, 5, 4],
            // Right
            [1, 2, 6],
            [1, 6, 5],
            // Left
            [0, 4, 7],
            [0, 7, 3],
        ];

        Self::build(
            vertices,
            faces,
            Vector3::from(DEFAULT_COLOR),
            RenderType::default(),
        )
    }

    /// Move the mesh by `offset` in world space
    pub fn translate(&mut self, offset: &Vector3<f32>) {
        self.model = Transform::translation(offset) * self.model;
    }

    /// Scale the mesh about its current world position.
    ///
    /// Factors that are not finite and positive would leave the model
    /// singular; they are logged and ignored.
    pub fn scale(&mut self, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) {
            warn!("ignoring scale by {}", factor);
            return;
        }
        let pivot = self.translation();
        self.model = Transform::scale_about_point(&pivot, factor) * self.model;
    }

    /// Rotate the mesh about a world axis through its current world position
    pub fn rotate(&mut self, axis: Axis, radians: f32) {
        let pivot = self.translation();
        self.model = Transform::rotate_about_point(axis, radians, &pivot) * self.model;
    }

    /// Scale so the largest extent of the untransformed vertices becomes 1.
    ///
    /// The pivot is the current translation, so calling this after
    /// `translate` gives a different result than calling it before.
    pub fn scale_to_unit_cube(&mut self) {
        let Some((min, max)) = self.bounds() else {
            return;
        };
        let extent = max - min;
        let largest = extent.x.max(extent.y).max(extent.z);
        if largest > 0.0 {
            self.scale(1.0 / largest);
        }
    }

    /// Axis-aligned bounds of the untransformed vertices
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(v), max.sup(v))
        }))
    }

    /// Axis-aligned bounds after the model transform
    pub fn world_bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let mut points = self.vertices.iter().map(|v| self.model.transform_point(v));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), v| (min.inf(&v), max.sup(&v))))
    }

    /// Translation column of the model matrix
    pub fn translation(&self) -> Vector3<f32> {
        self.model.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Each triangle's corners mapped through the model matrix
    pub fn world_triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.triangle_vertices.chunks_exact(3).map(|corners| {
            [
                self.model.transform_point(&corners[0]),
                self.model.transform_point(&corners[1]),
                self.model.transform_point(&corners[2]),
            ]
        })
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    pub fn triangle_vertices(&self) -> &[Point3<f32>] {
        &self.triangle_vertices
    }

    pub fn face_normals(&self) -> &[Vector3<f32>] {
        &self.face_normals
    }

    pub fn vertex_normals(&self) -> &[Vector3<f32>] {
        &self.vertex_normals
    }

    pub fn model(&self) -> &Matrix4<f32> {
        &self.model
    }

    pub fn color(&self) -> Vector3<f32> {
        self.color
    }

    pub fn set_color(&mut self, color: Vector3<f32>) {
        self.color = color;
    }

    pub fn render_type(&self) -> RenderType {
        self.render_type
    }

    pub fn set_render_type(&mut self, render_type: RenderType) {
        self.render_type = render_type;
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }
}

/// Gather each face's corner positions in face order
fn triangle_vertices(vertices: &[Point3<f32>], faces: &[[usize; 3]]) -> Vec<Point3<f32>> {
    faces
        .iter()
        .flat_map(|face| face.iter().map(|&i| vertices[i]))
        .collect()
}

/// Flat normal of a triangle, zero when the triangle is degenerate
pub fn triangle_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Vector3<f32> {
    (b - a)
        .cross(&(c - a))
        .try_normalize(NORMAL_EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

/// One flat normal per corner, identical across a triangle's three corners
fn face_normals(triangle_vertices: &[Point3<f32>]) -> Vec<Vector3<f32>> {
    triangle_vertices
        .chunks_exact(3)
        .flat_map(|corners| {
            let normal = triangle_normal(&corners[0], &corners[1], &corners[2]);
            [normal; 3]
        })
        .collect()
}

/// Per-corner smooth normals.
///
/// Each corner gets the normalized, unweighted sum of the face normals of
/// every face touching its vertex. Irregular triangulations bias the result.
fn vertex_normals(faces: &[[usize; 3]], face_normals: &[Vector3<f32>]) -> Vec<Vector3<f32>> {
    let mut incident: HashMap<usize, Vec<usize>> = HashMap::new();
    for (face, indices) in faces.iter().enumerate() {
        for &vertex in indices {
            incident.entry(vertex).or_default().push(face);
        }
    }

    faces
        .iter()
        .flat_map(|indices| {
            indices.map(|vertex| {
                incident
                    .get(&vertex)
                    .into_iter()
                    .flatten()
                    .map(|&face| face_normals[3 * face])
                    .sum::<Vector3<f32>>()
                    .try_normalize(NORMAL_EPSILON)
                    .unwrap_or_else(Vector3::zeros)
            })
        })
        .collect()
}
