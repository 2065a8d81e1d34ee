/// OFF mesh file parser
use std::fs;
use std::path::Path;

use log::debug;
use nalgebra::{Point3, Vector3};
use nom::{
    character::complete::{space0, space1, u64 as integer},
    combinator::{all_consuming, opt, rest},
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::{ViewerError, ViewerResult};
use crate::geometry::{Mesh, RenderType};

/// Raw vertex and face arrays read from an OFF file
#[derive(Debug, Clone, PartialEq)]
pub struct OffData {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<[usize; 3]>,
}

impl OffData {
    /// Shift every vertex so the triangle-centroid barycenter sits at the origin
    pub fn recenter(&mut self) {
        let center = barycenter(&self.vertices, &self.faces);
        for vertex in &mut self.vertices {
            *vertex -= center;
        }
    }

    /// Recenter and build a mesh
    pub fn into_mesh(mut self, color: Vector3<f32>, render_type: RenderType) -> ViewerResult<Mesh> {
        self.recenter();
        Mesh::with_style(self.vertices, self.faces, color, render_type)
    }
}

/// Average over faces of each face's own centroid.
///
/// This is not the plain vertex average: vertices shared by many faces pull
/// harder. Zero when there are no faces.
pub fn barycenter(vertices: &[Point3<f32>], faces: &[[usize; 3]]) -> Vector3<f32> {
    if faces.is_empty() {
        return Vector3::zeros();
    }
    let sum: Vector3<f32> = faces
        .iter()
        .map(|&[a, b, c]| (vertices[a].coords + vertices[b].coords + vertices[c].coords) / 3.0)
        .sum();
    sum / faces.len() as f32
}

/// Parse OFF text into raw arrays, without recentering.
///
/// Layout: one header line (ignored), a counts line
/// `<vertices> <faces> [<edges>]`, then one `x y z` line per vertex and one
/// `3 i0 i1 i2` line per face. Blank lines and `#` comments after the header
/// are skipped. Only triangular faces are accepted.
pub fn parse_off(input: &str) -> ViewerResult<OffData> {
    let total_lines = input.lines().count();
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .skip(1)
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        });

    if total_lines == 0 {
        return Err(ViewerError::Parse {
            line: 1,
            message: "missing header line".to_string(),
        });
    }

    let mut next_line = |expected: &str| {
        lines.next().ok_or_else(|| ViewerError::Parse {
            line: total_lines + 1,
            message: format!("unexpected end of file, expected {}", expected),
        })
    };

    let (line_no, line) = next_line("vertex and face counts")?;
    let (vertex_count, face_count) = parse_line(line_no, line, counts)?;

    // Counts come from the file; never reserve more than it has lines
    let mut vertices = Vec::with_capacity(vertex_count.min(total_lines));
    for _ in 0..vertex_count {
        let (line_no, line) = next_line("a vertex")?;
        let point = parse_line(line_no, line, vertex)?;
        if !point.coords.iter().all(|c| c.is_finite()) {
            return Err(ViewerError::Parse {
                line: line_no,
                message: format!("non-finite coordinate in {:?}", line),
            });
        }
        vertices.push(point);
    }

    let mut faces = Vec::with_capacity(face_count.min(total_lines));
    for _ in 0..face_count {
        let (line_no, line) = next_line("a face")?;
        let (corners, indices) = parse_line(line_no, line, face)?;
        if corners != 3 {
            return Err(ViewerError::Parse {
                line: line_no,
                message: format!("face has {} corners, only triangles are supported", corners),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(ViewerError::Parse {
                line: line_no,
                message: format!("vertex index {} out of range ({} vertices)", bad, vertex_count),
            });
        }
        faces.push(indices);
    }

    debug!("parsed OFF with {} vertices and {} faces", vertex_count, face_count);
    Ok(OffData { vertices, faces })
}

/// Parse OFF text, recenter it and build a styled mesh
pub fn mesh_from_off(input: &str, color: Vector3<f32>, render_type: RenderType) -> ViewerResult<Mesh> {
    parse_off(input)?.into_mesh(color, render_type)
}

/// Read, parse and recenter an OFF file
pub fn load_off(
    path: impl AsRef<Path>,
    color: Vector3<f32>,
    render_type: RenderType,
) -> ViewerResult<Mesh> {
    let path = path.as_ref();
    debug!("loading OFF file {}", path.display());
    let text = fs::read_to_string(path)?;
    mesh_from_off(&text, color, render_type)
}

fn parse_line<'a, T>(
    line_no: usize,
    line: &'a str,
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
) -> ViewerResult<T> {
    all_consuming(parser)(line)
        .map(|(_, value)| value)
        .map_err(|e| ViewerError::Parse {
            line: line_no,
            message: format!("malformed line {:?}: {}", line, e),
        })
}

fn counts(input: &str) -> IResult<&str, (usize, usize)> {
    let (input, _) = space0(input)?;
    let (input, vertices) = integer(input)?;
    let (input, _) = space1(input)?;
    let (input, faces) = integer(input)?;
    let (input, _) = opt(preceded(space1, integer))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, (vertices as usize, faces as usize)))
}

fn vertex(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = space0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = space1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = space1(input)?;
    let (input, z) = float(input)?;
    let (input, _) = space0(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Corner count and the first three indices; anything after them (such as
/// per-face colours) is ignored
fn face(input: &str) -> IResult<&str, (u64, [usize; 3])> {
    let (input, _) = space0(input)?;
    let (input, corners) = integer(input)?;
    let (input, _) = space1(input)?;
    let (input, a) = integer(input)?;
    let (input, _) = space1(input)?;
    let (input, b) = integer(input)?;
    let (input, _) = space1(input)?;
    let (input, c) = integer(input)?;
    let (input, _) = rest(input)?;
    Ok((input, (corners, [a as usize, b as usize, c as usize])))
}
