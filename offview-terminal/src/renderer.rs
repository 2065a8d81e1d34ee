/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use offview_core::lighting::{normal_matrix, OUTLINE_COLOR, SELECTION_COLOR};
use offview_core::{Camera, Light, Mesh, RenderType, Transform, ViewerResult, World};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Character used for wire edges drawn over filled faces
const OUTLINE_CHAR: char = '+';

/// Edges win depth ties against the face they border
const EDGE_DEPTH_BIAS: f32 = 1e-3;

/// Per-draw state shared by every triangle of one mesh
struct MeshPass<'a> {
    mesh: &'a Mesh,
    mvp: Matrix4<f32>,
    normals: Matrix3<f32>,
    color: Vector3<f32>,
    eye: Point3<f32>,
    light: &'a Light,
}

/// A projected corner: screen x, screen y, NDC depth
type ScreenPoint = (f32, f32, f32);

/// ASCII renderer that converts meshes to coloured terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Character at a cell, if inside the buffer
    pub fn cell(&self, x: usize, y: usize) -> Option<(char, Color)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.width + x;
        Some((self.char_buffer[idx], self.color_buffer[idx]))
    }

    /// Rasterize every mesh of `world` through its active camera
    pub fn render_world(&mut self, world: &World, light: &Light) -> ViewerResult<()> {
        let camera = world.active_camera()?;
        for (id, mesh) in world.meshes() {
            let selected = world.selected() == Some(id);
            self.render_mesh(mesh, camera, light, selected);
        }
        Ok(())
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, camera: &Camera, light: &Light, selected: bool) {
        let color = if selected {
            Vector3::from(SELECTION_COLOR)
        } else {
            mesh.color()
        };
        let pass = MeshPass {
            mesh,
            mvp: Transform::mvp_matrix(mesh.model(), &camera.view_matrix(), &camera.projection_matrix()),
            normals: normal_matrix(mesh.model()),
            color,
            eye: camera.eye(),
            light,
        };

        for (index, corners) in mesh.triangle_vertices().chunks_exact(3).enumerate() {
            let Some(screen) = self.project_triangle(&pass.mvp, corners) else {
                continue; // Triangle is clipped
            };

            match mesh.render_type() {
                RenderType::Wireframe => {
                    let (character, color) = flat_shade(&pass, index, corners);
                    self.draw_outline(&screen, character, color);
                }
                RenderType::FlatShade => {
                    let (character, color) = flat_shade(&pass, index, corners);
                    self.fill_triangle(&screen, |_| (character, color));
                    self.draw_outline(&screen, OUTLINE_CHAR, to_terminal_color(&Vector3::from(OUTLINE_COLOR)));
                }
                RenderType::PhongShade => {
                    let normals = &mesh.vertex_normals()[index * 3..index * 3 + 3];
                    self.fill_triangle(&screen, |(w0, w1, w2)| {
                        let local = Point3::from(
                            corners[0].coords * w0 + corners[1].coords * w1 + corners[2].coords * w2,
                        );
                        let normal = normals[0] * w0 + normals[1] * w1 + normals[2] * w2;
                        shade_sample(&pass, &local, &normal, RenderType::PhongShade)
                    });
                }
            }
        }
    }

    fn project_triangle(&self, mvp: &Matrix4<f32>, corners: &[Point3<f32>]) -> Option<[ScreenPoint; 3]> {
        let project = |p: &Point3<f32>| Camera::project_with(mvp, p, self.width as u32, self.height as u32);
        Some([project(&corners[0])?, project(&corners[1])?, project(&corners[2])?])
    }

    fn fill_triangle(&mut self, coords: &[ScreenPoint; 3], mut shade: impl FnMut((f32, f32, f32)) -> (char, Color)) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    let (character, color) = shade((w0, w1, w2));
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    fn draw_outline(&mut self, coords: &[ScreenPoint; 3], character: char, color: Color) {
        for (a, b) in [(0, 1), (1, 2), (2, 0)] {
            self.draw_line(coords[a], coords[b], character, color);
        }
    }

    /// DDA line with interpolated depth
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, character: char, color: Color) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;

        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = (from.0 + dx * t).floor();
            let y = (from.1 + dy * t).floor();
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }

            let depth = from.2 + (to.2 - from.2) * t - EDGE_DEPTH_BIAS;
            let idx = y as usize * self.width + x as usize;
            if depth < self.depth_buffer[idx] {
                self.depth_buffer[idx] = depth;
                self.char_buffer[idx] = character;
                self.color_buffer[idx] = color;
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// One shade for the whole face, lit at its centroid
fn flat_shade(pass: &MeshPass, index: usize, corners: &[Point3<f32>]) -> (char, Color) {
    let centroid = Point3::from((corners[0].coords + corners[1].coords + corners[2].coords) / 3.0);
    let normal = pass.mesh.face_normals()[index * 3];
    shade_sample(pass, &centroid, &normal, pass.mesh.render_type())
}

/// Light one object-space sample and turn it into a character and colour
fn shade_sample(
    pass: &MeshPass,
    local: &Point3<f32>,
    normal: &Vector3<f32>,
    render_type: RenderType,
) -> (char, Color) {
    let position = pass.mesh.model().transform_point(local);
    let normal = pass.normals * normal;
    let intensity = pass
        .light
        .shade(render_type, &position, &normal, &pass.eye, &Vector3::repeat(1.0))
        .x;

    let ramp_index = (intensity.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
    // Keep lit faces visible even when only ambient light reaches them
    let character = LUMINOSITY_RAMP[ramp_index.max(1)];
    (character, to_terminal_color(&(pass.color * intensity)))
}

fn to_terminal_color(color: &Vector3<f32>) -> Color {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::Rgb {
        r: channel(color.x),
        g: channel(color.y),
        b: channel(color.z),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
