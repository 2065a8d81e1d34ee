/// offview web bindings
///
/// Exposes a scene to JavaScript through wasm-bindgen. The page owns the
/// canvas and the GL context; this crate hands it matrices and flat vertex
/// buffers and turns clicks and key presses into scene commands.
use std::fmt;

use log::LevelFilter;
use nalgebra::{Point3, Vector3};
use offview_core::lighting::SELECTION_COLOR;
use offview_core::{
    Axis, Command, Mesh, MeshId, MeshSource, RenderType, Scene, ViewerConfig, ViewerResult,
};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn initialize() {
    #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))]
    console_error_panic_hook::set_once();
    init_logger(LevelFilter::Info);
}

/// Route `log` records to the browser console; later calls are no-ops
#[cfg(target_arch = "wasm32")]
fn init_logger(level: LevelFilter) {
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logger(_level: LevelFilter) {}

/// A scene driven from the page
#[wasm_bindgen]
pub struct WebViewer {
    scene: Scene,
}

#[wasm_bindgen]
impl WebViewer {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> WebViewer {
        WebViewer {
            scene: Scene::new(ViewerConfig::default(), width, height),
        }
    }

    /// Parse OFF text and add it as a unit-sized mesh; returns its id
    pub fn load_off(&mut self, text: &str) -> Result<u32, JsValue> {
        let config = self.scene.config();
        let (color, render_type) = (config.mesh_color, config.render_type);
        let id = self
            .scene
            .load_mesh(MeshSource::Text(text.to_string()), color, render_type)
            .map_err(to_js_error)?;
        Ok(id.index() as u32)
    }

    pub fn add_cube(&mut self) -> u32 {
        self.scene.add_cube().index() as u32
    }

    /// Pick at a device-pixel position; returns the selected id or -1
    pub fn click(&mut self, x: f32, y: f32) -> Result<i32, JsValue> {
        self.apply(Command::Click { x, y }).map_err(to_js_error)?;
        Ok(self.selected())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.apply(Command::Resize { width, height }).map_err(to_js_error)
    }

    /// Handle a `KeyboardEvent.key` value; returns whether it was bound
    pub fn key(&mut self, key: &str) -> Result<bool, JsValue> {
        match key_command(key, self.scene.config()) {
            Some(command) => {
                self.apply(command).map_err(to_js_error)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn selected(&self) -> i32 {
        self.scene
            .world()
            .selected()
            .map_or(-1, |id| id.index() as i32)
    }

    pub fn mesh_ids(&self) -> Vec<u32> {
        self.scene
            .world()
            .meshes()
            .map(|(id, _)| id.index() as u32)
            .collect()
    }

    /// Active camera view matrix, column-major
    pub fn view_matrix(&self) -> Result<Vec<f32>, JsValue> {
        let camera = self.scene.world().active_camera().map_err(to_js_error)?;
        Ok(camera.view_matrix().as_slice().to_vec())
    }

    /// Active camera projection matrix, column-major
    pub fn projection_matrix(&self) -> Result<Vec<f32>, JsValue> {
        let camera = self.scene.world().active_camera().map_err(to_js_error)?;
        Ok(camera.projection_matrix().as_slice().to_vec())
    }

    pub fn eye(&self) -> Result<Vec<f32>, JsValue> {
        let camera = self.scene.world().active_camera().map_err(to_js_error)?;
        Ok(flatten_points(&[camera.eye()]))
    }

    pub fn light_position(&self) -> Vec<f32> {
        flatten_points(&[self.scene.config().light.position])
    }

    /// Three corners per triangle, xyz each
    pub fn mesh_positions(&self, id: u32) -> Result<Vec<f32>, JsValue> {
        let mesh = self.mesh(id).map_err(to_js_error)?;
        Ok(flatten_points(mesh.triangle_vertices()))
    }

    pub fn mesh_face_normals(&self, id: u32) -> Result<Vec<f32>, JsValue> {
        let mesh = self.mesh(id).map_err(to_js_error)?;
        Ok(flatten_vectors(mesh.face_normals()))
    }

    pub fn mesh_vertex_normals(&self, id: u32) -> Result<Vec<f32>, JsValue> {
        let mesh = self.mesh(id).map_err(to_js_error)?;
        Ok(flatten_vectors(mesh.vertex_normals()))
    }

    /// Model matrix, column-major
    pub fn mesh_model(&self, id: u32) -> Result<Vec<f32>, JsValue> {
        let mesh = self.mesh(id).map_err(to_js_error)?;
        Ok(mesh.model().as_slice().to_vec())
    }

    /// Draw colour; the selected mesh is drawn in the selection colour
    pub fn mesh_color(&self, id: u32) -> Result<Vec<f32>, JsValue> {
        self.draw_color(id).map_err(to_js_error)
    }

    /// 0 wireframe, 1 flat, 2 Phong
    pub fn mesh_render_type(&self, id: u32) -> Result<u8, JsValue> {
        let mesh = self.mesh(id).map_err(to_js_error)?;
        Ok(render_type_code(mesh.render_type()))
    }
}

impl WebViewer {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn apply(&mut self, command: Command) -> ViewerResult<()> {
        self.scene.apply(command).map(|_| ())
    }

    fn mesh(&self, id: u32) -> ViewerResult<&Mesh> {
        self.scene.world().mesh(MeshId(id as usize))
    }

    fn draw_color(&self, id: u32) -> ViewerResult<Vec<f32>> {
        let mesh = self.mesh(id)?;
        let color = if self.scene.world().selected() == Some(MeshId(id as usize)) {
            Vector3::from(SELECTION_COLOR)
        } else {
            mesh.color()
        };
        Ok(color.as_slice().to_vec())
    }
}

/// Same bindings as the terminal front end, keyed by `KeyboardEvent.key`
fn key_command(key: &str, config: &ViewerConfig) -> Option<Command> {
    let step = config.translate_step;
    let turn = config.rotate_step;
    let camera = config.camera_step;
    let depth = config.camera_depth_step;

    let command = match key {
        "ArrowUp" => Command::MoveCamera(Vector3::new(0.0, camera, 0.0)),
        "ArrowDown" => Command::MoveCamera(Vector3::new(0.0, -camera, 0.0)),
        "ArrowLeft" => Command::MoveCamera(Vector3::new(-camera, 0.0, 0.0)),
        "ArrowRight" => Command::MoveCamera(Vector3::new(camera, 0.0, 0.0)),
        "]" => Command::MoveCamera(Vector3::new(0.0, 0.0, -depth)),
        "/" => Command::MoveCamera(Vector3::new(0.0, 0.0, depth)),
        "Tab" => Command::ToggleProjection,
        "1" => Command::AddCube,
        other => match other.to_ascii_lowercase().as_str() {
            "a" => Command::Translate(Vector3::new(-step, 0.0, 0.0)),
            "d" => Command::Translate(Vector3::new(step, 0.0, 0.0)),
            "w" => Command::Translate(Vector3::new(0.0, 0.0, -step)),
            "s" => Command::Translate(Vector3::new(0.0, 0.0, step)),
            "q" => Command::Translate(Vector3::new(0.0, step, 0.0)),
            "z" => Command::Translate(Vector3::new(0.0, -step, 0.0)),
            "e" => Command::Rotate(Axis::Z, -turn),
            "r" => Command::Rotate(Axis::Z, turn),
            "f" => Command::Rotate(Axis::X, -turn),
            "g" => Command::Rotate(Axis::X, turn),
            "c" => Command::Rotate(Axis::Y, -turn),
            "v" => Command::Rotate(Axis::Y, turn),
            "p" => Command::Scale(config.scale_step),
            "l" => Command::Scale(1.0 / config.scale_step),
            "m" => Command::CycleRenderType,
            _ => return None,
        },
    };
    Some(command)
}

fn render_type_code(render_type: RenderType) -> u8 {
    match render_type {
        RenderType::Wireframe => 0,
        RenderType::FlatShade => 1,
        RenderType::PhongShade => 2,
    }
}

fn flatten_points(points: &[Point3<f32>]) -> Vec<f32> {
    points.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
}

fn flatten_vectors(vectors: &[Vector3<f32>]) -> Vec<f32> {
    vectors.iter().flat_map(|v| [v.x, v.y, v.z]).collect()
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "OFF\n3 1 0\n0 0 0\n2 0 0\n0 2 0\n3 0 1 2\n";

    #[test]
    fn test_load_exposes_flat_buffers() {
        let mut viewer = WebViewer::new(100, 100);
        let id = viewer.load_off(TRIANGLE).unwrap();
        assert_eq!(viewer.mesh_ids(), vec![id]);
        assert_eq!(viewer.mesh_positions(id).unwrap().len(), 9);
        assert_eq!(viewer.mesh_face_normals(id).unwrap()[2], 1.0);
        assert_eq!(viewer.mesh_vertex_normals(id).unwrap().len(), 9);
        assert_eq!(viewer.mesh_model(id).unwrap().len(), 16);
        assert_eq!(viewer.mesh_render_type(id).unwrap(), 0);
    }

    #[test]
    fn test_bad_mesh_is_reported_without_adding() {
        let mut viewer = WebViewer::new(100, 100);
        let result = viewer.scene.load_mesh(
            MeshSource::Text("OFF\n3 1 0\n".to_string()),
            Vector3::zeros(),
            RenderType::Wireframe,
        );
        assert!(result.is_err());
        assert!(viewer.mesh_ids().is_empty());
    }

    #[test]
    fn test_click_selects_and_recolours() {
        let mut viewer = WebViewer::new(100, 100);
        let id = viewer.add_cube();
        assert_eq!(viewer.draw_color(id).unwrap(), vec![1.0, 1.0, 0.0]);

        assert_eq!(viewer.click(50.0, 49.0).unwrap(), id as i32);
        assert_eq!(viewer.draw_color(id).unwrap(), SELECTION_COLOR.to_vec());

        assert_eq!(viewer.click(0.0, 0.0).unwrap(), -1);
    }

    #[test]
    fn test_keys_edit_the_selection() {
        let mut viewer = WebViewer::new(100, 100);
        let id = viewer.add_cube();
        viewer.click(50.0, 49.0).unwrap();

        assert!(viewer.key("D").unwrap());
        assert!(viewer.key("m").unwrap());
        assert!(!viewer.key("x").unwrap());

        let mesh = viewer.mesh(id).unwrap();
        assert!((mesh.translation().x - 0.1).abs() < 1e-6);
        assert_eq!(mesh.render_type(), RenderType::PhongShade);
    }

    #[test]
    fn test_matrices_are_column_major() {
        let viewer = WebViewer::new(100, 100);
        let view = viewer.view_matrix().unwrap();
        // Translation by -eye lives in the last column
        assert!((view[14] + 3.0).abs() < 1e-6);
        let projection = viewer.projection_matrix().unwrap();
        assert_eq!(projection[11], -1.0);
        assert_eq!(viewer.eye().unwrap(), vec![0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_initialize_twice_is_harmless() {
        initialize();
        initialize();
        assert_eq!(WebViewer::new(10, 10).selected(), -1);
    }

    #[test]
    fn test_unknown_mesh_is_an_error() {
        let viewer = WebViewer::new(10, 10);
        assert!(viewer.mesh(7).is_err());
        assert!(viewer.draw_color(7).is_err());
    }
}
