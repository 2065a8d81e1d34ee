//! Discrete edit commands and the scene they act on.
//!
//! Front ends translate their own input events into [`Command`]s and hand
//! them to [`Scene::apply`]. The scene owns the world and the viewport size;
//! nothing here is global.

use std::path::PathBuf;

use log::{debug, warn};
use nalgebra::Vector3;

use crate::config::ViewerConfig;
use crate::error::ViewerResult;
use crate::geometry::{Mesh, RenderType};
use crate::off;
use crate::picking::{self, PickHit};
use crate::transform::Axis;
use crate::world::{MeshId, World};

/// Colour of cubes added with [`Command::AddCube`]
pub const CUBE_COLOR: [f32; 3] = [1.0, 1.0, 0.0];

/// Where a mesh comes from
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    /// OFF file on disk
    Path(PathBuf),
    /// OFF text already in memory
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadMesh {
        source: MeshSource,
        color: Vector3<f32>,
        render_type: RenderType,
    },
    AddCube,
    Translate(Vector3<f32>),
    Rotate(Axis, f32),
    Scale(f32),
    CycleRenderType,
    MoveCamera(Vector3<f32>),
    ToggleProjection,
    Click { x: f32, y: f32 },
    Resize { width: u32, height: u32 },
}

/// What applying a command did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Applied,
    /// A mesh edit arrived with nothing selected
    Ignored,
    Added(MeshId),
    Picked(Option<PickHit>),
}

/// World plus viewport: the whole state a front end drives
#[derive(Debug, Clone)]
pub struct Scene {
    world: World,
    width: u32,
    height: u32,
    config: ViewerConfig,
}

impl Scene {
    /// Empty world with one camera built from `config`
    pub fn new(config: ViewerConfig, width: u32, height: u32) -> Self {
        let mut world = World::new();
        world.add_camera(config.camera(width, height));
        Self {
            world,
            width,
            height,
            config,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Apply one command.
    ///
    /// Mesh edits go to the selected mesh and are ignored without a
    /// selection. Load failures leave the world unchanged.
    pub fn apply(&mut self, command: Command) -> ViewerResult<Outcome> {
        match command {
            Command::LoadMesh {
                source,
                color,
                render_type,
            } => Ok(Outcome::Added(self.load_mesh(source, color, render_type)?)),
            Command::AddCube => Ok(Outcome::Added(self.add_cube())),
            Command::Translate(offset) => Ok(self.edit_selected(|mesh| mesh.translate(&offset))),
            Command::Rotate(axis, radians) => Ok(self.edit_selected(|mesh| mesh.rotate(axis, radians))),
            Command::Scale(factor) => Ok(self.edit_selected(|mesh| mesh.scale(factor))),
            Command::CycleRenderType => Ok(self.edit_selected(|mesh| {
                let next = mesh.render_type().next();
                mesh.set_render_type(next);
            })),
            Command::MoveCamera(delta) => {
                self.world.active_camera_mut()?.translate_by(&delta);
                Ok(Outcome::Applied)
            }
            Command::ToggleProjection => {
                let camera = self.world.active_camera_mut()?;
                camera.toggle_projection();
                debug!("projection is now {:?}", camera.mode());
                Ok(Outcome::Applied)
            }
            Command::Click { x, y } => {
                let hit = picking::pick(&mut self.world, x, y, self.width, self.height)?;
                Ok(Outcome::Picked(hit))
            }
            Command::Resize { width, height } => {
                self.width = width;
                self.height = height;
                self.world
                    .active_camera_mut()?
                    .set_aspect(width as f32 / height.max(1) as f32);
                Ok(Outcome::Applied)
            }
        }
    }

    /// Load an OFF mesh, scale it to a unit cube and add it
    pub fn load_mesh(
        &mut self,
        source: MeshSource,
        color: Vector3<f32>,
        render_type: RenderType,
    ) -> ViewerResult<MeshId> {
        let mut mesh = match source {
            MeshSource::Path(path) => off::load_off(path, color, render_type)?,
            MeshSource::Text(text) => off::mesh_from_off(&text, color, render_type)?,
        };
        mesh.scale_to_unit_cube();
        Ok(self.world.add_mesh(mesh))
    }

    /// Add a yellow, flat-shaded unit cube at the origin
    pub fn add_cube(&mut self) -> MeshId {
        let mut cube = Mesh::cube(1.0);
        cube.set_color(Vector3::from(CUBE_COLOR));
        cube.set_render_type(RenderType::FlatShade);
        self.world.add_mesh(cube)
    }

    fn edit_selected(&mut self, edit: impl FnOnce(&mut Mesh)) -> Outcome {
        match self.world.selected_mesh_mut() {
            Some(mesh) => {
                edit(mesh);
                Outcome::Applied
            }
            None => {
                warn!("mesh edit ignored: nothing is selected");
                Outcome::Ignored
            }
        }
    }
}
