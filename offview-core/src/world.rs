//! Scene storage.
//!
//! The world owns every mesh and camera and hands out stable integer handles.
//! Removing an entry leaves an empty slot behind, so other handles never
//! shift and a stale handle is reported instead of aliasing a new entry.

use log::debug;

use crate::error::{ViewerError, ViewerResult};
use crate::geometry::Mesh;
use crate::projection::Camera;

/// Handle to a mesh stored in a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Handle to a camera stored in a [`World`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub usize);

impl MeshId {
    /// Returns the raw slot index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl CameraId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Meshes, cameras, the active camera and the current selection
#[derive(Debug, Clone, Default)]
pub struct World {
    meshes: Vec<Option<Mesh>>,
    cameras: Vec<Option<Camera>>,
    active_camera: Option<CameraId>,
    selected: Option<MeshId>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.len());
        debug!("adding mesh {} ({} triangles)", id.0, mesh.triangle_count());
        self.meshes.push(Some(mesh));
        id
    }

    pub fn mesh(&self, id: MeshId) -> ViewerResult<&Mesh> {
        self.meshes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(ViewerError::UnknownMesh(id.0))
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> ViewerResult<&mut Mesh> {
        self.meshes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ViewerError::UnknownMesh(id.0))
    }

    /// Take a mesh out of the world, clearing the selection if it pointed there
    pub fn remove_mesh(&mut self, id: MeshId) -> ViewerResult<Mesh> {
        let mesh = self
            .meshes
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(ViewerError::UnknownMesh(id.0))?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Ok(mesh)
    }

    /// Live meshes in insertion order
    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> + '_ {
        self.meshes
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|mesh| (MeshId(i), mesh)))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.iter().flatten().count()
    }

    /// Store a camera; the first camera added becomes the active one
    pub fn add_camera(&mut self, camera: Camera) -> CameraId {
        let id = CameraId(self.cameras.len());
        self.cameras.push(Some(camera));
        if self.active_camera.is_none() {
            self.active_camera = Some(id);
        }
        id
    }

    pub fn camera(&self, id: CameraId) -> ViewerResult<&Camera> {
        self.cameras
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(ViewerError::UnknownCamera(id.0))
    }

    pub fn camera_mut(&mut self, id: CameraId) -> ViewerResult<&mut Camera> {
        self.cameras
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ViewerError::UnknownCamera(id.0))
    }

    /// Take a camera out of the world.
    ///
    /// If it was active, the first remaining camera takes over.
    pub fn remove_camera(&mut self, id: CameraId) -> ViewerResult<Camera> {
        let camera = self
            .cameras
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(ViewerError::UnknownCamera(id.0))?;
        if self.active_camera == Some(id) {
            let next = self.cameras().next().map(|(id, _)| id);
            self.active_camera = next;
        }
        Ok(camera)
    }

    /// Live cameras in insertion order
    pub fn cameras(&self) -> impl Iterator<Item = (CameraId, &Camera)> + '_ {
        self.cameras
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|camera| (CameraId(i), camera)))
    }

    pub fn set_active_camera(&mut self, id: CameraId) -> ViewerResult<()> {
        self.camera(id)?;
        self.active_camera = Some(id);
        Ok(())
    }

    pub fn active_camera_id(&self) -> Option<CameraId> {
        self.active_camera
    }

    /// The camera the scene is viewed through
    pub fn active_camera(&self) -> ViewerResult<&Camera> {
        let id = self.active_camera.ok_or(ViewerError::NoCamera)?;
        self.camera(id)
    }

    pub fn active_camera_mut(&mut self) -> ViewerResult<&mut Camera> {
        let id = self.active_camera.ok_or(ViewerError::NoCamera)?;
        self.camera_mut(id)
    }

    /// Select a mesh, or clear the selection with `None`
    pub fn select(&mut self, id: Option<MeshId>) -> ViewerResult<()> {
        if let Some(id) = id {
            self.mesh(id)?;
        }
        self.selected = id;
        Ok(())
    }

    pub fn selected(&self) -> Option<MeshId> {
        self.selected
    }

    pub fn selected_mesh_mut(&mut self) -> Option<&mut Mesh> {
        let id = self.selected?;
        self.mesh_mut(id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_sequential() {
        let mut world = World::new();
        let a = world.add_mesh(Mesh::cube(1.0));
        let b = world.add_mesh(Mesh::cube(2.0));
        assert_eq!(a, MeshId(0));
        assert_eq!(b, MeshId(1));
        assert_eq!(world.mesh_count(), 2);
    }

    #[test]
    fn test_removed_handle_stays_invalid() {
        let mut world = World::new();
        let a = world.add_mesh(Mesh::cube(1.0));
        let b = world.add_mesh(Mesh::cube(1.0));
        world.remove_mesh(a).unwrap();

        assert!(matches!(world.mesh(a), Err(ViewerError::UnknownMesh(0))));
        assert!(world.mesh(b).is_ok());
        let c = world.add_mesh(Mesh::cube(1.0));
        assert_eq!(c, MeshId(2));
        assert_eq!(world.meshes().map(|(id, _)| id).collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn test_removing_selected_mesh_clears_selection() {
        let mut world = World::new();
        let a = world.add_mesh(Mesh::cube(1.0));
        world.select(Some(a)).unwrap();
        assert_eq!(world.selected(), Some(a));
        world.remove_mesh(a).unwrap();
        assert_eq!(world.selected(), None);
    }

    #[test]
    fn test_select_rejects_unknown_mesh() {
        let mut world = World::new();
        assert!(world.select(Some(MeshId(3))).is_err());
        assert_eq!(world.selected(), None);
        assert!(world.selected_mesh_mut().is_none());
    }

    #[test]
    fn test_first_camera_is_active() {
        let mut world = World::new();
        assert!(matches!(world.active_camera(), Err(ViewerError::NoCamera)));

        let first = world.add_camera(Camera::default());
        let second = world.add_camera(Camera::for_viewport(100, 100));
        assert_eq!(world.active_camera_id(), Some(first));

        world.set_active_camera(second).unwrap();
        assert!((world.active_camera().unwrap().aspect() - 1.0).abs() < 1e-6);
        assert!(world.set_active_camera(CameraId(9)).is_err());
    }

    #[test]
    fn test_removing_active_camera_falls_back() {
        let mut world = World::new();
        let first = world.add_camera(Camera::default());
        let second = world.add_camera(Camera::default());
        world.remove_camera(first).unwrap();
        assert_eq!(world.active_camera_id(), Some(second));
        world.remove_camera(second).unwrap();
        assert!(matches!(world.active_camera(), Err(ViewerError::NoCamera)));
    }

    #[test]
    fn test_removing_inactive_camera_keeps_active() {
        let mut world = World::new();
        let first = world.add_camera(Camera::default());
        let second = world.add_camera(Camera::default());
        world.remove_camera(second).unwrap();
        assert_eq!(world.active_camera_id(), Some(first));
        assert!(world.remove_camera(second).is_err());
        assert_eq!(world.cameras().count(), 1);
    }

    #[test]
    fn test_selected_mesh_mut_edits_in_place() {
        let mut world = World::new();
        let id = world.add_mesh(Mesh::cube(1.0));
        world.select(Some(id)).unwrap();
        world
            .selected_mesh_mut()
            .unwrap()
            .translate(&nalgebra::Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(world.mesh(id).unwrap().translation().x, 1.0);
    }
}
