//! End-to-end selection through the public API.

use nalgebra::{Point3, Vector3};
use offview_core::{
    pick, Axis, Camera, Command, Mesh, MeshId, MeshSource, Outcome, ProjectionMode, RenderType,
    Scene, ViewerConfig, ViewerError, World,
};

fn unit_cube_world(mode: ProjectionMode) -> World {
    let mut world = World::new();
    let mut cube = Mesh::cube(1.0);
    cube.scale_to_unit_cube();
    world.add_mesh(cube);
    world.add_camera(Camera::new(
        Point3::new(0.0, 0.0, 3.0),
        Point3::origin(),
        mode,
        1.0,
        -0.5,
        -100.0,
        90f32.to_radians(),
    ));
    world
}

#[test]
fn centre_click_selects_and_corner_click_clears() {
    let mut world = unit_cube_world(ProjectionMode::Perspective);
    let (width, height) = (200, 200);

    let hit = pick(&mut world, width as f32 / 2.0, height as f32 / 2.0 - 1.0, width, height)
        .unwrap()
        .expect("centre ray should hit the cube");
    assert_eq!(hit.mesh, MeshId(0));
    assert!((hit.distance - 2.5).abs() < 1e-3);
    assert_eq!(world.selected(), Some(MeshId(0)));

    assert_eq!(pick(&mut world, 0.0, 0.0, width, height).unwrap(), None);
    assert_eq!(world.selected(), None);
}

#[test]
fn orthographic_centre_click_selects() {
    let mut world = unit_cube_world(ProjectionMode::Orthographic);
    let hit = pick(&mut world, 100.0, 99.0, 200, 200).unwrap();
    assert_eq!(hit.map(|hit| hit.mesh), Some(MeshId(0)));
}

#[test]
fn moved_cube_is_only_hit_where_it_went() {
    let mut world = unit_cube_world(ProjectionMode::Perspective);
    world
        .mesh_mut(MeshId(0))
        .unwrap()
        .translate(&Vector3::new(1.5, 0.0, 0.0));

    assert_eq!(pick(&mut world, 100.0, 99.0, 200, 200).unwrap(), None);

    // x = 1.5 at depth 2.5 projects to ndc 0.6, i.e. pixel 160
    let hit = pick(&mut world, 160.0, 99.0, 200, 200).unwrap();
    assert_eq!(hit.map(|hit| hit.mesh), Some(MeshId(0)));
}

#[test]
fn picking_without_camera_reports_it() {
    let mut world = World::new();
    world.add_mesh(Mesh::cube(1.0));
    assert!(matches!(pick(&mut world, 1.0, 1.0, 10, 10), Err(ViewerError::NoCamera)));
}

#[test]
fn scene_session_from_off_file() {
    let path = std::env::temp_dir().join(format!("offview-tetra-{}.off", std::process::id()));
    std::fs::write(
        &path,
        "OFF\n4 4 6\n0 0 0\n1 0 0\n0 1 0\n0 0 1\n3 0 2 1\n3 0 1 3\n3 0 3 2\n3 1 2 3\n",
    )
    .unwrap();

    let mut scene = Scene::new(ViewerConfig::default(), 200, 200);
    let outcome = scene.apply(Command::LoadMesh {
        source: MeshSource::Path(path.clone()),
        color: Vector3::new(0.0, 1.0, 0.0),
        render_type: RenderType::PhongShade,
    });
    std::fs::remove_file(&path).unwrap();

    let Outcome::Added(id) = outcome.unwrap() else {
        panic!("mesh was not added");
    };
    let mesh = scene.world().mesh(id).unwrap();
    assert_eq!(mesh.triangle_count(), 4);
    let (min, max) = mesh.world_bounds().unwrap();
    assert!(((max - min).max() - 1.0).abs() < 1e-5);

    let Outcome::Picked(hit) = scene.apply(Command::Click { x: 100.0, y: 99.0 }).unwrap() else {
        panic!("click did not pick");
    };
    assert_eq!(hit.map(|hit| hit.mesh), Some(id));

    assert_eq!(scene.apply(Command::Rotate(Axis::X, 0.1)).unwrap(), Outcome::Applied);
    assert_eq!(scene.apply(Command::CycleRenderType).unwrap(), Outcome::Applied);
    assert_eq!(scene.world().mesh(id).unwrap().render_type(), RenderType::Wireframe);
}

#[test]
fn missing_file_leaves_scene_empty() {
    let mut scene = Scene::new(ViewerConfig::default(), 10, 10);
    let result = scene.apply(Command::LoadMesh {
        source: MeshSource::Path("/no/such/mesh.off".into()),
        color: Vector3::zeros(),
        render_type: RenderType::Wireframe,
    });
    assert!(matches!(result, Err(ViewerError::Io(_))));
    assert_eq!(scene.world().mesh_count(), 0);
}
