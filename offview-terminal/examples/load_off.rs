/// Example: load an OFF file, click the centre of the view and print one frame
///
/// Usage: cargo run --example load_off -- path/to/mesh.off

use std::env;
use std::io::{stdout, Write};
use std::path::PathBuf;

use offview_core::{Command, MeshSource, Outcome, Scene, ViewerConfig, ViewerResult};
use offview_terminal::AsciiRenderer;

const WIDTH: u32 = 80;
const HEIGHT: u32 = 40;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> ViewerResult<()> {
    let config = ViewerConfig::default();
    let color = config.mesh_color;
    let render_type = config.render_type;
    let mut scene = Scene::new(config, WIDTH, HEIGHT);

    match env::args().nth(1) {
        Some(path) => {
            scene.apply(Command::LoadMesh {
                source: MeshSource::Path(PathBuf::from(path)),
                color,
                render_type,
            })?;
        }
        None => {
            eprintln!("No OFF file provided, using default cube...");
            scene.apply(Command::AddCube)?;
        }
    }

    let click = Command::Click {
        x: WIDTH as f32 / 2.0,
        y: HEIGHT as f32 / 2.0 - 1.0,
    };
    if let Outcome::Picked(hit) = scene.apply(click)? {
        log::info!("centre click: {:?}", hit);
    }

    let mut renderer = AsciiRenderer::new(WIDTH as usize, HEIGHT as usize);
    renderer.render_world(scene.world(), &scene.config().light)?;

    let mut out = stdout();
    renderer.draw(&mut out)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
