/// offview terminal viewer
///
/// Loads OFF meshes (or a unit cube) and shows them in the terminal.
/// Controls:
///   - Left click: select the mesh under the cursor
///   - A/D, W/S, Q/Z: move the selection along x, z, y
///   - E/R, F/G, C/V: rotate the selection about z, x, y
///   - P/L: grow / shrink the selection, M: cycle its render style
///   - Arrows, ] and /: move the camera, Tab: toggle projection
///   - 1: add a unit cube, Esc: quit
use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use crossterm::terminal;
use offview_core::{Command, MeshSource, Scene, ViewerConfig, ViewerResult};
use offview_terminal::TerminalApp;

#[derive(Parser)]
#[command(name = "offview")]
#[command(version, about = "Interactive terminal viewer for OFF triangle meshes")]
struct Cli {
    /// OFF files to load at startup.
    meshes: Vec<PathBuf>,

    /// Initial projection.
    #[arg(short, long, value_enum, default_value_t = ProjectionArg::Perspective)]
    projection: ProjectionArg,

    /// Field of view in degrees (90 for perspective, 140 for orthographic by default).
    #[arg(long)]
    fov: Option<f32>,

    /// Start with an empty scene instead of a unit cube when no meshes are given.
    #[arg(long)]
    no_cube: bool,

    /// Write log output to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProjectionArg {
    Perspective,
    Orthographic,
}

impl Cli {
    fn config(&self) -> ViewerConfig {
        let mut config = match self.projection {
            ProjectionArg::Perspective => ViewerConfig::default(),
            ProjectionArg::Orthographic => ViewerConfig::orthographic(),
        };
        if let Some(degrees) = self.fov {
            config.fov = degrees.to_radians();
        }
        config
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_ref()).and_then(|()| run(cli)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> ViewerResult<()> {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(path) = log_file {
        builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
    }
    builder.init();
    Ok(())
}

fn run(cli: Cli) -> ViewerResult<()> {
    let config = cli.config();
    let color = config.mesh_color;
    let render_type = config.render_type;
    log::debug!("starting in {:?} projection", config.projection);

    let (width, height) = terminal::size()?;
    let mut scene = Scene::new(config, width as u32, height as u32);
    for path in cli.meshes {
        scene.apply(Command::LoadMesh {
            source: MeshSource::Path(path),
            color,
            render_type,
        })?;
    }
    if scene.world().mesh_count() == 0 && !cli.no_cube {
        scene.apply(Command::AddCube)?;
    }

    TerminalApp::new(scene).run()
}
