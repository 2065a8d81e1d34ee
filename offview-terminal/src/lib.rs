/// Terminal front end: crossterm event loop over an offview scene
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use log::debug;
use offview_core::{Command, Outcome, ProjectionMode, Scene, ViewerResult};
use std::io::{stdout, Write};
use std::time::{Duration, Instant};

pub mod input;
pub mod renderer;

pub use input::{map_event, Input};
pub use renderer::AsciiRenderer;

/// Main application struct for terminal rendering
pub struct TerminalApp {
    scene: Scene,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// The renderer is sized to the scene's viewport
    pub fn new(scene: Scene) -> Self {
        let (width, height) = scene.viewport();
        Self {
            scene,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run(&mut self) -> ViewerResult<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, EnableMouseCapture, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        execute!(stdout(), DisableMouseCapture, terminal::LeaveAlternateScreen, cursor::Show)?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> ViewerResult<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(&event)?;
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    /// Apply one terminal event to the scene
    pub fn handle_event(&mut self, event: &event::Event) -> ViewerResult<()> {
        match map_event(event, self.scene.config()) {
            Some(Input::Quit) => self.running = false,
            Some(Input::Command(command)) => self.apply(command)?,
            None => {}
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) -> ViewerResult<()> {
        if let Command::Resize { width, height } = command {
            self.renderer.resize(width as usize, height as usize);
        }
        match self.scene.apply(command)? {
            Outcome::Added(id) => debug!("mesh {} added", id.index()),
            Outcome::Picked(hit) => debug!("selection is now {:?}", hit.map(|hit| hit.mesh)),
            Outcome::Applied | Outcome::Ignored => {}
        }
        Ok(())
    }

    fn render(&mut self) -> ViewerResult<()> {
        self.renderer.clear();
        self.renderer
            .render_world(self.scene.world(), &self.scene.config().light)?;

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let status = self.status_line()?;
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }

    fn status_line(&self) -> ViewerResult<String> {
        let world = self.scene.world();
        let projection = match world.active_camera()?.mode() {
            ProjectionMode::Perspective => "perspective",
            ProjectionMode::Orthographic => "orthographic",
        };
        let selection = match world.selected() {
            Some(id) => format!("mesh {} ({:?})", id.index(), world.mesh(id)?.render_type()),
            None => "none".to_string(),
        };
        Ok(format!(
            "offview | FPS: {:.1} | {} | selected: {} | Click=Select 1=Cube Tab=Projection M=Style Esc=Quit",
            self.fps, projection, selection
        ))
    }
}
