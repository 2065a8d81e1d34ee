/// Translation of terminal events into scene commands
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use nalgebra::Vector3;
use offview_core::{Axis, Command, ViewerConfig};

/// What an input event asks the application to do
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Quit,
}

/// Map one terminal event, or `None` when it is not bound
pub fn map_event(event: &Event, config: &ViewerConfig) -> Option<Input> {
    match event {
        Event::Key(key) => map_key(key, config),
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(Input::Command(Command::Click {
            x: *column as f32,
            y: *row as f32,
        })),
        Event::Resize(width, height) => Some(Input::Command(Command::Resize {
            width: *width as u32,
            height: *height as u32,
        })),
        _ => None,
    }
}

fn map_key(key: &KeyEvent, config: &ViewerConfig) -> Option<Input> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::Quit);
    }

    let step = config.translate_step;
    let turn = config.rotate_step;
    let camera = config.camera_step;
    let depth = config.camera_depth_step;

    let command = match key.code {
        KeyCode::Esc => return Some(Input::Quit),
        KeyCode::Up => Command::MoveCamera(Vector3::new(0.0, camera, 0.0)),
        KeyCode::Down => Command::MoveCamera(Vector3::new(0.0, -camera, 0.0)),
        KeyCode::Left => Command::MoveCamera(Vector3::new(-camera, 0.0, 0.0)),
        KeyCode::Right => Command::MoveCamera(Vector3::new(camera, 0.0, 0.0)),
        KeyCode::Tab => Command::ToggleProjection,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'a' => Command::Translate(Vector3::new(-step, 0.0, 0.0)),
            'd' => Command::Translate(Vector3::new(step, 0.0, 0.0)),
            'w' => Command::Translate(Vector3::new(0.0, 0.0, -step)),
            's' => Command::Translate(Vector3::new(0.0, 0.0, step)),
            'q' => Command::Translate(Vector3::new(0.0, step, 0.0)),
            'z' => Command::Translate(Vector3::new(0.0, -step, 0.0)),
            'e' => Command::Rotate(Axis::Z, -turn),
            'r' => Command::Rotate(Axis::Z, turn),
            'f' => Command::Rotate(Axis::X, -turn),
            'g' => Command::Rotate(Axis::X, turn),
            'c' => Command::Rotate(Axis::Y, -turn),
            'v' => Command::Rotate(Axis::Y, turn),
            'p' => Command::Scale(config.scale_step),
            'l' => Command::Scale(1.0 / config.scale_step),
            'm' => Command::CycleRenderType,
            ']' => Command::MoveCamera(Vector3::new(0.0, 0.0, -depth)),
            '/' => Command::MoveCamera(Vector3::new(0.0, 0.0, depth)),
            '1' => Command::AddCube,
            _ => return None,
        },
        _ => return None,
    };
    Some(Input::Command(command))
}
