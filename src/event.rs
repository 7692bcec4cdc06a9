//! Host-agnostic input events.
//!
//! The native host translates winit events into these; positions are in
//! viewport pixels with the origin at the top-left corner.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { button: MouseButton, position: Point },
    PointerMove { position: Point },
    PointerUp { button: MouseButton, position: Point },
    /// The pointer left the viewport.
    PointerLeave,
    /// Positive `delta` zooms out, negative zooms in (pixel units).
    Wheel { delta: f32, position: Point },
    KeyDown { key: KeyCode, repeat: bool },
    KeyUp { key: KeyCode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Keys the viewer can bind to actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Space,
    Tab,
    Enter,
    Escape,
}

impl KeyCode {
    /// Display string, e.g. for the startup help line.
    pub fn label(self) -> &'static str {
        match self {
            KeyCode::A => "A",
            KeyCode::B => "B",
            KeyCode::C => "C",
            KeyCode::D => "D",
            KeyCode::E => "E",
            KeyCode::F => "F",
            KeyCode::G => "G",
            KeyCode::H => "H",
            KeyCode::I => "I",
            KeyCode::J => "J",
            KeyCode::K => "K",
            KeyCode::L => "L",
            KeyCode::M => "M",
            KeyCode::N => "N",
            KeyCode::O => "O",
            KeyCode::P => "P",
            KeyCode::Q => "Q",
            KeyCode::R => "R",
            KeyCode::S => "S",
            KeyCode::T => "T",
            KeyCode::U => "U",
            KeyCode::V => "V",
            KeyCode::W => "W",
            KeyCode::X => "X",
            KeyCode::Y => "Y",
            KeyCode::Z => "Z",
            KeyCode::Key0 => "0",
            KeyCode::Key1 => "1",
            KeyCode::Key2 => "2",
            KeyCode::Key3 => "3",
            KeyCode::Key4 => "4",
            KeyCode::Key5 => "5",
            KeyCode::Key6 => "6",
            KeyCode::Key7 => "7",
            KeyCode::Key8 => "8",
            KeyCode::Key9 => "9",
            KeyCode::Space => "Space",
            KeyCode::Tab => "Tab",
            KeyCode::Enter => "Enter",
            KeyCode::Escape => "Esc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_serializes_by_name() {
        assert_eq!(serde_json::to_string(&KeyCode::Key3).unwrap(), "\"Key3\"");
        let key: KeyCode = serde_json::from_str("\"F\"").unwrap();
        assert_eq!(key, KeyCode::F);
    }

    #[test]
    fn test_labels() {
        assert_eq!(KeyCode::Key0.label(), "0");
        assert_eq!(KeyCode::Escape.label(), "Esc");
    }
}
