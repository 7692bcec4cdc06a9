//! Customizable keybindings for the viewer.

use serde::{Deserialize, Serialize};

use crate::event::KeyCode;
use crate::modes::ModeKind;

/// What a bound key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Reset the camera so the pair fills the viewport.
    FitToView,
    SelectMode(ModeKind),
    /// Show the difference view while the key is held.
    PreviewDiff,
}

impl KeyAction {
    pub fn description(&self) -> String {
        match self {
            KeyAction::FitToView => "fit to view".to_string(),
            KeyAction::SelectMode(kind) => format!("{} mode", kind),
            KeyAction::PreviewDiff => "hold for diff".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub fit: KeyCode,
    pub mode_two_up: KeyCode,
    pub mode_slide: KeyCode,
    pub mode_overlay: KeyCode,
    pub mode_diff: KeyCode,
    pub preview_diff: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            fit: KeyCode::F,
            mode_two_up: KeyCode::Key1,
            mode_slide: KeyCode::Key2,
            mode_overlay: KeyCode::Key3,
            mode_diff: KeyCode::Key4,
            preview_diff: KeyCode::D,
        }
    }
}

impl KeyBindings {
    pub fn key_for_mode(&self, kind: ModeKind) -> KeyCode {
        match kind {
            ModeKind::TwoUp => self.mode_two_up,
            ModeKind::Slide => self.mode_slide,
            ModeKind::Overlay => self.mode_overlay,
            ModeKind::Diff => self.mode_diff,
        }
    }

    /// All bindings in display order.
    pub fn entries(&self) -> Vec<(KeyCode, KeyAction)> {
        let mut entries = vec![(self.fit, KeyAction::FitToView)];
        entries.extend(
            ModeKind::ALL
                .iter()
                .map(|&kind| (self.key_for_mode(kind), KeyAction::SelectMode(kind))),
        );
        entries.push((self.preview_diff, KeyAction::PreviewDiff));
        entries
    }

    /// The action bound to `key`. If a key is bound twice the first entry wins.
    pub fn action_for_key(&self, key: KeyCode) -> Option<KeyAction> {
        self.entries()
            .into_iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, action)| action)
    }

    /// Describe the first other action already using `key`, if any.
    pub fn key_conflict(&self, key: KeyCode, exclude: Option<KeyAction>) -> Option<String> {
        self.entries()
            .into_iter()
            .find(|(bound, action)| *bound == key && Some(*action) != exclude)
            .map(|(_, action)| action.description())
    }

    /// One-line summary such as `F: fit to view, 1: two-up mode, ...`.
    pub fn help_line(&self) -> String {
        self.entries()
            .iter()
            .map(|(key, action)| format!("{}: {}", key.label(), action.description()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
