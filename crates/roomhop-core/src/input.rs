use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Logical actions the movement controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Jump,
    Dash,
}

/// Keyboard state, updated from host key events each frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    pub keys_down: HashSet<String>,
    /// Keys pressed this frame (cleared each frame).
    pub keys_just_pressed: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a key down event. Auto-repeat does not re-trigger "just pressed".
    pub fn on_key_down(&mut self, code: impl Into<String>) {
        let code = code.into();
        if self.keys_down.insert(code.clone()) {
            self.keys_just_pressed.insert(code);
        }
    }

    pub fn on_key_up(&mut self, code: impl Into<String>) {
        let code = code.into();
        self.keys_down.remove(&code);
    }

    pub fn is_key_down(&self, code: &str) -> bool {
        self.keys_down.contains(code)
    }

    pub fn is_key_just_pressed(&self, code: &str) -> bool {
        self.keys_just_pressed.contains(code)
    }

    /// Clear per-frame state. Call at the end of each frame.
    pub fn end_frame(&mut self) {
        self.keys_just_pressed.clear();
    }
}

/// Physical key codes bound to each logical action. Any bound key counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub jump: Vec<String>,
    pub dash: Vec<String>,
}

impl Default for InputBindings {
    fn default() -> Self {
        fn keys(codes: &[&str]) -> Vec<String> {
            codes.iter().map(|c| c.to_string()).collect()
        }
        Self {
            left: keys(&["ArrowLeft", "KeyA"]),
            right: keys(&["ArrowRight", "KeyD"]),
            up: keys(&["ArrowUp", "KeyW"]),
            down: keys(&["ArrowDown", "KeyS"]),
            // Z/Space on keyboards, U/J on arcade panels.
            jump: keys(&["KeyZ", "Space", "KeyU", "KeyJ"]),
            dash: keys(&["KeyX", "ShiftLeft", "KeyI", "KeyK"]),
        }
    }
}

impl InputBindings {
    pub fn keys_for(&self, action: Action) -> &[String] {
        match action {
            Action::Left => &self.left,
            Action::Right => &self.right,
            Action::Up => &self.up,
            Action::Down => &self.down,
            Action::Jump => &self.jump,
            Action::Dash => &self.dash,
        }
    }

    pub fn is_held(&self, state: &InputState, action: Action) -> bool {
        self.keys_for(action).iter().any(|k| state.is_key_down(k))
    }

    pub fn is_just_pressed(&self, state: &InputState, action: Action) -> bool {
        self.keys_for(action)
            .iter()
            .any(|k| state.is_key_just_pressed(k))
    }

    /// Collapse the raw key state into one tick's worth of logical actions.
    pub fn snapshot(&self, state: &InputState) -> ActionSnapshot {
        ActionSnapshot {
            left: self.is_held(state, Action::Left),
            right: self.is_held(state, Action::Right),
            up: self.is_held(state, Action::Up),
            down: self.is_held(state, Action::Down),
            jump_held: self.is_held(state, Action::Jump),
            jump_pressed: self.is_just_pressed(state, Action::Jump),
            dash_pressed: self.is_just_pressed(state, Action::Dash),
        }
    }
}

/// Logical input for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump_held: bool,
    /// Edge-triggered: true only on the tick the button went down.
    pub jump_pressed: bool,
    /// Edge-triggered: true only on the tick the button went down.
    pub dash_pressed: bool,
}

impl ActionSnapshot {
    /// Mark `action` as held for this tick.
    pub fn holding(mut self, action: Action) -> Self {
        match action {
            Action::Left => self.left = true,
            Action::Right => self.right = true,
            Action::Up => self.up = true,
            Action::Down => self.down = true,
            Action::Jump => self.jump_held = true,
            Action::Dash => {},
        }
        self
    }

    /// Mark `action` as pressed this tick (and held, where that applies).
    pub fn pressing(self, action: Action) -> Self {
        let mut s = self.holding(action);
        match action {
            Action::Jump => s.jump_pressed = true,
            Action::Dash => s.dash_pressed = true,
            _ => {},
        }
        s
    }

    /// Directional axis as (x, y) in {-1, 0, 1}, y pointing down.
    ///
    /// Left beats right and up beats down when both are held.
    pub fn axis(&self) -> (f32, f32) {
        let x = if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        };
        let y = if self.up {
            -1.0
        } else if self.down {
            1.0
        } else {
            0.0
        };
        (x, y)
    }
}
