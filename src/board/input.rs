//! Per-tick input snapshot, decoupled from any binding system.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::math::{normalize_or, project_on_plane};

/// Edge/level state of a digital button for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    #[default]
    Up,
    Pressed,
    Held,
    Released,
}

impl ButtonState {
    /// Derives the state from the button level on the previous and current tick.
    pub fn from_levels(was_down: bool, is_down: bool) -> Self {
        match (was_down, is_down) {
            (false, true) => ButtonState::Pressed,
            (true, true) => ButtonState::Held,
            (true, false) => ButtonState::Released,
            (false, false) => ButtonState::Up,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Held)
    }

    pub fn pressed(self) -> bool {
        self == ButtonState::Pressed
    }
}

/// Tracks the previous level so callers can feed raw button levels.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonTracker {
    was_down: bool,
}

impl ButtonTracker {
    pub fn update(&mut self, is_down: bool) -> ButtonState {
        let state = ButtonState::from_levels(self.was_down, is_down);
        self.was_down = is_down;
        state
    }

    pub fn reset(&mut self) {
        self.was_down = false;
    }
}

/// Frame the lean stick is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StickFrame {
    /// Stick x is board-right, stick y is board-forward.
    #[default]
    Board,
    /// Stick axes follow a camera; they are flattened onto the board's up-plane first.
    Camera {
        forward: Vector3<f32>,
        right: Vector3<f32>,
    },
}

/// Everything the board reads from its player in one tick. Axes are in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoardInput {
    /// Lean stick: x right, y forward.
    pub lean: [f32; 2],
    pub turn: f32,
    pub accelerate: bool,
    pub jump: ButtonState,
    pub flip_over: ButtonState,
    /// External wipeout trigger.
    pub wipeout: bool,
    pub frame: StickFrame,
}

impl BoardInput {
    /// Copy with every axis clamped into [-1, 1]; NaN reads as centred.
    pub fn sanitized(mut self) -> Self {
        self.lean = [clamp_axis(self.lean[0]), clamp_axis(self.lean[1])];
        self.turn = clamp_axis(self.turn);
        self
    }

    /// Lean stick re-expressed as `(roll, pitch)` about board-right/board-forward.
    pub fn board_lean(
        &self,
        board_up: &Vector3<f32>,
        board_forward: &Vector3<f32>,
        board_right: &Vector3<f32>,
    ) -> (f32, f32) {
        let [x, y] = self.lean;
        match self.frame {
            StickFrame::Board => (x, y),
            StickFrame::Camera { forward, right } => {
                let lean_forward = normalize_or(&project_on_plane(&forward, board_up), *board_forward);
                let lean_right = normalize_or(&project_on_plane(&right, board_up), *board_right);
                let world = lean_right * x + lean_forward * y;
                (world.dot(board_right), world.dot(board_forward))
            }
        }
    }
}

fn clamp_axis(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}
