//! Input latch
//!
//! Key events arrive asynchronously; the latch remembers what is held and
//! which one-shot edges happened since the last tick. `sample` hands the tick
//! a frozen `TickInput` and clears the edges.

use serde::{Deserialize, Serialize};

/// Logical actions the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Crouch,
    Jump,
    Confirm,
}

impl Action {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Action::MoveLeft),
            "ArrowRight" => Some(Action::MoveRight),
            "ArrowDown" => Some(Action::Crouch),
            "ArrowUp" => Some(Action::Jump),
            "Enter" | " " => Some(Action::Confirm),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub crouch: bool,
    /// Jump currently held (charging)
    pub jump_held: bool,
    /// Jump was released since the last tick
    pub jump_released: bool,
    /// Confirm was pressed since the last tick
    pub confirm: bool,
    /// Monotonic milliseconds, for cosmetic wobble only
    pub clock_ms: f64,
}

/// Held-key state plus pending edges
#[derive(Debug, Clone, Default)]
pub struct InputLatch {
    held: [bool; 5],
    jump_released: bool,
    confirm_pressed: bool,
}

impl InputLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, action: Action) {
        let was_held = self.held[action.index()];
        self.held[action.index()] = true;
        if action == Action::Confirm && !was_held {
            self.confirm_pressed = true;
        }
    }

    pub fn release(&mut self, action: Action) {
        let was_held = self.held[action.index()];
        self.held[action.index()] = false;
        if action == Action::Jump && was_held {
            self.jump_released = true;
        }
    }

    pub fn is_down(&self, action: Action) -> bool {
        self.held[action.index()]
    }

    /// Drop all held keys and edges (focus loss, reset)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Freeze the current state for one tick and consume the edges
    pub fn sample(&mut self, clock_ms: f64) -> TickInput {
        let input = TickInput {
            left: self.is_down(Action::MoveLeft),
            right: self.is_down(Action::MoveRight),
            crouch: self.is_down(Action::Crouch),
            jump_held: self.is_down(Action::Jump),
            jump_released: self.jump_released,
            confirm: self.confirm_pressed,
            clock_ms,
        };
        self.jump_released = false;
        self.confirm_pressed = false;
        input
    }
}
