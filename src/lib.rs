//! Lantern Dash - A side-scrolling lantern festival platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `scheduler`: Frame driver, countdown timer and command mailbox
//! - `audio`: Procedural Web Audio sound cues (wasm only)
//! - `tuning`: Data-driven game balance
//! - `settings`: Audio preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod scheduler;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use scheduler::{Command, GameLoop, IntervalTimer, PhaseChange};
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Viewport dimensions (pixels). The world scrolls horizontally only.
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 480.0;
    /// Size of one level tile
    pub const TILE_SIZE: f32 = 32.0;

    /// Player physics (pixels per tick)
    pub const GRAVITY: f32 = 0.5;
    pub const MAX_FALL_SPEED: f32 = 12.0;
    pub const PLAYER_MAX_SPEED: f32 = 4.0;
    pub const PLAYER_ACCEL: f32 = 0.4;
    /// Horizontal velocity multiplier when no direction is held
    pub const FRICTION: f32 = 0.85;
    /// Base jump velocity (negative is up)
    pub const JUMP_STRENGTH: f32 = -8.0;
    /// Ticks of held jump needed for a full-power jump
    pub const MAX_JUMP_CHARGE: u32 = 15;
    /// Extra jump velocity granted at full charge (0.4 = 1.4x base)
    pub const JUMP_CHARGE_BONUS: f32 = 0.4;
    /// Velocity after bumping a platform from below
    pub const HEAD_BUMP_VY: f32 = 1.0;

    /// Player spawn and shape
    pub const PLAYER_START_X: f32 = 100.0;
    pub const PLAYER_START_Y: f32 = 300.0;
    pub const PLAYER_WIDTH: f32 = 34.0;
    pub const PLAYER_HEIGHT: f32 = 46.0;
    pub const START_LIVES: u32 = 3;
    /// Damage immunity after a hit or respawn (ticks)
    pub const INVINCIBILITY_TICKS: u32 = 60;
    /// Horizontal knockback after touching an adversary
    pub const KNOCKBACK_SPEED: f32 = 4.0;

    /// Countdown length (seconds)
    pub const START_TIME: u32 = 400;

    /// Adversaries
    pub const ADVERSARY_SIZE: f32 = 32.0;
    pub const ADVERSARY_SPEED: f32 = 1.5;
    pub const ADVERSARY_MIN_RANGE: f32 = 120.0;
    pub const ADVERSARY_RANGE_JITTER: f32 = 100.0;
    pub const STOMP_BOUNCE_VY: f32 = -7.0;
    pub const STOMP_SCORE: u64 = 500;
    pub const DEFEAT_ANIM_TICKS: u32 = 20;

    /// Tokens
    pub const TOKEN_SIZE: f32 = 31.0;
    pub const TOKEN_SCORE: u64 = 200;
    pub const TOKEN_SPIN_RATE: f32 = 0.08;

    /// Feedback text
    pub const EFFECT_RISE: f32 = 1.8;
    pub const EFFECT_DECAY: f32 = 0.015;

    /// Victory sequence
    pub const POLE_WIDTH: f32 = 8.0;
    pub const POLE_SNAP_OFFSET: f32 = 12.0;
    pub const POLE_SLIDE_SPEED: f32 = 2.5;
    pub const VICTORY_WALK_SPEED: f32 = 2.0;
    pub const VICTORY_LANTERN_RISE: f32 = 1.5;
    pub const VICTORY_LANTERN_TARGET_Y: f32 = 80.0;

    /// Sky lanterns
    pub const SKY_LANTERN_COUNT: usize = 100;
    pub const SKY_LANTERN_FLICKER_RATE: f32 = 0.05;
    /// Lanterns above this y are recycled to the bottom (when allowed)
    pub const SKY_LANTERN_RECYCLE_Y: f32 = -150.0;
}

