//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One call to `tick` per animation frame
//! - Seeded RNG only (the wall clock feeds cosmetic sway, never physics)
//! - Stable iteration order (list order)
//! - No rendering, audio or platform dependencies

pub mod bridge;
pub mod camera;
pub mod collision;
pub mod entities;
pub mod input;
pub mod level;
pub mod state;
pub mod tick;

pub use bridge::{AudioSink, SilentAudio, WorldSnapshot};
pub use collision::{Aabb, Resolution, resolve_platform};
pub use entities::Contact;
pub use input::{Action, InputLatch, TickInput};
pub use level::{Band, Level, LevelError, LevelGeometry, LevelParams, LevelPlan, generate_level};
pub use state::{
    Adversary, Body, EffectKind, FeedbackEffect, GameEvent, GameOverReason, GamePhase, GameState,
    Platform, PlatformKind, Player, Session, SkyLantern, SoundCue, Token,
};
pub use tick::{countdown_second, reset, start_run, tick};
