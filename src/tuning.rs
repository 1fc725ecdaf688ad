//! Data-driven game balance
//!
//! Every number the simulation step reads lives here so a run can be retuned
//! from a JSON file without recompiling. Defaults mirror `crate::consts`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tuning value `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

/// Per-tick physics and scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub max_speed: f32,
    pub accel: f32,
    /// Multiplier applied to vx when no direction is held (0..1)
    pub friction: f32,
    pub jump_strength: f32,
    pub max_jump_charge: u32,
    pub jump_charge_bonus: f32,
    pub invincibility_ticks: u32,
    pub knockback_speed: f32,
    pub stomp_bounce_vy: f32,
    pub stomp_score: u64,
    pub token_score: u64,
    /// Countdown length in seconds
    pub start_time: u32,
    pub start_lives: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            max_fall_speed: MAX_FALL_SPEED,
            max_speed: PLAYER_MAX_SPEED,
            accel: PLAYER_ACCEL,
            friction: FRICTION,
            jump_strength: JUMP_STRENGTH,
            max_jump_charge: MAX_JUMP_CHARGE,
            jump_charge_bonus: JUMP_CHARGE_BONUS,
            invincibility_ticks: INVINCIBILITY_TICKS,
            knockback_speed: KNOCKBACK_SPEED,
            stomp_bounce_vy: STOMP_BOUNCE_VY,
            stomp_score: STOMP_SCORE,
            token_score: TOKEN_SCORE,
            start_time: START_TIME,
            start_lives: START_LIVES,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break the physics invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("gravity", self.gravity),
            ("max_fall_speed", self.max_fall_speed),
            ("max_speed", self.max_speed),
            ("accel", self.accel),
            ("max_jump_charge", self.max_jump_charge as f32),
            ("start_time", self.start_time as f32),
            ("start_lives", self.start_lives as f32),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }
        for (field, value) in [
            ("jump_charge_bonus", self.jump_charge_bonus),
            ("knockback_speed", self.knockback_speed),
        ] {
            if !(value >= 0.0) {
                return Err(TuningError::OutOfRange { field, value });
            }
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err(TuningError::OutOfRange {
                field: "friction",
                value: self.friction,
            });
        }
        if !(self.jump_strength < 0.0) {
            return Err(TuningError::OutOfRange {
                field: "jump_strength",
                value: self.jump_strength,
            });
        }
        if !(self.stomp_bounce_vy < 0.0) {
            return Err(TuningError::OutOfRange {
                field: "stomp_bounce_vy",
                value: self.stomp_bounce_vy,
            });
        }
        Ok(())
    }

    /// Jump velocity for a given charge (more charge = higher jump, capped)
    pub fn jump_velocity(&self, charge: u32) -> f32 {
        let power = (charge as f32 / self.max_jump_charge as f32).min(1.0);
        self.jump_strength * (1.0 + power * self.jump_charge_bonus)
    }
}
