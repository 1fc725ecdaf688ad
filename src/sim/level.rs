//! Procedural level generation
//!
//! A level is a strip of ground tiles, periodic bands of floating bricks, a
//! goal pole and a goal structure, plus the initial adversaries and tokens.
//! Parameters are validated once (`LevelParams::validate`); a validated
//! `LevelPlan` can then generate any number of levels without failing.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::collision::Aabb;
use super::state::{Adversary, Body, Platform, PlatformKind, Token};
use crate::consts::*;

/// Labels painted on adversaries
pub const ADVERSARY_LABELS: &[&str] = &["Glitch", "Anomaly", "Barrier", "Drift", "Gap"];
/// Labels printed on tokens
pub const TOKEN_LABELS: &[&str] = &["Insight", "Horizon", "Shield", "Swift"];

/// Rejected level parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("level needs at least one tile")]
    NoTiles,
    #[error("{name} must be positive (got {value})")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} stride must be non-zero")]
    ZeroStride { name: &'static str },
    #[error("goal pole (tile {pole}) must come before the goal structure (tile {goal})")]
    PoleAfterGoal { pole: u32, goal: u32 },
    #[error("goal structure ends at tile {end} past level end {tiles}")]
    GoalOutOfBounds { end: u64, tiles: u32 },
    #[error("{name} band reaches tile {end} past the last usable tile {limit}")]
    BandOutOfBounds {
        name: &'static str,
        end: u32,
        limit: u32,
    },
    #[error("level width {level} is narrower than the viewport {view}")]
    NarrowerThanView { level: f32, view: f32 },
}

/// A column range `[start, end)` visited every `step` tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub start: u32,
    pub end: u32,
    pub step: u32,
}

impl Band {
    pub fn columns(self) -> impl Iterator<Item = u32> {
        (self.start..self.end).step_by(self.step.max(1) as usize)
    }
}

/// Raw layout knobs (unchecked)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    pub tiles: u32,
    pub tile_size: f32,
    pub view_width: f32,
    pub view_height: f32,
    pub bricks: Band,
    /// Chance that a brick gets a second brick beside it
    pub double_brick_chance: f64,
    pub pole_tile: u32,
    pub goal_tile: u32,
    /// Goal structure size in tiles
    pub goal_width: u32,
    pub goal_height: u32,
    pub adversaries: Band,
    pub tokens: Band,
    pub spawn: Vec2,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            tiles: 250,
            tile_size: TILE_SIZE,
            view_width: VIEW_WIDTH,
            view_height: VIEW_HEIGHT,
            bricks: Band {
                start: 15,
                end: 220,
                step: 12,
            },
            double_brick_chance: 0.6,
            pole_tile: 210,
            goal_tile: 220,
            goal_width: 6,
            goal_height: 8,
            adversaries: Band {
                start: 30,
                end: 200,
                step: 25,
            },
            tokens: Band {
                start: 20,
                end: 205,
                step: 10,
            },
            spawn: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
        }
    }
}

impl LevelParams {
    /// Check the parameters describe a playable level
    pub fn validate(self) -> Result<LevelPlan, LevelError> {
        if self.tiles == 0 {
            return Err(LevelError::NoTiles);
        }
        for (name, value) in [
            ("tile_size", self.tile_size),
            ("view_width", self.view_width),
            ("view_height", self.view_height),
            ("goal_width", self.goal_width as f32),
            ("goal_height", self.goal_height as f32),
        ] {
            if !(value > 0.0) {
                return Err(LevelError::NonPositive { name, value });
            }
        }
        for (name, band) in [
            ("brick", self.bricks),
            ("adversary", self.adversaries),
            ("token", self.tokens),
        ] {
            if band.step == 0 {
                return Err(LevelError::ZeroStride { name });
            }
        }
        if self.pole_tile >= self.goal_tile {
            return Err(LevelError::PoleAfterGoal {
                pole: self.pole_tile,
                goal: self.goal_tile,
            });
        }
        let goal_end = u64::from(self.goal_tile) + u64::from(self.goal_width);
        if goal_end > u64::from(self.tiles) {
            return Err(LevelError::GoalOutOfBounds {
                end: goal_end,
                tiles: self.tiles,
            });
        }
        let level = self.tiles as f32 * self.tile_size;
        if level < self.view_width {
            return Err(LevelError::NarrowerThanView {
                level,
                view: self.view_width,
            });
        }
        // A brick column may grow a second brick one tile to its right
        for (name, band, limit) in [
            ("brick", self.bricks, self.tiles - 1),
            ("adversary", self.adversaries, self.tiles),
            ("token", self.tokens, self.tiles),
        ] {
            if band.end > limit {
                return Err(LevelError::BandOutOfBounds {
                    name,
                    end: band.end,
                    limit,
                });
            }
        }
        Ok(LevelPlan { params: self })
    }
}

/// Validated parameters; generation from a plan cannot fail
#[derive(Debug, Clone, PartialEq)]
pub struct LevelPlan {
    params: LevelParams,
}

impl Default for LevelPlan {
    fn default() -> Self {
        // The default parameters are covered by `test_default_params_validate`.
        Self {
            params: LevelParams::default(),
        }
    }
}

/// Fixed coordinates derived from the layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelGeometry {
    pub width: f32,
    pub tile_size: f32,
    pub view_width: f32,
    pub view_height: f32,
    /// Top of the ground strip
    pub ground_y: f32,
    pub pole_x: f32,
    /// Center of the goal structure (end of the victory walk)
    pub goal_target_x: f32,
    pub spawn: Vec2,
}

/// A freshly generated level
#[derive(Debug, Clone)]
pub struct Level {
    pub geometry: LevelGeometry,
    pub platforms: Vec<Platform>,
    pub adversaries: Vec<Adversary>,
    pub tokens: Vec<Token>,
}

impl LevelPlan {
    pub fn params(&self) -> &LevelParams {
        &self.params
    }

    pub fn generate(&self, rng: &mut Pcg32) -> Level {
        let p = &self.params;
        let t = p.tile_size;
        let h = p.view_height;
        let ground_y = h - t * 2.0;

        let mut platforms = Vec::with_capacity(p.tiles as usize + 64);
        for i in 0..p.tiles {
            platforms.push(Platform {
                rect: Aabb::from_xywh(i as f32 * t, ground_y, t, t * 2.0),
                kind: PlatformKind::Ground,
            });
        }

        let brick_y = h - t * 5.0;
        for i in p.bricks.columns() {
            platforms.push(Platform {
                rect: Aabb::from_xywh(i as f32 * t, brick_y, t, t),
                kind: PlatformKind::Brick,
            });
            if rng.random_bool(p.double_brick_chance.clamp(0.0, 1.0)) {
                platforms.push(Platform {
                    rect: Aabb::from_xywh((i + 1) as f32 * t, brick_y, t, t),
                    kind: PlatformKind::Brick,
                });
            }
        }

        let goal_x = p.goal_tile as f32 * t;
        let goal_w = p.goal_width as f32 * t;
        let goal_h = p.goal_height as f32 * t;
        platforms.push(Platform {
            rect: Aabb::from_xywh(goal_x, ground_y - goal_h, goal_w, goal_h),
            kind: PlatformKind::GoalStructure,
        });

        let adversaries = p
            .adversaries
            .columns()
            .map(|i| {
                let x = i as f32 * t;
                let mut body = Body::new(x, h - t * 3.1, ADVERSARY_SIZE, ADVERSARY_SIZE);
                body.vel.x = ADVERSARY_SPEED;
                Adversary {
                    body,
                    label: pick(rng, ADVERSARY_LABELS),
                    anchor_x: x,
                    range: ADVERSARY_MIN_RANGE + rng.random_range(0.0..ADVERSARY_RANGE_JITTER),
                    direction: 1.0,
                    defeated: false,
                    defeat_timer: 0,
                }
            })
            .collect();

        let tokens = p
            .tokens
            .columns()
            .map(|i| {
                let rows = if rng.random_bool(0.5) { 6.5 } else { 3.5 };
                Token {
                    body: Body::new(i as f32 * t, h - t * rows, TOKEN_SIZE, TOKEN_SIZE),
                    label: pick(rng, TOKEN_LABELS),
                    collected: false,
                    rotation: 0.0,
                }
            })
            .collect();

        Level {
            geometry: LevelGeometry {
                width: p.tiles as f32 * t,
                tile_size: t,
                view_width: p.view_width,
                view_height: h,
                ground_y,
                pole_x: p.pole_tile as f32 * t,
                goal_target_x: goal_x + goal_w / 2.0,
                spawn: p.spawn,
            },
            platforms,
            adversaries,
            tokens,
        }
    }
}

/// Validate and generate in one step
pub fn generate_level(params: LevelParams, rng: &mut Pcg32) -> Result<Level, LevelError> {
    Ok(params.validate()?.generate(rng))
}

fn pick(rng: &mut Pcg32, labels: &[&str]) -> String {
    labels[rng.random_range(0..labels.len())].to_string()
}
