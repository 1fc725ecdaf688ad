//! Fixed-step simulation tick
//!
//! One call advances the world by one animation frame. The phase decides which
//! update path runs; everything here is pure in-memory arithmetic.

use super::camera;
use super::collision::{Resolution, resolve_platform};
use super::entities::{Contact, raise_victory_lantern, update_effects, update_sky_lanterns};
use super::input::TickInput;
use super::state::{EffectKind, GameOverReason, GamePhase, GameState, SoundCue};
use crate::consts::*;
use crate::tuning::Tuning;

/// What cost the player a life
#[derive(Debug, Clone, Copy, PartialEq)]
enum Damage {
    /// Touched an adversary whose left edge is at `x`
    Adversary { x: f32 },
    /// Fell below the viewport
    Fall,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, tuning: &Tuning) {
    state.time_ticks += 1;

    match state.phase {
        GamePhase::Start => {
            if input.confirm {
                start_run(state, tuning);
            }
        }
        GamePhase::Playing => step_playing(state, input, tuning),
        GamePhase::VictoryPole => {
            state.victory_lantern_y = raise_victory_lantern(state.victory_lantern_y);
            let ground_y = state.geometry.ground_y;
            let body = &mut state.player.body;
            body.vel.y = POLE_SLIDE_SPEED;
            body.pos.y += body.vel.y;
            if body.bottom() >= ground_y {
                body.pos.y = ground_y - body.size.y;
                body.vel.y = 0.0;
                state.enter_phase(GamePhase::VictoryWalk, None);
            }
        }
        GamePhase::VictoryWalk => {
            state.victory_lantern_y = raise_victory_lantern(state.victory_lantern_y);
            let player = &mut state.player;
            player.body.pos.x += VICTORY_WALK_SPEED;
            player.facing_right = true;
            if player.body.pos.x >= state.geometry.goal_target_x {
                player.body.vel.x = 0.0;
                state.enter_phase(GamePhase::VictoryCelebration, None);
                state.emit(SoundCue::Festive);
            }
        }
        GamePhase::VictoryCelebration => {
            state.victory_lantern_y = raise_victory_lantern(state.victory_lantern_y);
            if input.confirm {
                reset(state, tuning);
            }
        }
        GamePhase::GameOver => {
            if input.confirm {
                reset(state, tuning);
            }
        }
    }

    let recycle = state.phase.lanterns_recycle();
    let mut lanterns = std::mem::take(&mut state.sky_lanterns);
    update_sky_lanterns(&mut lanterns, input.clock_ms, recycle, state.lantern_rng());
    state.sky_lanterns = lanterns;

    state.camera_x = camera::follow(
        state.player.body.pos.x,
        state.geometry.width,
        state.geometry.view_width,
    );
}

/// One real-time second elapsed. Only counts down while playing.
pub fn countdown_second(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    if state.session.time_left <= 1 {
        state.session.time_left = 0;
        state.enter_phase(GamePhase::GameOver, Some(GameOverReason::TimeExpired));
    } else {
        state.session.time_left -= 1;
    }
}

/// Begin a fresh run on a newly generated level
pub fn start_run(state: &mut GameState, tuning: &Tuning) {
    state.regenerate_level();
    state.reset_session(tuning.start_lives, tuning.start_time);
    state.enter_phase(GamePhase::Playing, None);
}

/// Return to the title screen with a fresh level and ledger
pub fn reset(state: &mut GameState, tuning: &Tuning) {
    state.regenerate_level();
    state.reset_session(tuning.start_lives, tuning.start_time);
    state.enter_phase(GamePhase::Start, None);
}

fn step_playing(state: &mut GameState, input: &TickInput, tuning: &Tuning) {
    let player = &mut state.player;

    if input.jump_released && player.release_jump(|charge| tuning.jump_velocity(charge)) {
        state.emit(SoundCue::Jump);
    }

    let player = &mut state.player;
    let vel = &mut player.body.vel;
    if input.left {
        vel.x -= tuning.accel;
        player.facing_right = false;
    } else if input.right {
        vel.x += tuning.accel;
        player.facing_right = true;
    } else {
        vel.x *= tuning.friction;
    }

    if input.jump_held && player.on_ground {
        player.jump_charge = (player.jump_charge + 1).min(tuning.max_jump_charge);
    }
    player.crouching = input.crouch;

    vel.x = vel.x.clamp(-tuning.max_speed, tuning.max_speed);
    vel.y = (vel.y + tuning.gravity).min(tuning.max_fall_speed);
    player.body.pos += player.body.vel;
    player.body.pos.x = player.body.pos.x.max(0.0);

    player.invincible = player.invincible.saturating_sub(1);
    player.on_ground = false;

    check_goal_pole(state);

    let player = &mut state.player;
    for platform in &state.platforms {
        let hit = resolve_platform(
            &mut player.body.pos,
            &mut player.body.vel,
            player.body.size,
            &platform.rect,
            HEAD_BUMP_VY,
        );
        if hit == Some(Resolution::Landed) {
            player.on_ground = true;
        }
    }

    update_adversaries(state, tuning);
    update_tokens(state, tuning);
    update_effects(&mut state.effects);

    let fell = state.player.body.pos.y > state.geometry.view_height;
    if fell && state.phase == GamePhase::Playing {
        take_damage(state, tuning, Damage::Fall);
    }
}

/// Crossing the pole above ground level starts the victory sequence
fn check_goal_pole(state: &mut GameState) {
    let pole_x = state.geometry.pole_x;
    let body = &state.player.body;
    let crossing = body.right() > pole_x && body.pos.x < pole_x + POLE_WIDTH;
    if !crossing || body.pos.y >= state.geometry.ground_y {
        return;
    }

    let body = &mut state.player.body;
    body.vel.x = 0.0;
    body.pos.x = pole_x - POLE_SNAP_OFFSET;
    state.enter_phase(GamePhase::VictoryPole, None);
    state.emit(SoundCue::Bells);
    state.spawn_sky_lanterns();
}

fn update_adversaries(state: &mut GameState, tuning: &Tuning) {
    for i in 0..state.adversaries.len() {
        let adversary = &mut state.adversaries[i];
        adversary.patrol();

        match adversary.contact(&state.player.body) {
            None => {}
            Some(Contact::Stomp) => {
                adversary.defeat();
                let pos = adversary.body.pos;
                state.player.body.vel.y = tuning.stomp_bounce_vy;
                state.session.score += tuning.stomp_score;
                state.spawn_effect(
                    pos,
                    format!("+{}", tuning.stomp_score),
                    EffectKind::Adversary,
                    None,
                    None,
                );
                state.emit(SoundCue::Jump);
                log::debug!("Stomped adversary {} at x={:.1}", i, pos.x);
            }
            Some(Contact::Hit) => {
                let x = adversary.body.pos.x;
                if state.player.invincible == 0 && state.phase == GamePhase::Playing {
                    take_damage(state, tuning, Damage::Adversary { x });
                }
            }
        }
    }
}

fn update_tokens(state: &mut GameState, tuning: &Tuning) {
    for i in 0..state.tokens.len() {
        let token = &mut state.tokens[i];
        let collected = token.try_collect(&state.player.body);
        token.spin();
        if !collected {
            continue;
        }

        let pos = token.body.pos;
        let label = token.label.clone();
        let rotation = token.rotation;
        state.session.score += tuning.token_score;
        state.session.tokens += 1;
        state.spawn_effect(
            pos,
            label,
            EffectKind::Token,
            Some(rotation),
            Some(format!("+{}", tuning.token_score)),
        );
        state.emit(SoundCue::Coin);
        log::debug!("Collected token {} ({} total)", i, state.session.tokens);
    }
}

/// Spend a life. The last life ends the run; otherwise grant a grace period
/// and either knock the player back or return them to the spawn point.
fn take_damage(state: &mut GameState, tuning: &Tuning, damage: Damage) {
    if state.session.lives == 0 {
        return;
    }
    state.session.lives -= 1;
    log::debug!("Player damaged by {:?}, {} lives left", damage, state.session.lives);

    if state.session.lives == 0 {
        let reason = match damage {
            Damage::Adversary { .. } => GameOverReason::LivesExhausted,
            Damage::Fall => GameOverReason::Fell,
        };
        state.enter_phase(GamePhase::GameOver, Some(reason));
        return;
    }

    let player = &mut state.player;
    match damage {
        Damage::Adversary { x } => {
            player.invincible = tuning.invincibility_ticks;
            player.body.vel.x = if player.body.pos.x < x {
                -tuning.knockback_speed
            } else {
                tuning.knockback_speed
            };
        }
        Damage::Fall => {
            player.respawn(state.geometry.spawn, tuning.invincibility_ticks);
        }
    }
    state.emit(SoundCue::Hurt);
}
