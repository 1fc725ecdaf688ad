//! Contract with the outside world
//!
//! Rendering reads a borrowed `WorldSnapshot` once per frame; audio receives
//! fire-and-forget cues through `AudioSink`. Neither can mutate the simulation.

use serde::Serialize;

use super::level::LevelGeometry;
use super::state::{
    Adversary, FeedbackEffect, GameOverReason, GamePhase, GameState, Platform, Player, Session,
    SkyLantern, SoundCue, Token,
};

/// Receiver for sound triggers. Implementations must return immediately.
pub trait AudioSink {
    fn on_jump(&mut self);
    fn on_coin(&mut self);
    fn on_hurt(&mut self);
    fn on_bells(&mut self);
    fn on_festive(&mut self);

    fn play(&mut self, cue: SoundCue) {
        match cue {
            SoundCue::Jump => self.on_jump(),
            SoundCue::Coin => self.on_coin(),
            SoundCue::Hurt => self.on_hurt(),
            SoundCue::Bells => self.on_bells(),
            SoundCue::Festive => self.on_festive(),
        }
    }
}

/// Sink that drops every cue (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn on_jump(&mut self) {}
    fn on_coin(&mut self) {}
    fn on_hurt(&mut self) {}
    fn on_bells(&mut self) {}
    fn on_festive(&mut self) {}
}

/// Read-only view of one frame
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot<'a> {
    pub phase: GamePhase,
    pub game_over_reason: Option<GameOverReason>,
    pub session: Session,
    pub player: &'a Player,
    pub camera_x: f32,
    pub geometry: &'a LevelGeometry,
    pub platforms: &'a [Platform],
    pub adversaries: &'a [Adversary],
    pub tokens: &'a [Token],
    pub effects: &'a [FeedbackEffect],
    pub sky_lanterns: &'a [SkyLantern],
    /// Whether lanterns leaving the top wrap to the bottom this frame
    pub lanterns_recycle: bool,
    pub victory_lantern_y: f32,
    pub time_ticks: u64,
}

impl WorldSnapshot<'_> {
    /// The player blinks while invincible
    pub fn player_visible(&self) -> bool {
        self.player.invincible % 10 < 5
    }

    /// Tokens still waiting to be picked up
    pub fn active_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| !t.collected)
    }

    /// Adversaries still patrolling
    pub fn live_adversaries(&self) -> impl Iterator<Item = &Adversary> {
        self.adversaries.iter().filter(|a| !a.defeated)
    }
}

impl GameState {
    pub fn snapshot(&self) -> WorldSnapshot<'_> {
        WorldSnapshot {
            phase: self.phase,
            game_over_reason: self.game_over_reason,
            session: self.session,
            player: &self.player,
            camera_x: self.camera_x,
            geometry: &self.geometry,
            platforms: &self.platforms,
            adversaries: &self.adversaries,
            tokens: &self.tokens,
            effects: &self.effects,
            sky_lanterns: &self.sky_lanterns,
            lanterns_recycle: self.phase.lanterns_recycle(),
            victory_lantern_y: self.victory_lantern_y,
            time_ticks: self.time_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<&'static str>);

    impl AudioSink for Recorder {
        fn on_jump(&mut self) {
            self.0.push("jump");
        }
        fn on_coin(&mut self) {
            self.0.push("coin");
        }
        fn on_hurt(&mut self) {
            self.0.push("hurt");
        }
        fn on_bells(&mut self) {
            self.0.push("bells");
        }
        fn on_festive(&mut self) {
            self.0.push("festive");
        }
    }

    #[test]
    fn test_play_routes_each_cue() {
        let mut sink = Recorder::default();
        for cue in [
            SoundCue::Jump,
            SoundCue::Coin,
            SoundCue::Hurt,
            SoundCue::Bells,
            SoundCue::Festive,
        ] {
            sink.play(cue);
        }
        assert_eq!(sink.0, ["jump", "coin", "hurt", "bells", "festive"]);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let state = GameState::new(5);
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["phase"], "Start");
        assert_eq!(json["session"]["lives"], 3);
        assert_eq!(json["lanterns_recycle"], true);
        assert_eq!(
            json["tokens"].as_array().map(Vec::len),
            Some(state.tokens.len())
        );
    }

    #[test]
    fn test_snapshot_filters_inactive_entities() {
        let mut state = GameState::new(5);
        state.tokens[0].collected = true;
        state.adversaries[0].defeated = true;
        let snapshot = state.snapshot();
        assert_eq!(snapshot.active_tokens().count(), state.tokens.len() - 1);
        assert_eq!(
            snapshot.live_adversaries().count(),
            state.adversaries.len() - 1
        );
    }

    #[test]
    fn test_player_blinks_while_invincible() {
        let mut state = GameState::new(5);
        assert!(state.snapshot().player_visible());
        state.player.invincible = 57;
        assert!(!state.snapshot().player_visible());
    }
}
