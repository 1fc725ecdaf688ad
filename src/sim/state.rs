//! Game state and core simulation types
//!
//! Everything one run mutates lives in `GameState`, owned by a single driver.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::level::{LevelGeometry, LevelPlan};
use crate::consts::*;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for confirm
    Start,
    /// Active gameplay
    Playing,
    /// Run ended (see `GameState::game_over_reason`)
    GameOver,
    /// Sliding down the goal pole
    VictoryPole,
    /// Walking to the goal structure
    VictoryWalk,
    /// Final screen
    VictoryCelebration,
}

impl GamePhase {
    pub fn is_victory(self) -> bool {
        matches!(
            self,
            GamePhase::VictoryPole | GamePhase::VictoryWalk | GamePhase::VictoryCelebration
        )
    }

    /// Terminal phases only leave through an explicit reset
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::VictoryCelebration)
    }

    /// Whether sky lanterns that drift off the top wrap back to the bottom
    pub fn lanterns_recycle(self) -> bool {
        matches!(self, GamePhase::Start | GamePhase::Playing)
    }
}

/// Why a run ended in `GamePhase::GameOver`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    TimeExpired,
    LivesExhausted,
    /// Last life lost by falling out of the world
    Fell,
}

/// Fire-and-forget sound triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    Jump,
    Coin,
    Hurt,
    Bells,
    Festive,
}

/// Side effects produced by a tick, drained by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    PhaseEntered {
        from: GamePhase,
        to: GamePhase,
        reason: Option<GameOverReason>,
    },
}

/// Position, size and velocity shared by every moving thing.
/// `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            vel: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }
}

/// The player character. Score, tokens and lives live in `Session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub on_ground: bool,
    /// Held-jump accumulator (0..=max charge)
    pub jump_charge: u32,
    pub facing_right: bool,
    pub crouching: bool,
    /// Ticks of damage immunity left (0 = vulnerable)
    pub invincible: u32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            body: Body::new(spawn.x, spawn.y, PLAYER_WIDTH, PLAYER_HEIGHT),
            on_ground: false,
            jump_charge: 0,
            facing_right: true,
            crouching: false,
            invincible: 0,
        }
    }

    /// Put the player back at the level start with a grace period
    pub fn respawn(&mut self, spawn: Vec2, invincible: u32) {
        self.body.pos = spawn;
        self.body.vel = Vec2::ZERO;
        self.invincible = invincible;
    }

    /// Release a charged jump. Returns false when airborne.
    pub fn release_jump(&mut self, jump_velocity: impl FnOnce(u32) -> f32) -> bool {
        if !self.on_ground {
            return false;
        }
        self.body.vel.y = jump_velocity(self.jump_charge);
        self.on_ground = false;
        self.jump_charge = 0;
        true
    }
}

/// Static level geometry kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Brick,
    GoalStructure,
}

/// An immutable solid rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Aabb,
    pub kind: PlatformKind,
}

/// A patrolling adversary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Adversary {
    pub body: Body,
    pub label: String,
    /// Patrol anchor x
    pub anchor_x: f32,
    /// Patrol half-range
    pub range: f32,
    /// +1 or -1
    pub direction: f32,
    pub defeated: bool,
    /// Squash animation ticks left after a stomp
    pub defeat_timer: u32,
}

/// A spinning collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub body: Body,
    pub label: String,
    pub collected: bool,
    /// Spin phase (radians, unbounded)
    pub rotation: f32,
}

/// Which event spawned a feedback effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Token,
    Adversary,
}

/// Floating score/label text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEffect {
    pub pos: Vec2,
    pub text: String,
    pub sub_text: Option<String>,
    /// 1.0 at spawn, removed at <= 0
    pub life: f32,
    pub kind: EffectKind,
    pub rotation: Option<f32>,
}

/// A decorative lantern floating up the screen (screen coordinates)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkyLantern {
    pub pos: Vec2,
    pub speed: f32,
    pub size: f32,
    pub flicker: f32,
    pub drift: f32,
}

impl SkyLantern {
    pub fn random(rng: &mut Pcg32) -> Self {
        Self {
            pos: Vec2::new(
                rng.random_range(0.0..VIEW_WIDTH),
                VIEW_HEIGHT + rng.random_range(0.0..VIEW_HEIGHT * 1.5),
            ),
            speed: 0.3 + rng.random_range(0.0..1.0),
            size: 12.0 + rng.random_range(0.0..15.0),
            flicker: rng.random_range(0.0..std::f32::consts::TAU),
            drift: rng.random_range(-0.2..0.2),
        }
    }
}

/// Score ledger exposed to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    pub tokens: u32,
    pub lives: u32,
    /// Countdown seconds left
    pub time_left: u32,
}

impl Session {
    pub fn new(lives: u32, time_left: u32) -> Self {
        Self {
            score: 0,
            tokens: 0,
            lives,
            time_left,
        }
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed of the level currently loaded
    pub seed: u64,
    rng: Pcg32,
    plan: LevelPlan,
    pub phase: GamePhase,
    pub game_over_reason: Option<GameOverReason>,
    pub session: Session,
    pub player: Player,
    pub geometry: LevelGeometry,
    pub platforms: Vec<Platform>,
    pub adversaries: Vec<Adversary>,
    pub tokens: Vec<Token>,
    pub effects: Vec<FeedbackEffect>,
    pub sky_lanterns: Vec<SkyLantern>,
    /// Height of the ceremonial lantern raised on the pole
    pub victory_lantern_y: f32,
    /// Horizontal scroll offset
    pub camera_x: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a run on the default level layout
    pub fn new(seed: u64) -> Self {
        Self::with_plan(seed, LevelPlan::default())
    }

    /// Create a run on a validated level layout
    pub fn with_plan(seed: u64, plan: LevelPlan) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let level = plan.generate(&mut rng);
        let geometry = level.geometry;
        let mut state = Self {
            seed,
            rng,
            plan,
            phase: GamePhase::Start,
            game_over_reason: None,
            session: Session::new(START_LIVES, START_TIME),
            player: Player::new(geometry.spawn),
            geometry,
            platforms: level.platforms,
            adversaries: level.adversaries,
            tokens: level.tokens,
            effects: Vec::new(),
            sky_lanterns: Vec::new(),
            victory_lantern_y: 0.0,
            camera_x: 0.0,
            time_ticks: 0,
            events: Vec::new(),
        };
        state.victory_lantern_y = state.victory_lantern_start();
        state
    }

    /// Throw away the current level and build a fresh one from the run RNG
    pub fn regenerate_level(&mut self) {
        self.seed = self.rng.random();
        self.rng = Pcg32::seed_from_u64(self.seed);
        let level = self.plan.generate(&mut self.rng);
        self.geometry = level.geometry;
        self.platforms = level.platforms;
        self.adversaries = level.adversaries;
        self.tokens = level.tokens;
        self.effects.clear();
        self.sky_lanterns.clear();
        self.victory_lantern_y = self.victory_lantern_start();
        log::info!(
            "Level generated: seed={} platforms={} adversaries={} tokens={}",
            self.seed,
            self.platforms.len(),
            self.adversaries.len(),
            self.tokens.len()
        );
    }

    /// Reset player and ledger to the start-of-run values
    pub fn reset_session(&mut self, lives: u32, time_left: u32) {
        self.session = Session::new(lives, time_left);
        self.player = Player::new(self.geometry.spawn);
        self.camera_x = 0.0;
        self.game_over_reason = None;
    }

    pub fn spawn_sky_lanterns(&mut self) {
        self.sky_lanterns = (0..SKY_LANTERN_COUNT)
            .map(|_| SkyLantern::random(&mut self.rng))
            .collect();
    }

    pub fn spawn_effect(
        &mut self,
        pos: Vec2,
        text: impl Into<String>,
        kind: EffectKind,
        rotation: Option<f32>,
        sub_text: Option<String>,
    ) {
        self.effects.push(FeedbackEffect {
            pos,
            text: text.into(),
            sub_text,
            life: 1.0,
            kind,
            rotation,
        });
    }

    /// Record a phase transition and notify listeners
    pub fn enter_phase(&mut self, to: GamePhase, reason: Option<GameOverReason>) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        if to == GamePhase::GameOver {
            self.game_over_reason = reason;
        }
        log::info!("Phase {:?} -> {:?} ({:?})", from, to, reason);
        self.events.push(GameEvent::PhaseEntered { from, to, reason });
    }

    pub fn emit(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn lantern_rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    fn victory_lantern_start(&self) -> f32 {
        self.geometry.ground_y - self.geometry.tile_size * 8.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_waits_on_start_screen() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.session, Session::new(START_LIVES, START_TIME));
        assert_eq!(state.player.body.pos, state.geometry.spawn);
        assert!(!state.platforms.is_empty());
    }

    #[test]
    fn test_enter_phase_records_reason_and_event() {
        let mut state = GameState::new(7);
        state.enter_phase(GamePhase::Playing, None);
        state.enter_phase(GamePhase::GameOver, Some(GameOverReason::TimeExpired));
        assert_eq!(state.game_over_reason, Some(GameOverReason::TimeExpired));
        let events = state.drain_events();
        assert_eq!(events.len(), 2);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_same_phase_is_not_a_transition() {
        let mut state = GameState::new(7);
        state.enter_phase(GamePhase::Start, None);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_regenerate_draws_a_new_seed() {
        let mut state = GameState::new(7);
        let first = state.seed;
        state.regenerate_level();
        assert_ne!(state.seed, first);
        assert!(state.tokens.iter().all(|t| !t.collected));
    }

    #[test]
    fn test_release_jump_needs_ground() {
        let mut player = Player::new(Vec2::ZERO);
        player.jump_charge = 5;
        assert!(!player.release_jump(|_| -8.0));
        assert_eq!(player.jump_charge, 5);

        player.on_ground = true;
        assert!(player.release_jump(|_| -8.0));
        assert_eq!(player.body.vel.y, -8.0);
        assert_eq!(player.jump_charge, 0);
        assert!(!player.on_ground);
    }
}
