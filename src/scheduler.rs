//! Frame driver
//!
//! `GameLoop` is the single owner of the simulation. Key handlers and the
//! countdown timer never touch the state directly: they post `Command`s that
//! are applied at the start of the next frame, so nothing can interleave with
//! a running tick. The countdown timer only exists while a run is in
//! `Playing` and is dropped the moment the phase changes.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::sim::{
    Action, AudioSink, GameEvent, GameOverReason, GamePhase, GameState, InputLatch, LevelPlan,
    WorldSnapshot, countdown_second, reset, tick,
};
use crate::tuning::Tuning;

/// Countdown period (milliseconds)
pub const COUNTDOWN_PERIOD_MS: f64 = 1000.0;

/// Messages applied to the game between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(Action),
    Release(Action),
    /// Window lost focus; forget every held key and pending edge
    ReleaseAll,
    /// One real-time second elapsed
    CountdownSecond,
    /// Return to the title screen from any phase
    Reset,
}

/// Notification for UI overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub from: GamePhase,
    pub to: GamePhase,
    pub reason: Option<GameOverReason>,
}

/// Fixed-period timer polled against a monotonic clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalTimer {
    period_ms: f64,
    next_due_ms: f64,
}

impl IntervalTimer {
    pub fn new(period_ms: f64, now_ms: f64) -> Self {
        Self {
            period_ms,
            next_due_ms: now_ms + period_ms,
        }
    }

    /// Number of periods that elapsed since the last poll
    pub fn poll(&mut self, now_ms: f64) -> u32 {
        let mut fired = 0;
        while now_ms >= self.next_due_ms {
            self.next_due_ms += self.period_ms;
            fired += 1;
        }
        fired
    }
}

/// Owns the game state and everything allowed to write to it
#[derive(Debug)]
pub struct GameLoop {
    state: GameState,
    tuning: Tuning,
    input: InputLatch,
    mailbox: VecDeque<Command>,
    countdown: Option<IntervalTimer>,
}

impl GameLoop {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_plan(seed, LevelPlan::default(), tuning)
    }

    pub fn with_plan(seed: u64, plan: LevelPlan, tuning: Tuning) -> Self {
        Self {
            state: GameState::with_plan(seed, plan),
            tuning,
            input: InputLatch::new(),
            mailbox: VecDeque::new(),
            countdown: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn snapshot(&self) -> WorldSnapshot<'_> {
        self.state.snapshot()
    }

    /// Queue a command for the next frame
    pub fn post(&mut self, command: Command) {
        self.mailbox.push_back(command);
    }

    pub fn countdown_running(&self) -> bool {
        self.countdown.is_some()
    }

    /// Run one frame: fire due timers, apply queued commands, tick once,
    /// then hand the tick's side effects to the collaborators.
    pub fn frame(&mut self, now_ms: f64, audio: &mut dyn AudioSink) -> Vec<PhaseChange> {
        if let Some(timer) = self.countdown.as_mut() {
            for _ in 0..timer.poll(now_ms) {
                self.mailbox.push_back(Command::CountdownSecond);
            }
        }

        while let Some(command) = self.mailbox.pop_front() {
            match command {
                Command::Press(action) => self.input.press(action),
                Command::Release(action) => self.input.release(action),
                Command::ReleaseAll => self.input.clear(),
                Command::CountdownSecond => countdown_second(&mut self.state),
                Command::Reset => reset(&mut self.state, &self.tuning),
            }
        }

        let input = self.input.sample(now_ms);
        tick(&mut self.state, &input, &self.tuning);

        let mut changes = Vec::new();
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(cue) => audio.play(cue),
                GameEvent::PhaseEntered { from, to, reason } => {
                    changes.push(PhaseChange { from, to, reason })
                }
            }
        }

        self.sync_timers(now_ms);
        changes
    }

    /// Cancel every timer and forget held keys
    pub fn shutdown(&mut self) {
        if self.countdown.take().is_some() {
            log::debug!("Countdown timer cancelled on shutdown");
        }
        self.mailbox.clear();
        self.input.clear();
    }

    fn sync_timers(&mut self, now_ms: f64) {
        let playing = self.state.phase == GamePhase::Playing;
        match (playing, self.countdown.is_some()) {
            (true, false) => {
                self.countdown = Some(IntervalTimer::new(COUNTDOWN_PERIOD_MS, now_ms));
                log::debug!("Countdown timer started");
            }
            (false, true) => {
                self.countdown = None;
                // Ticks queued by a late timer must not reach the next run
                self.mailbox.retain(|c| *c != Command::CountdownSecond);
                log::debug!("Countdown timer cancelled");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SilentAudio, SoundCue};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[derive(Default)]
    struct Cues(Vec<SoundCue>);

    impl AudioSink for Cues {
        fn on_jump(&mut self) {
            self.0.push(SoundCue::Jump);
        }
        fn on_coin(&mut self) {
            self.0.push(SoundCue::Coin);
        }
        fn on_hurt(&mut self) {
            self.0.push(SoundCue::Hurt);
        }
        fn on_bells(&mut self) {
            self.0.push(SoundCue::Bells);
        }
        fn on_festive(&mut self) {
            self.0.push(SoundCue::Festive);
        }
    }

    fn confirm(game: &mut GameLoop) {
        game.post(Command::Press(Action::Confirm));
        game.post(Command::Release(Action::Confirm));
    }

    #[test]
    fn test_interval_timer_catches_up() {
        let mut timer = IntervalTimer::new(1000.0, 0.0);
        assert_eq!(timer.poll(999.0), 0);
        assert_eq!(timer.poll(1000.0), 1);
        assert_eq!(timer.poll(3500.0), 2);
        assert_eq!(timer.poll(3600.0), 0);
    }

    #[test]
    fn test_countdown_runs_only_while_playing() {
        let mut game = GameLoop::new(1, Tuning::default());
        let mut audio = SilentAudio;
        game.frame(0.0, &mut audio);
        assert!(!game.countdown_running());

        confirm(&mut game);
        let changes = game.frame(FRAME_MS, &mut audio);
        assert_eq!(changes[0].to, GamePhase::Playing);
        assert!(game.countdown_running());

        game.frame(FRAME_MS + 3000.0, &mut audio);
        assert_eq!(game.state().session.time_left, 397);
    }

    #[test]
    fn test_countdown_expiry_ends_run_and_cancels_timer() {
        let tuning = Tuning {
            start_time: 2,
            ..Default::default()
        };
        let mut game = GameLoop::new(1, tuning);
        let mut audio = SilentAudio;
        confirm(&mut game);
        game.frame(0.0, &mut audio);

        let changes = game.frame(5000.0, &mut audio);
        assert_eq!(
            changes,
            vec![PhaseChange {
                from: GamePhase::Playing,
                to: GamePhase::GameOver,
                reason: Some(GameOverReason::TimeExpired),
            }]
        );
        assert_eq!(game.state().session.time_left, 0);
        assert!(!game.countdown_running());
    }

    #[test]
    fn test_sounds_reach_the_sink_after_the_tick() {
        let mut game = GameLoop::new(1, Tuning::default());
        let mut audio = Cues::default();
        confirm(&mut game);
        game.frame(0.0, &mut audio);

        // Let the player land, then jump
        let mut now = 0.0;
        for _ in 0..60 {
            now += FRAME_MS;
            game.frame(now, &mut audio);
        }
        assert!(game.state().player.on_ground);
        game.post(Command::Press(Action::Jump));
        game.frame(now + FRAME_MS, &mut audio);
        game.post(Command::Release(Action::Jump));
        game.frame(now + 2.0 * FRAME_MS, &mut audio);
        assert!(audio.0.contains(&SoundCue::Jump));
        assert!(game.state().player.body.vel.y < 0.0);
    }

    #[test]
    fn test_reset_command_returns_to_start() {
        let mut game = GameLoop::new(1, Tuning::default());
        let mut audio = SilentAudio;
        confirm(&mut game);
        game.frame(0.0, &mut audio);
        game.post(Command::Reset);
        let changes = game.frame(FRAME_MS, &mut audio);
        assert_eq!(changes[0].to, GamePhase::Start);
        assert!(!game.countdown_running());
    }

    #[test]
    fn test_release_all_drops_held_keys() {
        let mut game = GameLoop::new(1, Tuning::default());
        let mut audio = SilentAudio;
        confirm(&mut game);
        game.frame(0.0, &mut audio);

        game.post(Command::Press(Action::MoveRight));
        game.frame(FRAME_MS, &mut audio);
        assert!(game.state().player.body.vel.x > 0.0);

        // Focus lost while the key was down: the keyup never arrives
        game.post(Command::ReleaseAll);
        let mut now = FRAME_MS;
        for _ in 0..30 {
            now += FRAME_MS;
            game.frame(now, &mut audio);
        }
        assert!(game.state().player.body.vel.x.abs() < 0.1);
        assert!(game.state().player.facing_right);
    }

    #[test]
    fn test_shutdown_cancels_timer() {
        let mut game = GameLoop::new(1, Tuning::default());
        let mut audio = SilentAudio;
        confirm(&mut game);
        game.frame(0.0, &mut audio);
        assert!(game.countdown_running());
        game.shutdown();
        assert!(!game.countdown_running());
    }
}
