//! Audio system using Web Audio API
//!
//! Procedurally generated sound cues - no external files needed. Multi-note
//! cues are scheduled on the audio clock so the caller never waits.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::AudioSink;

/// Notes of the celebration jingle (Hz), 300 ms apart
const FESTIVE_NOTES: [f32; 7] = [523.0, 587.0, 659.0, 523.0, 659.0, 783.0, 659.0];
/// Bell chord (Hz), 200 ms apart
const BELL_NOTES: [f32; 3] = [880.0, 1046.0, 1318.0];

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    settings: Settings,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AudioManager {
    pub fn new(settings: Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            settings: settings.clamped(),
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace preferences, e.g. from the host page's options menu
    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.clamped();
    }

    /// Context ready to play at the given volume, if any
    fn live_context(&self) -> Option<(&AudioContext, f32)> {
        let vol = self.settings.effective_volume();
        if vol <= 0.0 {
            return None;
        }
        let ctx = self.ctx.as_ref()?;

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }
        Some((ctx, vol))
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// One decaying tone: pitch slides down an octave while the gain fades
    fn tone(
        &self,
        ctx: &AudioContext,
        freq: f32,
        duration: f64,
        osc_type: OscillatorType,
        level: f32,
        delay: f64,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };
        let t = ctx.current_time() + delay;

        osc.frequency().set_value_at_time(freq, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(freq / 2.0, t + duration)
            .ok();
        gain.gain().set_value_at_time(level, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + duration)
            .ok();

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + duration).ok();
    }
}

impl AudioSink for AudioManager {
    /// Short square blip
    fn on_jump(&mut self) {
        if let Some((ctx, vol)) = self.live_context() {
            self.tone(ctx, 400.0, 0.1, OscillatorType::Square, vol * 0.1, 0.0);
        }
    }

    /// Two rising sine pings
    fn on_coin(&mut self) {
        if let Some((ctx, vol)) = self.live_context() {
            self.tone(ctx, 900.0, 0.15, OscillatorType::Sine, vol * 0.15, 0.0);
            self.tone(ctx, 1200.0, 0.2, OscillatorType::Sine, vol * 0.15, 0.05);
        }
    }

    /// Low sawtooth buzz
    fn on_hurt(&mut self) {
        if let Some((ctx, vol)) = self.live_context() {
            self.tone(ctx, 150.0, 0.3, OscillatorType::Sawtooth, vol * 0.2, 0.0);
        }
    }

    fn on_bells(&mut self) {
        if let Some((ctx, vol)) = self.live_context() {
            for (i, freq) in BELL_NOTES.iter().enumerate() {
                self.tone(ctx, *freq, 0.5, OscillatorType::Sine, vol * 0.1, i as f64 * 0.2);
            }
        }
    }

    fn on_festive(&mut self) {
        if let Some((ctx, vol)) = self.live_context() {
            for (i, freq) in FESTIVE_NOTES.iter().enumerate() {
                self.tone(ctx, *freq, 0.3, OscillatorType::Triangle, vol * 0.1, i as f64 * 0.3);
            }
        }
    }
}
