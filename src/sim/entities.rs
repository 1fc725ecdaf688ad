//! Per-tick behavior of non-player entities
//!
//! These updaters only move their own entity. Anything that touches the score
//! ledger or the phase is decided in `tick`.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Adversary, Body, FeedbackEffect, SkyLantern, Token};
use crate::consts::*;

/// Outcome of the player touching a live adversary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Landed on top while falling
    Stomp,
    /// Any other touch
    Hit,
}

impl Adversary {
    /// Walk back and forth around the anchor; defeated adversaries only run
    /// out their squash animation
    pub fn patrol(&mut self) {
        if self.defeated {
            self.defeat_timer = self.defeat_timer.saturating_sub(1);
            return;
        }
        self.body.pos.x += self.body.vel.x * self.direction;
        if (self.body.pos.x - self.anchor_x).abs() > self.range {
            self.direction = -self.direction;
        }
    }

    /// Classify an overlap with the player, if any.
    ///
    /// A stomp needs the player falling with its feet above the adversary's
    /// midline, allowing for this tick's fall distance.
    pub fn contact(&self, player: &Body) -> Option<Contact> {
        if self.defeated || !player.aabb().overlaps(&self.body.aabb()) {
            return None;
        }
        let midline = self.body.pos.y + self.body.size.y / 2.0;
        if player.vel.y > 0.0 && player.bottom() < midline + player.vel.y {
            Some(Contact::Stomp)
        } else {
            Some(Contact::Hit)
        }
    }

    pub fn defeat(&mut self) {
        self.defeated = true;
        self.defeat_timer = DEFEAT_ANIM_TICKS;
    }
}

impl Token {
    /// Only uncollected tokens are drawn spinning
    pub fn spin(&mut self) {
        if !self.collected {
            self.rotation += TOKEN_SPIN_RATE;
        }
    }

    /// Mark collected if the player overlaps it. Returns true exactly once.
    pub fn try_collect(&mut self, player: &Body) -> bool {
        if self.collected || !player.aabb().overlaps(&self.body.aabb()) {
            return false;
        }
        self.collected = true;
        true
    }
}

/// Float feedback text upward, fade it, and drop the expired ones
pub fn update_effects(effects: &mut Vec<FeedbackEffect>) {
    effects.retain_mut(|e| {
        e.pos.y -= EFFECT_RISE;
        e.life -= EFFECT_DECAY;
        e.life > 0.0
    });
}

/// Drift sky lanterns upward with a cosmetic sway
pub fn update_sky_lanterns(
    lanterns: &mut [SkyLantern],
    clock_ms: f64,
    recycle: bool,
    rng: &mut Pcg32,
) {
    let t = (clock_ms / 1500.0) as f32;
    for lantern in lanterns.iter_mut() {
        lantern.pos.y -= lantern.speed;
        lantern.pos.x += lantern.drift + (t + lantern.flicker).sin() * 0.5;
        lantern.flicker += SKY_LANTERN_FLICKER_RATE;
        if recycle && lantern.pos.y < SKY_LANTERN_RECYCLE_Y {
            lantern.pos.y = VIEW_HEIGHT + 20.0;
            lantern.pos.x = rng.random_range(0.0..VIEW_WIDTH);
        }
    }
}

/// Next height of the ceremonial pole lantern
pub fn raise_victory_lantern(y: f32) -> f32 {
    if y > VICTORY_LANTERN_TARGET_Y {
        y - VICTORY_LANTERN_RISE
    } else {
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;

    use crate::sim::state::EffectKind;

    fn adversary_at(x: f32) -> Adversary {
        let mut body = Body::new(x, 380.0, ADVERSARY_SIZE, ADVERSARY_SIZE);
        body.vel.x = ADVERSARY_SPEED;
        Adversary {
            body,
            label: "Glitch".into(),
            anchor_x: x,
            range: 3.0,
            direction: 1.0,
            defeated: false,
            defeat_timer: 0,
        }
    }

    #[test]
    fn test_patrol_turns_past_half_range() {
        let mut a = adversary_at(100.0);
        a.patrol(); // 101.5
        a.patrol(); // 103.0
        assert_eq!(a.direction, 1.0);
        a.patrol(); // 104.5 > 3 away
        assert_eq!(a.direction, -1.0);
        a.patrol();
        assert_eq!(a.body.pos.x, 103.0);
    }

    #[test]
    fn test_defeated_adversary_stands_still_and_counts_down() {
        let mut a = adversary_at(100.0);
        a.defeat();
        a.patrol();
        assert_eq!(a.body.pos.x, 100.0);
        assert_eq!(a.defeat_timer, DEFEAT_ANIM_TICKS - 1);
        for _ in 0..100 {
            a.patrol();
        }
        assert_eq!(a.defeat_timer, 0);
    }

    #[test]
    fn test_falling_onto_top_is_a_stomp() {
        let a = adversary_at(100.0);
        let mut player = Body::new(100.0, 380.0 - 46.0 + 4.0, 34.0, 46.0);
        player.vel.y = 5.0;
        assert_eq!(a.contact(&player), Some(Contact::Stomp));
    }

    #[test]
    fn test_rising_or_side_touch_is_a_hit() {
        let a = adversary_at(100.0);
        let mut rising = Body::new(100.0, 380.0 - 46.0 + 4.0, 34.0, 46.0);
        rising.vel.y = -2.0;
        assert_eq!(a.contact(&rising), Some(Contact::Hit));

        let mut side = Body::new(70.0, 370.0, 34.0, 46.0);
        side.vel = Vec2::new(3.0, 0.0);
        assert_eq!(a.contact(&side), Some(Contact::Hit));
    }

    #[test]
    fn test_defeated_adversary_has_no_contact() {
        let mut a = adversary_at(100.0);
        a.defeat();
        let player = Body::new(100.0, 380.0, 34.0, 46.0);
        assert_eq!(a.contact(&player), None);
    }

    #[test]
    fn test_token_collects_once_and_stops_spinning() {
        let mut token = Token {
            body: Body::new(0.0, 0.0, TOKEN_SIZE, TOKEN_SIZE),
            label: "Swift".into(),
            collected: false,
            rotation: 0.0,
        };
        token.spin();
        assert_eq!(token.rotation, TOKEN_SPIN_RATE);

        let player = Body::new(10.0, 10.0, 34.0, 46.0);
        assert!(token.try_collect(&player));
        assert!(!token.try_collect(&player));
        token.spin();
        assert_eq!(token.rotation, TOKEN_SPIN_RATE);
    }

    #[test]
    fn test_effects_rise_and_expire() {
        let mut effects = vec![FeedbackEffect {
            pos: Vec2::new(0.0, 100.0),
            text: "+500".into(),
            sub_text: None,
            life: 0.02,
            kind: EffectKind::Adversary,
            rotation: None,
        }];
        update_effects(&mut effects);
        assert_eq!(effects.len(), 1);
        assert!((effects[0].pos.y - (100.0 - EFFECT_RISE)).abs() < 1e-4);
        update_effects(&mut effects);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_lanterns_recycle_only_when_allowed() {
        let mut rng = Pcg32::seed_from_u64(1);
        let lantern = SkyLantern {
            pos: Vec2::new(10.0, -149.0),
            speed: 2.0,
            size: 12.0,
            flicker: 0.0,
            drift: 0.0,
        };

        let mut kept = vec![lantern.clone()];
        update_sky_lanterns(&mut kept, 0.0, false, &mut rng);
        assert!(kept[0].pos.y < SKY_LANTERN_RECYCLE_Y);

        let mut wrapped = vec![lantern];
        update_sky_lanterns(&mut wrapped, 0.0, true, &mut rng);
        assert_eq!(wrapped[0].pos.y, VIEW_HEIGHT + 20.0);
    }

    #[test]
    fn test_victory_lantern_stops_at_target() {
        let mut y = VICTORY_LANTERN_TARGET_Y + 2.0;
        y = raise_victory_lantern(y);
        assert_eq!(y, VICTORY_LANTERN_TARGET_Y + 0.5);
        y = raise_victory_lantern(y);
        let settled = raise_victory_lantern(y);
        assert_eq!(settled, y);
    }
}
