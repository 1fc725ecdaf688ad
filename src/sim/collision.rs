//! Axis-aligned box collision
//!
//! Every solid and every entity is a rectangle. Platform contacts are resolved
//! along the axis of least penetration, one platform at a time, in list order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box (`pos` is the top-left corner, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Penetration depth on each axis, measured from the nearer edge pair
    pub fn penetration(&self, other: &Aabb) -> Vec2 {
        Vec2::new(
            (self.right() - other.left()).min(other.right() - self.left()),
            (self.bottom() - other.top()).min(other.bottom() - self.top()),
        )
    }
}

/// How a mover was pushed out of a platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Pushed sideways; horizontal velocity killed
    Wall,
    /// Pushed up onto the top face; grounded
    Landed,
    /// Pushed down out of the bottom face
    HeadBump,
}

/// Push a moving box out of one static box along the smaller overlap axis.
///
/// Returns `None` when the boxes do not overlap. Velocity is adjusted in
/// place: a wall zeroes `vel.x`, a landing zeroes `vel.y`, a head bump sets
/// `vel.y` to `bump_vy`.
pub fn resolve_platform(
    pos: &mut Vec2,
    vel: &mut Vec2,
    size: Vec2,
    solid: &Aabb,
    bump_vy: f32,
) -> Option<Resolution> {
    let mover = Aabb::new(*pos, size);
    if !mover.overlaps(solid) {
        return None;
    }

    let depth = mover.penetration(solid);
    if depth.x < depth.y {
        if pos.x < solid.left() {
            pos.x -= depth.x;
        } else {
            pos.x += depth.x;
        }
        vel.x = 0.0;
        Some(Resolution::Wall)
    } else if pos.y < solid.top() {
        pos.y -= depth.y;
        vel.y = 0.0;
        Some(Resolution::Landed)
    } else {
        pos.y += depth.y;
        vel.y = bump_vy;
        Some(Resolution::HeadBump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: Vec2 = Vec2::new(34.0, 46.0);

    fn block() -> Aabb {
        Aabb::from_xywh(100.0, 200.0, 32.0, 32.0)
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::from_xywh(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Aabb::from_xywh(9.9, 9.9, 1.0, 1.0)));
    }

    #[test]
    fn test_lands_on_top_face() {
        let mut pos = Vec2::new(105.0, 200.0 - PLAYER.y + 3.0);
        let mut vel = Vec2::new(1.0, 3.0);
        let hit = resolve_platform(&mut pos, &mut vel, PLAYER, &block(), 1.0);
        assert_eq!(hit, Some(Resolution::Landed));
        assert_eq!(pos.y + PLAYER.y, 200.0);
        assert_eq!(vel, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_bumps_head_on_bottom_face() {
        let mut pos = Vec2::new(105.0, 230.0);
        let mut vel = Vec2::new(0.0, -6.0);
        let hit = resolve_platform(&mut pos, &mut vel, PLAYER, &block(), 1.0);
        assert_eq!(hit, Some(Resolution::HeadBump));
        assert_eq!(pos.y, 232.0);
        assert_eq!(vel.y, 1.0);
    }

    #[test]
    fn test_pushed_out_of_side() {
        let mut pos = Vec2::new(100.0 - PLAYER.x + 2.0, 190.0);
        let mut vel = Vec2::new(4.0, 0.0);
        let hit = resolve_platform(&mut pos, &mut vel, PLAYER, &block(), 1.0);
        assert_eq!(hit, Some(Resolution::Wall));
        assert_eq!(pos.x + PLAYER.x, 100.0);
        assert_eq!(vel.x, 0.0);
    }

    #[test]
    fn test_no_overlap_is_untouched() {
        let mut pos = Vec2::new(0.0, 0.0);
        let mut vel = Vec2::new(2.0, 2.0);
        assert_eq!(resolve_platform(&mut pos, &mut vel, PLAYER, &block(), 1.0), None);
        assert_eq!(vel, Vec2::new(2.0, 2.0));
    }
}
