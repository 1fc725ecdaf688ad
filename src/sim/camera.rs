//! Horizontal camera tracking

/// Scroll offset that centers `player_x`, clamped so the view never leaves
/// `[0, level_width]`
pub fn follow(player_x: f32, level_width: f32, view_width: f32) -> f32 {
    let max = (level_width - view_width).max(0.0);
    (player_x - view_width / 2.0).clamp(0.0, max)
}
