//! Collision detection
//!
//! Two kinds of checks run every step: the frog's bounding box against each
//! pipe pair, and the tongue tip against each fly still in the air.

use glam::Vec2;

use super::state::{Fly, Obstacle, Player};

/// Does the frog overlap either half of this pipe pair?
///
/// Only pipes overlapping the frog horizontally are tested vertically.
pub fn pipe_hit(player: &Player, obstacle: &Obstacle, pipe_width: f32, gap: f32) -> bool {
    let pipe_left = obstacle.x;
    let pipe_right = obstacle.x + pipe_width;
    if player.right() <= pipe_left || player.left() >= pipe_right {
        return false;
    }

    player.top() < obstacle.top_height || player.bottom() > obstacle.gap_bottom(gap)
}

/// First pipe the frog collides with, if any
pub fn first_pipe_collision(player: &Player, obstacles: &[Obstacle], pipe_width: f32, gap: f32) -> Option<u32> {
    obstacles
        .iter()
        .find(|o| pipe_hit(player, o, pipe_width, gap))
        .map(|o| o.id)
}

/// Outcome of probing the flies with the tongue tip
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TongueProbe {
    /// A fly is inside the capture radius
    Caught(u32),
    /// Nothing caught, but a fly is inside the proximity radius
    Near(u32),
    Miss,
}

/// Probe uncaught flies around `tip`
///
/// A capture beats any near miss; among captures the first in spawn order
/// wins, among near misses the closest.
pub fn probe_tongue(tip: Vec2, flies: &[Fly], capture_radius: f32, proximity_radius: f32) -> TongueProbe {
    let mut nearest: Option<(u32, f32)> = None;

    for fly in flies.iter().filter(|f| !f.caught) {
        let distance = tip.distance(fly.pos);
        if distance < capture_radius {
            return TongueProbe::Caught(fly.id);
        }
        if distance < proximity_radius && nearest.is_none_or(|(_, d)| distance < d) {
            nearest = Some((fly.id, distance));
        }
    }

    match nearest {
        Some((id, _)) => TongueProbe::Near(id),
        None => TongueProbe::Miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::PlayerTuning;

    fn player_at(y: f32) -> Player {
        let mut player = Player::new(&PlayerTuning::default());
        player.y = y;
        player
    }

    fn pipe(id: u32, x: f32, top_height: f32) -> Obstacle {
        Obstacle {
            id,
            x,
            top_height,
            bottom_height: 600.0 - top_height - 150.0,
            passed: false,
        }
    }

    fn fly(id: u32, x: f32, y: f32) -> Fly {
        let pos = Vec2::new(x, y);
        Fly {
            id,
            pos,
            origin: pos,
            vel: Vec2::ZERO,
            phase: 0.0,
            amplitude: 0.0,
            wobble_speed: 0.0,
            caught: false,
        }
    }

    #[test]
    fn test_frog_inside_gap_is_safe() {
        // Gap spans 100..250, frog spans 150..190
        let player = player_at(150.0);
        assert!(!pipe_hit(&player, &pipe(1, 60.0, 100.0), 52.0, 150.0));
    }

    #[test]
    fn test_frog_hits_top_pipe() {
        let player = player_at(90.0);
        assert!(pipe_hit(&player, &pipe(1, 60.0, 100.0), 52.0, 150.0));
    }

    #[test]
    fn test_frog_hits_bottom_pipe() {
        // Bottom edge 260 > gap bottom 250
        let player = player_at(220.0);
        assert!(pipe_hit(&player, &pipe(1, 60.0, 100.0), 52.0, 150.0));
    }

    #[test]
    fn test_no_horizontal_overlap_no_hit() {
        // Frog spans x 50..90; pipe is further right
        let player = player_at(0.0);
        assert!(!pipe_hit(&player, &pipe(1, 95.0, 300.0), 52.0, 150.0));
        // Pipe already behind the frog
        assert!(!pipe_hit(&player, &pipe(2, -10.0, 300.0), 52.0, 150.0));
    }

    #[test]
    fn test_first_collision_reports_one_pipe() {
        let player = player_at(0.0);
        let pipes = [pipe(1, 300.0, 300.0), pipe(2, 60.0, 300.0), pipe(3, 70.0, 300.0)];
        assert_eq!(first_pipe_collision(&player, &pipes, 52.0, 150.0), Some(2));
        assert_eq!(first_pipe_collision(&player, &[], 52.0, 150.0), None);
    }

    #[test]
    fn test_tongue_catches_close_fly() {
        let flies = [fly(4, 295.0, 103.0)];
        let tip = Vec2::new(290.0, 100.0);
        assert_eq!(probe_tongue(tip, &flies, 15.0, 30.0), TongueProbe::Caught(4));
    }

    #[test]
    fn test_tongue_near_miss() {
        let flies = [fly(4, 310.0, 100.0), fly(5, 300.0, 118.0)];
        let tip = Vec2::new(290.0, 100.0);
        // 20px and ~20.6px away; the closer one is reported
        assert_eq!(probe_tongue(tip, &flies, 15.0, 30.0), TongueProbe::Near(4));
    }

    #[test]
    fn test_caught_flies_are_ignored() {
        let mut caught = fly(4, 290.0, 100.0);
        caught.caught = true;
        assert_eq!(
            probe_tongue(Vec2::new(290.0, 100.0), &[caught], 15.0, 30.0),
            TongueProbe::Miss
        );
    }
}
