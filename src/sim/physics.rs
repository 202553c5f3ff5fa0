//! Vertical motion of the frog

use super::state::Player;

/// Result of integrating one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsOutcome {
    InBounds,
    /// Hit the ceiling; position and velocity zeroed
    ClampedTop,
    /// Dropped past the bottom edge; position clamped, run must end
    FellOut,
}

/// Apply gravity and move the frog by its velocity
pub fn integrate(player: &mut Player, gravity: f32, gravity_scale: f32, playfield_height: f32) -> BoundsOutcome {
    player.vel_y += gravity * gravity_scale;
    player.y += player.vel_y;
    clamp_to_playfield(player, playfield_height)
}

/// Keep the frog inside `[0, playfield_height - height]`
pub fn clamp_to_playfield(player: &mut Player, playfield_height: f32) -> BoundsOutcome {
    if player.y < 0.0 {
        player.y = 0.0;
        player.vel_y = 0.0;
        return BoundsOutcome::ClampedTop;
    }

    let floor = playfield_height - player.height;
    if player.y > floor {
        player.y = floor;
        return BoundsOutcome::FellOut;
    }

    BoundsOutcome::InBounds
}

/// Instant upward impulse; replaces the current velocity
pub fn flap(player: &mut Player, impulse: f32) {
    player.vel_y = impulse;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::PlayerTuning;
    use proptest::prelude::*;

    fn player_at(y: f32, vel_y: f32) -> Player {
        let mut player = Player::new(&PlayerTuning::default());
        player.y = y;
        player.vel_y = vel_y;
        player
    }

    #[test]
    fn test_gravity_step() {
        let mut player = player_at(200.0, 0.0);
        let outcome = integrate(&mut player, 0.7, 1.0, 600.0);
        assert_eq!(outcome, BoundsOutcome::InBounds);
        assert!((player.vel_y - 0.7).abs() < 1e-6);
        assert!((player.y - 200.7).abs() < 1e-4);
    }

    #[test]
    fn test_flap_overrides_velocity() {
        let mut player = player_at(200.0, 12.0);
        flap(&mut player, -9.5);
        assert_eq!(player.vel_y, -9.5);
        integrate(&mut player, 0.7, 1.0, 600.0);
        assert!((player.vel_y - (-8.8)).abs() < 1e-5);
    }

    #[test]
    fn test_ceiling_clamps_without_bounce() {
        let mut player = player_at(3.0, -9.5);
        assert_eq!(integrate(&mut player, 0.7, 1.0, 600.0), BoundsOutcome::ClampedTop);
        assert_eq!(player.y, 0.0);
        assert_eq!(player.vel_y, 0.0);
    }

    #[test]
    fn test_falling_out_clamps_to_floor() {
        let mut player = player_at(560.0, 0.0);
        assert_eq!(integrate(&mut player, 0.7, 1.0, 600.0), BoundsOutcome::FellOut);
        assert_eq!(player.y, 560.0);
    }

    proptest! {
        #[test]
        fn prop_position_stays_in_playfield(
            y in -50.0f32..650.0,
            vel in -20.0f32..20.0,
            scale in 0.7f32..3.0,
        ) {
            let mut player = player_at(y, vel);
            integrate(&mut player, 0.7, scale, 600.0);
            prop_assert!(player.y >= 0.0);
            prop_assert!(player.y <= 600.0 - player.height);
        }
    }
}
