//! Frame-driven simulation tick and game state transitions
//!
//! `on_frame` is called once per animation frame with the platform timestamp.
//! It gates and sizes the physics step, advances tongue retraction on every
//! frame, and runs at most one simulation step.

use super::clock::{FrameTiming, LoopToken};
use super::collision::{TongueProbe, first_pipe_collision, probe_tongue};
use super::physics::{self, BoundsOutcome};
use super::spawn::{advance_flies, drift_clouds, run_spawners, scroll_obstacles};
use super::state::{GameEvent, GamePhase, GameState, InputKind, OverReason};
use super::tongue::{RetractCause, auto_target, select_target};

/// Whether the caller should schedule another animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// Session ended or the token is stale
    Stop,
}

/// Begin a fresh run from `NotStarted` or `Over`
///
/// Resets every per-run field and starts a new loop chain, invalidating any
/// callback still scheduled by the previous one.
pub fn start(state: &mut GameState) -> LoopToken {
    state.reset_run();
    state.phase = GamePhase::Running;
    let token = state.chain.start();
    state.emit(GameEvent::Started);
    log::info!(
        "Run started (seed {}, loop generation {}, best {})",
        state.seed,
        token.generation(),
        state.stats.high_score
    );
    token
}

/// Route one player input
///
/// Returns the new loop token when the input (re)started the game; the
/// platform must schedule the first frame with it.
pub fn handle_input(state: &mut GameState, input: InputKind, now: f64) -> Option<LoopToken> {
    match (input, state.phase) {
        (InputKind::Start | InputKind::Flap, GamePhase::NotStarted | GamePhase::Over) => Some(start(state)),
        (InputKind::Start, GamePhase::Running) => None,
        (InputKind::Flap, GamePhase::Running) => {
            physics::flap(&mut state.player, state.tuning.player.flap_impulse);
            state.stats.flap_count += 1;
            state.emit(GameEvent::Flapped);
            None
        }
        (InputKind::TongueExtend, GamePhase::Running) => {
            let target = select_target(
                state.player.mouth(),
                state.player.x,
                &state.flies,
                state.tuning.tongue.reach,
            )
            .map(|fly| fly.id);
            extend_tongue(state, now, target);
            None
        }
        (InputKind::TongueExtend, _) => None,
    }
}

/// Shoot the tongue at fly `target` (or straight ahead without one)
fn extend_tongue(state: &mut GameState, now: f64, target: Option<u32>) -> bool {
    if !state.tuning.enable_collectibles {
        return false;
    }
    let mouth = state.player.mouth();
    let fly = target.and_then(|id| state.flies.iter().find(|f| f.id == id));
    let extended = state.tongue.try_extend(now, mouth, fly, &state.tuning.tongue);
    if !extended {
        log::debug!("Tongue extension rejected (out or cooling down)");
    }
    extended
}

/// Handle one animation frame for the chain identified by `token`
pub fn on_frame(state: &mut GameState, token: LoopToken, timestamp: f64) -> FrameOutcome {
    if !state.chain.is_current(token) || !state.is_running() {
        return FrameOutcome::Stop;
    }

    state.stats.frame_count += 1;
    state.frame_stats.record(timestamp);

    let timing = state.clock.advance(timestamp, &state.tuning.frame);
    if timing == FrameTiming::Bootstrap {
        return FrameOutcome::Continue;
    }

    // Retraction runs on every frame, throttled or not; it only reads the frog
    let mouth = state.player.mouth();
    if state.tongue.retract_step(timestamp, mouth, &state.tuning.tongue) {
        state.emit(GameEvent::TongueRetracted);
    }

    if let FrameTiming::Step {
        elapsed,
        gravity_scale,
        ..
    } = timing
    {
        step(state, timestamp, elapsed, gravity_scale);
    }

    if state.chain.is_current(token) {
        FrameOutcome::Continue
    } else {
        FrameOutcome::Stop
    }
}

/// One simulation step: physics, spawning, scrolling, collisions, tongue
///
/// `elapsed` is the unclamped time since the previous step; clouds hold
/// still when it exceeds the skip threshold.
pub fn step(state: &mut GameState, now: f64, elapsed: f64, gravity_scale: f32) {
    if !state.is_running() {
        return;
    }
    state.stats.steps += 1;

    let outcome = physics::integrate(
        &mut state.player,
        state.tuning.player.gravity,
        gravity_scale,
        state.tuning.playfield.height,
    );
    if outcome == BoundsOutcome::FellOut {
        end_game(state, OverReason::FellOut);
        return;
    }

    run_spawners(state, now);

    let passed = scroll_obstacles(state);
    if passed > 0 {
        add_score(state, passed);
    }
    advance_flies(state);
    drift_clouds(state, now, elapsed);

    let pipes = &state.tuning.pipes;
    if let Some(id) = first_pipe_collision(&state.player, &state.obstacles, pipes.width, pipes.gap) {
        log::debug!("Frog hit pipe {}", id);
        end_game(state, OverReason::HitPipe);
        return;
    }

    if state.tuning.enable_collectibles {
        step_tongue(state, now);
    }
}

fn step_tongue(state: &mut GameState, now: f64) {
    let mouth = state.player.mouth();
    let tuning = &state.tuning.tongue;

    if tuning.auto_trigger && !state.tongue.is_extended() && !state.tongue.on_cooldown(now) {
        if let Some(id) = auto_target(mouth, state.player.x, &state.flies, tuning) {
            extend_tongue(state, now, Some(id));
        }
    }

    let tuning = &state.tuning.tongue;
    if !state.tongue.is_extended() || state.tongue.is_retracting() {
        return;
    }

    let full = state.tongue.extend_step(mouth, tuning);
    match probe_tongue(state.tongue.tip(), &state.flies, tuning.capture_radius, tuning.proximity_radius) {
        TongueProbe::Caught(id) => {
            catch_fly(state, id);
            state.tongue.begin_retract(now, RetractCause::Caught { fly: id });
        }
        TongueProbe::Near(id) => {
            state.emit(GameEvent::FlyNear { id });
            if full {
                state.tongue.begin_retract(now, RetractCause::MaxLength);
            }
        }
        TongueProbe::Miss => {
            if full {
                state.tongue.begin_retract(now, RetractCause::MaxLength);
            }
        }
    }
}

/// Mark a fly caught and award the bonus; unknown or already caught ids are ignored
fn catch_fly(state: &mut GameState, id: u32) {
    let Some(fly) = state.flies.iter_mut().find(|f| f.id == id && !f.caught) else {
        return;
    };
    fly.caught = true;
    let bonus = state.tuning.flies.catch_bonus;
    state.stats.flies_caught += 1;
    state.emit(GameEvent::FlyCaught { id, bonus });
    add_score(state, bonus);
    log::debug!("Caught fly {} (+{})", id, bonus);
}

fn add_score(state: &mut GameState, points: u32) {
    state.stats.score = state.stats.score.saturating_add(points);
    state.emit(GameEvent::ScoreChanged(state.stats.score));
}

/// Transition `Running -> Over`; no-op in any other phase
///
/// Stops the loop chain and folds the score into the high score. Returns
/// whether the transition happened.
pub fn end_game(state: &mut GameState, reason: OverReason) -> bool {
    if state.phase != GamePhase::Running {
        return false;
    }
    state.phase = GamePhase::Over;
    state.chain.cancel();

    let score = state.stats.score;
    let new_record = score > state.stats.high_score;
    if new_record {
        state.stats.high_score = score;
        log::info!("New high score: {}", score);
    }
    state.emit(GameEvent::GameOver {
        reason,
        score,
        high_score: state.stats.high_score,
        new_record,
    });
    log::info!("Game over ({:?}), final score {}", reason, score);
    true
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::sim::state::{Fly, Obstacle};
    use crate::sim::tongue::TonguePhase;
    use crate::tuning::Tuning;

    const FRAME: f64 = 1000.0 / 60.0;

    /// Start a run and consume the bootstrap frame at t=0
    fn running(tuning: Tuning) -> (GameState, LoopToken) {
        let mut state = GameState::new(tuning, 42, 0);
        let token = handle_input(&mut state, InputKind::Start, 0.0).expect("starts");
        assert_eq!(on_frame(&mut state, token, 0.0), FrameOutcome::Continue);
        (state, token)
    }

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.enable_collectibles = false;
        tuning
    }

    #[test]
    fn test_bootstrap_frame_does_not_step() {
        let (state, _) = running(Tuning::default());
        assert_eq!(state.stats.steps, 0);
        assert_eq!(state.player.y, crate::consts::PLAYER_START_Y);
    }

    #[test]
    fn test_first_step_spawns_pipe_and_falls() {
        let (mut state, token) = running(quiet_tuning());
        on_frame(&mut state, token, FRAME);
        assert_eq!(state.stats.steps, 1);
        assert_eq!(state.obstacles.len(), 1);
        assert!(state.player.y > crate::consts::PLAYER_START_Y);
    }

    #[test]
    fn test_flap_only_while_running() {
        let mut state = GameState::new(Tuning::default(), 1, 0);
        // Flap on the title screen starts the game instead
        assert!(handle_input(&mut state, InputKind::Flap, 0.0).is_some());
        assert_eq!(state.phase, GamePhase::Running);

        assert!(handle_input(&mut state, InputKind::Flap, 5.0).is_none());
        assert_eq!(state.player.vel_y, crate::consts::FLAP_IMPULSE);
        assert_eq!(state.stats.flap_count, 1);
        assert!(state.pending_events().contains(&GameEvent::Flapped));
    }

    #[test]
    fn test_fall_out_ends_game_once() {
        let (mut state, token) = running(quiet_tuning());
        state.player.y = 560.0;
        state.player.vel_y = 0.0;

        on_frame(&mut state, token, FRAME);
        assert_eq!(state.phase, GamePhase::Over);
        assert_eq!(state.player.y, 560.0);
        assert!(!state.chain.is_active());

        // Post-Over checks do nothing further
        assert!(!end_game(&mut state, OverReason::FellOut));
        assert_eq!(on_frame(&mut state, token, 2.0 * FRAME), FrameOutcome::Stop);
        let game_overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_pipe_collision_ends_game() {
        let (mut state, token) = running(quiet_tuning());
        state.obstacles.push(Obstacle {
            id: 900,
            x: 60.0,
            top_height: 400.0,
            bottom_height: 50.0,
            passed: false,
        });
        on_frame(&mut state, token, FRAME);
        assert_eq!(state.phase, GamePhase::Over);
        assert!(state.pending_events().iter().any(|e| matches!(
            e,
            GameEvent::GameOver {
                reason: OverReason::HitPipe,
                ..
            }
        )));
    }

    #[test]
    fn test_high_score_tracks_best() {
        let mut state = GameState::new(quiet_tuning(), 3, 10);
        start(&mut state);
        state.stats.score = 7;
        end_game(&mut state, OverReason::HitPipe);
        assert_eq!(state.stats.high_score, 10);

        start(&mut state);
        state.stats.score = 15;
        end_game(&mut state, OverReason::HitPipe);
        assert_eq!(state.stats.high_score, 15);
        assert!(state.drain_events().contains(&GameEvent::GameOver {
            reason: OverReason::HitPipe,
            score: 15,
            high_score: 15,
            new_record: true,
        }));
    }

    #[test]
    fn test_restart_resets_session() {
        let (mut state, old_token) = running(Tuning::default());
        for i in 1..200 {
            state.player.y = 200.0;
            on_frame(&mut state, old_token, i as f64 * FRAME);
        }
        state.stats.score = 9;
        end_game(&mut state, OverReason::HitPipe);

        let token = handle_input(&mut state, InputKind::Start, 10_000.0).expect("restarts");
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.stats.score, 0);
        assert!(state.obstacles.is_empty());
        assert!(state.flies.is_empty());
        assert!(state.clouds.is_empty());
        assert!(!state.tongue.is_extended());
        assert_eq!(state.player.y, crate::consts::PLAYER_START_Y);
        assert_eq!(state.player.vel_y, 0.0);

        // Callbacks from the old chain are stale
        assert_eq!(on_frame(&mut state, old_token, 10_016.0), FrameOutcome::Stop);
        assert_eq!(on_frame(&mut state, token, 10_016.0), FrameOutcome::Continue);
    }

    #[test]
    fn test_start_while_running_is_ignored() {
        let (mut state, token) = running(Tuning::default());
        assert!(handle_input(&mut state, InputKind::Start, 5.0).is_none());
        assert!(state.chain.is_current(token));
    }

    #[test]
    fn test_tongue_catches_fly() {
        let mut tuning = Tuning::default();
        tuning.tongue.max_length = 250.0;
        tuning.tongue.auto_trigger = false;
        let (mut state, token) = running(tuning);

        // Mouth at (90, 100); after one extension step the tip sits at (290, 100)
        state.player.y = 80.0;
        state.player.vel_y = -0.7;
        state.tongue.phase = TonguePhase::Extending;
        state.tongue.anchor = Vec2::new(90.0, 100.0);
        state.tongue.length = 188.0;
        state.spawner.flies.interval = f64::MAX;
        state.spawner.flies.try_fire(0.0);
        let pos = Vec2::new(295.0, 103.0);
        state.flies.push(Fly {
            id: 500,
            pos,
            origin: pos,
            vel: Vec2::ZERO,
            phase: 0.0,
            amplitude: 0.0,
            wobble_speed: 0.0,
            caught: false,
        });

        on_frame(&mut state, token, FRAME);
        assert!(state.flies.iter().find(|f| f.id == 500).is_some_and(|f| f.caught));
        assert_eq!(state.stats.score, 3);
        assert_eq!(state.tongue.phase(), TonguePhase::Retracting);

        // Caught flies are cleared on the next step
        on_frame(&mut state, token, 2.0 * FRAME);
        assert!(state.flies.iter().all(|f| f.id != 500));
    }

    #[test]
    fn test_retraction_advances_on_throttled_frames() {
        let (mut state, token) = running(quiet_tuning());
        state.tuning.enable_collectibles = true;
        state.tongue.phase = TonguePhase::Extending;
        state.tongue.length = 100.0;
        state.tongue.begin_retract(0.0, RetractCause::MaxLength);

        // 4ms after the bootstrap frame: throttled, but retraction still moves
        on_frame(&mut state, token, 4.0);
        assert_eq!(state.stats.steps, 0);
        assert_eq!(state.tongue.length, 100.0 - crate::consts::TONGUE_RETRACT_SPEED);
    }

    #[test]
    fn test_auto_trigger_aims_at_approaching_fly() {
        let (mut state, token) = running(Tuning::default());
        state.spawner.flies.interval = f64::MAX;
        state.spawner.flies.try_fire(0.0);
        state.player.y = 200.0;
        state.player.vel_y = -0.7;

        // Mouth lands near (90, 220); the hovering fly scores better but only
        // the approaching one may trip the automatic trigger
        let hover = Vec2::new(150.0, 222.0);
        let approach = Vec2::new(180.0, 245.0);
        state.flies.push(Fly {
            id: 1,
            pos: approach,
            origin: approach,
            vel: Vec2::new(-2.0, 0.0),
            phase: 0.0,
            amplitude: 0.0,
            wobble_speed: 0.0,
            caught: false,
        });
        state.flies.push(Fly {
            id: 2,
            pos: hover,
            origin: hover,
            vel: Vec2::ZERO,
            phase: 0.0,
            amplitude: 0.0,
            wobble_speed: 0.0,
            caught: false,
        });

        on_frame(&mut state, token, FRAME);
        assert!(state.tongue.is_extended());
        assert_eq!(state.tongue.target, Some(1));
        assert!(state.tongue.aim_offset > 0.0);
    }

    #[test]
    fn test_clouds_hold_still_after_long_step() {
        let (mut state, token) = running(quiet_tuning());
        on_frame(&mut state, token, 50.0);
        assert_eq!(state.clouds.len(), 1);
        let x = state.clouds[0].x;

        // Throttled frame 5ms later, then a step 65ms after the previous one
        on_frame(&mut state, token, 55.0);
        on_frame(&mut state, token, 115.0);
        assert_eq!(state.stats.steps, 2);
        assert_eq!(state.clouds[0].x, x);

        on_frame(&mut state, token, 115.0 + FRAME);
        assert!(state.clouds[0].x > x);
    }

    #[test]
    fn test_tongue_input_ignored_when_collectibles_disabled() {
        let (mut state, _) = running(quiet_tuning());
        handle_input(&mut state, InputKind::TongueExtend, 1.0);
        assert!(!state.tongue.is_extended());
    }

    #[test]
    fn test_tongue_input_extends_while_running() {
        let (mut state, _) = running(Tuning::default());
        handle_input(&mut state, InputKind::TongueExtend, 1.0);
        assert_eq!(state.tongue.phase(), TonguePhase::Extending);
        // Second request while out is rejected without disturbing it
        handle_input(&mut state, InputKind::TongueExtend, 2.0);
        assert_eq!(state.tongue.phase(), TonguePhase::Extending);
    }

    #[test]
    fn test_same_seed_same_run() {
        let play = |seed: u64| {
            let mut state = GameState::new(Tuning::default(), seed, 0);
            let token = start(&mut state);
            for i in 0..300 {
                if i % 20 == 0 {
                    handle_input(&mut state, InputKind::Flap, i as f64 * FRAME);
                }
                on_frame(&mut state, token, i as f64 * FRAME);
            }
            (state.player.y, state.stats.score, state.obstacles.len(), state.flies.len())
        };
        assert_eq!(play(1), play(1));
    }

    proptest! {
        #[test]
        fn prop_session_invariants(
            seed in any::<u64>(),
            flaps in proptest::collection::vec(any::<bool>(), 1..400),
            jitter in proptest::collection::vec(4.0f64..60.0, 400),
        ) {
            let mut state = GameState::new(Tuning::default(), seed, 0);
            let token = start(&mut state);
            let mut now = 0.0;
            let mut last_score = 0;

            for (i, flap) in flaps.iter().enumerate() {
                now += jitter[i];
                if *flap && state.player.vel_y > 0.0 {
                    handle_input(&mut state, InputKind::Flap, now);
                }
                if i % 7 == 0 {
                    handle_input(&mut state, InputKind::TongueExtend, now);
                }
                let outcome = on_frame(&mut state, token, now);

                let floor = state.tuning.playfield.height - state.player.height;
                prop_assert!(state.player.y >= 0.0 && state.player.y <= floor);
                prop_assert!(state.stats.score >= last_score);
                last_score = state.stats.score;
                prop_assert!(state.obstacles.len() <= 5);
                prop_assert!(state.flies.len() <= 8);
                prop_assert!(!(state.tongue.is_extended() && state.tongue.on_cooldown(now)));
                for pipe in &state.obstacles {
                    prop_assert_eq!(pipe.top_height + state.tuning.pipes.gap + pipe.bottom_height, 600.0);
                }
                if outcome == FrameOutcome::Stop {
                    prop_assert_eq!(state.phase, GamePhase::Over);
                    prop_assert_eq!(state.stats.high_score, state.stats.score);
                    break;
                }
            }
        }
    }
}
