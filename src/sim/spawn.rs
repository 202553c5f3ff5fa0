//! Entity spawning and lifecycle
//!
//! Pipes, flies and clouds are created on wall-clock timers, bounded by
//! population caps, moved once per simulation step and dropped once they leave
//! the playfield.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Cloud, CloudSize, Fly, GameEvent, GameState, Obstacle};
use crate::tuning::{FlyTuning, Tuning};

/// Time gate for one entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTimer {
    last: Option<f64>,
    /// Minimum time between spawns (ms)
    pub interval: f64,
}

impl SpawnTimer {
    pub fn new(interval: f64) -> Self {
        Self { last: None, interval }
    }

    /// Never fired, or the interval has elapsed since the last firing
    pub fn ready(&self, now: f64) -> bool {
        self.last.is_none_or(|last| now - last > self.interval)
    }

    /// Fire if ready; returns whether it fired
    pub fn try_fire(&mut self, now: f64) -> bool {
        if !self.ready(now) {
            return false;
        }
        self.last = Some(now);
        true
    }
}

/// Timers for every spawned entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub pipes: SpawnTimer,
    pub flies: SpawnTimer,
    /// Interval re-rolled after each cloud
    pub clouds: SpawnTimer,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pipes: SpawnTimer::new(tuning.pipes.interval_ms),
            flies: SpawnTimer::new(tuning.flies.interval_ms),
            clouds: SpawnTimer::new(tuning.clouds.min_interval_ms),
        }
    }
}

/// Top and bottom pipe heights for a random draw in `[0, 1)`
///
/// Heights snap to whole pixels so `top + gap + bottom` is exactly the
/// playfield height.
pub fn obstacle_heights(playfield_height: f32, gap: f32, min_height: f32, draw: f32) -> (f32, f32) {
    let available = playfield_height - gap - 2.0 * min_height;
    let top = (min_height + draw * available).floor();
    let bottom = playfield_height - top - gap;
    (top, bottom)
}

/// Spawn a pipe pair at the right edge unless at the cap
pub fn spawn_obstacle(state: &mut GameState) -> Option<u32> {
    let pipes = &state.tuning.pipes;
    if state.obstacles.len() >= pipes.max_count {
        log::debug!("Pipe cap reached ({}), spawn dropped", pipes.max_count);
        return None;
    }

    let draw: f32 = state.rng.random();
    let (top_height, bottom_height) =
        obstacle_heights(state.tuning.playfield.height, pipes.gap, pipes.min_height, draw);
    let x = state.tuning.playfield.width;

    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        x,
        top_height,
        bottom_height,
        passed: false,
    });
    log::debug!("Pipe {} spawned (top {}, bottom {})", id, top_height, bottom_height);
    Some(id)
}

/// Fly placement strategies, tried in list order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inside the gap of the newest pipe ahead of the frog
    ObstacleGap,
    /// Anywhere along the right side
    RightEdge,
    /// Entering from the top or bottom edge
    VerticalEdge,
}

#[derive(Debug, Clone, Copy)]
pub struct WeightedPlacement {
    pub placement: Placement,
    pub weight: f32,
}

/// Ordered strategy list; `RightEdge` never fails so the walk always ends
pub fn placement_order(flies: &FlyTuning) -> [WeightedPlacement; 3] {
    [
        WeightedPlacement {
            placement: Placement::ObstacleGap,
            weight: flies.gap_weight,
        },
        WeightedPlacement {
            placement: Placement::RightEdge,
            weight: flies.right_edge_weight,
        },
        WeightedPlacement {
            placement: Placement::VerticalEdge,
            weight: flies.vertical_edge_weight,
        },
    ]
}

/// Index of the strategy a roll in `[0, 1)` lands on
pub fn pick_weighted(order: &[WeightedPlacement], roll: f32) -> usize {
    let total: f32 = order.iter().map(|w| w.weight).sum();
    let mut target = roll * total;
    for (i, entry) in order.iter().enumerate() {
        if target < entry.weight {
            return i;
        }
        target -= entry.weight;
    }
    order.len() - 1
}

/// Starting position and drift of a new fly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyPlacement {
    pub placement: Placement,
    pub pos: Vec2,
    pub vel: Vec2,
}

fn place_with<R: Rng>(
    placement: Placement,
    rng: &mut R,
    tuning: &Tuning,
    obstacles: &[Obstacle],
    frog_right: f32,
) -> Option<FlyPlacement> {
    let width = tuning.playfield.width;
    let height = tuning.playfield.height;
    let flies = &tuning.flies;
    let speed = rng.random_range(flies.min_speed..=flies.max_speed);

    match placement {
        Placement::ObstacleGap => {
            let pipe_width = tuning.pipes.width;
            let gap = tuning.pipes.gap;
            let anchor = obstacles.iter().rev().find(|o| o.x + pipe_width > frog_right)?;

            let mut y = anchor.gap_center(gap);
            if rng.random_bool(flies.gap_offset_chance.clamp(0.0, 1.0)) {
                let max_offset = gap * flies.gap_offset_fraction;
                if max_offset > 0.0 {
                    y += rng.random_range(-max_offset..=max_offset);
                }
            }
            let y = y.clamp(flies.margin, height - flies.margin);

            Some(FlyPlacement {
                placement,
                pos: Vec2::new(anchor.x + pipe_width * 0.5, y),
                // Rides along with its pipe
                vel: Vec2::new(-tuning.pipes.speed, 0.0),
            })
        }
        Placement::RightEdge => {
            let x = rng.random_range(width * 0.75..=width + flies.margin);
            let y = rng.random_range(flies.margin..=height - flies.margin);
            Some(FlyPlacement {
                placement,
                pos: Vec2::new(x, y),
                vel: Vec2::new(-speed, 0.0),
            })
        }
        Placement::VerticalEdge => {
            let x = rng.random_range(width * 0.4..=width);
            let climb = rng.random_range(0.8f32..=1.6);
            let (y, vy) = if rng.random_bool(0.5) {
                (-flies.margin, climb)
            } else {
                (height + flies.margin, -climb)
            };
            Some(FlyPlacement {
                placement,
                pos: Vec2::new(x, y),
                vel: Vec2::new(-speed * 0.5, vy),
            })
        }
    }
}

/// Choose a placement: weighted pick, then walk the list until one succeeds
pub fn place_fly<R: Rng>(rng: &mut R, tuning: &Tuning, obstacles: &[Obstacle], frog_right: f32) -> FlyPlacement {
    let order = placement_order(&tuning.flies);
    let start = pick_weighted(&order, rng.random());

    for offset in 0..order.len() {
        let placement = order[(start + offset) % order.len()].placement;
        if let Some(found) = place_with(placement, rng, tuning, obstacles, frog_right) {
            return found;
        }
    }

    // Unreachable in practice: RightEdge always succeeds
    FlyPlacement {
        placement: Placement::RightEdge,
        pos: Vec2::new(tuning.playfield.width, tuning.playfield.height * 0.5),
        vel: Vec2::new(-tuning.flies.min_speed, 0.0),
    }
}

/// Spawn a fly unless at the cap or collectibles are disabled
pub fn spawn_fly(state: &mut GameState) -> Option<u32> {
    if !state.tuning.enable_collectibles || state.flies.len() >= state.tuning.flies.max_count {
        return None;
    }

    let placement = place_fly(
        &mut state.rng,
        &state.tuning,
        &state.obstacles,
        state.player.right(),
    );
    let flies = &state.tuning.flies;
    let phase = state.rng.random_range(0.0..std::f32::consts::TAU);
    let amplitude = state.rng.random_range(flies.min_amplitude..=flies.max_amplitude);
    let wobble_speed = state.rng.random_range(flies.min_wobble..=flies.max_wobble);

    let id = state.next_entity_id();
    state.flies.push(Fly {
        id,
        pos: placement.pos,
        origin: placement.pos,
        vel: placement.vel,
        phase,
        amplitude,
        wobble_speed,
        caught: false,
    });
    log::debug!("Fly {} spawned via {:?} at {:?}", id, placement.placement, placement.pos);
    Some(id)
}

/// Spawn a decorative cloud off the left edge unless at the cap
pub fn spawn_cloud(state: &mut GameState, now: f64) -> Option<u32> {
    if state.clouds.len() >= state.tuning.clouds.max_count {
        return None;
    }

    let size = CloudSize::ALL[state.rng.random_range(0..CloudSize::ALL.len())];
    let (base, spread) = size.speed_range();
    let speed = base + state.rng.random::<f32>() * spread;
    let y = state.rng.random::<f32>() * (state.tuning.playfield.height - 100.0).max(0.0) + 20.0;

    let id = state.next_entity_id();
    state.clouds.push(Cloud {
        id,
        x: -150.0,
        y,
        size,
        speed,
        born_at: now,
    });
    Some(id)
}

/// Run every spawn gate once for the frame at `now`
///
/// A timer that fires while its population is capped still consumes the
/// window; requests are never queued.
pub fn run_spawners(state: &mut GameState, now: f64) {
    if state.spawner.pipes.try_fire(now) {
        spawn_obstacle(state);
    }

    if state.tuning.enable_collectibles && state.spawner.flies.try_fire(now) {
        spawn_fly(state);
    }

    if state.spawner.clouds.try_fire(now) {
        spawn_cloud(state, now);
        let clouds = &state.tuning.clouds;
        state.spawner.clouds.interval = state
            .rng
            .random_range(clouds.min_interval_ms..=clouds.max_interval_ms);
    }
}

/// Scroll pipes left, award passes, drop pipes past the left edge
///
/// Returns the number of pipes passed this step.
pub fn scroll_obstacles(state: &mut GameState) -> u32 {
    let pipe_width = state.tuning.pipes.width;
    let speed = state.tuning.pipes.speed;
    let scoring_line = state.tuning.playfield.width / 2.0;
    let mut passed = 0;
    let mut removed = Vec::new();

    state.obstacles.retain_mut(|pipe| {
        pipe.x -= speed;
        if pipe.x < -pipe_width {
            removed.push(pipe.id);
            return false;
        }
        if !pipe.passed && pipe.x + pipe_width < scoring_line {
            pipe.passed = true;
            passed += 1;
        }
        true
    });

    for id in removed {
        state.emit(GameEvent::ObstacleRemoved { id });
    }
    passed
}

/// Move flies and drop caught or departed ones
pub fn advance_flies(state: &mut GameState) {
    let height = state.tuning.playfield.height;
    let margin = state.tuning.flies.margin;
    let mut removed = Vec::new();

    state.flies.retain_mut(|fly| {
        if fly.caught {
            removed.push(fly.id);
            return false;
        }
        fly.advance();
        if fly.is_off_screen(height, margin) {
            removed.push(fly.id);
            return false;
        }
        true
    });

    for id in removed {
        state.emit(GameEvent::FlyRemoved { id });
    }
}

/// Drift clouds right; drop those past the edge or too old
///
/// Motion is skipped when `elapsed` since the previous step is too long,
/// expiry still applies.
pub fn drift_clouds(state: &mut GameState, now: f64, elapsed: f64) {
    let tuning = &state.tuning.clouds;
    let move_clouds = elapsed <= tuning.skip_frame_ms;
    let max_age = tuning.max_age_ms;
    let right_limit = state.tuning.playfield.width + 150.0;
    let mut removed = Vec::new();

    state.clouds.retain_mut(|cloud| {
        if move_clouds {
            cloud.x += cloud.speed;
        }
        if cloud.x > right_limit || now - cloud.born_at > max_age {
            removed.push(cloud.id);
            return false;
        }
        true
    });

    for id in removed {
        state.emit(GameEvent::CloudRemoved { id });
    }
}
