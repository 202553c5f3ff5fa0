//! Game state and core simulation types
//!
//! Everything the controller mutates during a session lives on [`GameState`];
//! collaborators only ever see it through `&GameState` or drained events.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::{FrameClock, FrameStats, LoopChain};
use super::spawn::Spawner;
use super::tongue::Tongue;
use crate::tuning::{PlayerTuning, Tuning};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first input
    NotStarted,
    /// Active gameplay
    Running,
    /// Run ended; waiting for restart input
    Over,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverReason {
    /// Frog dropped past the bottom edge
    FellOut,
    /// Frog touched a pipe
    HitPipe,
}

/// Player input routed by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Start,
    Flap,
    TongueExtend,
}

/// The frog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Fixed horizontal position (left edge)
    pub x: f32,
    /// Vertical position (top edge, px from the top of the playfield)
    pub y: f32,
    /// Vertical velocity (px per reference frame)
    pub vel_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Player {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            x: tuning.x,
            y: tuning.start_y,
            vel_y: 0.0,
            width: tuning.width,
            height: tuning.height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Where the tongue is rooted: front edge, half way down
    pub fn mouth(&self) -> Vec2 {
        Vec2::new(self.right(), self.y + self.height * 0.5)
    }
}

/// A pipe pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge (decreases as the pipe scrolls)
    pub x: f32,
    pub top_height: f32,
    pub bottom_height: f32,
    /// Set once the trailing edge crosses the scoring line
    pub passed: bool,
}

impl Obstacle {
    /// Y coordinate where the gap ends and the bottom pipe starts
    pub fn gap_bottom(&self, gap: f32) -> f32 {
        self.top_height + gap
    }

    /// Vertical centre of the gap
    pub fn gap_center(&self, gap: f32) -> f32 {
        self.top_height + gap * 0.5
    }
}

/// A fly (tongue target)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fly {
    pub id: u32,
    /// Current (rendered) position
    pub pos: Vec2,
    /// Oscillation centre; drifts with `vel`
    pub origin: Vec2,
    /// Drift per step
    pub vel: Vec2,
    pub phase: f32,
    pub amplitude: f32,
    /// Phase advance per step (radians)
    pub wobble_speed: f32,
    pub caught: bool,
}

impl Fly {
    /// Drift the origin and bob around it
    pub fn advance(&mut self) {
        self.origin += self.vel;
        self.phase += self.wobble_speed;
        self.pos = self.origin + Vec2::new(0.0, self.phase.sin() * self.amplitude);
    }

    /// True once the fly has left the playfield for good
    pub fn is_off_screen(&self, height: f32, margin: f32) -> bool {
        self.pos.x < -margin || self.pos.y < -2.0 * margin || self.pos.y > height + 2.0 * margin
    }
}

/// Cloud size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloudSize {
    Small,
    Medium,
    Large,
}

impl CloudSize {
    pub const ALL: [CloudSize; 3] = [CloudSize::Small, CloudSize::Medium, CloudSize::Large];

    /// Base speed and random spread (px per step); larger clouds drift slower
    pub fn speed_range(self) -> (f32, f32) {
        match self {
            CloudSize::Small => (0.3, 0.3),
            CloudSize::Medium => (0.2, 0.2),
            CloudSize::Large => (0.1, 0.15),
        }
    }
}

/// Decorative background cloud (no gameplay effect)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: CloudSize,
    pub speed: f32,
    /// Timestamp (ms) at spawn
    pub born_at: f64,
}

/// Per-session counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub score: u32,
    /// Best score seen, including persisted history
    pub high_score: u32,
    /// Animation frames received (all kinds)
    pub frame_count: u64,
    /// Simulation steps actually run
    pub steps: u64,
    pub flap_count: u32,
    pub flies_caught: u32,
}

/// Notifications for collaborators, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Flapped,
    ScoreChanged(u32),
    FlyCaught { id: u32, bonus: u32 },
    FlyNear { id: u32 },
    ObstacleRemoved { id: u32 },
    FlyRemoved { id: u32 },
    CloudRemoved { id: u32 },
    TongueRetracted,
    GameOver {
        reason: OverReason,
        score: u32,
        high_score: u32,
        new_record: bool,
    },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub stats: SessionStats,
    pub player: Player,
    /// Active pipes (oldest first)
    pub obstacles: Vec<Obstacle>,
    /// Active flies (spawn order)
    pub flies: Vec<Fly>,
    pub clouds: Vec<Cloud>,
    pub tongue: Tongue,
    pub clock: FrameClock,
    pub frame_stats: FrameStats,
    pub chain: LoopChain,
    pub spawner: Spawner,
    pub(crate) rng: Pcg32,
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create an idle session; `high_score` comes from the persistence collaborator
    pub fn new(tuning: Tuning, seed: u64, high_score: u32) -> Self {
        let player = Player::new(&tuning.player);
        let spawner = Spawner::new(&tuning);
        Self {
            seed,
            phase: GamePhase::NotStarted,
            stats: SessionStats {
                high_score,
                ..Default::default()
            },
            player,
            obstacles: Vec::new(),
            flies: Vec::new(),
            clouds: Vec::new(),
            tongue: Tongue::default(),
            clock: FrameClock::default(),
            frame_stats: FrameStats::default(),
            chain: LoopChain::default(),
            spawner,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Take the events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Peek at pending events without consuming them
    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Put every per-run field back to its starting value
    ///
    /// Entities still on screen are announced as removed so presenters drop them.
    pub(crate) fn reset_run(&mut self) {
        let removed: Vec<GameEvent> = self
            .obstacles
            .iter()
            .map(|o| GameEvent::ObstacleRemoved { id: o.id })
            .chain(self.flies.iter().map(|f| GameEvent::FlyRemoved { id: f.id }))
            .chain(self.clouds.iter().map(|c| GameEvent::CloudRemoved { id: c.id }))
            .collect();
        self.events.extend(removed);

        self.player = Player::new(&self.tuning.player);
        self.obstacles.clear();
        self.flies.clear();
        self.clouds.clear();
        self.tongue = Tongue::default();
        self.clock = FrameClock::default();
        self.frame_stats = FrameStats::default();
        self.spawner = Spawner::new(&self.tuning);
        self.stats = SessionStats {
            high_score: self.stats.high_score,
            ..Default::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::new(Tuning::default(), 7, 12);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.stats.score, 0);
        assert_eq!(state.stats.high_score, 12);
        assert_eq!(state.player.y, crate::consts::PLAYER_START_Y);
        assert!(state.obstacles.is_empty());
        assert!(!state.tongue.is_extended());
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new(Tuning::default(), 7, 0);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fly_bobs_around_drifting_origin() {
        let mut fly = Fly {
            id: 1,
            pos: Vec2::new(100.0, 100.0),
            origin: Vec2::new(100.0, 100.0),
            vel: Vec2::new(-2.0, 0.0),
            phase: 0.0,
            amplitude: 10.0,
            wobble_speed: std::f32::consts::FRAC_PI_2,
            caught: false,
        };
        fly.advance();
        assert!((fly.origin.x - 98.0).abs() < 1e-4);
        assert!((fly.pos.y - 110.0).abs() < 1e-4);
    }

    #[test]
    fn test_player_mouth_is_front_centre() {
        let player = Player::new(&PlayerTuning::default());
        let mouth = player.mouth();
        assert_eq!(mouth.x, player.x + player.width);
        assert_eq!(mouth.y, player.y + player.height / 2.0);
    }
}
