//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Timestamps come in from the platform, never read from a clock here
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies; collaborators consume events

pub mod clock;
pub mod collision;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod tongue;

pub use clock::{FrameClock, FrameStats, FrameTiming, LoopChain, LoopToken};
pub use collision::{TongueProbe, first_pipe_collision, pipe_hit, probe_tongue};
pub use physics::{BoundsOutcome, flap, integrate};
pub use spawn::{Placement, SpawnTimer, Spawner, obstacle_heights};
pub use state::{
    Cloud, CloudSize, Fly, GameEvent, GamePhase, GameState, InputKind, Obstacle, OverReason, Player,
    SessionStats,
};
pub use tick::{FrameOutcome, end_game, handle_input, on_frame, start, step};
pub use tongue::{RetractCause, Tongue, TonguePhase, select_target};
