//! Fly Frog - A side-scrolling frog arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, tongue, game state)
//! - `platform`: Collaborator contracts (rendering, effects, high score storage)
//! - `tuning`: Data-driven game balance
//! - `highscores` / `settings`: LocalStorage-backed persistence

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Playfield dimensions (px)
    pub const PLAYFIELD_WIDTH: f32 = 400.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Frame pacing
    pub const TARGET_FPS: f64 = 60.0;
    /// Largest physics step accepted after a stall (ms)
    pub const MAX_TIME_STEP_MS: f64 = 50.0;
    /// Reference frame duration for gravity scaling (ms)
    pub const REFERENCE_FRAME_MS: f64 = 16.67;
    pub const MIN_GRAVITY_SCALE: f32 = 0.7;

    /// Frog defaults
    pub const PLAYER_X: f32 = 50.0;
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    pub const PLAYER_START_Y: f32 = 200.0;
    pub const GRAVITY: f32 = 0.7;
    pub const FLAP_IMPULSE: f32 = -9.5;

    /// Pipe defaults
    pub const PIPE_WIDTH: f32 = 52.0;
    pub const PIPE_GAP: f32 = 150.0;
    pub const MIN_PIPE_HEIGHT: f32 = 50.0;
    pub const PIPE_INTERVAL_MS: f64 = 3000.0;
    /// Horizontal scroll per simulation step (px)
    pub const PIPE_SPEED: f32 = 2.5;
    pub const MAX_PIPES: usize = 5;

    /// Fly defaults
    pub const MAX_FLIES: usize = 8;
    pub const FLY_INTERVAL_MS: f64 = 1500.0;
    /// Keep flies this far from the top/bottom edges (px)
    pub const FLY_MARGIN: f32 = 20.0;
    pub const CATCH_BONUS: u32 = 3;

    /// Tongue defaults
    pub const CAPTURE_RADIUS: f32 = 15.0;
    pub const PROXIMITY_RADIUS: f32 = 30.0;
    pub const TONGUE_MAX_LENGTH: f32 = 120.0;
    pub const TONGUE_SPEED: f32 = 12.0;
    /// Retraction runs at twice the extension speed
    pub const TONGUE_RETRACT_SPEED: f32 = 24.0;
    pub const TONGUE_MAX_AIM: f32 = 20.0;
    /// Per-step anchor catch-up while retracting (px)
    pub const TONGUE_ANCHOR_STEP: f32 = 4.0;
    pub const TONGUE_REACH: f32 = 150.0;
    pub const TONGUE_COOLDOWN_MS: f64 = 300.0;
    pub const TONGUE_WATCHDOG_MS: f64 = 500.0;
    /// Auto-trigger envelope (px)
    pub const AUTO_TONGUE_HORIZONTAL: f32 = 100.0;
    pub const AUTO_TONGUE_VERTICAL: f32 = 40.0;

    /// Decorative clouds
    pub const MAX_CLOUDS: usize = 6;
    pub const CLOUD_MIN_INTERVAL_MS: f64 = 6000.0;
    pub const CLOUD_MAX_INTERVAL_MS: f64 = 14000.0;
    pub const CLOUD_MAX_AGE_MS: f64 = 120_000.0;
    /// Clouds freeze on frames slower than this (ms)
    pub const CLOUD_SKIP_FRAME_MS: f64 = 60.0;
}
