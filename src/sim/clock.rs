//! Frame pacing for the animation-frame driven loop
//!
//! The platform hands us a monotonic timestamp (ms) every paint cycle. The
//! clock decides whether that frame runs a simulation step and how large the
//! step is; the loop chain tracks which callback chain is allowed to act.

use serde::{Deserialize, Serialize};

use crate::tuning::FrameTuning;

/// What the driver should do with one animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameTiming {
    /// First frame of a run: timestamp recorded, nothing simulated
    Bootstrap,
    /// Arrived too soon after the previous step (high refresh display)
    Throttled,
    /// Run one simulation step
    Step {
        /// Unclamped time since the previous step (ms)
        elapsed: f64,
        /// Clamped elapsed time (ms)
        time_step: f64,
        /// Gravity multiplier normalizing the step to a 60 Hz frame
        gravity_scale: f32,
    },
}

/// Timestamp bookkeeping for frame gating
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameClock {
    last_frame_time: Option<f64>,
}

impl FrameClock {
    /// Timestamp of the last frame that ran (or bootstrapped) a step
    pub fn last_frame_time(&self) -> Option<f64> {
        self.last_frame_time
    }

    /// Classify the frame at `timestamp`
    pub fn advance(&mut self, timestamp: f64, tuning: &FrameTuning) -> FrameTiming {
        let Some(last) = self.last_frame_time else {
            self.last_frame_time = Some(timestamp);
            return FrameTiming::Bootstrap;
        };

        let elapsed = timestamp - last;
        if elapsed < tuning.frame_period_ms() * 0.5 {
            return FrameTiming::Throttled;
        }

        let time_step = elapsed.min(tuning.max_time_step_ms);
        self.last_frame_time = Some(timestamp);
        let gravity_scale =
            ((time_step / tuning.reference_frame_ms) as f32).max(tuning.min_gravity_scale);

        FrameTiming::Step {
            elapsed,
            time_step,
            gravity_scale,
        }
    }
}

/// Rolling frames-per-second counter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameStats {
    window_start: Option<f64>,
    frames_in_window: u32,
    previous: Option<f64>,
    /// Frames counted over the last full second
    pub fps: u32,
    /// Duration of the most recent frame (ms)
    pub last_frame_ms: f64,
}

impl FrameStats {
    /// Count one animation frame
    pub fn record(&mut self, timestamp: f64) {
        if let Some(previous) = self.previous {
            self.last_frame_ms = timestamp - previous;
        }
        self.previous = Some(timestamp);

        self.frames_in_window += 1;
        let start = *self.window_start.get_or_insert(timestamp);
        let span = timestamp - start;
        if span >= 1000.0 {
            self.fps = (f64::from(self.frames_in_window) * 1000.0 / span).round() as u32;
            self.frames_in_window = 0;
            self.window_start = Some(timestamp);
        }
    }
}

/// Identifies one requestAnimationFrame chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopToken(u64);

impl LoopToken {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Generation counter guarding against duplicate or stale frame loops
///
/// Starting a chain invalidates every earlier token, so a callback scheduled
/// by a previous run notices it is stale and stops re-registering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoopChain {
    generation: u64,
    active: bool,
}

impl LoopChain {
    /// Cancel any running chain and begin a new one
    pub fn start(&mut self) -> LoopToken {
        self.generation += 1;
        self.active = true;
        LoopToken(self.generation)
    }

    /// Stop the current chain; its callbacks become no-ops
    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a callback holding `token` may still act and re-register
    pub fn is_current(&self, token: LoopToken) -> bool {
        self.active && token.0 == self.generation
    }

    /// Token of the live chain, if any
    pub fn current(&self) -> Option<LoopToken> {
        self.active.then_some(LoopToken(self.generation))
    }
}
