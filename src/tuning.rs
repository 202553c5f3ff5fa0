//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads comes from a [`Tuning`]. The
//! defaults mirror [`crate::consts`]; a JSON document can override any subset.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading a tuning table
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Playfield size in pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldTuning {
    pub width: f32,
    pub height: f32,
}

impl Default for PlayfieldTuning {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
        }
    }
}

/// Frame pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameTuning {
    pub target_fps: f64,
    pub max_time_step_ms: f64,
    pub reference_frame_ms: f64,
    pub min_gravity_scale: f32,
}

impl Default for FrameTuning {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            max_time_step_ms: MAX_TIME_STEP_MS,
            reference_frame_ms: REFERENCE_FRAME_MS,
            min_gravity_scale: MIN_GRAVITY_SCALE,
        }
    }
}

impl FrameTuning {
    /// Target frame period in milliseconds
    pub fn frame_period_ms(&self) -> f64 {
        1000.0 / self.target_fps
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub x: f32,
    pub width: f32,
    pub height: f32,
    pub start_y: f32,
    pub gravity: f32,
    pub flap_impulse: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            x: PLAYER_X,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            start_y: PLAYER_START_Y,
            gravity: GRAVITY,
            flap_impulse: FLAP_IMPULSE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipeTuning {
    pub width: f32,
    pub gap: f32,
    pub min_height: f32,
    pub interval_ms: f64,
    pub speed: f32,
    pub max_count: usize,
}

impl Default for PipeTuning {
    fn default() -> Self {
        Self {
            width: PIPE_WIDTH,
            gap: PIPE_GAP,
            min_height: MIN_PIPE_HEIGHT,
            interval_ms: PIPE_INTERVAL_MS,
            speed: PIPE_SPEED,
            max_count: MAX_PIPES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyTuning {
    pub max_count: usize,
    pub interval_ms: f64,
    pub margin: f32,
    pub catch_bonus: u32,
    /// Relative weights of the placement strategies
    pub gap_weight: f32,
    pub right_edge_weight: f32,
    pub vertical_edge_weight: f32,
    /// Chance that a gap-aligned fly is nudged off the gap centre
    pub gap_offset_chance: f64,
    /// Largest nudge, as a fraction of the pipe gap
    pub gap_offset_fraction: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_amplitude: f32,
    pub max_amplitude: f32,
    /// Oscillation speed range (radians per step)
    pub min_wobble: f32,
    pub max_wobble: f32,
}

impl Default for FlyTuning {
    fn default() -> Self {
        Self {
            max_count: MAX_FLIES,
            interval_ms: FLY_INTERVAL_MS,
            margin: FLY_MARGIN,
            catch_bonus: CATCH_BONUS,
            gap_weight: 0.2,
            right_edge_weight: 0.55,
            vertical_edge_weight: 0.25,
            gap_offset_chance: 0.4,
            gap_offset_fraction: 0.3,
            min_speed: 1.5,
            max_speed: 3.0,
            min_amplitude: 5.0,
            max_amplitude: 15.0,
            min_wobble: 0.03,
            max_wobble: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TongueTuning {
    pub capture_radius: f32,
    pub proximity_radius: f32,
    pub max_length: f32,
    pub speed: f32,
    pub retract_speed: f32,
    pub max_aim: f32,
    pub anchor_step: f32,
    pub reach: f32,
    pub cooldown_ms: f64,
    pub watchdog_ms: f64,
    pub auto_trigger: bool,
    pub auto_horizontal: f32,
    pub auto_vertical: f32,
}

impl Default for TongueTuning {
    fn default() -> Self {
        Self {
            capture_radius: CAPTURE_RADIUS,
            proximity_radius: PROXIMITY_RADIUS,
            max_length: TONGUE_MAX_LENGTH,
            speed: TONGUE_SPEED,
            retract_speed: TONGUE_RETRACT_SPEED,
            max_aim: TONGUE_MAX_AIM,
            anchor_step: TONGUE_ANCHOR_STEP,
            reach: TONGUE_REACH,
            cooldown_ms: TONGUE_COOLDOWN_MS,
            watchdog_ms: TONGUE_WATCHDOG_MS,
            auto_trigger: true,
            auto_horizontal: AUTO_TONGUE_HORIZONTAL,
            auto_vertical: AUTO_TONGUE_VERTICAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudTuning {
    pub max_count: usize,
    pub min_interval_ms: f64,
    pub max_interval_ms: f64,
    pub max_age_ms: f64,
    pub skip_frame_ms: f64,
}

impl Default for CloudTuning {
    fn default() -> Self {
        Self {
            max_count: MAX_CLOUDS,
            min_interval_ms: CLOUD_MIN_INTERVAL_MS,
            max_interval_ms: CLOUD_MAX_INTERVAL_MS,
            max_age_ms: CLOUD_MAX_AGE_MS,
            skip_frame_ms: CLOUD_SKIP_FRAME_MS,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Flies and the tongue; off gives the plain pipe-dodging variant
    pub enable_collectibles: bool,
    pub playfield: PlayfieldTuning,
    pub frame: FrameTuning,
    pub player: PlayerTuning,
    pub pipes: PipeTuning,
    pub flies: FlyTuning,
    pub tongue: TongueTuning,
    pub clouds: CloudTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            enable_collectibles: true,
            playfield: PlayfieldTuning::default(),
            frame: FrameTuning::default(),
            player: PlayerTuning::default(),
            pipes: PipeTuning::default(),
            flies: FlyTuning::default(),
            tongue: TongueTuning::default(),
            clouds: CloudTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning table and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Check the cross-field constraints the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let invalid = |msg: String| Err(TuningError::Invalid(msg));

        if self.playfield.width <= 0.0 || self.playfield.height <= 0.0 {
            return invalid(format!(
                "playfield must be positive, got {}x{}",
                self.playfield.width, self.playfield.height
            ));
        }
        if self.player.height >= self.playfield.height {
            return invalid("player is taller than the playfield".to_string());
        }
        let pipe_room = self.pipes.gap + 2.0 * self.pipes.min_height;
        if pipe_room >= self.playfield.height {
            return invalid(format!(
                "pipe gap {} plus two minimum pipes {} leaves no room in height {}",
                self.pipes.gap, self.pipes.min_height, self.playfield.height
            ));
        }
        if self.flies.margin < 0.0 || 2.0 * self.flies.margin >= self.playfield.height {
            return invalid(format!(
                "fly margin {} leaves no room in height {}",
                self.flies.margin, self.playfield.height
            ));
        }
        if self.pipes.max_count == 0 || self.flies.max_count == 0 || self.clouds.max_count == 0 {
            return invalid("population caps must be at least 1".to_string());
        }
        if self.pipes.interval_ms <= 0.0
            || self.flies.interval_ms <= 0.0
            || self.clouds.min_interval_ms <= 0.0
        {
            return invalid("spawn intervals must be positive".to_string());
        }
        if self.clouds.min_interval_ms > self.clouds.max_interval_ms {
            return invalid("cloud interval range is inverted".to_string());
        }
        if self.frame.target_fps <= 0.0 || self.frame.max_time_step_ms <= 0.0 {
            return invalid("frame pacing must be positive".to_string());
        }
        if self.pipes.speed <= 0.0 || self.tongue.speed <= 0.0 || self.tongue.retract_speed <= 0.0 {
            return invalid("speeds must be positive".to_string());
        }
        if self.flies.min_speed > self.flies.max_speed
            || self.flies.min_amplitude > self.flies.max_amplitude
            || self.flies.min_wobble > self.flies.max_wobble
        {
            return invalid("fly parameter ranges are inverted".to_string());
        }
        let weights = [
            self.flies.gap_weight,
            self.flies.right_edge_weight,
            self.flies.vertical_edge_weight,
        ];
        if weights.iter().any(|w| *w < 0.0) || weights.iter().sum::<f32>() <= 0.0 {
            return invalid("fly placement weights must be non-negative and not all zero".to_string());
        }
        if self.tongue.capture_radius > self.tongue.proximity_radius {
            return invalid(format!(
                "capture radius {} exceeds proximity radius {}",
                self.tongue.capture_radius, self.tongue.proximity_radius
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides() {
        let tuning = Tuning::from_json(r#"{ "pipes": { "gap": 180.0 }, "enable_collectibles": false }"#)
            .expect("valid tuning");
        assert_eq!(tuning.pipes.gap, 180.0);
        assert_eq!(tuning.pipes.width, PIPE_WIDTH);
        assert!(!tuning.enable_collectibles);
        assert_eq!(tuning.player.gravity, GRAVITY);
    }

    #[test]
    fn test_rejects_gap_without_room() {
        let err = Tuning::from_json(r#"{ "pipes": { "gap": 520.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_rejects_margin_without_room() {
        let err = Tuning::from_json(r#"{ "flies": { "margin": 400.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
        let err = Tuning::from_json(r#"{ "flies": { "margin": -150.0 } }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
        assert!(Tuning::from_json(r#"{ "flies": { "margin": 0.0 } }"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_rejects_capture_larger_than_proximity() {
        let mut tuning = Tuning::default();
        tuning.tongue.capture_radius = 40.0;
        assert!(tuning.validate().is_err());
    }
}
