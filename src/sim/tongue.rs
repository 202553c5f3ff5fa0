//! Tongue targeting state machine
//!
//! `Idle -> Extending -> Retracting -> Idle`, with a cooldown after each
//! retraction. Extension advances once per simulation step; retraction
//! advances on every animation frame and is bounded by a wall-clock watchdog
//! so the tongue can never stay out indefinitely.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Fly;
use crate::tuning::TongueTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TonguePhase {
    #[default]
    Idle,
    Extending,
    Retracting,
}

/// Why the tongue started retracting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetractCause {
    Caught { fly: u32 },
    MaxLength,
}

/// The frog's tongue (single instance)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tongue {
    pub(crate) phase: TonguePhase,
    /// Root of the tongue
    pub anchor: Vec2,
    /// Current reach (px, along +x)
    pub length: f32,
    /// Vertical aim relative to the mouth, fixed when extension starts
    pub aim_offset: f32,
    /// Fly the tongue was aimed at
    pub target: Option<u32>,
    pub retract_cause: Option<RetractCause>,
    cooldown_until: Option<f64>,
    retract_started: Option<f64>,
}

/// Targeting score: lower is better, vertical distance counts double
pub fn target_score(mouth: Vec2, fly_pos: Vec2) -> f32 {
    (fly_pos.x - mouth.x).abs() + 2.0 * (fly_pos.y - mouth.y).abs()
}

/// Best fly ahead of the frog within horizontal reach
///
/// Ties go to the earlier fly in the slice.
pub fn select_target<'a>(mouth: Vec2, player_x: f32, flies: &'a [Fly], reach: f32) -> Option<&'a Fly> {
    let mut best: Option<(&Fly, f32)> = None;
    for fly in flies {
        if fly.caught || fly.pos.x <= player_x || fly.pos.x - mouth.x > reach {
            continue;
        }
        let score = target_score(mouth, fly.pos);
        if best.is_none_or(|(_, s)| score < s) {
            best = Some((fly, score));
        }
    }
    best.map(|(fly, _)| fly)
}

/// Mouth-relative vertical aim toward `target_y`, limited to `max_aim`
pub fn aim_toward(mouth_y: f32, target_y: f32, max_aim: f32) -> f32 {
    (target_y - mouth_y).clamp(-max_aim, max_aim)
}

/// Fly the automatic trigger would go for, if any is close enough
///
/// Only flies drifting toward the frog are considered; the winner must sit
/// inside the horizontal and vertical envelope.
pub fn auto_target(mouth: Vec2, player_x: f32, flies: &[Fly], tuning: &TongueTuning) -> Option<u32> {
    let approaching: Vec<Fly> = flies
        .iter()
        .filter(|f| !f.caught && f.vel.x < 0.0)
        .cloned()
        .collect();
    let best = select_target(mouth, player_x, &approaching, tuning.reach)?;

    let dx = (best.pos.x - mouth.x).abs();
    let dy = (best.pos.y - mouth.y).abs();
    (dx <= tuning.auto_horizontal && dy <= tuning.auto_vertical).then_some(best.id)
}

impl Tongue {
    pub fn phase(&self) -> TonguePhase {
        self.phase
    }

    /// Out of the mouth (extending or retracting)
    pub fn is_extended(&self) -> bool {
        self.phase != TonguePhase::Idle
    }

    pub fn is_retracting(&self) -> bool {
        self.phase == TonguePhase::Retracting
    }

    /// Re-extension is blocked until the cooldown deadline
    pub fn on_cooldown(&self, now: f64) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    /// Tip position (the tongue always points forward)
    pub fn tip(&self) -> Vec2 {
        self.anchor + Vec2::new(self.length, 0.0)
    }

    /// Start extending toward `target`; rejected while out or cooling down
    ///
    /// Without a target the tongue shoots straight out of the mouth.
    pub fn try_extend(&mut self, now: f64, mouth: Vec2, target: Option<&Fly>, tuning: &TongueTuning) -> bool {
        if self.is_extended() || self.on_cooldown(now) {
            return false;
        }

        self.aim_offset = target.map_or(0.0, |fly| aim_toward(mouth.y, fly.pos.y, tuning.max_aim));
        self.target = target.map(|fly| fly.id);
        self.anchor = mouth + Vec2::new(0.0, self.aim_offset);
        self.length = 0.0;
        self.retract_cause = None;
        self.cooldown_until = None;
        self.retract_started = None;
        self.phase = TonguePhase::Extending;
        log::debug!("Tongue extending toward {:?} (aim {:+.1})", self.target, self.aim_offset);
        true
    }

    /// Grow by one step, keeping the root on the mouth
    ///
    /// Returns true when the tongue has reached full length.
    pub fn extend_step(&mut self, mouth: Vec2, tuning: &TongueTuning) -> bool {
        if self.phase != TonguePhase::Extending {
            return false;
        }
        self.anchor = mouth + Vec2::new(0.0, self.aim_offset);
        self.length = (self.length + tuning.speed).min(tuning.max_length);
        self.length >= tuning.max_length
    }

    /// Switch to retracting (after a catch or at full length)
    pub fn begin_retract(&mut self, now: f64, cause: RetractCause) {
        if self.phase != TonguePhase::Extending {
            return;
        }
        self.phase = TonguePhase::Retracting;
        self.retract_started = Some(now);
        self.retract_cause = Some(cause);
        log::debug!("Tongue retracting ({:?})", cause);
    }

    /// Advance retraction by one animation frame
    ///
    /// Returns true on the frame the tongue gets back to idle, whether it
    /// shrank to zero or the watchdog forced it.
    pub fn retract_step(&mut self, now: f64, mouth: Vec2, tuning: &TongueTuning) -> bool {
        if self.phase != TonguePhase::Retracting {
            return false;
        }

        let started = *self.retract_started.get_or_insert(now);
        if now - started >= tuning.watchdog_ms {
            log::warn!("Tongue retraction stalled, forcing idle");
            self.finish(now, tuning);
            return true;
        }

        self.length = (self.length - tuning.retract_speed).max(0.0);
        self.anchor.x = mouth.x;
        let dy = (mouth.y - self.anchor.y).clamp(-tuning.anchor_step, tuning.anchor_step);
        self.anchor.y += dy;

        if self.length <= 0.0 {
            self.finish(now, tuning);
            return true;
        }
        false
    }

    fn finish(&mut self, now: f64, tuning: &TongueTuning) {
        self.phase = TonguePhase::Idle;
        self.length = 0.0;
        self.aim_offset = 0.0;
        self.target = None;
        self.retract_started = None;
        self.cooldown_until = Some(now + tuning.cooldown_ms);
    }
}
