//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects, no external files needed.
//! Browsers keep a fresh `AudioContext` suspended until a user gesture; the
//! manager stays `unlocked == false` until `unlock` is called from one.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

use crate::platform::{Effect, EffectPlayer};
use crate::settings::Settings;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    unlocked: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            unlocked: false,
        }
    }

    /// Pick up volume and mute preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.muted = settings.muted;
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Resume the context; must be called from a user gesture handler
    pub fn unlock(&mut self) {
        if self.unlocked {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() == AudioContextState::Suspended && ctx.resume().is_err() {
            log::warn!("AudioContext resume rejected");
            return;
        }
        self.unlocked = true;
        log::info!("Audio unlocked");
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn play_effect(&self, effect: Effect) {
        let vol = self.effective_volume();
        if vol <= 0.0 || !self.unlocked {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        match effect {
            Effect::Flap => self.play_flap(ctx, vol),
            Effect::Hit => self.play_hit(ctx, vol),
            Effect::Catch => self.play_catch(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Flap - short low raspberry
    fn play_flap(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 110.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.18)
            .ok();
        osc.frequency().set_value_at_time(110.0, t).ok();
        osc.frequency().set_value_at_time(90.0, t + 0.04).ok();
        osc.frequency().set_value_at_time(120.0, t + 0.08).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(60.0, t + 0.18)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }

    /// Hit - thud with a falling tail
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 180.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.4)
                .ok();
            osc.frequency().set_value_at_time(180.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.4)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.45).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 60.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }
    }

    /// Catch - quick rising chirp
    fn play_catch(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [900.0, 1300.0].iter().enumerate() {
            let delay = i as f64 * 0.06;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.15).ok();
            }
        }
    }
}

impl EffectPlayer for AudioManager {
    fn play(&mut self, effect: Effect) {
        self.play_effect(effect);
    }
}
