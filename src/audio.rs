//! Audio system using Web Audio API
//!
//! Every cue is synthesized from a single oscillator with a gain envelope and
//! a stereo panner; no sample files are loaded.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType, StereoPannerNode};

use crate::ports::AudioTrigger;
use crate::sim::{SoundCue, SoundParams};

/// Web Audio backed [`AudioTrigger`]
pub struct WebAudio {
    ctx: Option<AudioContext>,
}

impl Default for WebAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl WebAudio {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Oscillator -> gain -> panner -> destination
    fn voice(
        ctx: &AudioContext,
        osc_type: OscillatorType,
        pan: f32,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        let panner: StereoPannerNode = ctx.create_stereo_panner().ok()?;

        osc.set_type(osc_type);
        panner.pan().set_value(pan);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&panner).ok()?;
        panner.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Laser - falling sawtooth zap
    fn play_laser(ctx: &AudioContext, vol: f32, rate: f32, pan: f32) {
        let Some((osc, gain)) = Self::voice(ctx, OscillatorType::Sawtooth, pan) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(880.0 * rate, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(110.0 * rate, t + 0.2)
            .ok();
        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    /// Explosion - low sine boom
    fn play_explosion(ctx: &AudioContext, vol: f32, rate: f32, pan: f32) {
        let Some((osc, gain)) = Self::voice(ctx, OscillatorType::Sine, pan) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(100.0 * rate, t).ok();
        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.5).ok();
    }

    /// Power-up - rising chirp
    fn play_powerup(ctx: &AudioContext, vol: f32, rate: f32, pan: f32) {
        let Some((osc, gain)) = Self::voice(ctx, OscillatorType::Sine, pan) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(330.0 * rate, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(880.0 * rate, t + 0.1)
            .ok();
        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    /// Hit - short triangle thud
    fn play_hit(ctx: &AudioContext, vol: f32, rate: f32, pan: f32) {
        let Some((osc, gain)) = Self::voice(ctx, OscillatorType::Triangle, pan) else {
            return;
        };
        let t = ctx.current_time();

        osc.frequency().set_value_at_time(220.0 * rate, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(55.0 * rate, t + 0.1)
            .ok();
        gain.gain().set_value_at_time(vol, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.1)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }
}

impl AudioTrigger for WebAudio {
    /// `params.volume` arrives already scaled by the user's mix
    fn play_sound(&mut self, cue: SoundCue, params: SoundParams) {
        if params.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let vol = params.volume as f32;
        let rate = params.rate.max(0.01) as f32;
        let pan = params.pan as f32;
        match cue {
            SoundCue::Laser => Self::play_laser(ctx, vol, rate, pan),
            SoundCue::Explosion => Self::play_explosion(ctx, vol, rate, pan),
            SoundCue::Powerup => Self::play_powerup(ctx, vol, rate, pan),
            SoundCue::Hit => Self::play_hit(ctx, vol, rate, pan),
        }
    }
}
