//! Side effects raised by the simulation for the host to act on
//!
//! The simulation never talks to audio or UI directly. It queues
//! [`GameEvent`]s on the world, and the session drains them once per frame.

use serde::{Deserialize, Serialize};

use super::powerups::PowerupKind;

/// Sound cue names understood by the audio trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Laser,
    Explosion,
    Hit,
    Powerup,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Laser => "laser",
            SoundCue::Explosion => "explosion",
            SoundCue::Hit => "hit",
            SoundCue::Powerup => "powerup",
        }
    }
}

/// Playback parameters for one cue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundParams {
    /// 0.0 - 1.0
    pub volume: f64,
    /// Playback rate multiplier
    pub rate: f64,
    /// Stereo position, -1.0 (left) to 1.0 (right)
    pub pan: f64,
}

impl SoundParams {
    pub fn new(volume: f64, rate: f64, pan: f64) -> Self {
        Self {
            volume: volume.clamp(0.0, 1.0),
            rate,
            pan: pan.clamp(-1.0, 1.0),
        }
    }

    /// Centered cue at normal rate
    pub fn centered(volume: f64) -> Self {
        Self::new(volume, 1.0, 0.0)
    }
}

/// Something the host should hear, show or react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound { cue: SoundCue, params: SoundParams },
    PowerupCollected(PowerupKind),
    PowerupExpired(PowerupKind),
    /// Level advanced to the given value
    LevelUp(u32),
    /// Jolt the screen for this long
    ScreenShake { duration_ms: f64 },
    GameOver { score: u64, level: u32 },
}

impl GameEvent {
    pub fn sound(cue: SoundCue, params: SoundParams) -> Self {
        GameEvent::Sound { cue, params }
    }
}
