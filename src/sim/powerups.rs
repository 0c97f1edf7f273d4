//! Timed power-up effects
//!
//! Collecting a pickup arms a countdown; the effect is live while its
//! remaining time is positive. Consumers only ever read the timers.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Shield,
    TripleShot,
    Speed,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 3] = [
        PowerupKind::Shield,
        PowerupKind::TripleShot,
        PowerupKind::Speed,
    ];

    /// Badge / pickup glyph
    pub fn symbol(&self) -> &'static str {
        match self {
            PowerupKind::Shield => "S",
            PowerupKind::TripleShot => "T",
            PowerupKind::Speed => "B",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            PowerupKind::Shield => Color::rgb(0x44, 0x88, 0xff),
            PowerupKind::TripleShot => Color::rgb(0xff, 0x88, 0x44),
            PowerupKind::Speed => Color::rgb(0x44, 0xff, 0x88),
        }
    }
}

/// Remaining duration of each effect (ms, never negative)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerups {
    pub shield_ms: f64,
    pub triple_shot_ms: f64,
    pub speed_ms: f64,
}

impl ActivePowerups {
    pub fn remaining(&self, kind: PowerupKind) -> f64 {
        match kind {
            PowerupKind::Shield => self.shield_ms,
            PowerupKind::TripleShot => self.triple_shot_ms,
            PowerupKind::Speed => self.speed_ms,
        }
    }

    fn slot_mut(&mut self, kind: PowerupKind) -> &mut f64 {
        match kind {
            PowerupKind::Shield => &mut self.shield_ms,
            PowerupKind::TripleShot => &mut self.triple_shot_ms,
            PowerupKind::Speed => &mut self.speed_ms,
        }
    }

    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.remaining(kind) > 0.0
    }

    /// Arm an effect for `duration_ms`, replacing any remaining time
    pub fn arm(&mut self, kind: PowerupKind, duration_ms: f64) {
        *self.slot_mut(kind) = duration_ms.max(0.0);
    }

    /// Count every live effect down by `elapsed_ms`
    ///
    /// Returns the effects that expired during this call, in `ALL` order.
    pub fn decay(&mut self, elapsed_ms: f64) -> Vec<PowerupKind> {
        let elapsed = elapsed_ms.max(0.0);
        let mut expired = Vec::new();
        for kind in PowerupKind::ALL {
            let slot = self.slot_mut(kind);
            if *slot > 0.0 {
                *slot -= elapsed;
                if *slot <= 0.0 {
                    *slot = 0.0;
                    expired.push(kind);
                }
            }
        }
        expired
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
