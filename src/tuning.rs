//! Data-driven game balance
//!
//! Every field defaults to the shipped balance, so a JSON document only needs
//! the keys it wants to override:
//!
//! ```
//! let tuning = cosmic_shooter::Tuning::from_json(r#"{ "level_interval_ms": 20000 }"#).unwrap();
//! assert_eq!(tuning.level_interval_ms, 20000.0);
//! assert_eq!(tuning.enemy_spawn.base_ms, 2000.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::PowerupKind;

/// A spawn timer whose period shrinks as the level rises
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRate {
    /// Period at level 0 (ms)
    pub base_ms: f64,
    /// Period reduction per level (ms)
    pub per_level_ms: f64,
    /// Shortest allowed period (ms)
    pub floor_ms: f64,
}

impl SpawnRate {
    /// `max(floor, base - level * per_level)`
    pub fn period_for(&self, level: u32) -> f64 {
        (self.base_ms - level as f64 * self.per_level_ms).max(self.floor_ms)
    }
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub enemy_spawn: SpawnRate,
    pub meteor_spawn: SpawnRate,
    /// Time between level advances (ms)
    pub level_interval_ms: f64,
    /// Shield window granted on level advance (ms)
    pub level_shield_ms: f64,

    pub shield_duration_ms: f64,
    pub triple_shot_duration_ms: f64,
    pub speed_duration_ms: f64,
    /// Movement multiplier while Speed is active
    pub speed_boost: f64,

    /// Shoot cooldown in ticks (normal / with Speed)
    pub shoot_cooldown_ticks: u32,
    pub boosted_shoot_cooldown_ticks: u32,

    /// Contact damage
    pub enemy_ram_damage: u32,
    pub enemy_shot_damage: u32,

    /// Power-up drop probabilities
    pub drop_chance: f64,
    pub tough_drop_chance: f64,
    pub meteor_drop_chance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            enemy_spawn: SpawnRate {
                base_ms: 2000.0,
                per_level_ms: 100.0,
                floor_ms: 500.0,
            },
            meteor_spawn: SpawnRate {
                base_ms: 3000.0,
                per_level_ms: 150.0,
                floor_ms: 800.0,
            },
            level_interval_ms: 30_000.0,
            level_shield_ms: 5000.0,

            shield_duration_ms: 10_000.0,
            triple_shot_duration_ms: 8000.0,
            speed_duration_ms: 6000.0,
            speed_boost: 1.5,

            shoot_cooldown_ticks: 15,
            boosted_shoot_cooldown_ticks: 8,

            enemy_ram_damage: 25,
            enemy_shot_damage: 10,

            drop_chance: 0.1,
            tough_drop_chance: 0.3,
            meteor_drop_chance: 0.05,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON override document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Duration granted when a pickup of this kind is collected (ms)
    pub fn powerup_duration(&self, kind: PowerupKind) -> f64 {
        match kind {
            PowerupKind::Shield => self.shield_duration_ms,
            PowerupKind::TripleShot => self.triple_shot_duration_ms,
            PowerupKind::Speed => self.speed_duration_ms,
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        for (name, rate) in [
            ("enemy_spawn", &self.enemy_spawn),
            ("meteor_spawn", &self.meteor_spawn),
        ] {
            if !(rate.floor_ms > 0.0) || !(rate.base_ms >= rate.floor_ms) {
                return Err(TuningError::OutOfRange {
                    field: name,
                    value: rate.floor_ms,
                    expected: "0 < floor_ms <= base_ms",
                });
            }
            if rate.per_level_ms < 0.0 {
                return Err(TuningError::OutOfRange {
                    field: name,
                    value: rate.per_level_ms,
                    expected: "per_level_ms >= 0",
                });
            }
        }

        let positive = [
            ("level_interval_ms", self.level_interval_ms),
            ("shield_duration_ms", self.shield_duration_ms),
            ("triple_shot_duration_ms", self.triple_shot_duration_ms),
            ("speed_duration_ms", self.speed_duration_ms),
            ("speed_boost", self.speed_boost),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::OutOfRange {
                    field,
                    value,
                    expected: "> 0",
                });
            }
        }

        let probabilities = [
            ("drop_chance", self.drop_chance),
            ("tough_drop_chance", self.tough_drop_chance),
            ("meteor_drop_chance", self.meteor_drop_chance),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(TuningError::OutOfRange {
                    field,
                    value,
                    expected: "0.0 - 1.0",
                });
            }
        }

        Ok(())
    }
}

/// Errors raised while loading a tuning document
#[derive(Debug)]
pub enum TuningError {
    /// The document is not valid JSON for [`Tuning`]
    Parse(serde_json::Error),
    /// A value parsed but cannot drive the simulation
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "invalid tuning document: {e}"),
            TuningError::OutOfRange {
                field,
                value,
                expected,
            } => write!(f, "tuning field `{field}` = {value} (expected {expected})"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::OutOfRange { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}
