//! Cosmic Shooter - real-time simulation core for a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, collisions, power-ups)
//! - `game`: Frame-driven session loop wiring the simulation to the host
//! - `render`: Draw pass against an abstract render surface
//! - `ports`: Render surface, audio trigger and UI sink contracts
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod color;
pub mod game;
pub mod ports;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use color::Color;
pub use game::{FrameStatus, Host, Session};
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame duration (ms) at ~60 Hz
    pub const NOMINAL_TICK_MS: f64 = 16.0;
    /// Longest frame the loop will integrate (tab switches, debugger stops)
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Player hull
    pub const PLAYER_WIDTH: f64 = 40.0;
    pub const PLAYER_HEIGHT: f64 = 50.0;
    pub const PLAYER_SPEED: f64 = 5.0;
    pub const MAX_HEALTH: u32 = 100;
    pub const MAX_SHIELD: u32 = 100;

    /// Per-tick keyboard rotation step (radians)
    pub const TURN_STEP: f64 = 0.05;

    /// Projectiles
    pub const PROJECTILE_RADIUS: f64 = 3.0;
    pub const PROJECTILE_LIFE: u32 = 100;
    pub const PLAYER_PROJECTILE_SPEED: f64 = 12.0;
    pub const ENEMY_PROJECTILE_SPEED: f64 = 8.0;
    /// Angular offsets of the triple-shot spread
    pub const TRIPLE_SHOT_SPREAD: [f64; 3] = [0.0, -0.2, 0.2];

    /// Off-screen margins (entities are culled once past these)
    pub const ENEMY_CULL_MARGIN: f64 = 100.0;
    pub const METEOR_CULL_PADDING: f64 = 50.0;
    /// Enemies spawn this far outside the viewport edge
    pub const ENEMY_SPAWN_OFFSET: f64 = 50.0;

    /// Meteors
    pub const METEOR_MIN_RADIUS: f64 = 15.0;
    pub const METEOR_RADIUS_SPREAD: f64 = 25.0;
    pub const METEOR_HEALTH_DIVISOR: f64 = 15.0;
    pub const METEOR_SPLIT_THRESHOLD: f64 = 30.0;
    pub const METEOR_FRAGMENT_SCALE: f64 = 0.6;

    /// Pickups
    pub const POWERUP_RADIUS: f64 = 15.0;
    pub const POWERUP_DRIFT: f64 = 1.0;

    /// Level cap
    pub const MAX_LEVEL: u32 = 10;

    /// Virtual joystick
    pub const JOYSTICK_RADIUS: f64 = 70.0;
    pub const TAP_MAX_MS: f64 = 200.0;
    pub const TAP_MAX_TRAVEL: f64 = 10.0;
    pub const TOUCH_FIRE_INTERVAL_MS: f64 = 200.0;

    /// One background star per this many square pixels
    pub const STAR_DENSITY_AREA: f64 = 2000.0;
}

/// Unit vector for a ship heading (0 = up, clockwise positive, screen coords)
#[inline]
pub fn heading_vector(heading: f64) -> DVec2 {
    DVec2::new(heading.sin(), -heading.cos())
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Stereo pan for a horizontal position in a viewport of the given width
#[inline]
pub fn pan_for(x: f64, width: f64) -> f64 {
    if width <= 0.0 {
        return 0.0;
    }
    (x / width * 2.0 - 1.0).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_vector_points_up_at_zero() {
        let v = heading_vector(0.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y + 1.0).abs() < 1e-12);

        let right = heading_vector(std::f64::consts::FRAC_PI_2);
        assert!((right.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_angle_wraps() {
        let a = normalize_angle(3.0 * std::f64::consts::PI);
        assert!((a.abs() - std::f64::consts::PI).abs() < 1e-9);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_pan_is_clamped() {
        assert_eq!(pan_for(0.0, 800.0), -1.0);
        assert_eq!(pan_for(400.0, 800.0), 0.0);
        assert_eq!(pan_for(2000.0, 800.0), 1.0);
        assert_eq!(pan_for(-50.0, 800.0), -1.0);
        assert_eq!(pan_for(10.0, 0.0), 0.0);
    }
}
