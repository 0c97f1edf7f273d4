//! Contracts between the game and its host
//!
//! The session draws through a [`RenderSurface`], plays cues through an
//! [`AudioTrigger`] and reports HUD changes to a [`UiSink`]. The browser build
//! implements them over canvas 2D, Web Audio and the DOM; tests record calls.

use glam::DVec2;

use crate::color::Color;
use crate::sim::{PowerupKind, SoundCue, SoundParams};

/// Immediate-mode 2D drawing target in viewport pixels
pub trait RenderSurface {
    /// Paint the whole surface (alpha < 1 leaves motion trails)
    fn clear(&mut self, color: Color);

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color);

    fn stroke_circle(&mut self, center: DVec2, radius: f64, line_width: f64, color: Color);

    /// Closed polygon through `points`; fewer than three points draws nothing
    fn fill_polygon(&mut self, points: &[DVec2], color: Color);

    /// Centered text
    fn fill_text(&mut self, text: &str, pos: DVec2, size: f64, color: Color);
}

/// Plays named sound cues
pub trait AudioTrigger {
    fn play_sound(&mut self, cue: SoundCue, params: SoundParams);
}

/// HUD and overlay updates
pub trait UiSink {
    fn score(&mut self, score: u64);
    fn level(&mut self, level: u32);
    /// Percent of max
    fn health(&mut self, percent: u32);
    /// Percent of max
    fn shield(&mut self, percent: u32);
    fn powerup_badge(&mut self, kind: PowerupKind, active: bool);
    fn level_banner(&mut self, level: u32);
    fn screen_shake(&mut self, duration_ms: f64);
    fn paused(&mut self, paused: bool);
    fn game_over(&mut self, score: u64, level: u32);
}

/// Discards every call; for headless runs
#[derive(Debug, Clone, Copy, Default)]
pub struct Null;

impl RenderSurface for Null {
    fn clear(&mut self, _color: Color) {}
    fn fill_circle(&mut self, _center: DVec2, _radius: f64, _color: Color) {}
    fn stroke_circle(&mut self, _center: DVec2, _radius: f64, _line_width: f64, _color: Color) {}
    fn fill_polygon(&mut self, _points: &[DVec2], _color: Color) {}
    fn fill_text(&mut self, _text: &str, _pos: DVec2, _size: f64, _color: Color) {}
}

impl AudioTrigger for Null {
    fn play_sound(&mut self, _cue: SoundCue, _params: SoundParams) {}
}

impl UiSink for Null {
    fn score(&mut self, _score: u64) {}
    fn level(&mut self, _level: u32) {}
    fn health(&mut self, _percent: u32) {}
    fn shield(&mut self, _percent: u32) {}
    fn powerup_badge(&mut self, _kind: PowerupKind, _active: bool) {}
    fn level_banner(&mut self, _level: u32) {}
    fn screen_shake(&mut self, _duration_ms: f64) {}
    fn paused(&mut self, _paused: bool) {}
    fn game_over(&mut self, _score: u64, _level: u32) {}
}
