// Shared fixtures for driving a session against recording host adapters.
#![allow(dead_code)]

use cosmic_shooter::ports::{AudioTrigger, RenderSurface, UiSink};
use cosmic_shooter::sim::{ManualClock, PowerupKind, ScriptedRng, SoundCue, SoundParams, Viewport};
use cosmic_shooter::{Color, FrameStatus, Host, Session, Settings, Tuning};
use glam::DVec2;

/// Everything the UI was told, in order
#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Score(u64),
    Level(u32),
    Health(u32),
    Shield(u32),
    Badge(PowerupKind, bool),
    Banner(u32),
    Shake(f64),
    Paused(bool),
    GameOver(u64, u32),
}

#[derive(Debug, Default)]
pub struct RecordingUi {
    pub calls: Vec<UiCall>,
}

impl RecordingUi {
    pub fn saw(&self, call: &UiCall) -> bool {
        self.calls.contains(call)
    }
}

impl UiSink for RecordingUi {
    fn score(&mut self, score: u64) {
        self.calls.push(UiCall::Score(score));
    }
    fn level(&mut self, level: u32) {
        self.calls.push(UiCall::Level(level));
    }
    fn health(&mut self, percent: u32) {
        self.calls.push(UiCall::Health(percent));
    }
    fn shield(&mut self, percent: u32) {
        self.calls.push(UiCall::Shield(percent));
    }
    fn powerup_badge(&mut self, kind: PowerupKind, active: bool) {
        self.calls.push(UiCall::Badge(kind, active));
    }
    fn level_banner(&mut self, level: u32) {
        self.calls.push(UiCall::Banner(level));
    }
    fn screen_shake(&mut self, duration_ms: f64) {
        self.calls.push(UiCall::Shake(duration_ms));
    }
    fn paused(&mut self, paused: bool) {
        self.calls.push(UiCall::Paused(paused));
    }
    fn game_over(&mut self, score: u64, level: u32) {
        self.calls.push(UiCall::GameOver(score, level));
    }
}

#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub played: Vec<(SoundCue, SoundParams)>,
}

impl RecordingAudio {
    pub fn count(&self, cue: SoundCue) -> usize {
        self.played.iter().filter(|(c, _)| *c == cue).count()
    }
}

impl AudioTrigger for RecordingAudio {
    fn play_sound(&mut self, cue: SoundCue, params: SoundParams) {
        self.played.push((cue, params));
    }
}

/// Counts frames and primitives
#[derive(Debug, Default)]
pub struct CountingSurface {
    pub frames: usize,
    pub primitives: usize,
}

impl RenderSurface for CountingSurface {
    fn clear(&mut self, _color: Color) {
        self.frames += 1;
    }
    fn fill_circle(&mut self, _center: DVec2, _radius: f64, _color: Color) {
        self.primitives += 1;
    }
    fn stroke_circle(&mut self, _center: DVec2, _radius: f64, _line_width: f64, _color: Color) {
        self.primitives += 1;
    }
    fn fill_polygon(&mut self, _points: &[DVec2], _color: Color) {
        self.primitives += 1;
    }
    fn fill_text(&mut self, _text: &str, _pos: DVec2, _size: f64, _color: Color) {
        self.primitives += 1;
    }
}

/// A session on a hand-driven clock plus recording adapters
pub struct Rig {
    pub session: Session,
    pub clock: ManualClock,
    pub surface: CountingSurface,
    pub audio: RecordingAudio,
    pub ui: RecordingUi,
}

impl Rig {
    pub fn new() -> Self {
        Self::with_viewport(Viewport::new(800.0, 600.0))
    }

    /// Every random draw is 0.5: no drops, no cosmetic particles at low odds
    pub fn with_viewport(viewport: Viewport) -> Self {
        let clock = ManualClock::new(0.0);
        let settings = Settings {
            starfield: false,
            ..Settings::default()
        };
        let session = Session::new(
            viewport,
            Tuning::default(),
            settings,
            Box::new(clock.clone()),
            Box::new(ScriptedRng::constant(0.5)),
        );
        Self {
            session,
            clock,
            surface: CountingSurface::default(),
            audio: RecordingAudio::default(),
            ui: RecordingUi::default(),
        }
    }

    /// Advance the clock by one nominal frame and run it
    pub fn frame(&mut self) -> FrameStatus {
        self.clock.advance(16.0);
        let mut host = Host {
            surface: &mut self.surface,
            audio: &mut self.audio,
            ui: &mut self.ui,
        };
        self.session.frame(&mut host)
    }

    pub fn frames(&mut self, n: usize) -> FrameStatus {
        let mut status = FrameStatus::Running;
        for _ in 0..n {
            status = self.frame();
        }
        status
    }
}
