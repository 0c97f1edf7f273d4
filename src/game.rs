//! Frame-driven session
//!
//! A [`Session`] owns one world, its input controller and spawn scheduler.
//! The host calls [`Session::frame`] once per display frame and reschedules
//! while the returned status is not [`FrameStatus::Halted`].

use glam::DVec2;

use crate::consts::MAX_FRAME_MS;
use crate::ports::{AudioTrigger, RenderSurface, UiSink};
use crate::render::render_world;
use crate::settings::Settings;
use crate::sim::{
    Clock, GameEvent, GameWorld, HudSnapshot, InputController, Key, PowerupKind, Randomness,
    SoundParams, SpawnScheduler, Viewport, tick,
};
use crate::tuning::Tuning;

/// Outcome of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Simulated and drew a frame
    Running,
    /// Frozen; keep scheduling frames
    Paused,
    /// Run over or quit; stop scheduling frames
    Halted,
}

/// The host side of a frame
pub struct Host<'a> {
    pub surface: &'a mut dyn RenderSurface,
    pub audio: &'a mut dyn AudioTrigger,
    pub ui: &'a mut dyn UiSink,
}

/// One playable run plus the plumbing around it
pub struct Session {
    world: GameWorld,
    input: InputController,
    scheduler: SpawnScheduler,
    settings: Settings,
    last_frame_ms: f64,
    /// Last HUD pushed to the UI; `None` forces a full refresh
    hud: Option<HudSnapshot>,
    reported_paused: bool,
}

impl Session {
    /// Build a world and start the run immediately
    pub fn new(
        viewport: Viewport,
        tuning: Tuning,
        settings: Settings,
        clock: Box<dyn Clock>,
        rng: Box<dyn Randomness>,
    ) -> Self {
        let scheduler = SpawnScheduler::new(&tuning, 1);
        let world = GameWorld::new(viewport, tuning, &settings, clock, rng);
        let last_frame_ms = world.now_ms();
        log::info!(
            "Session started ({}x{}, quality {})",
            viewport.width,
            viewport.height,
            settings.quality.as_str()
        );
        Self {
            world,
            input: InputController::new(),
            scheduler,
            settings,
            last_frame_ms,
            hud: None,
            reported_paused: false,
        }
    }

    pub fn world(&self) -> &GameWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut GameWorld {
        &mut self.world
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Adopt new preferences; particle and star budgets follow immediately
    pub fn set_settings(&mut self, settings: Settings) {
        self.world.max_particles = settings.max_particles();
        let viewport = self.world.viewport;
        let stars = settings.star_count(viewport.width, viewport.height);
        self.settings = settings;
        if stars != self.world.star_count {
            self.world.resize(viewport, &self.settings);
        }
    }

    pub fn is_active(&self) -> bool {
        self.world.state.active
    }

    pub fn is_paused(&self) -> bool {
        self.world.state.paused
    }

    /// Throw the current run away and begin a new one at level 1
    pub fn restart(&mut self) {
        self.world.reset(&self.settings);
        self.scheduler = SpawnScheduler::new(&self.world.tuning, 1);
        self.input.reset();
        self.hud = None;
        self.reported_paused = false;
        self.last_frame_ms = self.world.now_ms();
        log::info!("Session restarted");
    }

    /// Run one frame: tick, draw, advance timers, then report to the host
    pub fn frame(&mut self, host: &mut Host) -> FrameStatus {
        let now_ms = self.world.now_ms();
        let elapsed_ms = (now_ms - self.last_frame_ms).clamp(0.0, MAX_FRAME_MS);
        self.last_frame_ms = now_ms;

        if self.input.take_pause_request() {
            self.toggle_pause();
        }

        let status = if !self.world.state.active {
            FrameStatus::Halted
        } else if self.world.state.paused {
            // Timers keep running; their firings are dropped
            self.scheduler.advance(&mut self.world, elapsed_ms);
            FrameStatus::Paused
        } else {
            let intent = self.input.current_intent(self.world.player.heading);
            tick(&mut self.world, &intent, elapsed_ms);
            render_world(&self.world, host.surface, now_ms);
            self.scheduler.advance(&mut self.world, elapsed_ms);
            if self.world.state.active {
                FrameStatus::Running
            } else {
                FrameStatus::Halted
            }
        };

        self.flush(host);
        status
    }

    /// Deliver queued events and HUD changes to the host
    fn flush(&mut self, host: &mut Host) {
        for event in self.world.drain_events() {
            match event {
                GameEvent::Sound { cue, params } => {
                    let volume = self.settings.effective_volume(params.volume);
                    if volume > 0.0 {
                        host.audio
                            .play_sound(cue, SoundParams::new(volume, params.rate, params.pan));
                    }
                }
                GameEvent::LevelUp(level) => host.ui.level_banner(level),
                GameEvent::ScreenShake { duration_ms } => {
                    if self.settings.effective_screen_shake() {
                        host.ui.screen_shake(duration_ms);
                    }
                }
                GameEvent::GameOver { score, level } => host.ui.game_over(score, level),
                // Badges follow the HUD snapshot, which also sees level-up shields
                GameEvent::PowerupCollected(_) | GameEvent::PowerupExpired(_) => {}
            }
        }

        let hud = self.world.hud();
        let previous = self.hud.take();
        let fresh = previous.is_none();
        let previous = previous.unwrap_or_else(|| hud.clone());
        if fresh || previous.score != hud.score {
            host.ui.score(hud.score);
        }
        if fresh || previous.level != hud.level {
            host.ui.level(hud.level);
        }
        if fresh || previous.health != hud.health {
            host.ui.health(hud.health);
        }
        if fresh || previous.shield != hud.shield {
            host.ui.shield(hud.shield);
        }
        for (i, kind) in PowerupKind::ALL.into_iter().enumerate() {
            if fresh || previous.badges[i] != hud.badges[i] {
                host.ui.powerup_badge(kind, hud.badges[i]);
            }
        }
        self.hud = Some(hud);

        if self.world.state.paused != self.reported_paused {
            self.reported_paused = self.world.state.paused;
            host.ui.paused(self.reported_paused);
        }
    }

    pub fn pause(&mut self) {
        if self.world.state.active && !self.world.state.paused {
            self.world.state.paused = true;
            self.input.reset();
            log::debug!("Paused");
        }
    }

    pub fn resume(&mut self) {
        if self.world.state.active && self.world.state.paused {
            self.world.state.paused = false;
            self.last_frame_ms = self.world.now_ms();
            log::debug!("Resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.world.state.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Leave the run: timers stop and every entity is released
    pub fn quit(&mut self) {
        self.scheduler.stop();
        self.world.clear_entities();
        self.world.state.active = false;
        self.world.state.paused = false;
        self.input.reset();
        log::info!("Session quit at score {}", self.world.state.score);
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Pause if !self.world.state.active => {}
            Key::Fire if !self.world.is_running() => {}
            _ => self.input.key_down(key),
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }

    pub fn touch_start(&mut self, id: i32, pos: DVec2) {
        if self.world.is_running() {
            let now_ms = self.world.now_ms();
            self.input.touch_start(id, pos, now_ms);
        }
    }

    pub fn touch_move(&mut self, id: i32, pos: DVec2) {
        if self.world.is_running() {
            self.input.touch_move(id, pos);
        }
    }

    pub fn touch_end(&mut self, id: i32) {
        let now_ms = self.world.now_ms();
        self.input.touch_end(id, now_ms);
    }

    pub fn touch_cancel(&mut self, id: i32) {
        self.input.touch_cancel(id);
    }

    /// Joystick drag for the on-screen knob, if a joystick touch is held
    pub fn joystick_drag(&self) -> Option<DVec2> {
        self.input.joystick_drag()
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.world.resize(Viewport::new(width, height), &self.settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Null;
    use crate::sim::{ManualClock, ScriptedRng};

    fn session(clock: &ManualClock) -> Session {
        Session::new(
            Viewport::new(800.0, 600.0),
            Tuning::default(),
            Settings::default(),
            Box::new(clock.clone()),
            Box::new(ScriptedRng::constant(0.5)),
        )
    }

    fn frame(session: &mut Session) -> FrameStatus {
        let (mut surface, mut audio, mut ui) = (Null, Null, Null);
        let mut host = Host {
            surface: &mut surface,
            audio: &mut audio,
            ui: &mut ui,
        };
        session.frame(&mut host)
    }

    #[test]
    fn test_frame_elapsed_is_clamped() {
        let clock = ManualClock::new(0.0);
        let mut s = session(&clock);
        s.world_mut().powerups.arm(PowerupKind::Speed, 1000.0);
        clock.advance(5000.0);
        assert_eq!(frame(&mut s), FrameStatus::Running);
        assert_eq!(s.world().powerups.speed_ms, 900.0);
    }

    #[test]
    fn test_pause_key_toggles() {
        let clock = ManualClock::new(0.0);
        let mut s = session(&clock);
        s.key_down(Key::Pause);
        clock.advance(16.0);
        assert_eq!(frame(&mut s), FrameStatus::Paused);
        assert!(s.is_paused());

        s.key_down(Key::Pause);
        clock.advance(16.0);
        assert_eq!(frame(&mut s), FrameStatus::Running);
    }

    #[test]
    fn test_fire_ignored_while_paused() {
        let clock = ManualClock::new(0.0);
        let mut s = session(&clock);
        s.pause();
        s.key_down(Key::Fire);
        s.resume();
        clock.advance(16.0);
        frame(&mut s);
        assert!(s.world().projectiles.is_empty());
    }

    #[test]
    fn test_quit_halts_and_clears() {
        let clock = ManualClock::new(0.0);
        let mut s = session(&clock);
        s.key_down(Key::Fire);
        clock.advance(16.0);
        frame(&mut s);
        assert_eq!(s.world().projectiles.len(), 1);

        s.quit();
        assert!(s.world().projectiles.is_empty());
        assert!(s.scheduler().is_stopped());
        assert_eq!(frame(&mut s), FrameStatus::Halted);

        s.restart();
        assert!(s.is_active());
        clock.advance(16.0);
        assert_eq!(frame(&mut s), FrameStatus::Running);
    }
}
