//! Cosmic Shooter entry point
//!
//! The browser build wires a [`Session`] to canvas 2D, Web Audio and the DOM
//! and drives it from `requestAnimationFrame`. The native build runs a
//! headless, seeded autopilot for smoke testing the simulation.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::DVec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, KeyboardEvent,
        TouchEvent,
    };

    use cosmic_shooter::audio::WebAudio;
    use cosmic_shooter::ports::{RenderSurface, UiSink};
    use cosmic_shooter::sim::{Clock, Key, PowerupKind, SeededRng, Viewport};
    use cosmic_shooter::{Color, FrameStatus, Host, Session, Settings, Tuning};

    /// `performance.now()` time source
    struct PerformanceClock {
        performance: web_sys::Performance,
    }

    impl Clock for PerformanceClock {
        fn now_ms(&self) -> f64 {
            self.performance.now()
        }
    }

    /// Canvas 2D backed [`RenderSurface`]
    struct CanvasSurface {
        ctx: CanvasRenderingContext2d,
        width: f64,
        height: f64,
    }

    impl CanvasSurface {
        fn trace_polygon(&self, points: &[DVec2]) {
            self.ctx.begin_path();
            self.ctx.move_to(points[0].x, points[0].y);
            for p in &points[1..] {
                self.ctx.line_to(p.x, p.y);
            }
            self.ctx.close_path();
        }
    }

    impl RenderSurface for CanvasSurface {
        fn clear(&mut self, color: Color) {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
        }

        fn fill_circle(&mut self, center: DVec2, radius: f64, color: Color) {
            self.ctx.begin_path();
            let _ = self
                .ctx
                .arc(center.x, center.y, radius.max(0.0), 0.0, std::f64::consts::TAU);
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }

        fn stroke_circle(&mut self, center: DVec2, radius: f64, line_width: f64, color: Color) {
            self.ctx.begin_path();
            let _ = self
                .ctx
                .arc(center.x, center.y, radius.max(0.0), 0.0, std::f64::consts::TAU);
            self.ctx.set_line_width(line_width);
            self.ctx.set_stroke_style_str(&color.to_css());
            self.ctx.stroke();
        }

        fn fill_polygon(&mut self, points: &[DVec2], color: Color) {
            if points.len() < 3 {
                return;
            }
            self.trace_polygon(points);
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }

        fn fill_text(&mut self, text: &str, pos: DVec2, size: f64, color: Color) {
            self.ctx.set_font(&format!("bold {}px sans-serif", size.round()));
            self.ctx.set_text_align("center");
            self.ctx.set_text_baseline("middle");
            self.ctx.set_fill_style_str(&color.to_css());
            let _ = self.ctx.fill_text(text, pos.x, pos.y);
        }
    }

    /// DOM backed [`UiSink`]
    struct DomUi {
        document: Document,
    }

    impl DomUi {
        fn element(&self, id: &str) -> Option<HtmlElement> {
            self.document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.element(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_bar(&self, id: &str, percent: u32) {
            if let Some(el) = self.element(id) {
                let _ = el.style().set_property("width", &format!("{}%", percent));
            }
        }

        fn set_class(&self, id: &str, class: &str, on: bool) {
            if let Some(el) = self.element(id) {
                let _ = if on {
                    el.class_list().add_1(class)
                } else {
                    el.class_list().remove_1(class)
                };
            }
        }

        /// Add `class` to `id` and drop it again after `duration_ms`
        fn flash_class(&self, id: &str, class: &'static str, duration_ms: f64) {
            let Some(el) = self.element(id) else { return };
            let _ = el.class_list().add_1(class);
            let Some(window) = web_sys::window() else { return };
            let clear = Closure::once_into_js(move || {
                let _ = el.class_list().remove_1(class);
            });
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                clear.unchecked_ref(),
                duration_ms as i32,
            );
        }
    }

    fn badge_id(kind: PowerupKind) -> &'static str {
        match kind {
            PowerupKind::TripleShot => "badge-triple",
            PowerupKind::Shield => "badge-shield",
            PowerupKind::Speed => "badge-speed",
        }
    }

    impl UiSink for DomUi {
        fn score(&mut self, score: u64) {
            self.set_text("score", &score.to_string());
        }

        fn level(&mut self, level: u32) {
            self.set_text("level", &level.to_string());
        }

        fn health(&mut self, percent: u32) {
            self.set_bar("health-bar", percent);
        }

        fn shield(&mut self, percent: u32) {
            self.set_bar("shield-bar", percent);
        }

        fn powerup_badge(&mut self, kind: PowerupKind, active: bool) {
            self.set_class(badge_id(kind), "active", active);
        }

        fn level_banner(&mut self, level: u32) {
            self.set_text("level-banner", &format!("Level {}", level));
            self.flash_class("level-banner", "show", 2000.0);
        }

        fn screen_shake(&mut self, duration_ms: f64) {
            self.flash_class("game-canvas", "shake", duration_ms);
        }

        fn paused(&mut self, paused: bool) {
            self.set_class("pause-overlay", "hidden", !paused);
        }

        fn game_over(&mut self, score: u64, level: u32) {
            self.set_text("final-score", &score.to_string());
            self.set_text("final-level", &level.to_string());
            self.set_class("game-over", "hidden", false);
        }
    }

    struct Game {
        session: Session,
        surface: CanvasSurface,
        audio: WebAudio,
        ui: DomUi,
        /// A frame callback is pending
        looping: bool,
    }

    impl Game {
        fn frame(&mut self) -> FrameStatus {
            let mut host = Host {
                surface: &mut self.surface,
                audio: &mut self.audio,
                ui: &mut self.ui,
            };
            let status = self.session.frame(&mut host);
            self.update_joystick_knob();
            status
        }

        fn update_joystick_knob(&self) {
            let Some(knob) = self.ui.element("joystick-knob") else { return };
            let drag = self.session.joystick_drag().unwrap_or(DVec2::ZERO);
            let _ = knob.style().set_property(
                "transform",
                &format!("translate({:.1}px, {:.1}px)", drag.x, drag.y),
            );
        }

        fn resize(&mut self, width: f64, height: f64) {
            self.surface.width = width;
            self.surface.height = height;
            self.session.resize(width, height);
        }
    }

    /// Tuning from an inline `<script id="tuning" type="application/json">`
    fn load_tuning(document: &Document) -> Tuning {
        let Some(json) = document
            .get_element_by_id("tuning")
            .and_then(|el| el.text_content())
        else {
            return Tuning::default();
        };
        match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning overrides: {}", e);
                Tuning::default()
            }
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Cosmic Shooter starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let performance = window.performance().ok_or("no performance timer")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let width = window.inner_width()?.as_f64().unwrap_or(800.0);
        let height = window.inner_height()?.as_f64().unwrap_or(600.0);
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        let session = Session::new(
            Viewport::new(width, height),
            load_tuning(&document),
            Settings::load(),
            Box::new(PerformanceClock { performance }),
            Box::new(SeededRng::new(seed)),
        );
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            surface: CanvasSurface { ctx, width, height },
            audio: WebAudio::new(),
            ui: DomUi {
                document: document.clone(),
            },
            looping: false,
        }));

        setup_keyboard(&document, game.clone());
        setup_touch(&canvas, game.clone());
        setup_resize(&canvas, game.clone());
        setup_restart_button(&document, game.clone());
        setup_auto_pause(&document, game.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        start_loop(game);
        log::info!("Cosmic Shooter running!");
        Ok(())
    }

    fn setup_keyboard(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let name = event.key();
                if name == "m" || name == "M" {
                    let mut g = game.borrow_mut();
                    let mut settings = g.session.settings().clone();
                    settings.muted = !settings.muted;
                    settings.save();
                    log::info!("Audio {}", if settings.muted { "muted" } else { "unmuted" });
                    g.session.set_settings(settings);
                    return;
                }
                let Some(key) = Key::from_name(&name) else { return };
                event.prevent_default();
                let mut g = game.borrow_mut();
                // First gesture unlocks audio
                g.audio.resume();
                g.session.key_down(key);
            });
            let _ =
                document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(key) = Key::from_name(&event.key()) {
                game.borrow_mut().session.key_up(key);
            }
        });
        let _ = document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Canvas-relative positions of the touches that changed in `event`
    fn changed_touches(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Vec<(i32, DVec2)> {
        let rect = canvas.get_bounding_client_rect();
        let touches = event.changed_touches();
        (0..touches.length())
            .filter_map(|i| touches.item(i))
            .map(|t| {
                let pos = DVec2::new(
                    t.client_x() as f64 - rect.left(),
                    t.client_y() as f64 - rect.top(),
                );
                (t.identifier(), pos)
            })
            .collect()
    }

    fn setup_touch(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        type Phase = fn(&mut Session, i32, DVec2);
        let phases: [(&str, Phase); 4] = [
            ("touchstart", |s, id, pos| s.touch_start(id, pos)),
            ("touchmove", |s, id, pos| s.touch_move(id, pos)),
            ("touchend", |s, id, _| s.touch_end(id)),
            ("touchcancel", |s, id, _| s.touch_cancel(id)),
        ];

        for (name, phase) in phases {
            let game = game.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                g.audio.resume();
                for (id, pos) in changed_touches(&target, &event) {
                    phase(&mut g.session, id, pos);
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let width = window.inner_width().ok().and_then(|v| v.as_f64());
            let height = window.inner_height().ok().and_then(|v| v.as_f64());
            if let (Some(width), Some(height)) = (width, height) {
                canvas.set_width(width as u32);
                canvas.set_height(height as u32);
                game.borrow_mut().resize(width, height);
                log::debug!("Resized to {}x{}", width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(btn) = document.get_element_by_id("restart-button") else { return };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            {
                let mut g = game.borrow_mut();
                g.session.restart();
                g.ui.set_class("game-over", "hidden", true);
            }
            start_loop(game.clone());
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut g = game.borrow_mut();
                if g.session.is_active() && !g.session.is_paused() {
                    g.session.pause();
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Begin scheduling frames unless a callback is already pending
    fn start_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.looping {
                return;
            }
            g.looping = true;
        }
        request_animation_frame(game);
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        let status = game.borrow_mut().frame();
        if status == FrameStatus::Halted {
            game.borrow_mut().looping = false;
            log::info!("Frame loop stopped");
            return;
        }
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    web_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use cosmic_shooter::consts::NOMINAL_TICK_MS;
    use cosmic_shooter::ports::{AudioTrigger, Null, UiSink};
    use cosmic_shooter::sim::{
        Key, ManualClock, PowerupKind, SeededRng, SoundCue, SoundParams, Viewport,
    };
    use cosmic_shooter::{
        FrameStatus, Host, QualityPreset, Session, Settings, Tuning, normalize_angle,
    };

    /// Traces cues instead of playing them
    struct LogAudio;

    impl AudioTrigger for LogAudio {
        fn play_sound(&mut self, cue: SoundCue, params: SoundParams) {
            log::trace!(
                "{} vol {:.2} rate {:.2} pan {:.2}",
                cue.name(),
                params.volume,
                params.rate,
                params.pan
            );
        }
    }

    /// Logs overlay events, ignores per-frame HUD churn
    struct LogUi;

    impl UiSink for LogUi {
        fn score(&mut self, _score: u64) {}
        fn level(&mut self, _level: u32) {}
        fn health(&mut self, percent: u32) {
            log::debug!("Health {}%", percent);
        }
        fn shield(&mut self, _percent: u32) {}
        fn powerup_badge(&mut self, kind: PowerupKind, active: bool) {
            log::debug!("{:?} {}", kind, if active { "on" } else { "off" });
        }
        fn level_banner(&mut self, level: u32) {
            log::info!("Level {}", level);
        }
        fn screen_shake(&mut self, _duration_ms: f64) {}
        fn paused(&mut self, _paused: bool) {}
        fn game_over(&mut self, score: u64, level: u32) {
            log::info!("Game over: score {} at level {}", score, level);
        }
    }

    /// Turn toward the nearest enemy and keep the trigger held
    fn steer(session: &mut Session) {
        let world = session.world();
        let player = world.player.pos;
        let heading = world.player.heading;
        let target = world
            .enemies
            .values()
            .map(|e| e.pos)
            .chain(world.meteors.values().map(|m| m.pos))
            .min_by(|a, b| a.distance_squared(player).total_cmp(&b.distance_squared(player)));

        session.key_up(Key::Left);
        session.key_up(Key::Right);
        if let Some(target) = target {
            let d = target - player;
            let diff = normalize_angle(d.x.atan2(-d.y) - heading);
            if diff > 0.05 {
                session.key_down(Key::Right);
            } else if diff < -0.05 {
                session.key_down(Key::Left);
            }
        }
        session.key_down(Key::Fire);
    }

    pub fn run(seed: u64, max_frames: u64, quality: Option<QualityPreset>) {
        let settings = quality.map_or_else(Settings::load, Settings::from_preset);
        log::info!("Quality {}", settings.quality.as_str());
        let clock = ManualClock::new(0.0);
        let mut session = Session::new(
            Viewport::new(800.0, 600.0),
            Tuning::default(),
            settings,
            Box::new(clock.clone()),
            Box::new(SeededRng::new(seed)),
        );

        let (mut surface, mut audio, mut ui) = (Null, LogAudio, LogUi);
        let mut frames = 0;
        while frames < max_frames {
            steer(&mut session);
            clock.advance(NOMINAL_TICK_MS);
            let mut host = Host {
                surface: &mut surface,
                audio: &mut audio,
                ui: &mut ui,
            };
            frames += 1;
            if session.frame(&mut host) == FrameStatus::Halted {
                break;
            }
        }

        let state = &session.world().state;
        log::info!(
            "Autopilot finished after {} frames ({:.1}s simulated): score {}, level {}, {}",
            frames,
            clock_secs(frames),
            state.score,
            state.level,
            if state.active { "alive" } else { "destroyed" }
        );
    }

    fn clock_secs(frames: u64) -> f64 {
        frames as f64 * NOMINAL_TICK_MS / 1000.0
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Cosmic Shooter (native) starting...");
    log::info!("Native mode runs a headless autopilot - run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 120);
    let quality = args.next().and_then(|s| cosmic_shooter::QualityPreset::parse(&s));
    headless::run(seed, frames, quality);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
