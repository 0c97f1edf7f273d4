//! World state and the single aggregate that owns it
//!
//! Everything the simulation reads or writes in a tick hangs off
//! [`GameWorld`]: entity registries, the player, timed effects, the injected
//! clock and randomness, and the outgoing event queue.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::entities::{Enemy, Meteor, Pickup, Player, Projectile, Star};
use super::events::{GameEvent, SoundCue, SoundParams};
use super::particles::{Fx, Particle};
use super::powerups::{ActivePowerups, PowerupKind};
use super::registry::{EntityId, IdAllocator, Registry};
use super::rng::Randomness;
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Borrow the effect sinks of a world as an [`Fx`] while other fields stay free
macro_rules! world_fx {
    ($world:expr) => {
        $crate::sim::particles::Fx {
            rng: &mut *$world.rng,
            ids: &mut $world.ids,
            particles: &mut $world.particles,
            pickups: &mut $world.pickups,
            events: &mut $world.events,
            viewport: $world.viewport,
            particle_cap: $world.max_particles,
        }
    };
}
pub(crate) use world_fx;

/// Drawable area in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Run-level bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    /// 1..=MAX_LEVEL
    pub level: u32,
    /// False once the run has ended
    pub active: bool,
    pub paused: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            score: 0,
            level: 1,
            active: true,
            paused: false,
            time_ticks: 0,
        }
    }
}

/// What the HUD shows; compared frame to frame so only changes are pushed
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub score: u64,
    pub level: u32,
    /// Percent of max
    pub health: u32,
    /// Percent of max
    pub shield: u32,
    /// Badge visibility in `PowerupKind::ALL` order
    pub badges: [bool; 3],
}

/// The whole simulated world
pub struct GameWorld {
    pub viewport: Viewport,
    pub tuning: Tuning,
    pub state: GameState,
    pub player: Player,
    pub powerups: ActivePowerups,
    pub projectiles: Registry<Projectile>,
    pub enemies: Registry<Enemy>,
    pub meteors: Registry<Meteor>,
    pub particles: Registry<Particle>,
    pub pickups: Registry<Pickup>,
    pub stars: Vec<Star>,
    /// Live particle budget (0 disables particles)
    pub max_particles: usize,
    /// Background star count for the current viewport
    pub star_count: usize,
    pub(crate) ids: IdAllocator,
    pub(crate) rng: Box<dyn Randomness>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) events: Vec<GameEvent>,
}

impl GameWorld {
    pub fn new(
        viewport: Viewport,
        tuning: Tuning,
        settings: &Settings,
        clock: Box<dyn Clock>,
        rng: Box<dyn Randomness>,
    ) -> Self {
        let star_count = settings.star_count(viewport.width, viewport.height);
        let mut world = Self {
            viewport,
            tuning,
            state: GameState::default(),
            player: Player::new(viewport.center()),
            powerups: ActivePowerups::default(),
            projectiles: Registry::new(),
            enemies: Registry::new(),
            meteors: Registry::new(),
            particles: Registry::new(),
            pickups: Registry::new(),
            stars: Vec::new(),
            max_particles: settings.max_particles(),
            star_count,
            ids: IdAllocator::default(),
            rng,
            clock,
            events: Vec::new(),
        };
        world.scatter_stars();
        world
    }

    fn scatter_stars(&mut self) {
        let viewport = self.viewport;
        let rng = &mut *self.rng;
        self.stars = (0..self.star_count)
            .map(|_| Star::new(viewport, rng))
            .collect();
    }

    /// Current time from the injected clock (ms)
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Effect context over this world's sinks
    pub fn fx(&mut self) -> Fx<'_> {
        world_fx!(self)
    }

    pub fn rng(&mut self) -> &mut dyn Randomness {
        &mut *self.rng
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand queued events to the caller, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn spawn_enemy(&mut self, enemy: Enemy) -> EntityId {
        self.enemies.insert(&mut self.ids, enemy)
    }

    pub fn spawn_meteor(&mut self, meteor: Meteor) -> EntityId {
        self.meteors.insert(&mut self.ids, meteor)
    }

    pub fn spawn_projectile(&mut self, projectile: Projectile) -> EntityId {
        self.projectiles.insert(&mut self.ids, projectile)
    }

    pub fn spawn_pickup(&mut self, pickup: Pickup) -> EntityId {
        self.pickups.insert(&mut self.ids, pickup)
    }

    /// Speed multiplier while the Speed power-up runs
    pub fn speed_boost(&self) -> f64 {
        if self.powerups.is_active(PowerupKind::Speed) {
            self.tuning.speed_boost
        } else {
            1.0
        }
    }

    /// Activate a collected power-up at `pos`
    pub fn collect_powerup(&mut self, kind: PowerupKind, pos: DVec2) {
        let duration = self.tuning.powerup_duration(kind);
        self.powerups.arm(kind, duration);
        if kind == PowerupKind::Shield {
            self.player.shield = MAX_SHIELD;
        }

        let mut fx = self.fx();
        fx.powerup_burst(pos, kind.color());
        fx.sound(SoundCue::Powerup, SoundParams::centered(0.4));
        self.events.push(GameEvent::PowerupCollected(kind));
        log::debug!("Collected {:?} for {:.0} ms", kind, duration);
    }

    /// Apply damage to the player
    ///
    /// Returns `true` when the hit ended the run.
    pub fn damage_player(&mut self, damage: u32) -> bool {
        if self.player.apply_damage(damage) {
            self.game_over();
            true
        } else {
            self.events.push(GameEvent::ScreenShake { duration_ms: 300.0 });
            false
        }
    }

    /// Move to `level`: refresh the shield and announce it
    pub fn enter_level(&mut self, level: u32) {
        self.state.level = level.min(MAX_LEVEL);
        self.player.shield = MAX_SHIELD;
        self.powerups
            .arm(PowerupKind::Shield, self.tuning.level_shield_ms);
        self.events.push(GameEvent::LevelUp(self.state.level));
        log::info!("Level {} reached (score {})", self.state.level, self.state.score);
    }

    /// End the run; further ticks are no-ops
    pub fn game_over(&mut self) {
        if !self.state.active {
            return;
        }
        self.state.active = false;
        self.events.push(GameEvent::GameOver {
            score: self.state.score,
            level: self.state.level,
        });
        log::info!(
            "Game over at level {} with score {}",
            self.state.level,
            self.state.score
        );
    }

    /// Whether ticks should advance the world
    pub fn is_running(&self) -> bool {
        self.state.active && !self.state.paused
    }

    pub fn add_score(&mut self, points: u64) {
        self.state.score = self.state.score.saturating_add(points);
    }

    pub fn hud(&self) -> HudSnapshot {
        let mut badges = [false; 3];
        for (slot, kind) in badges.iter_mut().zip(PowerupKind::ALL) {
            *slot = self.powerups.is_active(kind);
        }
        HudSnapshot {
            score: self.state.score,
            level: self.state.level,
            health: self.player.health * 100 / MAX_HEALTH,
            shield: self.player.shield * 100 / MAX_SHIELD,
            badges,
        }
    }

    /// Adopt a new viewport size, keeping the player on screen
    pub fn resize(&mut self, viewport: Viewport, settings: &Settings) {
        self.viewport = viewport;
        self.player.clamp_to(viewport);
        self.star_count = settings.star_count(viewport.width, viewport.height);
        self.scatter_stars();
    }

    /// Start a fresh run in place, keeping the clock, randomness and viewport
    pub fn reset(&mut self, settings: &Settings) {
        self.clear_entities();
        self.events.clear();
        self.state = GameState::default();
        self.player = Player::new(self.viewport.center());
        self.max_particles = settings.max_particles();
        self.star_count = settings.star_count(self.viewport.width, self.viewport.height);
        self.scatter_stars();
    }

    /// Drop every entity, e.g. when the session quits
    pub fn clear_entities(&mut self) {
        self.projectiles.clear();
        self.enemies.clear();
        self.meteors.clear();
        self.particles.clear();
        self.pickups.clear();
        self.powerups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::clock::ManualClock;
    use crate::sim::rng::ScriptedRng;

    fn world() -> GameWorld {
        GameWorld::new(
            Viewport::new(800.0, 600.0),
            Tuning::default(),
            &Settings::default(),
            Box::new(ManualClock::new(0.0)),
            Box::new(ScriptedRng::constant(0.5)),
        )
    }

    #[test]
    fn test_new_world() {
        let w = world();
        assert_eq!(w.player.pos, DVec2::new(400.0, 300.0));
        assert_eq!(w.state.level, 1);
        assert!(w.is_running());
        assert_eq!(w.stars.len(), w.star_count);
        assert!(w.enemies.is_empty());
    }

    #[test]
    fn test_collect_shield() {
        let mut w = world();
        w.collect_powerup(PowerupKind::Shield, DVec2::new(100.0, 100.0));
        assert_eq!(w.player.shield, 100);
        assert_eq!(w.powerups.shield_ms, 10_000.0);
        assert_eq!(w.particles.len(), 21);

        let events = w.drain_events();
        assert!(events.contains(&GameEvent::PowerupCollected(PowerupKind::Shield)));
        // Centered regardless of where the pickup was
        assert!(events.contains(&GameEvent::Sound {
            cue: SoundCue::Powerup,
            params: SoundParams::new(0.4, 1.0, 0.0),
        }));
        assert!(w.drain_events().is_empty());
    }

    #[test]
    fn test_lethal_damage_ends_run_once() {
        let mut w = world();
        assert!(!w.damage_player(10));
        assert_eq!(w.player.health, 90);
        assert!(w.damage_player(90));
        assert!(!w.state.active);
        w.game_over();

        let overs = w
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_enter_level_refreshes_shield() {
        let mut w = world();
        w.enter_level(2);
        assert_eq!(w.state.level, 2);
        assert_eq!(w.player.shield, 100);
        assert_eq!(w.powerups.shield_ms, 5000.0);
        assert_eq!(w.hud().badges, [true, false, false]);
    }

    #[test]
    fn test_hud_percentages() {
        let mut w = world();
        w.player.health = 45;
        w.player.shield = 20;
        w.add_score(15);
        let hud = w.hud();
        assert_eq!((hud.score, hud.health, hud.shield), (15, 45, 20));
    }

    #[test]
    fn test_reset_starts_fresh_run() {
        let mut w = world();
        w.add_score(120);
        w.enter_level(4);
        w.spawn_pickup(Pickup::new(DVec2::ZERO, PowerupKind::Speed));
        w.game_over();

        w.reset(&Settings::default());
        assert_eq!(w.state, GameState::default());
        assert!(w.pickups.is_empty());
        assert!(w.drain_events().is_empty());
        assert_eq!(w.powerups, ActivePowerups::default());
        assert_eq!(w.player.health, MAX_HEALTH);
    }

    #[test]
    fn test_resize_clamps_player() {
        let mut w = world();
        w.player.pos = DVec2::new(790.0, 590.0);
        w.resize(Viewport::new(400.0, 300.0), &Settings::default());
        assert_eq!(w.player.pos, DVec2::new(380.0, 275.0));
        assert_eq!(w.viewport.width, 400.0);
    }
}
