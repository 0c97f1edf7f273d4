//! Cosmetic particles and the effect spawners that emit them
//!
//! Particles never collide. Each one carries a [`ParticleKind`] chosen at
//! creation that decides how it ages and how it is drawn.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::entities::Pickup;
use super::events::{GameEvent, SoundCue, SoundParams};
use super::powerups::PowerupKind;
use super::registry::{IdAllocator, Registry};
use super::rng::Randomness;
use super::state::Viewport;
use crate::color::Color;
use crate::pan_for;

/// Radius an expanding ring reaches at the end of its life
pub const RING_MAX_RADIUS: f64 = 50.0;

/// How a particle ages and renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    /// Drifts with drag, shrinks and fades with remaining life
    Decay,
    /// Stationary white ring expanding out of an explosion
    ShockwaveRing,
    /// Stationary colored ring expanding out of a pickup
    PulseRing,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub base_radius: f64,
    pub color: Color,
    /// Remaining life (ticks)
    pub life: f64,
    pub max_life: f64,
}

impl Particle {
    pub fn decay(pos: DVec2, vel: DVec2, radius: f64, color: Color, life: f64) -> Self {
        Self {
            kind: ParticleKind::Decay,
            pos,
            vel,
            radius,
            base_radius: radius,
            color,
            life,
            max_life: life,
        }
    }

    pub fn ring(kind: ParticleKind, pos: DVec2, radius: f64, color: Color, life: f64) -> Self {
        Self {
            kind,
            pos,
            vel: DVec2::ZERO,
            radius,
            base_radius: radius,
            color,
            life,
            max_life: life,
        }
    }

    /// Remaining life as a fraction (1.0 = fresh)
    pub fn life_fraction(&self) -> f64 {
        if self.max_life <= 0.0 {
            0.0
        } else {
            (self.life / self.max_life).clamp(0.0, 1.0)
        }
    }

    /// Current ring radius for ring kinds
    pub fn ring_radius(&self) -> f64 {
        (1.0 - self.life_fraction()) * RING_MAX_RADIUS
    }

    pub fn update(&mut self) {
        self.life -= 1.0;
        if self.kind == ParticleKind::Decay {
            self.pos += self.vel;
            self.radius = (self.life_fraction() * self.base_radius).max(0.1);
            self.vel *= 0.99;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.life <= 0.0
    }
}

/// Side-effect context handed to entity behaviors
///
/// Bundles everything an update or hit may touch besides the entity itself,
/// so callers can hold a mutable borrow on one registry while effects land
/// in the others.
pub struct Fx<'a> {
    pub rng: &'a mut dyn Randomness,
    pub ids: &'a mut IdAllocator,
    pub particles: &'a mut Registry<Particle>,
    pub pickups: &'a mut Registry<Pickup>,
    pub events: &'a mut Vec<GameEvent>,
    pub viewport: Viewport,
    /// Live particle budget; zero disables particle spawning
    pub particle_cap: usize,
}

impl Fx<'_> {
    /// Queue a particle unless particles are disabled
    pub fn emit(&mut self, particle: Particle) {
        if self.particle_cap > 0 {
            self.particles.insert(self.ids, particle);
        }
    }

    pub fn sound(&mut self, cue: SoundCue, params: SoundParams) {
        self.events.push(GameEvent::sound(cue, params));
    }

    pub fn pan(&self, x: f64) -> f64 {
        pan_for(x, self.viewport.width)
    }

    /// Drop a pickup of a random kind at `pos`
    pub fn drop_pickup(&mut self, pos: DVec2) {
        let idx = self.rng.index(PowerupKind::ALL.len());
        let pickup = Pickup::new(pos, PowerupKind::ALL[idx]);
        log::debug!("Pickup {:?} dropped at ({:.0}, {:.0})", pickup.kind, pos.x, pos.y);
        self.pickups.insert(self.ids, pickup);
    }

    /// Burst of debris, a shockwave ring, an explosion cue and maybe a shake
    ///
    /// `debris` explosions (meteors breaking up) play slightly quieter.
    pub fn explosion(&mut self, pos: DVec2, color: Color, debris: bool) {
        for _ in 0..40 {
            let speed = self.rng.range(1.0, 6.0);
            let angle = self.rng.range(0.0, std::f64::consts::TAU);
            let radius = self.rng.range(2.0, 7.0);
            let life = self.rng.range(30.0, 50.0);
            self.emit(Particle::decay(
                pos,
                DVec2::new(angle.cos(), angle.sin()) * speed,
                radius,
                color,
                life,
            ));
        }
        self.emit(Particle::ring(
            ParticleKind::ShockwaveRing,
            pos,
            5.0,
            Color::WHITE.with_alpha(0.8),
            20.0,
        ));

        let volume: f64 = (0.3_f64 + if debris { 0.1 } else { 0.2 }).min(0.8);
        let rate = self.rng.range(0.8, 1.2);
        let pan = self.pan(pos.x);
        self.sound(SoundCue::Explosion, SoundParams::new(volume, rate, pan));

        if self.rng.chance(0.3) {
            self.events.push(GameEvent::ScreenShake { duration_ms: 500.0 });
        }
    }

    /// Small spark spray and a hit cue
    pub fn hit_sparks(&mut self, pos: DVec2, color: Color) {
        for _ in 0..10 {
            let speed = self.rng.range(0.5, 3.5);
            let angle = self.rng.range(0.0, std::f64::consts::TAU);
            let radius = self.rng.range(1.0, 4.0);
            let life = self.rng.range(15.0, 25.0);
            self.emit(Particle::decay(
                pos,
                DVec2::new(angle.cos(), angle.sin()) * speed,
                radius,
                color,
                life,
            ));
        }

        let rate = self.rng.range(0.9, 1.1);
        let pan = self.pan(pos.x);
        self.sound(SoundCue::Hit, SoundParams::new(0.2, rate, pan));
    }

    /// Evenly spaced ring of particles plus a pulse for a collected pickup
    pub fn powerup_burst(&mut self, pos: DVec2, color: Color) {
        for i in 0..20 {
            let angle = i as f64 / 20.0 * std::f64::consts::TAU;
            let speed = self.rng.range(1.0, 4.0);
            let radius = self.rng.range(2.0, 6.0);
            let life = self.rng.range(30.0, 40.0);
            self.emit(Particle::decay(
                pos,
                DVec2::new(angle.cos(), angle.sin()) * speed,
                radius,
                color,
                life,
            ));
        }
        self.emit(Particle::ring(
            ParticleKind::PulseRing,
            pos,
            20.0,
            color.with_alpha(0.5),
            20.0,
        ));
    }
}
