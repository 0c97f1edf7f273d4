//! Entity types and their per-tick behavior
//!
//! Player, projectiles, enemies, meteors, pickups and background stars.
//! Particles live in `particles`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, SoundCue, SoundParams};
use super::input::Intent;
use super::particles::{Fx, Particle};
use super::powerups::{ActivePowerups, PowerupKind};
use super::rng::Randomness;
use super::state::Viewport;
use crate::color::Color;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{heading_vector, normalize_angle};

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: DVec2,
    /// Radians, 0 = nose up
    pub heading: f64,
    /// Pixels per tick at full throttle
    pub speed: f64,
    /// Ticks until the next shot is allowed
    pub shoot_cooldown: u32,
    pub health: u32,
    pub shield: u32,
    pub width: f64,
    pub height: f64,
}

impl Player {
    pub fn new(pos: DVec2) -> Self {
        Self {
            pos,
            heading: 0.0,
            speed: PLAYER_SPEED,
            shoot_cooldown: 0,
            health: MAX_HEALTH,
            shield: 0,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
        }
    }

    /// Collision radius
    pub fn radius(&self) -> f64 {
        self.width / 2.0
    }

    /// Where shots leave the hull
    pub fn nose(&self) -> DVec2 {
        self.pos + heading_vector(self.heading) * (self.height / 2.0)
    }

    /// Per-tick housekeeping (cooldown)
    pub fn update(&mut self) {
        self.shoot_cooldown = self.shoot_cooldown.saturating_sub(1);
    }

    /// Steer and move according to an intent, staying inside the viewport
    pub fn move_by(&mut self, intent: &Intent, boost: f64, viewport: Viewport) {
        self.heading = intent.heading;

        let direction = if intent.reverse { -1.0 } else { 1.0 };
        let magnitude = intent.magnitude.clamp(0.0, 1.0);
        self.pos += heading_vector(self.heading) * self.speed * magnitude * boost * direction;
        self.clamp_to(viewport);
    }

    /// Keep the hull fully on screen
    pub fn clamp_to(&mut self, viewport: Viewport) {
        let hx = self.width / 2.0;
        let hy = self.height / 2.0;
        self.pos.x = self.pos.x.min(viewport.width - hx).max(hx);
        self.pos.y = self.pos.y.min(viewport.height - hy).max(hy);
    }

    /// Fire if the cooldown allows it
    ///
    /// Returns the new projectiles (empty while cooling down).
    pub fn shoot(
        &mut self,
        active: &ActivePowerups,
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> Vec<Projectile> {
        if self.shoot_cooldown > 0 {
            return Vec::new();
        }

        let nose = self.nose();
        let shots = if active.is_active(PowerupKind::TripleShot) {
            events.push(GameEvent::sound(
                SoundCue::Laser,
                SoundParams::new(0.4, 1.2, 0.0),
            ));
            TRIPLE_SHOT_SPREAD
                .iter()
                .map(|offset| Projectile::player(nose, self.heading + offset))
                .collect()
        } else {
            events.push(GameEvent::sound(
                SoundCue::Laser,
                SoundParams::new(0.3, 1.0, 0.0),
            ));
            vec![Projectile::player(nose, self.heading)]
        };

        self.shoot_cooldown = if active.is_active(PowerupKind::Speed) {
            tuning.boosted_shoot_cooldown_ticks
        } else {
            tuning.shoot_cooldown_ticks
        };
        shots
    }

    /// Apply contact damage, shield first
    ///
    /// Damage beyond the shield spills into health. Returns `true` when the
    /// hit was lethal.
    pub fn apply_damage(&mut self, damage: u32) -> bool {
        let absorbed = damage.min(self.shield);
        self.shield -= absorbed;
        self.health = self.health.saturating_sub(damage - absorbed);
        self.health == 0
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// A laser bolt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: Owner,
    pub pos: DVec2,
    pub heading: f64,
    pub speed: f64,
    pub radius: f64,
    /// Remaining range (ticks)
    pub life: u32,
    /// Ticks until the next trail particle
    trail_timer: u32,
}

impl Projectile {
    pub fn player(pos: DVec2, heading: f64) -> Self {
        Self::new(Owner::Player, pos, heading, PLAYER_PROJECTILE_SPEED)
    }

    pub fn enemy(pos: DVec2, heading: f64) -> Self {
        Self::new(Owner::Enemy, pos, heading, ENEMY_PROJECTILE_SPEED)
    }

    fn new(owner: Owner, pos: DVec2, heading: f64, speed: f64) -> Self {
        Self {
            owner,
            pos,
            heading,
            speed,
            radius: PROJECTILE_RADIUS,
            life: PROJECTILE_LIFE,
            trail_timer: 0,
        }
    }

    pub fn color(&self) -> Color {
        match self.owner {
            Owner::Player => Color::PLAYER_SHOT,
            Owner::Enemy => Color::ENEMY_SHOT,
        }
    }

    pub fn update(&mut self, fx: &mut Fx) {
        self.pos += heading_vector(self.heading) * self.speed;

        if self.trail_timer == 0 {
            let color = match self.owner {
                Owner::Player => Color::rgb(255, 255, fx.rng.range(155.0, 255.0) as u8),
                Owner::Enemy => Color::rgb(
                    255,
                    fx.rng.range(0.0, 100.0) as u8,
                    fx.rng.range(0.0, 50.0) as u8,
                ),
            }
            .with_alpha(fx.rng.range(0.5, 1.0));
            let vel = DVec2::new(fx.rng.spread(0.25), fx.rng.spread(0.25));
            let radius = fx.rng.range(1.0, 3.0);
            fx.emit(Particle::decay(self.pos, vel, radius, color, 10.0));
            self.trail_timer = 2;
        }
        self.trail_timer -= 1;

        self.life = self.life.saturating_sub(1);
    }

    /// Outside the exact viewport, or out of range
    pub fn is_off_screen(&self, viewport: Viewport) -> bool {
        self.pos.x < 0.0
            || self.pos.x > viewport.width
            || self.pos.y < 0.0
            || self.pos.y > viewport.height
            || self.life == 0
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Homes straight in
    Basic,
    /// Surges in pulses
    Fast,
    /// Weaves, takes two hits and shoots back
    Tough,
}

/// A hostile ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: DVec2,
    pub heading: f64,
    pub speed: f64,
    pub health: u32,
    pub score_value: u32,
    pub width: f64,
    pub height: f64,
    pub color: Color,
    /// Ticks until the next shot (Tough only)
    pub shoot_timer: Option<f64>,
}

/// Ticks between Tough enemy shots once the first one is out
pub const ENEMY_SHOOT_COOLDOWN: f64 = 120.0;

impl Enemy {
    /// Build an enemy of `kind` at `pos`, scaled for `level`
    pub fn new(kind: EnemyKind, pos: DVec2, level: u32, rng: &mut dyn Randomness) -> Self {
        let level = level as f64;
        let (width, height, speed, health, score_value, color) = match kind {
            EnemyKind::Basic => (30.0, 30.0, 2.0 + level * 0.2, 1, 10, Color::rgb(0xff, 0x44, 0x44)),
            EnemyKind::Fast => (25.0, 35.0, 3.0 + level * 0.3, 1, 15, Color::rgb(0xff, 0x88, 0x44)),
            EnemyKind::Tough => (40.0, 40.0, 1.5 + level * 0.15, 2, 20, Color::rgb(0xaa, 0x44, 0x44)),
        };
        let shoot_timer = (kind == EnemyKind::Tough).then(|| rng.range(0.0, 300.0));

        Self {
            kind,
            pos,
            heading: 0.0,
            speed,
            health,
            score_value,
            width,
            height,
            color,
            shoot_timer,
        }
    }

    /// Random point just outside one of the viewport edges
    pub fn edge_position(viewport: Viewport, rng: &mut dyn Randomness) -> DVec2 {
        if rng.chance(0.5) {
            let x = rng.range(0.0, viewport.width);
            let y = if rng.chance(0.5) {
                -ENEMY_SPAWN_OFFSET
            } else {
                viewport.height + ENEMY_SPAWN_OFFSET
            };
            DVec2::new(x, y)
        } else {
            let x = if rng.chance(0.5) {
                -ENEMY_SPAWN_OFFSET
            } else {
                viewport.width + ENEMY_SPAWN_OFFSET
            };
            let y = rng.range(0.0, viewport.height);
            DVec2::new(x, y)
        }
    }

    /// Collision radius
    pub fn radius(&self) -> f64 {
        self.width / 2.0
    }

    /// Steer toward the player, move, maybe shoot
    ///
    /// Returns a projectile when a Tough enemy fires this tick.
    pub fn update(&mut self, target: DVec2, now_ms: f64, fx: &mut Fx) -> Option<Projectile> {
        let to_target = target - self.pos;
        let desired = to_target.x.atan2(-to_target.y);
        let diff = normalize_angle(desired - self.heading);
        self.heading += diff * 0.05;

        match self.kind {
            EnemyKind::Basic => {
                self.pos += heading_vector(self.heading) * self.speed;
            }
            EnemyKind::Fast => {
                let surge = 1.0 + (now_ms * 0.005).sin() * 0.5;
                self.pos += heading_vector(self.heading) * self.speed * surge;
            }
            EnemyKind::Tough => {
                let weave = (now_ms * 0.002).sin() * 0.5;
                self.pos += heading_vector(self.heading + weave) * self.speed;
            }
        }

        let shot = match self.shoot_timer.as_mut() {
            Some(timer) => {
                *timer -= 1.0;
                if *timer <= 0.0 {
                    *timer = ENEMY_SHOOT_COOLDOWN;
                    Some(self.fire(fx))
                } else {
                    None
                }
            }
            None => None,
        };

        if fx.rng.chance(0.3) {
            let back = self.heading - std::f64::consts::PI;
            let exhaust = heading_vector(back);
            let pos = self.pos + exhaust * (self.height / 2.0);
            let vel = DVec2::new(
                exhaust.x * 2.0 + fx.rng.spread(0.5),
                exhaust.y * 2.0 + fx.rng.spread(0.5),
            );
            let radius = fx.rng.range(1.0, 4.0);
            let hue = if self.kind == EnemyKind::Fast { 30.0 } else { 0.0 };
            let color = Color::hsl(hue, 1.0, 0.5).with_alpha(fx.rng.range(0.5, 1.0));
            fx.emit(Particle::decay(pos, vel, radius, color, 15.0));
        }

        shot
    }

    fn fire(&self, fx: &mut Fx) -> Projectile {
        let pan = fx.pan(self.pos.x);
        fx.sound(SoundCue::Laser, SoundParams::new(0.2, 0.8, pan));
        Projectile::enemy(self.pos, self.heading)
    }

    /// Take one point of damage
    ///
    /// Returns the score value on the hit that destroys the enemy, 0 otherwise.
    pub fn hit(&mut self, fx: &mut Fx, tuning: &Tuning) -> u32 {
        self.health = self.health.saturating_sub(1);
        fx.hit_sparks(self.pos, self.color);

        if self.health > 0 {
            return 0;
        }

        fx.explosion(self.pos, self.color, false);
        let drop_chance = if self.kind == EnemyKind::Tough {
            tuning.tough_drop_chance
        } else {
            tuning.drop_chance
        };
        if fx.rng.chance(drop_chance) {
            fx.drop_pickup(self.pos);
        }
        self.score_value
    }

    /// Past the generous off-screen margin
    pub fn is_off_screen(&self, viewport: Viewport) -> bool {
        self.pos.x < -ENEMY_CULL_MARGIN
            || self.pos.x > viewport.width + ENEMY_CULL_MARGIN
            || self.pos.y < -ENEMY_CULL_MARGIN
            || self.pos.y > viewport.height + ENEMY_CULL_MARGIN
    }
}

/// Decorative surface crater, relative to the meteor center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crater {
    pub offset: DVec2,
    pub radius: f64,
    /// Darkening alpha
    pub shade: f64,
}

/// Number of vertices in a meteor outline
pub const METEOR_OUTLINE_POINTS: usize = 12;

/// A drifting rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meteor {
    pub pos: DVec2,
    pub vel: DVec2,
    pub radius: f64,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub health: u32,
    pub score_value: u32,
    pub color: Color,
    pub craters: Vec<Crater>,
    /// Per-vertex radius multipliers for the irregular outline
    pub outline: Vec<f64>,
}

/// Result of a projectile striking a meteor
#[derive(Debug, Clone, Default)]
pub struct MeteorHit {
    /// Score earned (non-zero only when destroyed)
    pub score: u32,
    /// Smaller meteors the rock broke into
    pub fragments: Vec<Meteor>,
}

impl Meteor {
    /// Build a meteor of the given size; health and score derive from radius
    pub fn new(pos: DVec2, vel: DVec2, radius: f64, rng: &mut dyn Randomness) -> Self {
        let rotation = rng.range(0.0, std::f64::consts::TAU);
        let rotation_speed = rng.spread(0.025);
        let color = Color::hsl(rng.range(0.0, 30.0), 0.2, rng.range(0.2, 0.5));

        let crater_count = 3 + rng.index(5);
        let craters = (0..crater_count)
            .map(|_| Crater {
                offset: DVec2::new(rng.spread(radius * 0.4), rng.spread(radius * 0.4)),
                radius: rng.range(3.0, 3.0 + radius * 0.3),
                shade: rng.range(0.0, 0.2),
            })
            .collect();
        let outline = (0..METEOR_OUTLINE_POINTS)
            .map(|_| 1.0 + rng.spread(0.1))
            .collect();

        Self {
            pos,
            vel,
            radius,
            rotation,
            rotation_speed,
            health: (radius / METEOR_HEALTH_DIVISOR).ceil() as u32,
            score_value: radius.floor() as u32,
            color,
            craters,
            outline,
        }
    }

    /// Full-size meteor entering from a random edge, aimed near the center
    pub fn spawn_at_edge(viewport: Viewport, level: u32, rng: &mut dyn Randomness) -> Self {
        let radius = METEOR_MIN_RADIUS + rng.next_unit() * METEOR_RADIUS_SPREAD;
        let pos = match rng.index(4) {
            0 => DVec2::new(rng.range(0.0, viewport.width), -radius),
            1 => DVec2::new(viewport.width + radius, rng.range(0.0, viewport.height)),
            2 => DVec2::new(rng.range(0.0, viewport.width), viewport.height + radius),
            _ => DVec2::new(-radius, rng.range(0.0, viewport.height)),
        };

        let center = viewport.center();
        let angle = (center.x - pos.x).atan2(center.y - pos.y) + rng.spread(0.75);
        let base_speed = 1.0 + level as f64 * 0.1;
        // Smaller meteors move faster
        let speed = base_speed * 35.0 / radius;
        let vel = DVec2::new(angle.sin(), angle.cos()) * speed;

        Self::new(pos, vel, radius, rng)
    }

    pub fn update(&mut self, fx: &mut Fx) {
        self.pos += self.vel;
        self.rotation += self.rotation_speed;

        if fx.rng.chance(0.1) {
            let pos = self.pos
                + DVec2::new(fx.rng.spread(self.radius / 2.0), fx.rng.spread(self.radius / 2.0));
            let vel = DVec2::new(fx.rng.spread(0.25), fx.rng.spread(0.25));
            let radius = fx.rng.range(1.0, 3.0);
            let color = Color::rgb(120, 120, 120).with_alpha(fx.rng.range(0.2, 0.5));
            fx.emit(Particle::decay(pos, vel, radius, color, 30.0));
        }
    }

    /// Take one point of damage, breaking apart on the last one
    pub fn hit(&mut self, fx: &mut Fx, tuning: &Tuning) -> MeteorHit {
        self.health = self.health.saturating_sub(1);
        fx.hit_sparks(self.pos, Color::DEBRIS);

        if self.health > 0 {
            return MeteorHit::default();
        }

        fx.explosion(self.pos, Color::DEBRIS, true);
        let fragments = if self.radius > METEOR_SPLIT_THRESHOLD {
            (0..2).map(|_| self.fragment(fx.rng)).collect()
        } else {
            Vec::new()
        };

        if fx.rng.chance(tuning.meteor_drop_chance) {
            fx.drop_pickup(self.pos);
        }

        MeteorHit {
            score: self.score_value,
            fragments,
        }
    }

    /// One child rock, smaller and a little faster than this one
    pub fn fragment(&self, rng: &mut dyn Randomness) -> Meteor {
        let vel = DVec2::new(
            self.vel.x * 1.2 + rng.spread(1.0),
            self.vel.y * 1.2 + rng.spread(1.0),
        );
        Meteor::new(self.pos, vel, self.radius * METEOR_FRAGMENT_SCALE, rng)
    }

    /// Past the viewport by more than its radius plus padding
    pub fn is_off_screen(&self, viewport: Viewport) -> bool {
        let margin = self.radius + METEOR_CULL_PADDING;
        self.pos.x < -margin
            || self.pos.x > viewport.width + margin
            || self.pos.y < -margin
            || self.pos.y > viewport.height + margin
    }
}

/// A collectible power-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PowerupKind,
    pub pos: DVec2,
    pub radius: f64,
    /// Downward drift (pixels per tick)
    pub drift: f64,
    /// Pulse animation phase
    pub pulse: f64,
    pub rotation: f64,
}

impl Pickup {
    pub fn new(pos: DVec2, kind: PowerupKind) -> Self {
        Self {
            kind,
            pos,
            radius: POWERUP_RADIUS,
            drift: POWERUP_DRIFT,
            pulse: 0.0,
            rotation: 0.0,
        }
    }

    pub fn update(&mut self, now_ms: f64, fx: &mut Fx) {
        self.pos.y += self.drift;
        self.pos.x += (now_ms * 0.002).sin() * 0.5;
        self.rotation += 0.02;
        self.pulse += 0.05;

        if fx.rng.chance(0.2) {
            let pos = self.pos
                + DVec2::new(fx.rng.spread(self.radius * 0.25), self.radius * 0.5);
            let vel = DVec2::new(fx.rng.spread(0.25), -fx.rng.range(0.5, 1.0));
            let radius = fx.rng.range(1.0, 4.0);
            fx.emit(Particle::decay(
                pos,
                vel,
                radius,
                self.kind.color().with_alpha(0.7),
                20.0,
            ));
        }
    }

    /// Scale factor of the pulsing outline
    pub fn pulse_scale(&self) -> f64 {
        1.0 + self.pulse.sin() * 0.2
    }

    /// Only the bottom edge culls: pickups drift downward
    pub fn is_off_screen(&self, viewport: Viewport) -> bool {
        self.pos.y > viewport.height + self.radius
    }
}

/// Twinkling background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: DVec2,
    pub size: f64,
    pub brightness: f64,
    pub blink_speed: f64,
    pub blink_offset: f64,
    pub color: Color,
    pub speed: f64,
}

impl Star {
    pub fn new(viewport: Viewport, rng: &mut dyn Randomness) -> Self {
        let pos = DVec2::new(rng.range(0.0, viewport.width), rng.range(0.0, viewport.height));
        let size = rng.range(0.5, 2.5);
        let brightness = rng.range(0.2, 1.0);
        let blink_speed = rng.range(0.005, 0.025);
        let blink_offset = rng.range(0.0, std::f64::consts::TAU);
        let color = if rng.chance(0.2) {
            Color::rgba(
                rng.range(200.0, 255.0) as u8,
                rng.range(200.0, 255.0) as u8,
                255,
                brightness,
            )
        } else {
            Color::WHITE.with_alpha(brightness)
        };
        let speed = rng.range(0.2, 0.5);

        Self {
            pos,
            size,
            brightness,
            blink_speed,
            blink_offset,
            color,
            speed,
        }
    }

    /// Scroll down, wrapping to the top at a new column
    pub fn update(&mut self, viewport: Viewport, rng: &mut dyn Randomness) {
        self.pos.y += self.speed;
        if self.pos.y > viewport.height {
            self.pos.y = 0.0;
            self.pos.x = rng.range(0.0, viewport.width);
        }
    }

    /// Opacity multiplier at `now_ms`
    pub fn twinkle(&self, now_ms: f64) -> f64 {
        0.7 + (now_ms * self.blink_speed + self.blink_offset).sin() * 0.3
    }
}
