//! Draw pass
//!
//! Walks the world in a fixed layer order and issues primitive calls on a
//! [`RenderSurface`]. Nothing here mutates the world.

use std::f64::consts::TAU;

use glam::DVec2;

use crate::color::Color;
use crate::ports::RenderSurface;
use crate::sim::entities::METEOR_OUTLINE_POINTS;
use crate::sim::{
    Enemy, EnemyKind, GameWorld, Meteor, Particle, ParticleKind, Pickup, Player, Projectile, Star,
};

/// Translucent black; the previous frame shows through as motion trails
pub const TRAIL_FADE: Color = Color::rgba(0, 0, 0, 0.2);

/// Something that can paint itself
pub trait Draw {
    fn draw(&self, surface: &mut dyn RenderSurface, now_ms: f64);
}

/// Rotate local-space `points` by `heading` and move them to `origin`
fn place(points: &[DVec2], origin: DVec2, heading: f64) -> Vec<DVec2> {
    let rotation = DVec2::from_angle(heading);
    points.iter().map(|p| origin + rotation.rotate(*p)).collect()
}

/// Regular polygon of `sides` around the origin
fn regular_polygon(sides: usize, radius: f64) -> Vec<DVec2> {
    (0..sides)
        .map(|i| {
            let angle = i as f64 / sides as f64 * TAU;
            DVec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

impl Draw for Star {
    fn draw(&self, surface: &mut dyn RenderSurface, now_ms: f64) {
        let alpha = self.color.a * self.twinkle(now_ms);
        surface.fill_circle(self.pos, self.size, self.color.with_alpha(alpha));
    }
}

impl Draw for Player {
    fn draw(&self, surface: &mut dyn RenderSurface, now_ms: f64) {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let hull = [
            DVec2::new(0.0, -hh),
            DVec2::new(-hw, hh),
            DVec2::new(hw, hh),
        ];
        surface.fill_polygon(&place(&hull, self.pos, self.heading), Color::PLAYER);

        if self.shield > 0 {
            let alpha = 0.5 + (now_ms * 0.005).sin() * 0.5;
            surface.stroke_circle(
                self.pos,
                self.width,
                3.0,
                Color::rgb(100, 150, 255).with_alpha(alpha),
            );
        }
    }
}

impl Draw for Projectile {
    fn draw(&self, surface: &mut dyn RenderSurface, _now_ms: f64) {
        surface.fill_circle(self.pos, self.radius * 3.0, self.color().with_alpha(0.35));
        surface.fill_circle(self.pos, self.radius, Color::WHITE);
    }
}

impl Draw for Enemy {
    fn draw(&self, surface: &mut dyn RenderSurface, _now_ms: f64) {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        match self.kind {
            EnemyKind::Basic => {
                let hull = [
                    DVec2::new(0.0, -hh),
                    DVec2::new(-hw, hh),
                    DVec2::new(hw, hh),
                ];
                surface.fill_polygon(&place(&hull, self.pos, self.heading), self.color);
            }
            EnemyKind::Fast => {
                let flame = [
                    DVec2::new(-hw / 2.0, hh),
                    DVec2::new(0.0, hh + 15.0),
                    DVec2::new(hw / 2.0, hh),
                ];
                surface.fill_polygon(
                    &place(&flame, self.pos, self.heading),
                    Color::rgba(255, 130, 50, 0.7),
                );
                let hull = [
                    DVec2::new(0.0, -hh),
                    DVec2::new(-hw, hh / 1.5),
                    DVec2::new(0.0, hh),
                    DVec2::new(hw, hh / 1.5),
                ];
                surface.fill_polygon(&place(&hull, self.pos, self.heading), self.color);
            }
            EnemyKind::Tough => {
                let hull = regular_polygon(6, hw);
                surface.fill_polygon(&place(&hull, self.pos, self.heading), self.color);
                surface.fill_circle(self.pos, hw / 2.0, Color::rgba(200, 50, 50, 0.8));
            }
        }
    }
}

impl Draw for Meteor {
    fn draw(&self, surface: &mut dyn RenderSurface, _now_ms: f64) {
        let outline: Vec<DVec2> = self
            .outline
            .iter()
            .enumerate()
            .map(|(i, jitter)| {
                let angle = i as f64 / METEOR_OUTLINE_POINTS as f64 * TAU;
                DVec2::new(angle.cos(), angle.sin()) * self.radius * jitter
            })
            .collect();
        surface.fill_polygon(&place(&outline, self.pos, self.rotation), self.color);

        let rotation = DVec2::from_angle(self.rotation);
        for crater in &self.craters {
            surface.fill_circle(
                self.pos + rotation.rotate(crater.offset),
                crater.radius,
                Color::BLACK.with_alpha(crater.shade),
            );
        }
    }
}

impl Draw for Particle {
    fn draw(&self, surface: &mut dyn RenderSurface, _now_ms: f64) {
        let fade = self.life_fraction();
        match self.kind {
            ParticleKind::Decay => {
                surface.fill_circle(self.pos, self.radius, self.color.with_alpha(self.color.a * fade));
            }
            ParticleKind::ShockwaveRing | ParticleKind::PulseRing => {
                surface.stroke_circle(
                    self.pos,
                    self.ring_radius(),
                    2.0,
                    self.color.with_alpha(self.color.a * fade),
                );
            }
        }
    }
}

impl Draw for Pickup {
    fn draw(&self, surface: &mut dyn RenderSurface, _now_ms: f64) {
        let radius = self.radius * self.pulse_scale();
        let color = self.kind.color();
        surface.fill_circle(self.pos, radius, Color::BLACK.with_alpha(0.5));
        surface.stroke_circle(self.pos, radius, 2.0, color);
        surface.fill_text(self.kind.symbol(), self.pos, self.radius * 1.2, color);
    }
}

/// Paint one frame: background, then stars, player, projectiles, enemies,
/// meteors, particles and pickups
pub fn render_world(world: &GameWorld, surface: &mut dyn RenderSurface, now_ms: f64) {
    surface.clear(TRAIL_FADE);

    for star in &world.stars {
        star.draw(surface, now_ms);
    }
    world.player.draw(surface, now_ms);
    for shot in world.projectiles.values() {
        shot.draw(surface, now_ms);
    }
    for enemy in world.enemies.values() {
        enemy.draw(surface, now_ms);
    }
    for meteor in world.meteors.values() {
        meteor.draw(surface, now_ms);
    }
    for particle in world.particles.values() {
        particle.draw(surface, now_ms);
    }
    for pickup in world.pickups.values() {
        pickup.draw(surface, now_ms);
    }
}
