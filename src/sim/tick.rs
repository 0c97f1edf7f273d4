//! One simulation step
//!
//! Advances every entity once, counts power-ups down by the frame time and
//! resolves collisions. Rendering, UI and spawn timers run outside the tick.

use super::collision::{CollisionReport, resolve_collisions};
use super::events::GameEvent;
use super::input::Intent;
use super::state::{GameWorld, world_fx};

/// What a tick did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Player projectiles created this tick
    pub shots_fired: usize,
    /// Projectiles fired by enemies this tick
    pub enemy_shots: usize,
    pub collisions: CollisionReport,
}

/// Advance the world by one tick covering `elapsed_ms` of wall time
///
/// A no-op while the world is paused or the run is over.
pub fn tick(world: &mut GameWorld, intent: &Intent, elapsed_ms: f64) -> TickReport {
    let mut report = TickReport::default();
    if !world.is_running() {
        return report;
    }
    world.state.time_ticks += 1;
    let now_ms = world.now_ms();
    let viewport = world.viewport;

    for star in world.stars.iter_mut() {
        star.update(viewport, &mut *world.rng);
    }

    // Player
    let boost = world.speed_boost();
    world.player.update();
    world.player.move_by(intent, boost, viewport);
    if intent.fire {
        let shots = world
            .player
            .shoot(&world.powerups, &world.tuning, &mut world.events);
        report.shots_fired = shots.len();
        for shot in shots {
            world.spawn_projectile(shot);
        }
    }

    // Projectiles
    {
        let mut fx = world_fx!(world);
        for (_, shot) in world.projectiles.iter_mut() {
            shot.update(&mut fx);
        }
    }
    world.projectiles.retain(|p| !p.is_off_screen(viewport));

    // Enemies; their shots join the projectile registry afterwards
    let target = world.player.pos;
    let mut enemy_shots = Vec::new();
    {
        let mut fx = world_fx!(world);
        for (_, enemy) in world.enemies.iter_mut() {
            if let Some(shot) = enemy.update(target, now_ms, &mut fx) {
                enemy_shots.push(shot);
            }
        }
    }
    world.enemies.retain(|e| !e.is_off_screen(viewport));
    report.enemy_shots = enemy_shots.len();
    for shot in enemy_shots {
        world.spawn_projectile(shot);
    }

    // Meteors
    {
        let mut fx = world_fx!(world);
        for (_, meteor) in world.meteors.iter_mut() {
            meteor.update(&mut fx);
        }
    }
    world.meteors.retain(|m| !m.is_off_screen(viewport));

    // Particles
    for (_, particle) in world.particles.iter_mut() {
        particle.update();
    }
    world.particles.retain(|p| !p.is_dead());

    // Pickups emit trail particles through the effect context, which also
    // owns the pickup registry, so walk a detached copy
    let mut pickups = std::mem::take(&mut world.pickups);
    {
        let mut fx = world_fx!(world);
        for (_, pickup) in pickups.iter_mut() {
            pickup.update(now_ms, &mut fx);
        }
    }
    pickups.retain(|p| !p.is_off_screen(viewport));
    world.pickups = pickups;

    for kind in world.powerups.decay(elapsed_ms) {
        log::debug!("{:?} expired", kind);
        world.events.push(GameEvent::PowerupExpired(kind));
    }

    report.collisions = resolve_collisions(world);

    world.particles.truncate_oldest(world.max_particles);
    report
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::consts::NOMINAL_TICK_MS;
    use crate::settings::Settings;
    use crate::sim::clock::ManualClock;
    use crate::sim::entities::{Enemy, EnemyKind, Meteor, Projectile};
    use crate::sim::powerups::PowerupKind;
    use crate::sim::rng::{ScriptedRng, SeededRng};
    use crate::sim::state::Viewport;
    use crate::tuning::Tuning;

    fn world_with(rng: Box<dyn crate::sim::rng::Randomness>) -> GameWorld {
        GameWorld::new(
            Viewport::new(800.0, 600.0),
            Tuning::default(),
            &Settings::default(),
            Box::new(ManualClock::new(0.0)),
            rng,
        )
    }

    fn world() -> GameWorld {
        world_with(Box::new(ScriptedRng::constant(0.5)))
    }

    #[test]
    fn test_tick_counts_and_moves_player() {
        let mut w = world();
        let intent = Intent {
            heading: 0.0,
            magnitude: 1.0,
            reverse: false,
            fire: false,
        };
        tick(&mut w, &intent, NOMINAL_TICK_MS);
        assert_eq!(w.state.time_ticks, 1);
        assert_eq!(w.player.pos, DVec2::new(400.0, 295.0));
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let mut w = world();
        w.state.paused = true;
        let intent = Intent {
            heading: 1.0,
            magnitude: 1.0,
            reverse: false,
            fire: true,
        };
        assert_eq!(tick(&mut w, &intent, NOMINAL_TICK_MS), TickReport::default());
        assert_eq!(w.state.time_ticks, 0);
        assert_eq!(w.player.pos, DVec2::new(400.0, 300.0));
        assert!(w.projectiles.is_empty());
    }

    #[test]
    fn test_fire_spawns_projectile() {
        let mut w = world();
        let mut intent = Intent::idle(0.0);
        intent.fire = true;
        let report = tick(&mut w, &intent, NOMINAL_TICK_MS);
        assert_eq!(report.shots_fired, 1);
        assert_eq!(w.projectiles.len(), 1);

        // Cooldown holds the next request back
        let report = tick(&mut w, &intent, NOMINAL_TICK_MS);
        assert_eq!(report.shots_fired, 0);
    }

    #[test]
    fn test_projectile_expires_by_tick_100() {
        let mut w = world();
        let id = w.spawn_projectile(Projectile::player(DVec2::new(400.0, 100.0), 0.0));
        if let Some(p) = w.projectiles.get_mut(id) {
            p.speed = 0.0;
        }
        let idle = Intent::idle(0.0);
        for _ in 0..99 {
            tick(&mut w, &idle, NOMINAL_TICK_MS);
        }
        assert!(w.projectiles.contains(id));
        tick(&mut w, &idle, NOMINAL_TICK_MS);
        assert!(!w.projectiles.contains(id));
    }

    #[test]
    fn test_offscreen_entities_culled() {
        let mut w = world();
        let enemy = Enemy::new(EnemyKind::Basic, DVec2::new(-500.0, 300.0), 1, w.rng());
        let enemy = w.spawn_enemy(enemy);
        let meteor = Meteor::new(DVec2::new(400.0, 900.0), DVec2::ZERO, 20.0, w.rng());
        let meteor = w.spawn_meteor(meteor);

        tick(&mut w, &Intent::idle(0.0), NOMINAL_TICK_MS);
        assert!(!w.enemies.contains(enemy));
        assert!(!w.meteors.contains(meteor));
    }

    #[test]
    fn test_powerup_expiry_event() {
        let mut w = world();
        w.powerups.arm(PowerupKind::Speed, 20.0);
        let idle = Intent::idle(0.0);
        tick(&mut w, &idle, NOMINAL_TICK_MS);
        assert!(w.powerups.is_active(PowerupKind::Speed));
        tick(&mut w, &idle, NOMINAL_TICK_MS);
        assert!(!w.powerups.is_active(PowerupKind::Speed));
        assert!(w
            .drain_events()
            .contains(&GameEvent::PowerupExpired(PowerupKind::Speed)));
    }

    #[test]
    fn test_particle_cap_enforced() {
        let mut w = world();
        w.max_particles = 10;
        for _ in 0..3 {
            w.fx().explosion(DVec2::new(100.0, 100.0), crate::Color::WHITE, false);
        }
        tick(&mut w, &Intent::idle(0.0), NOMINAL_TICK_MS);
        assert!(w.particles.len() <= 10);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = world_with(Box::new(SeededRng::new(7)));
        let mut b = world_with(Box::new(SeededRng::new(7)));
        let mut intent = Intent::idle(0.3);
        intent.magnitude = 1.0;
        intent.fire = true;
        for w in [&mut a, &mut b] {
            for _ in 0..3 {
                crate::sim::spawner::spawn_enemy(w);
            }
            for _ in 0..120 {
                tick(w, &intent, NOMINAL_TICK_MS);
            }
        }
        assert_eq!(a.state, b.state);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.particles.len(), b.particles.len());
    }
}
