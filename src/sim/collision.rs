//! Collision detection and response
//!
//! Every collider is a circle. Pairs are resolved once per tick, after the
//! entity updates, in a fixed order. Removals are collected while walking a
//! registry and applied afterwards; meteor fragments join the world only
//! after the projectile pass so they cannot be struck in the tick they appear.

use glam::DVec2;

use super::entities::{Meteor, Owner};
use super::registry::EntityId;
use super::state::{GameWorld, world_fx};

/// Strict circle overlap: touching edges do not collide
pub fn circles_overlap(a: DVec2, ra: f64, b: DVec2, rb: f64) -> bool {
    a.distance(b) < ra + rb
}

/// Contact damage for ramming a meteor of radius `r`
pub fn meteor_ram_damage(radius: f64) -> u32 {
    (radius / 2.0).ceil().max(0.0) as u32
}

/// What one collision pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub enemies_destroyed: u32,
    pub meteors_destroyed: u32,
    pub fragments_spawned: u32,
    /// Times the player took damage
    pub player_hits: u32,
    pub pickups_collected: u32,
    pub score_gained: u64,
    /// The pass ended the run; later pairs were skipped
    pub game_over: bool,
}

/// Resolve all collision pairs for this tick
pub fn resolve_collisions(world: &mut GameWorld) -> CollisionReport {
    let mut report = CollisionReport::default();

    shots_vs_enemies(world, &mut report);
    shots_vs_meteors(world, &mut report);

    if player_vs_enemies(world, &mut report)
        || player_vs_meteors(world, &mut report)
        || player_vs_enemy_shots(world, &mut report)
    {
        report.game_over = true;
        return report;
    }

    player_vs_pickups(world, &mut report);
    report
}

/// Live player projectiles, in registry order
fn player_shots(world: &GameWorld) -> Vec<(EntityId, DVec2, f64)> {
    world
        .projectiles
        .iter()
        .filter(|(_, p)| p.owner == Owner::Player)
        .map(|(id, p)| (id, p.pos, p.radius))
        .collect()
}

fn shots_vs_enemies(world: &mut GameWorld, report: &mut CollisionReport) {
    let shots = player_shots(world);
    let mut spent = Vec::new();
    let mut destroyed = Vec::new();
    let mut score = 0u64;

    {
        let mut fx = world_fx!(world);
        for (shot_id, shot_pos, shot_radius) in shots {
            let target = world
                .enemies
                .iter_mut()
                .filter(|(id, _)| !destroyed.contains(id))
                .find(|(_, e)| circles_overlap(shot_pos, shot_radius, e.pos, e.radius()));

            if let Some((enemy_id, enemy)) = target {
                spent.push(shot_id);
                let points = enemy.hit(&mut fx, &world.tuning);
                if points > 0 {
                    score += points as u64;
                    destroyed.push(enemy_id);
                }
            }
        }
    }

    world.projectiles.remove_all(&spent);
    world.enemies.remove_all(&destroyed);
    world.add_score(score);
    report.enemies_destroyed += destroyed.len() as u32;
    report.score_gained += score;
}

fn shots_vs_meteors(world: &mut GameWorld, report: &mut CollisionReport) {
    let shots = player_shots(world);
    let mut spent = Vec::new();
    let mut destroyed = Vec::new();
    let mut fragments: Vec<Meteor> = Vec::new();
    let mut score = 0u64;

    {
        let mut fx = world_fx!(world);
        for (shot_id, shot_pos, shot_radius) in shots {
            let target = world
                .meteors
                .iter_mut()
                .filter(|(id, _)| !destroyed.contains(id))
                .find(|(_, m)| circles_overlap(shot_pos, shot_radius, m.pos, m.radius));

            if let Some((meteor_id, meteor)) = target {
                spent.push(shot_id);
                let hit = meteor.hit(&mut fx, &world.tuning);
                if hit.score > 0 {
                    score += hit.score as u64;
                    destroyed.push(meteor_id);
                    fragments.extend(hit.fragments);
                }
            }
        }
    }

    world.projectiles.remove_all(&spent);
    world.meteors.remove_all(&destroyed);
    report.fragments_spawned += fragments.len() as u32;
    for fragment in fragments {
        world.spawn_meteor(fragment);
    }
    world.add_score(score);
    report.meteors_destroyed += destroyed.len() as u32;
    report.score_gained += score;
}

/// Returns `true` when the player died
fn player_vs_enemies(world: &mut GameWorld, report: &mut CollisionReport) -> bool {
    let player_pos = world.player.pos;
    let player_radius = world.player.radius();
    let rams: Vec<EntityId> = world
        .enemies
        .iter()
        .filter(|(_, e)| circles_overlap(player_pos, player_radius, e.pos, e.radius()))
        .map(|(id, _)| id)
        .collect();

    for id in rams {
        let Some(enemy) = world.enemies.remove(id) else {
            continue;
        };
        world.fx().explosion(enemy.pos, enemy.color, false);
        report.player_hits += 1;
        let damage = world.tuning.enemy_ram_damage;
        if world.damage_player(damage) {
            return true;
        }
    }
    false
}

/// Returns `true` when the player died
fn player_vs_meteors(world: &mut GameWorld, report: &mut CollisionReport) -> bool {
    let player_pos = world.player.pos;
    let player_radius = world.player.radius();
    let rams: Vec<EntityId> = world
        .meteors
        .iter()
        .filter(|(_, m)| circles_overlap(player_pos, player_radius, m.pos, m.radius))
        .map(|(id, _)| id)
        .collect();

    for id in rams {
        let Some(meteor) = world.meteors.remove(id) else {
            continue;
        };
        world.fx().explosion(meteor.pos, meteor.color, false);
        report.player_hits += 1;
        if world.damage_player(meteor_ram_damage(meteor.radius)) {
            return true;
        }
    }
    false
}

/// Returns `true` when the player died
fn player_vs_enemy_shots(world: &mut GameWorld, report: &mut CollisionReport) -> bool {
    let player_pos = world.player.pos;
    let player_radius = world.player.radius();
    let hits: Vec<EntityId> = world
        .projectiles
        .iter()
        .filter(|(_, p)| p.owner == Owner::Enemy)
        .filter(|(_, p)| circles_overlap(player_pos, player_radius, p.pos, p.radius))
        .map(|(id, _)| id)
        .collect();

    for id in hits {
        let Some(shot) = world.projectiles.remove(id) else {
            continue;
        };
        world.fx().hit_sparks(shot.pos, shot.color());
        report.player_hits += 1;
        let damage = world.tuning.enemy_shot_damage;
        if world.damage_player(damage) {
            return true;
        }
    }
    false
}

fn player_vs_pickups(world: &mut GameWorld, report: &mut CollisionReport) {
    let player_pos = world.player.pos;
    let player_radius = world.player.radius();
    let touched: Vec<EntityId> = world
        .pickups
        .iter()
        .filter(|(_, p)| circles_overlap(player_pos, player_radius, p.pos, p.radius))
        .map(|(id, _)| id)
        .collect();

    for id in touched {
        if let Some(pickup) = world.pickups.remove(id) {
            world.collect_powerup(pickup.kind, pickup.pos);
            report.pickups_collected += 1;
        }
    }
}
