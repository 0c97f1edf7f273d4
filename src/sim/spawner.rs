//! Spawn timers and the level state machine
//!
//! Three interval timers drive the run: enemy spawns, meteor spawns and
//! level advances. They are advanced by frame time after each tick. A firing
//! only takes effect while the world is active and unpaused; otherwise it is
//! dropped, never queued.

use super::entities::{Enemy, EnemyKind, Meteor};
use super::state::GameWorld;
use crate::consts::MAX_LEVEL;
use crate::tuning::Tuning;

/// Fires every `period_ms` of accumulated time
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTimer {
    pub period_ms: f64,
    elapsed_ms: f64,
}

impl IntervalTimer {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            elapsed_ms: 0.0,
        }
    }

    /// Accumulate `dt_ms`; returns how many periods completed
    pub fn advance(&mut self, dt_ms: f64) -> u32 {
        if self.period_ms <= 0.0 {
            return 0;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        let mut fired = 0;
        while self.elapsed_ms >= self.period_ms {
            self.elapsed_ms -= self.period_ms;
            fired += 1;
        }
        fired
    }

    /// Restart from zero with a new period
    pub fn reset(&mut self, period_ms: f64) {
        self.period_ms = period_ms;
        self.elapsed_ms = 0.0;
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }
}

/// Level progression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    Playing(u32),
    /// Transient while timers and shield are being refreshed
    Advancing(u32),
}

impl LevelState {
    pub fn level(&self) -> u32 {
        match *self {
            LevelState::Playing(level) | LevelState::Advancing(level) => level,
        }
    }
}

/// What a scheduler advance did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub enemies: u32,
    pub meteors: u32,
    pub level_up: bool,
    /// Firings that landed while paused or after the run ended
    pub dropped: u32,
}

/// Owns the spawn and level timers for one run
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    enemy_timer: IntervalTimer,
    meteor_timer: IntervalTimer,
    level_timer: IntervalTimer,
    state: LevelState,
    stopped: bool,
}

impl SpawnScheduler {
    pub fn new(tuning: &Tuning, level: u32) -> Self {
        Self {
            enemy_timer: IntervalTimer::new(tuning.enemy_spawn.period_for(level)),
            meteor_timer: IntervalTimer::new(tuning.meteor_spawn.period_for(level)),
            level_timer: IntervalTimer::new(tuning.level_interval_ms),
            state: LevelState::Playing(level),
            stopped: false,
        }
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn enemy_period(&self) -> f64 {
        self.enemy_timer.period_ms
    }

    pub fn meteor_period(&self) -> f64 {
        self.meteor_timer.period_ms
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Cancel all timers; nothing fires afterwards
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Advance all timers by `dt_ms`, acting on the firings that are allowed
    pub fn advance(&mut self, world: &mut GameWorld, dt_ms: f64) -> SpawnReport {
        let mut report = SpawnReport::default();
        if self.stopped {
            return report;
        }

        for _ in 0..self.enemy_timer.advance(dt_ms) {
            if world.is_running() {
                spawn_enemy(world);
                report.enemies += 1;
            } else {
                report.dropped += 1;
            }
        }

        for _ in 0..self.meteor_timer.advance(dt_ms) {
            if world.is_running() {
                spawn_meteor(world);
                report.meteors += 1;
            } else {
                report.dropped += 1;
            }
        }

        for _ in 0..self.level_timer.advance(dt_ms) {
            if world.is_running() {
                report.level_up |= self.advance_level(world);
            } else {
                report.dropped += 1;
            }
        }

        if !world.state.active {
            self.stop();
        }
        report
    }

    /// Step to the next level; no-op at the cap
    ///
    /// Returns `true` when the level changed.
    pub fn advance_level(&mut self, world: &mut GameWorld) -> bool {
        let current = self.state.level();
        if current >= MAX_LEVEL {
            return false;
        }

        let next = current + 1;
        self.state = LevelState::Advancing(next);
        self.enemy_timer
            .reset(world.tuning.enemy_spawn.period_for(next));
        self.meteor_timer
            .reset(world.tuning.meteor_spawn.period_for(next));
        world.enter_level(next);
        self.state = LevelState::Playing(next);
        true
    }
}

/// Pick an enemy variant for `level` from a uniform roll in `[0, 1)`
pub fn choose_enemy_kind(level: u32, roll: f64) -> EnemyKind {
    let (tough, fast) = if level >= 5 {
        (0.4, 0.7)
    } else if level >= 3 {
        (0.2, 0.5)
    } else {
        (0.1, 0.3)
    };

    if roll < tough {
        EnemyKind::Tough
    } else if roll < fast {
        EnemyKind::Fast
    } else {
        EnemyKind::Basic
    }
}

/// Spawn one enemy just outside a random edge
pub fn spawn_enemy(world: &mut GameWorld) {
    let level = world.state.level;
    let viewport = world.viewport;
    let rng = world.rng();
    let kind = choose_enemy_kind(level, rng.next_unit());
    let pos = Enemy::edge_position(viewport, rng);
    let enemy = Enemy::new(kind, pos, level, rng);
    log::debug!("Spawned {:?} enemy at ({:.0}, {:.0})", kind, pos.x, pos.y);
    world.spawn_enemy(enemy);
}

/// Spawn one meteor drifting in from a random edge
pub fn spawn_meteor(world: &mut GameWorld) {
    let level = world.state.level;
    let viewport = world.viewport;
    let meteor = Meteor::spawn_at_edge(viewport, level, world.rng());
    log::debug!("Spawned meteor r={:.1}", meteor.radius);
    world.spawn_meteor(meteor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::clock::ManualClock;
    use crate::sim::rng::ScriptedRng;
    use crate::sim::state::Viewport;

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
    fn test_interval_timer() {
        let mut timer = IntervalTimer::new(100.0);
        assert_eq!(timer.advance(99.0), 0);
        assert_eq!(timer.advance(1.0), 1);
        assert_eq!(timer.advance(250.0), 2);
        assert_eq!(timer.elapsed_ms(), 50.0);
        timer.reset(10.0);
        assert_eq!(timer.elapsed_ms(), 0.0);
        assert_eq!(timer.advance(-5.0), 0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(choose_enemy_kind(1, 0.09), EnemyKind::Tough);
        assert_eq!(choose_enemy_kind(1, 0.1), EnemyKind::Fast);
        assert_eq!(choose_enemy_kind(2, 0.3), EnemyKind::Basic);
        assert_eq!(choose_enemy_kind(3, 0.19), EnemyKind::Tough);
        assert_eq!(choose_enemy_kind(4, 0.49), EnemyKind::Fast);
        assert_eq!(choose_enemy_kind(4, 0.5), EnemyKind::Basic);
        assert_eq!(choose_enemy_kind(5, 0.39), EnemyKind::Tough);
        assert_eq!(choose_enemy_kind(10, 0.69), EnemyKind::Fast);
        assert_eq!(choose_enemy_kind(10, 0.7), EnemyKind::Basic);
    }

    #[test]
    fn test_level_one_periods() {
        let scheduler = SpawnScheduler::new(&Tuning::default(), 1);
        assert_eq!(scheduler.enemy_period(), 1900.0);
        assert_eq!(scheduler.meteor_period(), 2850.0);
        assert_eq!(scheduler.state(), LevelState::Playing(1));
    }

    #[test]
    fn test_spawns_follow_periods() {
        let mut w = world();
        let mut scheduler = SpawnScheduler::new(&w.tuning, 1);
        let report = scheduler.advance(&mut w, 5700.0);
        assert_eq!(report.enemies, 3);
        assert_eq!(report.meteors, 2);
        assert_eq!(w.enemies.len(), 3);
        assert_eq!(w.meteors.len(), 2);
    }

    #[test]
    fn test_paused_firings_are_dropped() {
        let mut w = world();
        let mut scheduler = SpawnScheduler::new(&w.tuning, 1);
        w.state.paused = true;
        let report = scheduler.advance(&mut w, 4000.0);
        assert_eq!(report.dropped, 3);
        assert!(w.enemies.is_empty());

        // Nothing was queued up while paused
        w.state.paused = false;
        let report = scheduler.advance(&mut w, 100.0);
        assert_eq!(report.enemies, 0);
        assert!(w.enemies.is_empty());
    }

    #[test]
    fn test_level_advance() {
        let mut w = world();
        let mut scheduler = SpawnScheduler::new(&w.tuning, 1);
        assert!(scheduler.advance_level(&mut w));
        assert_eq!(scheduler.state(), LevelState::Playing(2));
        assert_eq!(scheduler.enemy_period(), 1800.0);
        assert_eq!(scheduler.meteor_period(), 2700.0);
        assert_eq!(w.state.level, 2);
        assert_eq!(w.player.shield, 100);
        assert_eq!(w.powerups.shield_ms, 5000.0);
    }

    #[test]
    fn test_level_caps_at_ten() {
        let mut w = world();
        let mut scheduler = SpawnScheduler::new(&w.tuning, 1);
        for _ in 0..20 {
            scheduler.advance_level(&mut w);
        }
        assert_eq!(w.state.level, 10);
        assert_eq!(scheduler.enemy_period(), 1000.0);
        assert_eq!(scheduler.meteor_period(), 1500.0);
        assert!(!scheduler.advance_level(&mut w));
    }

    #[test]
    fn test_stops_after_game_over() {
        let mut w = world();
        let mut scheduler = SpawnScheduler::new(&w.tuning, 1);
        w.game_over();
        let report = scheduler.advance(&mut w, 2000.0);
        assert_eq!(report.dropped, 1);
        assert!(scheduler.is_stopped());
        assert_eq!(scheduler.advance(&mut w, 10_000.0), SpawnReport::default());
    }
}
