//! Simulation module
//!
//! All gameplay logic lives here. Nothing in this module touches a canvas,
//! an audio context or the DOM:
//! - Time comes from an injected [`Clock`]
//! - Randomness comes from an injected [`Randomness`]
//! - Side effects leave as [`GameEvent`]s drained by the session
//! - Registries iterate in insertion order

pub mod clock;
pub mod collision;
pub mod entities;
pub mod events;
pub mod input;
pub mod particles;
pub mod powerups;
pub mod registry;
pub mod rng;
pub mod spawner;
pub mod state;
pub mod tick;

pub use clock::{Clock, ManualClock};
#[cfg(not(target_arch = "wasm32"))]
pub use clock::SystemClock;
pub use collision::{CollisionReport, circles_overlap, resolve_collisions};
pub use entities::{Enemy, EnemyKind, Meteor, MeteorHit, Owner, Pickup, Player, Projectile, Star};
pub use events::{GameEvent, SoundCue, SoundParams};
pub use input::{InputController, Intent, Key};
pub use particles::{Fx, Particle, ParticleKind};
pub use powerups::{ActivePowerups, PowerupKind};
pub use registry::{EntityId, IdAllocator, Registry};
pub use rng::{Randomness, ScriptedRng, SeededRng};
pub use spawner::{IntervalTimer, LevelState, SpawnReport, SpawnScheduler, choose_enemy_kind};
pub use state::{GameState, GameWorld, HudSnapshot, Viewport};
pub use tick::{TickReport, tick};
