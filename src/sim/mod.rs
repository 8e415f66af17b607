//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{FieldBounds, circles_overlap};
pub use entity::{Boss, Enemy, Entity, EntityKind, EntityStore, EntityTag, HitResult, Player};
pub use spawn::SpawnOutcome;
pub use state::{
    EntityView, ExplosionSize, GameEvent, RunPhase, RunSnapshot, RunState, RunStats, RunSummary,
};
pub use tick::{TickInput, tick};
