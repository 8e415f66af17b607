//! Layer Breach - a side-scrolling layer-diving arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, combat, run state)
//! - `tuning`: Data-driven game balance (layers, enemies, bosses, prestige)
//! - `progression`: Rank, enemy scaling and unlock derivation
//! - `persistence`: Versioned profile storage and leaderboard

pub mod persistence;
pub mod progression;
pub mod sim;
pub mod tuning;

pub use persistence::{Progression, RunReport};
pub use sim::{GameEvent, RunState, TickInput, tick};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Frame length the combo decay rate is expressed against (60 FPS)
    pub const REFERENCE_FRAME_SECS: f64 = 1.0 / 60.0;

    /// Number of difficulty layers
    pub const LAYER_COUNT: u8 = 6;
    /// Prestige level of the final boss tier
    pub const FINAL_PRESTIGE: u32 = 8;
}

/// Velocity of magnitude `speed` pointing from `from` toward `to`.
///
/// Returns a leftward velocity when the two points coincide, which is the
/// direction enemies travel across the field.
#[inline]
pub fn aim_at(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    let dir = (to - from).try_normalize().unwrap_or(Vec2::NEG_X);
    dir * speed
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Round to one decimal place
#[inline]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
