//! Enemy stat scaling by prestige and layer

use serde::{Deserialize, Serialize};

use crate::round1;
use crate::tuning::EnemyTypeConfig;

/// Unscaled enemy stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub health: f64,
    pub speed: f64,
    pub points: u32,
}

impl From<&EnemyTypeConfig> for BaseStats {
    fn from(config: &EnemyTypeConfig) -> Self {
        Self {
            health: config.health,
            speed: config.speed as f64,
            points: config.points,
        }
    }
}

/// Stats after prestige and layer scaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    /// One decimal place
    pub health: f64,
    /// Whole pixels per second
    pub speed: f64,
    pub points: u32,
}

impl EnemyStats {
    /// Integer hit points for a live entity (never below 1)
    pub fn hit_points(&self) -> u32 {
        (self.health.round() as u32).max(1)
    }
}

/// Scale base stats.
///
/// - health: `round1(base * layer_multiplier * (1 + 0.2 * prestige))`
/// - speed: `round(base * (1 + 0.05 * prestige))`
/// - points: `round(base * (1 + 0.1 * prestige))`
pub fn enemy_stats(base: BaseStats, prestige: u32, layer_multiplier: f64) -> EnemyStats {
    let p = prestige as f64;
    EnemyStats {
        health: round1(base.health * layer_multiplier * (1.0 + 0.2 * p)),
        speed: (base.speed * (1.0 + 0.05 * p)).round(),
        points: (base.points as f64 * (1.0 + 0.1 * p)).round() as u32,
    }
}

/// Sprite/name variant band for a prestige level (1..=4)
pub fn enemy_variant(prestige: u32) -> u8 {
    match prestige {
        0..=1 => 1,
        2..=3 => 2,
        4..=5 => 3,
        _ => 4,
    }
}
