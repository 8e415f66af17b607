//! Progression derivation
//!
//! Pure functions from persisted progress (prestige level, layer) to display
//! identity, enemy scaling and unlock state. Nothing here holds state.

pub mod bosses;
pub mod rank;
pub mod scaling;
pub mod unlocks;

pub use bosses::{BossIdentity, enemy_name, graduation_boss_identity};
pub use rank::{RANKS, Rank, RankTier, rank_for};
pub use scaling::{BaseStats, EnemyStats, enemy_stats, enemy_variant};
pub use unlocks::{Unlocks, bullet_tier};
