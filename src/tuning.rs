//! Data-driven game balance
//!
//! Every number the spawn scheduler and combat loop read lives here. The
//! defaults describe the shipped game; a JSON document can override any
//! subset of fields.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::consts::LAYER_COUNT;

/// Enemy colour, which doubles as the enemy type key
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EnemyColor {
    #[default]
    Green,
    Yellow,
    Blue,
    Purple,
    Red,
}

impl EnemyColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyColor::Green => "green",
            EnemyColor::Yellow => "yellow",
            EnemyColor::Blue => "blue",
            EnemyColor::Purple => "purple",
            EnemyColor::Red => "red",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "green" => Some(EnemyColor::Green),
            "yellow" => Some(EnemyColor::Yellow),
            "blue" => Some(EnemyColor::Blue),
            "purple" => Some(EnemyColor::Purple),
            "red" | "red-boss" => Some(EnemyColor::Red),
            _ => None,
        }
    }

    /// Lookup that never fails: unknown keys resolve to green
    pub fn from_key(s: &str) -> Self {
        Self::from_str(s).unwrap_or_else(|| {
            log::debug!("Unknown enemy type '{}', using green", s);
            EnemyColor::Green
        })
    }
}

/// Autonomous fire parameters for shooting enemies and bosses
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShooterTuning {
    /// Minimum time between shots (ms)
    pub interval_ms: f64,
    /// Enemy bullet speed (pixels/s)
    pub bullet_speed: f32,
}

/// Base stats for one enemy type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyTypeConfig {
    pub color: EnemyColor,
    pub points: u32,
    /// Pixels per second
    pub speed: f32,
    /// Fractional so prestige/layer scaling stays exact; rounded at spawn
    pub health: f64,
    pub spawn_weight: u32,
    pub radius: f32,
    /// Present only for types with `canShoot`
    #[serde(default)]
    pub shooter: Option<ShooterTuning>,
}

impl EnemyTypeConfig {
    pub fn can_shoot(&self) -> bool {
        self.shooter.is_some()
    }
}

const FALLBACK_ENEMY: EnemyTypeConfig = EnemyTypeConfig {
    color: EnemyColor::Green,
    points: 10,
    speed: 120.0,
    health: 1.0,
    spawn_weight: 5,
    radius: 14.0,
    shooter: None,
};

/// One difficulty layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// 1-based layer number
    pub number: u8,
    pub name: String,
    /// Minimum score to be in this layer
    pub threshold: u64,
    /// Enemy types eligible for the weighted pick
    pub enemies: Vec<EnemyColor>,
    /// Probability per spawn tick that a boss appears instead
    pub boss_chance: f32,
    pub health_multiplier: f64,
    /// Divides the spawn delay while in this layer
    pub spawn_rate_multiplier: f64,
}

static FALLBACK_LAYER: LazyLock<LayerConfig> = LazyLock::new(|| LayerConfig {
    number: 1,
    name: "Userland".to_string(),
    threshold: 0,
    enemies: vec![EnemyColor::Green],
    boss_chance: 0.0,
    health_multiplier: 1.0,
    spawn_rate_multiplier: 1.0,
});

/// A boss tier, independent of the normal enemy table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossTierConfig {
    pub name: String,
    /// Lowest layer this tier can appear in
    pub min_layer: u8,
    /// Chance of upgrading into this tier once unlocked (first tier ignores it)
    pub unlock_chance: f32,
    pub points: u32,
    pub health: u32,
    pub speed: f32,
    /// Render/collision scale relative to a regular enemy
    pub scale: f32,
    #[serde(default)]
    pub shooter: Option<ShooterTuning>,
}

/// Difficulty and content tier unlocked by a prestige level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrestigeTier {
    pub level: u32,
    pub title: String,
    /// Multiplies the initial spawn delay (lower is harder)
    pub spawn_pace_multiplier: f64,
    /// Added to every layer's boss chance
    pub boss_chance_bonus: f32,
}

/// Spawn scheduler pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub initial_delay_ms: f64,
    pub min_interval_ms: f64,
    /// Applied to the delay after each non-boss spawn (< 1)
    pub difficulty_decay: f64,
    /// Hostile cap (enemies + bosses)
    pub max_enemies: usize,
    /// Random angular jitter applied to launch velocity (radians, +/-)
    pub jitter_radians: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1500.0,
            min_interval_ms: 350.0,
            difficulty_decay: 0.98,
            max_enemies: 24,
            jitter_radians: 0.2,
        }
    }
}

/// Player, bullet and scoring parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub player_speed: f32,
    pub player_radius: f32,
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Distance ahead of the player where bullets appear
    pub bullet_offset: f32,
    pub fire_interval_ms: f64,
    pub enemy_bullet_radius: f32,
    /// Distance past the field edge before an entity is culled
    pub cull_margin: f32,
    pub combo_step: f64,
    /// Idle time before the combo starts decaying (ms)
    pub combo_idle_ms: f64,
    /// Decay factor per reference frame (60 FPS)
    pub combo_decay_per_frame: f64,
    pub starting_lives: u8,
    /// Grace period after losing a life (ms)
    pub invulnerable_ms: f64,
    /// Delay between game over and the score submission signal (ms)
    pub submit_delay_ms: f64,
    /// Score at which the final graduation boss appears in the last layer
    pub prestige_score_threshold: u64,
    /// Health multiplier for graduation bosses over their boss tier
    pub graduation_health_multiplier: f64,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            player_speed: 320.0,
            player_radius: 14.0,
            bullet_speed: 720.0,
            bullet_radius: 4.0,
            bullet_offset: 24.0,
            fire_interval_ms: 180.0,
            enemy_bullet_radius: 5.0,
            cull_margin: 48.0,
            combo_step: 0.1,
            combo_idle_ms: 10_000.0,
            combo_decay_per_frame: 0.99,
            starting_lives: 1,
            invulnerable_ms: 1500.0,
            submit_delay_ms: 1200.0,
            prestige_score_threshold: 50_000,
            graduation_health_multiplier: 1.5,
        }
    }
}

/// Playfield geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldTuning {
    pub width: f32,
    pub height: f32,
    /// Distance past the right edge where enemies appear, and the vertical inset
    pub spawn_margin: f32,
    /// Player start x
    pub player_start_x: f32,
}

impl Default for FieldTuning {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
            spawn_margin: 40.0,
            player_start_x: 80.0,
        }
    }
}

/// Complete balance document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub layers: Vec<LayerConfig>,
    pub enemies: Vec<EnemyTypeConfig>,
    pub boss_tiers: Vec<BossTierConfig>,
    pub prestige_tiers: Vec<PrestigeTier>,
    pub spawn: SpawnTuning,
    pub combat: CombatTuning,
    pub field: FieldTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        use EnemyColor::*;

        let layer = |number: u8,
                     name: &str,
                     threshold: u64,
                     enemies: Vec<EnemyColor>,
                     boss_chance: f32,
                     health_multiplier: f64,
                     spawn_rate_multiplier: f64| LayerConfig {
            number,
            name: name.to_string(),
            threshold,
            enemies,
            boss_chance,
            health_multiplier,
            spawn_rate_multiplier,
        };

        let layers = vec![
            layer(1, "Userland", 0, vec![Green], 0.0, 1.0, 1.0),
            layer(2, "Sockets", 500, vec![Green, Yellow], 0.005, 1.0, 1.1),
            layer(3, "Firewall", 1500, vec![Green, Yellow, Blue], 0.01, 1.2, 1.2),
            layer(4, "Kernel", 4000, vec![Yellow, Blue, Purple], 0.015, 1.5, 1.35),
            layer(5, "Firmware", 10_000, vec![Green, Blue, Purple], 0.02, 1.8, 1.5),
            layer(6, "Silicon", 25_000, vec![Blue, Purple, Red], 0.03, 2.2, 1.7),
        ];

        let enemies = vec![
            FALLBACK_ENEMY,
            EnemyTypeConfig {
                color: Yellow,
                points: 20,
                speed: 150.0,
                health: 1.0,
                spawn_weight: 3,
                radius: 14.0,
                shooter: None,
            },
            EnemyTypeConfig {
                color: Blue,
                points: 30,
                speed: 100.0,
                health: 2.0,
                spawn_weight: 2,
                radius: 16.0,
                shooter: None,
            },
            EnemyTypeConfig {
                color: Purple,
                points: 50,
                speed: 90.0,
                health: 3.0,
                spawn_weight: 1,
                radius: 18.0,
                shooter: Some(ShooterTuning {
                    interval_ms: 2200.0,
                    bullet_speed: 220.0,
                }),
            },
            EnemyTypeConfig {
                color: Red,
                points: 100,
                speed: 80.0,
                health: 5.0,
                spawn_weight: 1,
                radius: 22.0,
                shooter: Some(ShooterTuning {
                    interval_ms: 1600.0,
                    bullet_speed: 260.0,
                }),
            },
        ];

        let boss_tiers = vec![
            BossTierConfig {
                name: "Sentinel".to_string(),
                min_layer: 1,
                unlock_chance: 1.0,
                points: 500,
                health: 12,
                speed: 60.0,
                scale: 2.0,
                shooter: Some(ShooterTuning {
                    interval_ms: 1400.0,
                    bullet_speed: 240.0,
                }),
            },
            BossTierConfig {
                name: "Warden".to_string(),
                min_layer: 3,
                unlock_chance: 0.5,
                points: 1200,
                health: 24,
                speed: 50.0,
                scale: 2.5,
                shooter: Some(ShooterTuning {
                    interval_ms: 1100.0,
                    bullet_speed: 260.0,
                }),
            },
            BossTierConfig {
                name: "Overseer".to_string(),
                min_layer: 5,
                unlock_chance: 0.5,
                points: 3000,
                health: 40,
                speed: 40.0,
                scale: 3.0,
                shooter: Some(ShooterTuning {
                    interval_ms: 800.0,
                    bullet_speed: 280.0,
                }),
            },
        ];

        const TITLES: [&str; 9] = [
            "Fresh Boot",
            "Patched",
            "Hardened",
            "Rootkit",
            "Hypervisor",
            "Microcode",
            "Quantum",
            "Singularity",
            "Zero Day",
        ];
        let prestige_tiers = TITLES
            .iter()
            .enumerate()
            .map(|(level, title)| PrestigeTier {
                level: level as u32,
                title: title.to_string(),
                spawn_pace_multiplier: (1.0 - 0.05 * level as f64).max(0.6),
                boss_chance_bonus: 0.002 * level as f32,
            })
            .collect();

        Self {
            layers,
            enemies,
            boss_tiers,
            prestige_tiers,
            spawn: SpawnTuning::default(),
            combat: CombatTuning::default(),
            field: FieldTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) balance document and repair it
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate();
        Ok(tuning)
    }

    /// Parse a balance document, falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            log::warn!("Invalid tuning document ({}), using defaults", e);
            Self::default()
        })
    }

    /// Repair tables so lookups stay well defined
    pub fn validate(&mut self) {
        if self.layers.is_empty() {
            log::warn!("Tuning has no layers, restoring defaults");
            self.layers = Tuning::default().layers;
        }
        let sorted = self
            .layers
            .windows(2)
            .all(|w| w[0].threshold < w[1].threshold);
        if !sorted {
            log::warn!("Layer thresholds are not strictly increasing, sorting");
            self.layers.sort_by_key(|l| l.threshold);
            self.layers.dedup_by_key(|l| l.threshold);
        }
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.number = i as u8 + 1;
        }
        if self.layers.len() > LAYER_COUNT as usize {
            log::warn!("Tuning defines more than {} layers, truncating", LAYER_COUNT);
            self.layers.truncate(LAYER_COUNT as usize);
        }
        if self.spawn.difficulty_decay >= 1.0 || self.spawn.difficulty_decay <= 0.0 {
            log::warn!(
                "difficulty_decay {} out of range, using default",
                self.spawn.difficulty_decay
            );
            self.spawn.difficulty_decay = SpawnTuning::default().difficulty_decay;
        }
        self.boss_tiers.sort_by_key(|b| b.min_layer);
    }

    /// Layer config by 1-based number; unknown numbers fall back to the first layer
    pub fn layer(&self, number: u8) -> &LayerConfig {
        self.layers
            .iter()
            .find(|l| l.number == number)
            .or_else(|| self.layers.first())
            .unwrap_or(&FALLBACK_LAYER)
    }

    /// Highest layer whose threshold is at or below `score`
    pub fn layer_for_score(&self, score: u64) -> u8 {
        self.layers
            .iter()
            .rev()
            .find(|l| l.threshold <= score)
            .map(|l| l.number)
            .unwrap_or(1)
    }

    /// Number of the last layer
    pub fn max_layer(&self) -> u8 {
        self.layers.last().map(|l| l.number).unwrap_or(1)
    }

    /// Enemy config by colour; missing entries fall back to green
    pub fn enemy(&self, color: EnemyColor) -> &EnemyTypeConfig {
        self.enemies
            .iter()
            .find(|e| e.color == color)
            .or_else(|| self.enemies.iter().find(|e| e.color == EnemyColor::Green))
            .unwrap_or(&FALLBACK_ENEMY)
    }

    /// Highest prestige tier at or below `level`
    pub fn prestige_tier(&self, level: u32) -> Option<&PrestigeTier> {
        self.prestige_tiers
            .iter()
            .filter(|t| t.level <= level)
            .max_by_key(|t| t.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_strictly_increasing() {
        let tuning = Tuning::default();
        let thresholds: Vec<u64> = tuning.layers.iter().map(|l| l.threshold).collect();
        assert_eq!(thresholds, vec![0, 500, 1500, 4000, 10_000, 25_000]);
    }

    #[test]
    fn test_layer_for_score() {
        let tuning = Tuning::default();
        assert_eq!(tuning.layer_for_score(0), 1);
        assert_eq!(tuning.layer_for_score(499), 1);
        assert_eq!(tuning.layer_for_score(500), 2);
        assert_eq!(tuning.layer_for_score(24_999), 5);
        assert_eq!(tuning.layer_for_score(25_000), 6);
        assert_eq!(tuning.layer_for_score(u64::MAX), 6);
    }

    #[test]
    fn test_unknown_layer_falls_back() {
        let tuning = Tuning::default();
        assert_eq!(tuning.layer(0).number, 1);
        assert_eq!(tuning.layer(42).number, 1);
        assert_eq!(tuning.layer(4).name, "Kernel");
    }

    #[test]
    fn test_unknown_enemy_key_is_green() {
        assert_eq!(EnemyColor::from_key("chartreuse"), EnemyColor::Green);
        assert_eq!(EnemyColor::from_key("PURPLE"), EnemyColor::Purple);
        assert_eq!(EnemyColor::from_key("red-boss"), EnemyColor::Red);
    }

    #[test]
    fn test_missing_enemy_entry_falls_back_to_green() {
        let mut tuning = Tuning::default();
        tuning.enemies.retain(|e| e.color != EnemyColor::Blue);
        assert_eq!(tuning.enemy(EnemyColor::Blue).color, EnemyColor::Green);

        tuning.enemies.clear();
        assert_eq!(tuning.enemy(EnemyColor::Red).points, 10);
    }

    #[test]
    fn test_shooters() {
        let tuning = Tuning::default();
        assert!(!tuning.enemy(EnemyColor::Green).can_shoot());
        assert!(tuning.enemy(EnemyColor::Purple).can_shoot());
        assert!(tuning.enemy(EnemyColor::Red).can_shoot());
    }

    #[test]
    fn test_prestige_tier_lookup() {
        let tuning = Tuning::default();
        assert_eq!(tuning.prestige_tier(0).map(|t| t.level), Some(0));
        assert_eq!(tuning.prestige_tier(3).map(|t| t.title.as_str()), Some("Rootkit"));
        assert_eq!(tuning.prestige_tier(20).map(|t| t.level), Some(8));
    }

    #[test]
    fn test_partial_json_override() {
        let json = r#"{ "spawn": { "max_enemies": 3 } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.spawn.max_enemies, 3);
        assert_eq!(tuning.spawn.initial_delay_ms, 1500.0);
        assert_eq!(tuning.layers.len(), 6);
    }

    #[test]
    fn test_validate_sorts_thresholds() {
        let mut tuning = Tuning::default();
        tuning.layers.swap(1, 3);
        tuning.validate();
        let thresholds: Vec<u64> = tuning.layers.iter().map(|l| l.threshold).collect();
        assert_eq!(thresholds, vec![0, 500, 1500, 4000, 10_000, 25_000]);
        assert_eq!(tuning.layers[3].number, 4);
    }

    #[test]
    fn test_bad_json_uses_defaults() {
        let tuning = Tuning::from_json_or_default("{ not json");
        assert_eq!(tuning, Tuning::default());
    }
}
