//! Enemy naming and graduation boss identities

use serde::Serialize;

use super::scaling::enemy_variant;
use crate::consts::FINAL_PRESTIGE;
use crate::tuning::EnemyColor;

/// Who a boss is, for the HUD and the sprite lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BossIdentity {
    pub name: &'static str,
    pub sprite_key: String,
}

/// Regular enemy names by colour, one per variant band
const ENEMY_NAMES: [(EnemyColor, [&str; 4]); 5] = [
    (EnemyColor::Green, ["Glitch", "Bitrot", "Worm", "Polymorph"]),
    (EnemyColor::Yellow, ["Ping", "Flood", "Botnet", "Swarm"]),
    (EnemyColor::Blue, ["Cookie", "Session", "Token", "Keylogger"]),
    (EnemyColor::Purple, ["Trojan", "Backdoor", "Rootkit", "Bootkit"]),
    (EnemyColor::Red, ["Exploit", "Payload", "Zero Click", "Wiper"]),
];

/// Graduation boss names for the colour-keyed layers
const GRADUATION_NAMES: [(EnemyColor, [&str; 4]); 4] = [
    (
        EnemyColor::Green,
        ["Glitch Mother", "Bitrot Hive", "Worm Queen", "Polymorph Prime"],
    ),
    (
        EnemyColor::Yellow,
        ["Ping Storm", "Flood Gate", "Botnet Herder", "Swarm Mind"],
    ),
    (
        EnemyColor::Blue,
        ["Cookie Monster", "Session Thief", "Token Forger", "Keylogger King"],
    ),
    (
        EnemyColor::Purple,
        ["Trojan Horse", "Backdoor Baron", "Rootkit Regent", "Bootkit Emperor"],
    ),
];

/// Last-layer boss ladder, indexed by prestige (0..=7)
const PRESTIGE_LADDER: [&str; 8] = [
    "Gatekeeper",
    "Firewall Golem",
    "Daemon Lord",
    "Kernel Panic",
    "Hypervisor Hydra",
    "Microcode Leviathan",
    "Quantum Basilisk",
    "Singularity Engine",
];

const FINAL_BOSS_NAME: &str = "The Zero Day";
const FINAL_BOSS_SPRITE: &str = "boss_final_zero_day";

/// Display name of a regular enemy at a prestige level
pub fn enemy_name(color: EnemyColor, prestige: u32) -> &'static str {
    let variant = enemy_variant(prestige) as usize - 1;
    ENEMY_NAMES
        .iter()
        .find(|(c, _)| *c == color)
        .map(|(_, names)| names[variant])
        .unwrap_or(ENEMY_NAMES[0].1[variant])
}

/// Identity of the boss guarding `layer` at `prestige`.
///
/// Layers 1-4 map to the green/yellow/blue/purple tables, layer 5 wraps back to
/// green, and layer 6 climbs the prestige ladder up to the final boss.
pub fn graduation_boss_identity(layer: u8, prestige: u32) -> BossIdentity {
    let variant = enemy_variant(prestige);
    let color = match layer {
        2 => EnemyColor::Yellow,
        3 => EnemyColor::Blue,
        4 => EnemyColor::Purple,
        6..=u8::MAX => return prestige_boss_identity(prestige),
        _ => EnemyColor::Green,
    };

    let name = GRADUATION_NAMES
        .iter()
        .find(|(c, _)| *c == color)
        .map(|(_, names)| names[variant as usize - 1])
        .unwrap_or(GRADUATION_NAMES[0].1[0]);

    BossIdentity {
        name,
        sprite_key: format!("boss_{}_{}", color.as_str(), variant),
    }
}

fn prestige_boss_identity(prestige: u32) -> BossIdentity {
    if prestige >= FINAL_PRESTIGE {
        return BossIdentity {
            name: FINAL_BOSS_NAME,
            sprite_key: FINAL_BOSS_SPRITE.to_string(),
        };
    }
    BossIdentity {
        name: PRESTIGE_LADDER[prestige as usize],
        sprite_key: format!("boss_prestige_{}", prestige),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_layers() {
        let id = graduation_boss_identity(1, 0);
        assert_eq!(id.name, "Glitch Mother");
        assert_eq!(id.sprite_key, "boss_green_1");

        let id = graduation_boss_identity(4, 5);
        assert_eq!(id.name, "Rootkit Regent");
        assert_eq!(id.sprite_key, "boss_purple_3");
    }

    #[test]
    fn test_layer_five_wraps_to_green() {
        for prestige in 0..8 {
            assert_eq!(
                graduation_boss_identity(5, prestige),
                graduation_boss_identity(1, prestige)
            );
        }
    }

    #[test]
    fn test_layer_six_ladder() {
        assert_eq!(graduation_boss_identity(6, 0).name, "Gatekeeper");
        assert_eq!(graduation_boss_identity(6, 7).sprite_key, "boss_prestige_7");
    }

    #[test]
    fn test_final_boss_bypasses_ladder() {
        let id = graduation_boss_identity(6, 8);
        assert_eq!(id.name, "The Zero Day");
        assert_eq!(id.sprite_key, "boss_final_zero_day");
        assert_eq!(graduation_boss_identity(6, 12), id);
        // Final boss only guards the last layer
        assert_ne!(graduation_boss_identity(3, 8).name, "The Zero Day");
    }

    #[test]
    fn test_enemy_names() {
        assert_eq!(enemy_name(EnemyColor::Green, 0), "Glitch");
        assert_eq!(enemy_name(EnemyColor::Red, 9), "Wiper");
        assert_eq!(enemy_name(EnemyColor::Blue, 3), "Session");
    }
}
