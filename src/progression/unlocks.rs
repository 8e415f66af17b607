//! Prestige-gated content

use serde::{Deserialize, Serialize};

/// Avatars and the prestige level that unlocks them
const AVATARS: [(u32, &str); 6] = [
    (0, "pilot"),
    (1, "ghost"),
    (2, "cipher"),
    (4, "daemon"),
    (6, "oracle"),
    (8, "zero"),
];

/// Ship kernels (weapon skins) and the prestige level that unlocks them
const KERNELS: [(u32, &str); 5] = [
    (0, "vanilla"),
    (1, "hardened"),
    (3, "realtime"),
    (5, "microkernel"),
    (7, "exokernel"),
];

/// Bullet cosmetic tier for a prestige level (1..=4)
pub fn bullet_tier(prestige: u32) -> u8 {
    (prestige / 2 + 1).min(4) as u8
}

/// Content a profile has unlocked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlocks {
    pub avatars: Vec<String>,
    pub kernels: Vec<String>,
    #[serde(default)]
    pub bullet_tier: u8,
}

impl Unlocks {
    /// Everything available at a prestige level
    pub fn for_prestige(prestige: u32) -> Self {
        let gated = |table: &[(u32, &str)]| {
            table
                .iter()
                .filter(|(level, _)| *level <= prestige)
                .map(|(_, name)| name.to_string())
                .collect::<Vec<_>>()
        };
        Self {
            avatars: gated(&AVATARS),
            kernels: gated(&KERNELS),
            bullet_tier: bullet_tier(prestige),
        }
    }

    /// Merge newly available content, keeping anything already unlocked.
    /// Returns the names that were added.
    pub fn merge(&mut self, other: &Unlocks) -> Vec<String> {
        let mut added = Vec::new();
        for (mine, theirs) in [
            (&mut self.avatars, &other.avatars),
            (&mut self.kernels, &other.kernels),
        ] {
            for name in theirs {
                if !mine.contains(name) {
                    mine.push(name.clone());
                    added.push(name.clone());
                }
            }
        }
        self.bullet_tier = self.bullet_tier.max(other.bullet_tier);
        added
    }

    pub fn has_avatar(&self, name: &str) -> bool {
        self.avatars.iter().any(|a| a == name)
    }
}
