//! The persisted player profile
//!
//! One record holds everything that outlives a run: lifetime totals, prestige
//! level, achievements, unlocked content, the local leaderboard and the
//! display identity.

use serde::{Deserialize, Serialize};

use super::leaderboard::Leaderboard;
use crate::consts::FINAL_PRESTIGE;
use crate::progression::Unlocks;
use crate::sim::RunSummary;

/// Totals accumulated over every finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeStats {
    /// Sum of final scores
    pub score: u64,
    /// Total survival time
    pub play_ms: f64,
    pub enemies_defeated: u64,
    pub bosses_defeated: u64,
    pub runs: u32,
    pub best_score: u64,
    pub deepest_layer: u8,
    pub best_combo: f64,
}

impl LifetimeStats {
    /// Fold a finished run into the totals
    pub fn absorb(&mut self, run: &RunSummary) {
        self.score = self.score.saturating_add(run.final_score);
        self.play_ms += run.survival_ms.max(0.0);
        self.enemies_defeated += run.enemies_defeated as u64;
        self.bosses_defeated += run.bosses_defeated as u64;
        self.runs += 1;
        self.best_score = self.best_score.max(run.final_score);
        self.deepest_layer = self.deepest_layer.max(run.deepest_layer);
        self.best_combo = self.best_combo.max(run.max_combo);
    }
}

/// Achievement definition
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    check: fn(&RunSummary, &LifetimeStats) -> bool,
}

/// Every achievement, checked against the finished run and the updated totals
pub const ACHIEVEMENTS: [Achievement; 10] = [
    Achievement {
        id: "first_blood",
        title: "First Blood",
        check: |run, _| run.enemies_defeated > 0,
    },
    Achievement {
        id: "combo_breaker",
        title: "Combo Breaker",
        check: |run, _| run.max_combo >= 3.0,
    },
    Achievement {
        id: "sharpshooter",
        title: "Sharpshooter",
        check: |run, _| run.accuracy >= 0.8 && run.enemies_defeated >= 20,
    },
    Achievement {
        id: "boss_hunter",
        title: "Boss Hunter",
        check: |run, _| run.bosses_defeated > 0,
    },
    Achievement {
        id: "deep_dive",
        title: "Deep Dive",
        check: |_, life| life.deepest_layer >= 4,
    },
    Achievement {
        id: "bare_metal",
        title: "Bare Metal",
        check: |_, life| life.deepest_layer >= 6,
    },
    Achievement {
        id: "survivor",
        title: "Survivor",
        check: |run, _| run.survival_ms >= 120_000.0,
    },
    Achievement {
        id: "graduate",
        title: "Graduate",
        check: |run, _| run.graduated,
    },
    Achievement {
        id: "veteran",
        title: "Veteran",
        check: |_, life| life.runs >= 10,
    },
    Achievement {
        id: "exterminator",
        title: "Exterminator",
        check: |_, life| life.enemies_defeated >= 1000,
    },
];

/// Look up an achievement title by id
pub fn achievement_title(id: &str) -> Option<&'static str> {
    ACHIEVEMENTS.iter().find(|a| a.id == id).map(|a| a.title)
}

/// Everything stored for a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    pub lifetime: LifetimeStats,
    pub prestige: u32,
    /// Achievement ids in unlock order
    pub achievements: Vec<String>,
    pub unlocks: Unlocks,
    pub leaderboard: Leaderboard,
    pub identity: String,
}

impl Default for ProfileRecord {
    fn default() -> Self {
        Self {
            lifetime: LifetimeStats::default(),
            prestige: 0,
            achievements: Vec::new(),
            unlocks: Unlocks::for_prestige(0),
            leaderboard: Leaderboard::new(),
            identity: "anonymous".to_string(),
        }
    }
}

impl ProfileRecord {
    /// Grant any achievements the run earned. Returns the new ids.
    pub fn evaluate_achievements(&mut self, run: &RunSummary) -> Vec<String> {
        let mut earned = Vec::new();
        for achievement in &ACHIEVEMENTS {
            if self.has_achievement(achievement.id) {
                continue;
            }
            if (achievement.check)(run, &self.lifetime) {
                self.achievements.push(achievement.id.to_string());
                earned.push(achievement.id.to_string());
            }
        }
        earned
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|a| a == id)
    }

    /// Advance prestige by one level (capped). Returns true if it moved.
    pub fn advance_prestige(&mut self) -> bool {
        if self.prestige >= FINAL_PRESTIGE {
            return false;
        }
        self.prestige += 1;
        true
    }
}
