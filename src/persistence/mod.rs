//! Progression persistence
//!
//! A single versioned profile record under one storage key. The run loop
//! only talks to `Progression` at terminal points (milestones, game over,
//! score submission). Storage or decode failures are logged and the profile
//! falls back to defaults; nothing here can stop a run.

pub mod envelope;
pub mod leaderboard;
pub mod profile;
pub mod storage;

use thiserror::Error;

pub use leaderboard::{Leaderboard, LeaderboardEntry, MAX_ENTRIES};
pub use profile::{ACHIEVEMENTS, LifetimeStats, ProfileRecord, achievement_title};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
pub use storage::{KeyValueStore, MemoryStore};

use crate::progression::{Rank, Unlocks, rank_for};
use crate::sim::{GameEvent, RunSummary};

/// Storage key for the profile record
pub const PROFILE_KEY: &str = "layer_breach_profile";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Storage unavailable")]
    Unavailable,
    #[error("Storage read failed: {0}")]
    Read(String),
    #[error("Storage write failed: {0}")]
    Write(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported profile version: {0}")]
    UnsupportedVersion(u32),
}

/// What changed in the profile after a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub new_achievements: Vec<String>,
    pub new_unlocks: Vec<String>,
    pub prestige_advanced: bool,
    pub prestige: u32,
    /// Lifetime best before this run
    pub previous_best: u64,
}

/// Profile service over a key/value store
pub struct Progression<S: KeyValueStore> {
    store: S,
    profile: ProfileRecord,
}

impl<S: KeyValueStore> Progression<S> {
    /// Load the profile from the store, or start fresh
    pub fn open(store: S) -> Self {
        let profile = match Self::load(&store) {
            Ok(Some(profile)) => {
                log::info!(
                    "Loaded profile: prestige {}, {} runs, best {}",
                    profile.prestige,
                    profile.lifetime.runs,
                    profile.lifetime.best_score
                );
                profile
            }
            Ok(None) => {
                log::info!("No profile found, starting fresh");
                ProfileRecord::default()
            }
            Err(e) => {
                log::warn!("Failed to load profile, using defaults: {}", e);
                ProfileRecord::default()
            }
        };
        Self { store, profile }
    }

    fn load(store: &S) -> Result<Option<ProfileRecord>, PersistenceError> {
        match store.get(PROFILE_KEY)? {
            Some(json) => Ok(Some(envelope::decode(&json)?)),
            None => Ok(None),
        }
    }

    /// Write the profile back. Failures are logged, never propagated.
    pub fn save(&mut self) -> bool {
        let result = envelope::encode(&self.profile).and_then(|json| self.store.set(PROFILE_KEY, &json));
        match result {
            Ok(()) => {
                log::debug!("Profile saved");
                true
            }
            Err(e) => {
                log::warn!("Failed to save profile: {}", e);
                false
            }
        }
    }

    pub fn profile(&self) -> &ProfileRecord {
        &self.profile
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn load_lifetime_stats(&self) -> LifetimeStats {
        self.profile.lifetime.clone()
    }

    pub fn prestige(&self) -> u32 {
        self.profile.prestige
    }

    pub fn identity(&self) -> &str {
        &self.profile.identity
    }

    pub fn set_identity(&mut self, identity: impl Into<String>) {
        self.profile.identity = identity.into();
        self.save();
    }

    /// Rank for the profile's prestige and deepest layer ever reached
    pub fn rank(&self) -> Rank {
        rank_for(self.profile.prestige, self.profile.lifetime.deepest_layer)
    }

    pub fn unlocks(&self) -> &Unlocks {
        &self.profile.unlocks
    }

    /// Fold a finished run into the profile and persist it
    pub fn record_run_result(&mut self, run: &RunSummary) -> RunReport {
        let previous_best = self.profile.lifetime.best_score;
        self.profile.lifetime.absorb(run);
        let new_achievements = self.profile.evaluate_achievements(run);

        let prestige_advanced = run.graduated && self.profile.advance_prestige();
        if prestige_advanced {
            log::info!("Prestige advanced to {}", self.profile.prestige);
        }
        let new_unlocks = self
            .profile
            .unlocks
            .merge(&Unlocks::for_prestige(self.profile.prestige));

        log::info!(
            "Run recorded: score {}, layer {}, {} new achievements",
            run.final_score,
            run.deepest_layer,
            new_achievements.len()
        );
        self.save();

        RunReport {
            new_achievements,
            new_unlocks,
            prestige_advanced,
            prestige: self.profile.prestige,
            previous_best,
        }
    }

    /// Add a leaderboard entry. Returns the rank if it made the board.
    pub fn submit_leaderboard_entry(
        &mut self,
        score: u64,
        identity: &str,
        deepest_layer: u8,
        timestamp: f64,
    ) -> Option<usize> {
        let rank = self.profile.leaderboard.add(LeaderboardEntry {
            score,
            identity: identity.to_string(),
            deepest_layer,
            timestamp,
        });
        if let Some(rank) = rank {
            log::info!("Leaderboard entry #{} ({} by {})", rank, score, identity);
            self.save();
        }
        rank
    }

    /// Record a newly reached deepest layer mid-run
    pub fn record_milestone(&mut self, deepest_layer: u8) {
        if deepest_layer <= self.profile.lifetime.deepest_layer {
            return;
        }
        self.profile.lifetime.deepest_layer = deepest_layer;
        log::info!("New deepest layer: {}", deepest_layer);
        self.save();
    }

    /// Forward the terminal events a host drains from a run
    pub fn handle_event(&mut self, event: &GameEvent, timestamp: f64) {
        match event {
            GameEvent::Milestone { deepest_layer } => self.record_milestone(*deepest_layer),
            GameEvent::SubmitScore {
                score,
                identity,
                deepest_layer,
            } => {
                self.submit_leaderboard_entry(*score, identity, *deepest_layer, timestamp);
            }
            _ => {}
        }
    }
}
