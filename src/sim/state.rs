//! Run state and the types the host reads from it
//!
//! A `RunState` is one play session. Only `tick` mutates it; the host reads
//! it through `snapshot()` and drains `GameEvent`s after each frame.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::FieldBounds;
use super::entity::{EntityStore, EntityTag, Player};
use crate::progression::{Rank, rank_for};
use crate::tuning::{EnemyColor, LayerConfig, Tuning};

/// Run lifecycle. `GameOver` is terminal; only `restart` leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunPhase {
    Running,
    GameOver,
}

/// Explosion size class for a kill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExplosionSize {
    Small,
    Medium,
    Large,
}

impl ExplosionSize {
    /// Bosses and red are large; purple, blue or any kill in layer 5+ is
    /// medium; everything else is small.
    pub fn classify(color: Option<EnemyColor>, is_boss: bool, layer: u8) -> Self {
        if is_boss || color == Some(EnemyColor::Red) {
            return ExplosionSize::Large;
        }
        if matches!(color, Some(EnemyColor::Purple | EnemyColor::Blue)) || layer >= 5 {
            return ExplosionSize::Medium;
        }
        ExplosionSize::Small
    }
}

/// Things that happened during a tick, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    EnemyHit {
        id: u32,
        remaining: u32,
    },
    EnemyKilled {
        id: u32,
        awarded: u64,
        explosion: ExplosionSize,
        boss: bool,
    },
    BossSpawned {
        id: u32,
        name: String,
        graduation: bool,
    },
    LayerReached {
        layer: u8,
        name: String,
    },
    /// First time this run has gone this deep
    Milestone {
        deepest_layer: u8,
    },
    PlayerHit {
        lives_left: u8,
    },
    GameOver {
        final_score: u64,
        deepest_layer: u8,
    },
    /// Fired once, a short delay after game over
    SubmitScore {
        score: u64,
        identity: String,
        deepest_layer: u8,
    },
    /// The last layer's graduation boss fell
    Graduated,
}

/// Counters summarised into the run result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub enemies_defeated: u32,
    pub bosses_defeated: u32,
    pub max_combo: f64,
}

/// Everything persistence needs from a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub final_score: u64,
    pub deepest_layer: u8,
    pub prestige: u32,
    pub survival_ms: f64,
    /// Hits / shots, 0 when nothing was fired
    pub accuracy: f32,
    pub max_combo: f64,
    pub enemies_defeated: u32,
    pub bosses_defeated: u32,
    pub graduated: bool,
}

/// One entity as the renderer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub id: u32,
    pub tag: EntityTag,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub health: u32,
}

/// Read-only view of a run for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub time_ms: f64,
    pub score: u64,
    pub combo: f64,
    pub layer: u8,
    pub layer_name: String,
    pub deepest_layer: u8,
    pub lives: u8,
    pub paused: bool,
    pub game_over: bool,
    pub final_score: u64,
    pub rank: Rank,
    pub player: EntityView,
    pub entities: Vec<EntityView>,
}

/// State of one play session
#[derive(Debug, Clone)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Leaderboard identity for the submission signal
    pub identity: String,
    pub prestige: u32,

    /// Sim clock (ms); stops while paused
    pub time_ms: f64,
    pub phase: RunPhase,
    pub paused: bool,

    pub score: u64,
    /// Always >= 1
    pub combo: f64,
    pub current_layer: u8,
    /// High-water mark of `current_layer`
    pub deepest_layer: u8,
    pub lives: u8,

    pub player: Player,
    pub entities: EntityStore,

    /// Current spawn delay; only shrinks, floored at the min interval
    pub spawn_delay_ms: f64,
    pub next_spawn_ms: f64,
    pub next_fire_ms: f64,
    pub last_hit_ms: f64,
    pub invulnerable_until_ms: f64,

    pub final_score: u64,
    pub final_deepest_layer: u8,
    pub ended_at_ms: Option<f64>,
    /// Deadline of the pending score submission
    pub submit_at_ms: Option<f64>,

    /// Layers whose graduation boss has already appeared
    pub graduation_spawned: Vec<u8>,
    pub graduated: bool,

    pub stats: RunStats,
    pub events: Vec<GameEvent>,
}

impl RunState {
    /// Create a fresh run
    pub fn new(seed: u64, prestige: u32, identity: impl Into<String>, tuning: Tuning) -> Self {
        let field = &tuning.field;
        let player = Player {
            pos: Vec2::new(field.player_start_x, field.height / 2.0),
            vel: Vec2::ZERO,
            radius: tuning.combat.player_radius,
        };
        let lives = tuning.combat.starting_lives.max(1);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            identity: identity.into(),
            prestige,
            time_ms: 0.0,
            phase: RunPhase::Running,
            paused: false,
            score: 0,
            combo: 1.0,
            current_layer: 1,
            deepest_layer: 1,
            lives,
            player,
            entities: EntityStore::new(),
            spawn_delay_ms: 0.0,
            next_spawn_ms: 0.0,
            next_fire_ms: 0.0,
            last_hit_ms: 0.0,
            invulnerable_until_ms: 0.0,
            final_score: 0,
            final_deepest_layer: 1,
            ended_at_ms: None,
            submit_at_ms: None,
            graduation_spawned: Vec::new(),
            graduated: false,
            stats: RunStats {
                max_combo: 1.0,
                ..Default::default()
            },
            events: Vec::new(),
            tuning,
        };
        state.spawn_delay_ms = state.initial_spawn_delay();
        state.next_spawn_ms = state.spawn_delay_ms;
        log::info!(
            "Run started (seed {}, prestige {}, spawn delay {:.0}ms)",
            seed,
            prestige,
            state.spawn_delay_ms
        );
        state
    }

    /// Reset to a fresh run with a new seed drawn from this run's RNG.
    /// Nothing from the previous run survives except tuning, identity and prestige.
    pub fn restart(&mut self) {
        let seed = self.rng.random::<u64>();
        self.restart_with(seed, self.prestige);
    }

    /// Reset to a fresh run with an explicit seed and prestige level
    pub fn restart_with(&mut self, seed: u64, prestige: u32) {
        let tuning = std::mem::take(&mut self.tuning);
        let identity = std::mem::take(&mut self.identity);
        *self = Self::new(seed, prestige, identity, tuning);
    }

    /// Spawn delay at run start, adjusted by the prestige tier's pace
    pub fn initial_spawn_delay(&self) -> f64 {
        let pace = self
            .tuning
            .prestige_tier(self.prestige)
            .map(|t| t.spawn_pace_multiplier)
            .unwrap_or(1.0);
        (self.tuning.spawn.initial_delay_ms * pace).max(self.tuning.spawn.min_interval_ms)
    }

    pub fn field(&self) -> FieldBounds {
        FieldBounds::new(self.tuning.field.width, self.tuning.field.height)
    }

    pub fn layer_config(&self) -> &LayerConfig {
        self.tuning.layer(self.current_layer)
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_config().name
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == RunPhase::GameOver
    }

    pub fn is_invulnerable(&self) -> bool {
        self.time_ms < self.invulnerable_until_ms
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Credit a kill: `floor(points * combo)` to score, then grow the combo.
    /// Returns the points awarded.
    pub fn award_kill(&mut self, points: u32) -> u64 {
        let awarded = (points as f64 * self.combo).floor() as u64;
        self.score = self.score.saturating_add(awarded);
        self.combo += self.tuning.combat.combo_step;
        self.stats.max_combo = self.stats.max_combo.max(self.combo);
        self.last_hit_ms = self.time_ms;
        self.stats.enemies_defeated += 1;
        awarded
    }

    /// Passive combo decay once idle, scaled by `dt` so the rate is the same
    /// at any frame rate. Never drops below 1.
    pub fn decay_combo(&mut self, dt: f32) {
        let combat = &self.tuning.combat;
        if self.time_ms - self.last_hit_ms <= combat.combo_idle_ms || self.combo <= 1.0 {
            return;
        }
        let frames = dt as f64 / crate::consts::REFERENCE_FRAME_SECS;
        self.combo = (self.combo * combat.combo_decay_per_frame.powf(frames)).max(1.0);
    }

    /// Recompute the layer from score. Returns the new layer if it changed.
    pub fn update_layer(&mut self) -> Option<u8> {
        let layer = self.tuning.layer_for_score(self.score);
        if layer == self.current_layer {
            return None;
        }
        self.current_layer = layer;
        let name = self.layer_name().to_string();
        log::info!("Layer {} reached: {}", layer, name);
        self.events.push(GameEvent::LayerReached { layer, name });
        if layer > self.deepest_layer {
            self.deepest_layer = layer;
            self.events.push(GameEvent::Milestone {
                deepest_layer: layer,
            });
        }
        Some(layer)
    }

    /// Hits divided by shots fired
    pub fn accuracy(&self) -> f32 {
        if self.stats.shots_fired == 0 {
            return 0.0;
        }
        self.stats.shots_hit as f32 / self.stats.shots_fired as f32
    }

    /// Summarise for persistence
    pub fn summary(&self) -> RunSummary {
        let (final_score, deepest_layer) = if self.is_game_over() {
            (self.final_score, self.final_deepest_layer)
        } else {
            (self.score, self.deepest_layer)
        };
        RunSummary {
            final_score,
            deepest_layer,
            prestige: self.prestige,
            survival_ms: self.ended_at_ms.unwrap_or(self.time_ms),
            accuracy: self.accuracy(),
            max_combo: self.stats.max_combo,
            enemies_defeated: self.stats.enemies_defeated,
            bosses_defeated: self.stats.bosses_defeated,
            graduated: self.graduated,
        }
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            time_ms: self.time_ms,
            score: self.score,
            combo: self.combo,
            layer: self.current_layer,
            layer_name: self.layer_name().to_string(),
            deepest_layer: self.deepest_layer,
            lives: self.lives,
            paused: self.paused,
            game_over: self.is_game_over(),
            final_score: self.final_score,
            rank: rank_for(self.prestige, self.deepest_layer),
            player: EntityView {
                id: 0,
                tag: EntityTag::Player,
                x: self.player.pos.x,
                y: self.player.pos.y,
                radius: self.player.radius,
                health: self.lives as u32,
            },
            entities: self
                .entities
                .iter()
                .map(|e| EntityView {
                    id: e.id,
                    tag: e.tag(),
                    x: e.pos.x,
                    y: e.pos.y,
                    radius: e.radius,
                    health: e.health(),
                })
                .collect(),
        }
    }
}
