//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically. Step order inside a
//! tick is fixed: movement, player fire, culling, enemy fire, bullet hits,
//! player hits, combo decay, layer transition, then spawning.

use std::f32::consts::FRAC_1_SQRT_2;

use glam::Vec2;

use super::collision::circles_overlap;
use super::entity::{EntityKind, Faction, HitResult};
use super::spawn;
use super::state::{ExplosionSize, GameEvent, RunPhase, RunState};
use crate::aim_at;
use crate::tuning::EnemyColor;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Fire held
    pub fire: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

impl TickInput {
    /// Unit-or-zero movement direction. Diagonals are scaled by 1/sqrt(2)
    /// so they are no faster than a single axis.
    pub fn movement(&self) -> Vec2 {
        let x = self.right as i8 - self.left as i8;
        let y = self.down as i8 - self.up as i8;
        let dir = Vec2::new(x as f32, y as f32);
        if x != 0 && y != 0 {
            dir * FRAC_1_SQRT_2
        } else {
            dir
        }
    }
}

/// A bullet that connected this tick, resolved after the collision pass
struct HitRecord {
    id: u32,
    result: HitResult,
    color: Option<EnemyColor>,
    boss: bool,
    graduation_layer: Option<u8>,
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut RunState, input: &TickInput, dt: f32) {
    if state.phase == RunPhase::GameOver {
        tick_game_over(state, dt);
        return;
    }

    // Handle pause toggle
    if input.pause {
        state.paused = !state.paused;
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    }
    if state.paused {
        return;
    }

    state.time_ms += dt as f64 * 1000.0;
    let now = state.time_ms;

    move_entities(state, input, dt);
    fire_player(state, input, now);
    cull_off_field(state);
    fire_enemies(state, now);
    resolve_bullet_hits(state);
    if resolve_player_hits(state, now) {
        state.entities.compact();
        return;
    }
    state.decay_combo(dt);
    advance_layer(state);
    spawn::update(state);

    state.entities.compact();
}

/// After game over only the clock runs, to deliver the delayed submission
fn tick_game_over(state: &mut RunState, dt: f32) {
    state.time_ms += dt as f64 * 1000.0;
    let due = matches!(state.submit_at_ms, Some(at) if state.time_ms >= at);
    if due {
        state.submit_at_ms = None;
        log::info!(
            "Submitting score {} (layer {}) for {}",
            state.final_score,
            state.final_deepest_layer,
            state.identity
        );
        state.events.push(GameEvent::SubmitScore {
            score: state.final_score,
            identity: state.identity.clone(),
            deepest_layer: state.final_deepest_layer,
        });
    }
}

/// Step 1: player velocity from input, then integrate everything
fn move_entities(state: &mut RunState, input: &TickInput, dt: f32) {
    let field = state.field();
    let player = &mut state.player;
    player.vel = input.movement() * state.tuning.combat.player_speed;
    player.pos = field.clamp(player.pos + player.vel * dt, player.radius);

    for entity in state.entities.iter_mut() {
        entity.pos += entity.vel * dt;
    }
}

/// Step 2: player bullet on the fire cooldown
fn fire_player(state: &mut RunState, input: &TickInput, now: f64) {
    if !input.fire || now < state.next_fire_ms {
        return;
    }
    let combat = &state.tuning.combat;
    let pos = state.player.pos + Vec2::new(combat.bullet_offset, 0.0);
    let vel = Vec2::new(combat.bullet_speed, 0.0);
    let radius = combat.bullet_radius;
    state.next_fire_ms = now + combat.fire_interval_ms;
    state
        .entities
        .insert(pos, vel, radius, EntityKind::PlayerBullet);
    state.stats.shots_fired += 1;
}

/// Step 3: drop bullets past the field margin and hostiles that flew off
fn cull_off_field(state: &mut RunState) {
    let field = state.field();
    let margin = state.tuning.combat.cull_margin;
    for entity in state.entities.iter_mut() {
        let gone = if entity.is_bullet() {
            field.outside(entity.pos, margin)
        } else {
            field.escaped(entity.pos, margin + entity.radius)
        };
        if gone {
            entity.alive = false;
        }
    }
}

/// Step 4: shooting enemies aim at the player's current position
fn fire_enemies(state: &mut RunState, now: f64) {
    let field = state.field();
    let target = state.player.pos;
    let mut shots = Vec::new();
    for entity in state.entities.iter_mut() {
        let pos = entity.pos;
        if field.outside(pos, 0.0) {
            continue;
        }
        if let Some(shooter) = entity.shooter_mut() {
            if shooter.ready(now) {
                shooter.last_shot_ms = now;
                shots.push((pos, shooter.bullet_speed));
            }
        }
    }

    let radius = state.tuning.combat.enemy_bullet_radius;
    for (pos, speed) in shots {
        state
            .entities
            .insert(pos, aim_at(pos, target, speed), radius, EntityKind::EnemyBullet);
    }
}

/// Step 5 (and the kill half of step 7): player bullets against hostiles
fn resolve_bullet_hits(state: &mut RunState) {
    let mut hits = Vec::new();
    {
        let entities = state.entities.as_mut_slice();
        for bi in 0..entities.len() {
            let bullet = &entities[bi];
            if !bullet.alive || !bullet.is_bullet() || bullet.faction() != Faction::Player {
                continue;
            }
            let (pos, radius) = (bullet.pos, bullet.radius);
            let target = entities.iter().position(|t| {
                t.alive
                    && t.faction() == Faction::Hostile
                    && t.is_hostile_body()
                    && circles_overlap(pos, radius, t.pos, t.radius)
            });
            let Some(ti) = target else {
                continue;
            };

            entities[bi].alive = false;
            let target = &mut entities[ti];
            let (color, boss, graduation_layer) = match &target.kind {
                EntityKind::Enemy(e) => (Some(e.color), false, None),
                EntityKind::Boss(b) => (None, true, b.graduation_layer),
                _ => (None, false, None),
            };
            hits.push(HitRecord {
                id: target.id,
                result: target.take_hit(),
                color,
                boss,
                graduation_layer,
            });
        }
    }

    for hit in hits {
        state.stats.shots_hit += 1;
        match hit.result {
            HitResult::Ignored => {}
            HitResult::Damaged { remaining } => {
                state.events.push(GameEvent::EnemyHit {
                    id: hit.id,
                    remaining,
                });
            }
            HitResult::Killed { points } => {
                let awarded = state.award_kill(points);
                let explosion = ExplosionSize::classify(hit.color, hit.boss, state.current_layer);
                if hit.boss {
                    state.stats.bosses_defeated += 1;
                }
                state.events.push(GameEvent::EnemyKilled {
                    id: hit.id,
                    awarded,
                    explosion,
                    boss: hit.boss,
                });
                if hit.graduation_layer.is_some_and(|l| l >= state.tuning.max_layer()) {
                    state.graduated = true;
                    log::info!("Final graduation boss defeated at prestige {}", state.prestige);
                    state.events.push(GameEvent::Graduated);
                }
            }
        }
    }
}

/// Step 6: hostile bodies or enemy bullets touching the player.
/// Returns true when the run ended.
fn resolve_player_hits(state: &mut RunState, now: f64) -> bool {
    if state.is_invulnerable() {
        return false;
    }
    let (pos, radius) = (state.player.pos, state.player.radius);
    let mut hit = false;
    for entity in state.entities.iter_mut() {
        if entity.faction() != Faction::Hostile {
            continue;
        }
        if circles_overlap(pos, radius, entity.pos, entity.radius) {
            hit = true;
            if entity.is_bullet() {
                entity.alive = false;
            }
        }
    }
    if !hit {
        return false;
    }

    state.combo = 1.0;
    state.last_hit_ms = now;
    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::PlayerHit {
        lives_left: state.lives,
    });
    if state.lives > 0 {
        state.invulnerable_until_ms = now + state.tuning.combat.invulnerable_ms;
        return false;
    }
    end_run(state, now);
    true
}

/// Terminal game-over resolution; runs at most once per run
fn end_run(state: &mut RunState, now: f64) {
    if state.phase == RunPhase::GameOver {
        return;
    }
    // Kills earlier in this tick may have crossed a threshold
    state.update_layer();
    state.phase = RunPhase::GameOver;
    state.player.vel = Vec2::ZERO;
    for entity in state.entities.iter_mut() {
        entity.vel = Vec2::ZERO;
    }
    state.final_score = state.score;
    state.final_deepest_layer = state.deepest_layer;
    state.ended_at_ms = Some(now);
    state.submit_at_ms = Some(now + state.tuning.combat.submit_delay_ms);
    log::info!(
        "Game over: score {}, deepest layer {}",
        state.final_score,
        state.final_deepest_layer
    );
    state.events.push(GameEvent::GameOver {
        final_score: state.final_score,
        deepest_layer: state.final_deepest_layer,
    });
}

/// Step 8: layer from score, plus a graduation boss for every layer left
/// behind (one kill can cross several thresholds)
fn advance_layer(state: &mut RunState) {
    let previous = state.current_layer;
    if let Some(layer) = state.update_layer() {
        for passed in previous..layer {
            spawn::spawn_graduation_boss(state, passed);
        }
    }
    let last = state.tuning.max_layer();
    if state.current_layer == last && state.score >= state.tuning.combat.prestige_score_threshold
    {
        spawn::spawn_graduation_boss(state, last);
    }
}
