//! Spawn scheduler
//!
//! Decides when and what hostile appears: weighted enemy picks, boss rolls,
//! graduation bosses, and the shrinking spawn delay. Never fails; when there
//! is nothing to spawn the tick is a no-op.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{Boss, Enemy, EntityKind, Shooter};
use super::state::{GameEvent, RunState};
use crate::progression::{BaseStats, enemy_stats, graduation_boss_identity};
use crate::tuning::{BossTierConfig, EnemyColor, LayerConfig, Tuning};
use crate::{aim_at, rotate};

/// What a scheduling pass did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Hostile cap reached
    Capped,
    /// No eligible enemy type (all weights zero)
    NoEligible,
    Enemy { id: u32, color: EnemyColor },
    Boss { id: u32 },
}

/// Run the scheduler if its deadline has passed, then re-arm the deadline.
pub fn update(state: &mut RunState) -> Option<SpawnOutcome> {
    if state.time_ms < state.next_spawn_ms {
        return None;
    }
    let layer = state.layer_config().clone();
    let active = state.entities.hostile_count();
    let outcome = schedule_next(state, &layer, active);

    let effective = (state.spawn_delay_ms / layer.spawn_rate_multiplier.max(f64::EPSILON))
        .max(state.tuning.spawn.min_interval_ms);
    state.next_spawn_ms = state.time_ms + effective;
    Some(outcome)
}

/// One scheduling decision for the given layer
pub fn schedule_next(
    state: &mut RunState,
    layer: &LayerConfig,
    active_enemy_count: usize,
) -> SpawnOutcome {
    if active_enemy_count >= state.tuning.spawn.max_enemies {
        return SpawnOutcome::Capped;
    }

    let bonus = state
        .tuning
        .prestige_tier(state.prestige)
        .map(|t| t.boss_chance_bonus)
        .unwrap_or(0.0);
    let boss_chance = if layer.boss_chance > 0.0 {
        layer.boss_chance + bonus
    } else {
        0.0
    };
    if state.rng.random::<f32>() < boss_chance {
        let tier = roll_boss_tier(&mut state.rng, &state.tuning.boss_tiers, layer.number);
        if let Some(id) = tier.and_then(|tier| spawn_boss(state, tier, None)) {
            return SpawnOutcome::Boss { id };
        }
    }

    let Some(color) = pick_enemy_type(&mut state.rng, &state.tuning, &layer.enemies) else {
        log::debug!("No eligible enemy types in layer {}", layer.number);
        return SpawnOutcome::NoEligible;
    };

    let id = spawn_enemy(state, color, layer.health_multiplier);
    let spawn = &state.tuning.spawn;
    state.spawn_delay_ms = (state.spawn_delay_ms * spawn.difficulty_decay).max(spawn.min_interval_ms);
    SpawnOutcome::Enemy { id, color }
}

/// Weighted pick over `candidates` using each type's spawn weight.
/// Returns `None` when the total weight is zero.
pub fn pick_enemy_type(
    rng: &mut Pcg32,
    tuning: &Tuning,
    candidates: &[EnemyColor],
) -> Option<EnemyColor> {
    let total: u32 = candidates
        .iter()
        .map(|c| tuning.enemy(*c).spawn_weight)
        .sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for color in candidates {
        let weight = tuning.enemy(*color).spawn_weight;
        if roll < weight {
            return Some(*color);
        }
        roll -= weight;
    }
    None
}

/// Pick a boss tier for `layer`: start at the lowest unlocked tier and climb
/// while each further unlocked tier passes its own roll.
pub fn roll_boss_tier(rng: &mut Pcg32, tiers: &[BossTierConfig], layer: u8) -> Option<usize> {
    let mut unlocked = tiers
        .iter()
        .enumerate()
        .filter(|(_, t)| t.min_layer <= layer);
    let (mut chosen, _) = unlocked.next()?;
    for (index, tier) in unlocked {
        if rng.random::<f32>() < tier.unlock_chance {
            chosen = index;
        } else {
            break;
        }
    }
    Some(chosen)
}

/// Highest boss tier unlocked at `layer`
fn strongest_tier(tiers: &[BossTierConfig], layer: u8) -> Option<usize> {
    tiers
        .iter()
        .enumerate()
        .filter(|(_, t)| t.min_layer <= layer)
        .map(|(i, _)| i)
        .last()
}

/// Random point on the right edge, inset vertically by the spawn margin
fn spawn_position(state: &mut RunState) -> Vec2 {
    let field = &state.tuning.field;
    let (lo, hi) = (field.spawn_margin, field.height - field.spawn_margin);
    let y = if hi > lo {
        state.rng.random_range(lo..=hi)
    } else {
        field.height / 2.0
    };
    Vec2::new(field.width + field.spawn_margin, y)
}

/// Launch velocity toward the player's current position, with jitter
fn launch_velocity(state: &mut RunState, pos: Vec2, speed: f32) -> Vec2 {
    let jitter = state.tuning.spawn.jitter_radians.abs();
    let angle = if jitter > 0.0 {
        state.rng.random_range(-jitter..=jitter)
    } else {
        0.0
    };
    rotate(aim_at(pos, state.player.pos, speed), angle)
}

/// Spawn a regular enemy of `color`, scaled for prestige and layer
pub fn spawn_enemy(state: &mut RunState, color: EnemyColor, layer_multiplier: f64) -> u32 {
    let config = *state.tuning.enemy(color);
    let stats = enemy_stats(BaseStats::from(&config), state.prestige, layer_multiplier);
    let pos = spawn_position(state);
    let vel = launch_velocity(state, pos, stats.speed as f32);
    let enemy = Enemy {
        color: config.color,
        health: stats.hit_points(),
        points: stats.points,
        shooter: config.shooter.map(Shooter::new),
    };
    state
        .entities
        .insert(pos, vel, config.radius, EntityKind::Enemy(enemy))
}

/// Spawn a boss of tier index `tier`. With `graduation_layer` set it becomes
/// that layer's graduation boss: named by layer/prestige and tougher.
/// Returns `None` for an unknown tier.
pub fn spawn_boss(
    state: &mut RunState,
    tier: usize,
    graduation_layer: Option<u8>,
) -> Option<u32> {
    let Some(config) = state.tuning.boss_tiers.get(tier).cloned() else {
        log::warn!("Unknown boss tier {}, skipping", tier);
        return None;
    };
    let multiplier = match graduation_layer {
        Some(_) => state.tuning.combat.graduation_health_multiplier,
        None => 1.0,
    };
    let base = BaseStats {
        health: config.health as f64,
        speed: config.speed as f64,
        points: config.points,
    };
    let stats = enemy_stats(base, state.prestige, multiplier);

    let (name, sprite_key) = match graduation_layer {
        Some(layer) => {
            let identity = graduation_boss_identity(layer, state.prestige);
            (identity.name.to_string(), identity.sprite_key)
        }
        None => (
            config.name.clone(),
            format!("boss_tier_{}", config.name.to_lowercase()),
        ),
    };

    let pos = spawn_position(state);
    let vel = launch_velocity(state, pos, stats.speed as f32);
    let radius = state.tuning.enemy(EnemyColor::Green).radius * config.scale;
    let hit_points = stats.hit_points();
    let boss = Boss {
        tier,
        name: name.clone(),
        sprite_key,
        health: hit_points,
        max_health: hit_points,
        points: stats.points,
        scale: config.scale,
        graduation_layer,
        shooter: config.shooter.map(Shooter::new),
    };
    let id = state.entities.insert(pos, vel, radius, EntityKind::Boss(boss));

    log::info!("Boss spawned: {} (tier {}, {} hp)", name, tier, hit_points);
    state.events.push(GameEvent::BossSpawned {
        id,
        name,
        graduation: graduation_layer.is_some(),
    });
    Some(id)
}

/// Spawn the graduation boss guarding `layer` once per run
pub fn spawn_graduation_boss(state: &mut RunState, layer: u8) -> Option<u32> {
    if state.graduation_spawned.contains(&layer) {
        return None;
    }
    let tier = strongest_tier(&state.tuning.boss_tiers, layer)?;
    let id = spawn_boss(state, tier, Some(layer))?;
    state.graduation_spawned.push(layer);
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityTag;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn new_state() -> RunState {
        RunState::new(7, 0, "tester", Tuning::default())
    }

    #[test]
    fn test_weighted_distribution_converges() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let candidates = [EnemyColor::Green, EnemyColor::Yellow, EnemyColor::Blue];
        let trials = 100_000;
        let mut counts = [0u32; 3];
        for _ in 0..trials {
            match pick_enemy_type(&mut rng, &tuning, &candidates) {
                Some(EnemyColor::Green) => counts[0] += 1,
                Some(EnemyColor::Yellow) => counts[1] += 1,
                Some(EnemyColor::Blue) => counts[2] += 1,
                other => panic!("unexpected pick {:?}", other),
            }
        }
        let expected = [0.5, 0.3, 0.2];
        for (count, want) in counts.iter().zip(expected) {
            let freq = *count as f64 / trials as f64;
            assert!((freq - want).abs() < 0.01, "freq {} want {}", freq, want);
        }
    }

    #[test]
    fn test_zero_weights_spawn_nothing() {
        let mut state = new_state();
        for e in state.tuning.enemies.iter_mut() {
            e.spawn_weight = 0;
        }
        let layer = state.tuning.layer(3).clone();
        let outcome = schedule_next(&mut state, &layer, 0);
        assert_eq!(outcome, SpawnOutcome::NoEligible);
        assert!(state.entities.is_empty());
        assert_eq!(state.spawn_delay_ms, 1500.0);
    }

    #[test]
    fn test_cap_skips_tick() {
        let mut state = new_state();
        let layer = state.tuning.layer(1).clone();
        let cap = state.tuning.spawn.max_enemies;
        assert_eq!(schedule_next(&mut state, &layer, cap), SpawnOutcome::Capped);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_spawn_position_and_aim() {
        let mut state = new_state();
        state.tuning.spawn.jitter_radians = 0.0;
        let layer = state.tuning.layer(1).clone();
        let SpawnOutcome::Enemy { id, color } = schedule_next(&mut state, &layer, 0) else {
            panic!("expected an enemy");
        };
        assert_eq!(color, EnemyColor::Green);
        let e = state.entities.get(id).unwrap();
        let field = &state.tuning.field;
        assert_eq!(e.pos.x, field.width + field.spawn_margin);
        assert!(e.pos.y >= field.spawn_margin && e.pos.y <= field.height - field.spawn_margin);
        let to_player = (state.player.pos - e.pos).normalize();
        assert!(e.vel.normalize().dot(to_player) > 0.9999);
        assert!((e.vel.length() - 120.0).abs() < 1e-3);
    }

    #[test]
    fn test_jitter_bounded() {
        let mut state = new_state();
        let layer = state.tuning.layer(1).clone();
        for _ in 0..200 {
            if let SpawnOutcome::Enemy { id, .. } = schedule_next(&mut state, &layer, 0) {
                let e = state.entities.get(id).unwrap();
                let to_player = (state.player.pos - e.pos).normalize();
                let angle = e.vel.normalize().angle_to(to_player).abs();
                assert!(angle <= 0.2 + 1e-4, "angle {}", angle);
            }
        }
    }

    #[test]
    fn test_delay_shrinks_to_floor() {
        let mut state = new_state();
        let layer = state.tuning.layer(1).clone();
        let mut prev = state.spawn_delay_ms;
        for _ in 0..500 {
            schedule_next(&mut state, &layer, 0);
            assert!(state.spawn_delay_ms <= prev);
            prev = state.spawn_delay_ms;
        }
        assert_eq!(state.spawn_delay_ms, state.tuning.spawn.min_interval_ms);
    }

    #[test]
    fn test_boss_does_not_shrink_delay() {
        let mut state = new_state();
        let mut layer = state.tuning.layer(3).clone();
        layer.boss_chance = 1.0;
        let outcome = schedule_next(&mut state, &layer, 0);
        let SpawnOutcome::Boss { id } = outcome else {
            panic!("expected a boss, got {:?}", outcome);
        };
        assert_eq!(state.spawn_delay_ms, 1500.0);
        assert_eq!(state.entities.get(id).map(|e| e.tag()), Some(EntityTag::Boss));
    }

    #[test]
    fn test_unknown_boss_tier_spawns_nothing() {
        let mut state = new_state();
        assert_eq!(spawn_boss(&mut state, 99, None), None);
        assert_eq!(spawn_boss(&mut state, 99, Some(2)), None);
        assert!(state.entities.is_empty());
        assert!(state.events.is_empty());

        // A boss roll with no tiers falls back to a regular enemy
        state.tuning.boss_tiers.clear();
        let mut layer = state.tuning.layer(3).clone();
        layer.boss_chance = 1.0;
        let outcome = schedule_next(&mut state, &layer, 0);
        assert!(matches!(outcome, SpawnOutcome::Enemy { .. }), "{:?}", outcome);
        assert_eq!(spawn_graduation_boss(&mut state, 3), None);
        assert!(state.graduation_spawned.is_empty());
    }

    #[test]
    fn test_boss_tier_gating() {
        let tiers = Tuning::default().boss_tiers;
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(roll_boss_tier(&mut rng, &tiers, 1), Some(0));
            assert!(roll_boss_tier(&mut rng, &tiers, 3).unwrap() <= 1);
        }
        let mut seen_top = false;
        for _ in 0..200 {
            seen_top |= roll_boss_tier(&mut rng, &tiers, 6) == Some(2);
        }
        assert!(seen_top);
        assert_eq!(roll_boss_tier(&mut rng, &[], 6), None);
    }

    #[test]
    fn test_shooters_tagged() {
        let mut state = new_state();
        let id = spawn_enemy(&mut state, EnemyColor::Purple, 1.0);
        let e = state.entities.get(id).unwrap();
        match &e.kind {
            EntityKind::Enemy(enemy) => {
                let shooter = enemy.shooter.expect("purple shoots");
                assert_eq!(shooter.last_shot_ms, 0.0);
                assert_eq!(shooter.interval_ms, 2200.0);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_graduation_boss_once_per_layer() {
        let mut state = new_state();
        assert!(spawn_graduation_boss(&mut state, 2).is_some());
        assert!(spawn_graduation_boss(&mut state, 2).is_none());
        let boss = state.entities.iter().find(|e| e.is_boss()).unwrap();
        match &boss.kind {
            EntityKind::Boss(b) => {
                assert_eq!(b.name, "Ping Storm");
                assert_eq!(b.graduation_layer, Some(2));
                // 12 hp tier scaled by the graduation multiplier
                assert_eq!(b.health, 18);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_update_rearms_deadline() {
        let mut state = new_state();
        assert_eq!(update(&mut state), None);
        state.time_ms = state.next_spawn_ms;
        assert!(update(&mut state).is_some());
        assert!(state.next_spawn_ms > state.time_ms);
    }

    proptest! {
        #[test]
        fn prop_zero_weight_never_spawns(seed in any::<u64>(), layer in 1u8..=6) {
            let mut state = RunState::new(seed, 0, "p", Tuning::default());
            for e in state.tuning.enemies.iter_mut() {
                e.spawn_weight = 0;
            }
            for l in state.tuning.layers.iter_mut() {
                l.boss_chance = 0.0;
            }
            let cfg = state.tuning.layer(layer).clone();
            prop_assert_eq!(schedule_next(&mut state, &cfg, 0), SpawnOutcome::NoEligible);
            prop_assert!(state.entities.is_empty());
        }
    }
}
