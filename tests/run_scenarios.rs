//! Whole-run scenarios driven through the public API

use glam::Vec2;
use layer_breach::consts::SIM_DT;
use layer_breach::persistence::{KeyValueStore, MemoryStore, PROFILE_KEY};
use layer_breach::sim::{Enemy, EntityKind, RunPhase};
use layer_breach::tuning::EnemyColor;
use layer_breach::{GameEvent, Progression, RunState, TickInput, Tuning, tick};

fn idle() -> TickInput {
    TickInput::default()
}

fn place_enemy(state: &mut RunState, pos: Vec2, health: u32, points: u32) -> u32 {
    state.entities.insert(
        pos,
        Vec2::ZERO,
        14.0,
        EntityKind::Enemy(Enemy {
            color: EnemyColor::Green,
            health,
            points,
            shooter: None,
        }),
    )
}

#[test]
fn game_over_freezes_run_and_submits_once() {
    let mut state = RunState::new(7, 0, "alice", Tuning::default());
    state.score = 640;
    let player = state.player.pos;
    place_enemy(&mut state, player, 3, 10);

    tick(&mut state, &idle(), SIM_DT);
    assert_eq!(state.phase, RunPhase::GameOver);
    assert_eq!(state.final_score, 640);
    assert!(state.entities.iter().all(|e| e.vel == Vec2::ZERO));

    // Further ticks never move anything or change the score
    let frozen: Vec<Vec2> = state.entities.iter().map(|e| e.pos).collect();
    let mut submits = 0;
    for _ in 0..1000 {
        tick(
            &mut state,
            &TickInput {
                fire: true,
                left: true,
                ..Default::default()
            },
            SIM_DT,
        );
        submits += state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::SubmitScore { .. }))
            .count();
    }
    assert_eq!(submits, 1);
    assert_eq!(state.score, 640);
    assert_eq!(
        state.entities.iter().map(|e| e.pos).collect::<Vec<_>>(),
        frozen
    );
    assert_eq!(state.stats.shots_fired, 0);
}

#[test]
fn restart_resets_everything_but_identity() {
    let mut state = RunState::new(7, 2, "bob", Tuning::default());
    for _ in 0..600 {
        tick(
            &mut state,
            &TickInput {
                fire: true,
                ..Default::default()
            },
            SIM_DT,
        );
    }
    state.score = 9000;
    state.combo = 3.5;

    state.restart();

    assert_eq!(state.score, 0);
    assert_eq!(state.combo, 1.0);
    assert_eq!(state.current_layer, 1);
    assert_eq!(state.deepest_layer, 1);
    assert_eq!(state.time_ms, 0.0);
    assert!(state.entities.is_empty());
    assert!(state.events.is_empty());
    assert_eq!(state.phase, RunPhase::Running);
    assert_eq!(state.identity, "bob");
    assert_eq!(state.prestige, 2);
    assert_eq!(state.spawn_delay_ms, state.initial_spawn_delay());
}

#[test]
fn fired_bullet_kills_enemy_and_scores() {
    let mut state = RunState::new(3, 0, "carol", Tuning::default());
    let target = state.player.pos + Vec2::new(200.0, 0.0);
    let id = place_enemy(&mut state, target, 1, 100);

    let fire = TickInput {
        fire: true,
        ..Default::default()
    };
    for _ in 0..60 {
        tick(&mut state, &fire, SIM_DT);
        if state.entities.get(id).is_none() {
            break;
        }
    }

    assert!(state.entities.get(id).is_none());
    assert_eq!(state.score, 100);
    assert!((state.combo - 1.1).abs() < 1e-9);
    assert_eq!(state.stats.shots_hit, 1);
    assert!(state.accuracy() > 0.0);
}

#[test]
fn spawner_populates_the_field() {
    let mut state = RunState::new(99, 0, "dave", Tuning::default());
    // Enemies need ~7s to cross the field, so nothing reaches the player
    for _ in 0..(120 * 5) {
        tick(&mut state, &idle(), SIM_DT);
    }
    assert!(state.entities.hostile_count() > 0);
    assert!(state.spawn_delay_ms < state.tuning.spawn.initial_delay_ms);
}

#[test]
fn same_seed_same_run() {
    let run = |seed| {
        let mut state = RunState::new(seed, 1, "eve", Tuning::default());
        for i in 0..(120 * 20) {
            let input = TickInput {
                fire: true,
                up: i % 240 < 120,
                down: i % 240 >= 120,
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT);
        }
        state.snapshot()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn profile_survives_reopen() {
    let mut state = RunState::new(5, 0, "frank", Tuning::default());
    state.score = 1800;
    let player = state.player.pos;
    place_enemy(&mut state, player, 1, 10);

    let mut progression = Progression::open(MemoryStore::new());
    for _ in 0..400 {
        tick(&mut state, &idle(), SIM_DT);
        for event in state.drain_events() {
            progression.handle_event(&event, 1_700_000_000_000.0);
        }
    }
    let report = progression.record_run_result(&state.summary());
    assert_eq!(report.previous_best, 0);

    let store = progression.into_store();
    let raw = store.get(PROFILE_KEY).unwrap().expect("profile written");
    assert!(raw.contains("\"version\":1"));

    let reopened = Progression::open(store);
    let profile = reopened.profile();
    assert_eq!(profile.lifetime.runs, 1);
    assert_eq!(profile.lifetime.best_score, 1800);
    assert_eq!(profile.leaderboard.top_score(), Some(1800));
    assert_eq!(profile.leaderboard.entries[0].identity, "frank");
}
