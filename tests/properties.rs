//! Property tests for scoring, difficulty, input mapping and spawning.
//!
//! These tests use `proptest` to generate random catch sequences, display
//! rectangles and seeds and check the invariants the gameplay relies on.

use drop_catch::consts::REFERENCE_FRAME_SECS;
use drop_catch::platform::AssetTracker;
use drop_catch::sim::{
    DisplayRect, Entity, EntityKind, GamePhase, PointerEvent, PowerUpKind, level_for_score,
    schedule, tick, to_sim_coords,
};
use drop_catch::{GameConfig, GameState};
use glam::Vec2;
use proptest::prelude::*;

fn started(config: GameConfig) -> GameState {
    let mut state = GameState::new(config).expect("valid config");
    let assets: AssetTracker<()> = AssetTracker::new(Vec::<String>::new());
    state.start(&assets).expect("assets ready");
    state
}

fn kind_strategy() -> impl Strategy<Value = EntityKind> {
    prop_oneof![
        4 => Just(EntityKind::Beneficial),
        2 => Just(EntityKind::Harmful),
        1 => Just(EntityKind::PowerUp(PowerUpKind::SlowTime)),
        1 => Just(EntityKind::PowerUp(PowerUpKind::ExtraLife)),
    ]
}

fn falling(id: u32, kind: EntityKind, y: f32, base_speed: f32) -> Entity {
    Entity {
        id,
        kind,
        pos: Vec2::new(0.0, y),
        size: 50.0,
        base_speed,
        struck: false,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn score_monotone_and_level_follows_score(
        kinds in prop::collection::vec(kind_strategy(), 1..80),
        threshold in 10u64..200,
    ) {
        let mut state = started(GameConfig {
            initial_lives: 1_000,
            level_up_threshold: threshold,
            seed: Some(1),
            ..Default::default()
        });

        let mut previous = 0;
        for (i, kind) in kinds.into_iter().enumerate() {
            state.insert_entity(falling(i as u32 + 1, kind, 100.0, 1.0));
            let caught = state.handle_sim_point(Vec2::new(25.0, 125.0));
            prop_assert!(caught.is_some());

            let score = state.score().score;
            prop_assert!(score >= previous);
            prop_assert_eq!(state.score().level, level_for_score(score, threshold));
            prop_assert_eq!(state.score().level as u64, score / threshold + 1);
            previous = score;
        }
        prop_assert!(state.entities().is_empty());
    }

    #[test]
    fn schedule_is_monotone_in_progress(
        level in 1u32..500,
        extra_levels in 0u32..500,
        score in 0u64..50_000,
        extra_score in 0u64..50_000,
    ) {
        let config = GameConfig::default();
        let early = schedule(level, score, &config);
        let late = schedule(level + extra_levels, score + extra_score, &config);

        prop_assert!(late.spawn_interval_ms <= early.spawn_interval_ms);
        prop_assert!(late.spawn_interval_ms >= config.min_spawn_interval_ms);
        prop_assert!(late.kind_thresholds.harmful >= early.kind_thresholds.harmful);
        prop_assert!(late.kind_thresholds.harmful <= config.harmful_chance_cap);
        prop_assert!(late.speed_multiplier >= early.speed_multiplier);
    }

    #[test]
    fn pointer_maps_linearly_into_field(
        left in -500.0f32..500.0,
        top in -500.0f32..500.0,
        width in 50.0f32..2000.0,
        height in 50.0f32..2000.0,
        fx in 0.0f32..=1.0,
        fy in 0.0f32..=1.0,
    ) {
        let rect = DisplayRect { left, top, width, height };
        let pointer = PointerEvent::new(left + fx * width, top + fy * height);
        let p = to_sim_coords(pointer, rect, 400.0, 600.0).expect("rect has area");

        prop_assert!((p.x - fx * 400.0).abs() < 0.05);
        prop_assert!((p.y - fy * 600.0).abs() < 0.05);
    }

    #[test]
    fn spawns_stay_inside_field_width(seed in any::<u64>(), ticks in 1usize..400) {
        let mut state = started(GameConfig {
            seed: Some(seed),
            initial_lives: 1_000,
            ..Default::default()
        });
        for _ in 0..ticks {
            tick(&mut state, 0.05);
            for e in state.entities() {
                prop_assert!(e.pos.x >= 0.0);
                prop_assert!(e.pos.x + e.size <= 400.0 + 1e-3);
                prop_assert!(e.base_speed >= 1.0);
                prop_assert!(!e.struck);
            }
        }
    }

    #[test]
    fn misses_stop_at_zero_lives(lives in 1i32..10, exiting in 1usize..20) {
        let mut state = started(GameConfig {
            initial_lives: lives,
            seed: Some(9),
            ..Default::default()
        });
        for i in 0..exiting {
            state.insert_entity(falling(i as u32 + 1, EntityKind::Beneficial, 599.0, 3.0));
        }

        tick(&mut state, REFERENCE_FRAME_SECS);

        let counted = (lives as usize).min(exiting);
        prop_assert_eq!(state.score().lives, lives - counted as i32);
        prop_assert_eq!(state.entities().len(), exiting - counted);
        prop_assert_eq!(state.phase() == GamePhase::Ended, exiting >= lives as usize);
    }
}
