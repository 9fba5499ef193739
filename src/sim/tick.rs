//! Per-frame simulation update
//!
//! Advances the session by the measured elapsed time of one host frame.

use super::state::{GameEvent, GameState};

/// Advance the session by `dt` seconds of wall time.
///
/// Order: decay timed effects, move entities (newest first) and resolve
/// boundary exits, age feedback markers, fire due spawns. The tick stops at
/// the first miss that ends the session.
pub fn tick(state: &mut GameState, dt: f32) {
    // Ticks after end (or before start) are ignored
    if !state.is_running() {
        return;
    }
    let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

    // Timed effects run on wall time, not tick count
    for effect in state.score.effects.decay(dt) {
        log::debug!("{:?} expired", effect);
        state.events.push(GameEvent::EffectExpired { effect });
    }
    let speed_factor = state.speed_factor();
    let field_height = state.config.field_height;

    // Walk backwards so removals never skip an element
    for i in (0..state.entities.len()).rev() {
        let entity = &mut state.entities[i];
        if entity.struck {
            state.entities.remove(i);
            continue;
        }
        entity.advance(dt, speed_factor);

        if entity.has_exited(field_height) {
            let exited = state.entities.remove(i);
            state.resolve_miss(&exited);
            if !state.is_running() {
                return;
            }
        }
    }

    for marker in state.feedback.iter_mut() {
        marker.remaining -= dt;
        marker.pos.y -= 30.0 * dt; // Drift upward
    }
    state.feedback.retain(|m| m.remaining > 0.0);

    let due = state.spawner.advance(dt);
    for _ in 0..due {
        state.spawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::REFERENCE_FRAME_SECS;
    use crate::platform::AssetTracker;
    use crate::settings::GameConfig;
    use crate::sim::entity::Entity;
    use crate::sim::kind::{EffectKind, EntityKind};
    use crate::sim::state::GamePhase;
    use glam::Vec2;

    fn started(config: GameConfig) -> GameState {
        let mut state = GameState::new(GameConfig {
            seed: Some(12345),
            ..config
        })
        .unwrap();
        let assets: AssetTracker<()> = AssetTracker::new(Vec::<String>::new());
        state.start(&assets).unwrap();
        state.drain_events();
        state
    }

    fn entity(id: u32, kind: EntityKind, y: f32, speed: f32) -> Entity {
        Entity {
            id,
            kind,
            pos: Vec2::new(0.0, y),
            size: 50.0,
            base_speed: speed,
            struck: false,
        }
    }

    #[test]
    fn test_tick_moves_entities() {
        let mut state = started(GameConfig::default());
        state.insert_entity(entity(1, EntityKind::Beneficial, 0.0, 2.0));
        tick(&mut state, REFERENCE_FRAME_SECS);
        assert!((state.entities()[0].pos.y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_tick_spawns_on_schedule() {
        let mut state = started(GameConfig::default());
        tick(&mut state, 0.5);
        assert!(state.entities().is_empty());
        tick(&mut state, 0.5);
        assert_eq!(state.entities().len(), 1);
        assert_eq!(state.entities()[0].pos.y, -50.0);
    }

    #[test]
    fn test_missed_harmful_is_harmless() {
        let mut state = started(GameConfig::default());
        state.insert_entity(entity(1, EntityKind::Harmful, 600.0, 10.0));
        tick(&mut state, REFERENCE_FRAME_SECS);
        assert!(state.entities().is_empty());
        assert_eq!(state.score().lives, 3);
    }

    #[test]
    fn test_short_circuit_on_last_life() {
        let mut state = started(GameConfig::default());
        state.score.lives = 1;
        // Both exit this tick; only the first processed (newest) may count
        state.insert_entity(entity(1, EntityKind::Beneficial, 600.0, 10.0));
        state.insert_entity(entity(2, EntityKind::Beneficial, 600.0, 10.0));

        tick(&mut state, REFERENCE_FRAME_SECS);
        assert_eq!(state.phase(), GamePhase::Ended);
        assert_eq!(state.score().lives, 0);
        assert_eq!(state.entities().len(), 1);
        assert_eq!(state.entities()[0].id, 1);

        // Further ticks are ignored
        tick(&mut state, 10.0);
        assert_eq!(state.score().lives, 0);
        assert_eq!(state.entities().len(), 1);
    }

    #[test]
    fn test_effect_expires_after_wall_time() {
        let mut state = started(GameConfig {
            slow_time_duration_ms: 1000,
            ..Default::default()
        });
        state.score.effects.extend(EffectKind::SlowTime, 1.0, 3.0);

        tick(&mut state, 0.25);
        tick(&mut state, 0.5);
        assert!(state.score().effects.is_active(EffectKind::SlowTime));
        tick(&mut state, 0.3);
        assert!(!state.score().effects.is_active(EffectKind::SlowTime));
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::EffectExpired {
                    effect: EffectKind::SlowTime
                })
        );
    }

    #[test]
    fn test_feedback_markers_fade() {
        let mut state = started(GameConfig {
            feedback_lifetime_ms: 500,
            ..Default::default()
        });
        state.insert_entity(entity(1, EntityKind::Beneficial, 100.0, 1.0));
        state.resolve_catch(0);
        assert_eq!(state.feedback().len(), 1);

        tick(&mut state, 0.3);
        assert_eq!(state.feedback().len(), 1);
        assert!(state.feedback()[0].alpha() < 0.5);
        tick(&mut state, 0.3);
        assert!(state.feedback().is_empty());
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut state = started(GameConfig::default());
        state.insert_entity(entity(1, EntityKind::Beneficial, 10.0, 2.0));
        tick(&mut state, f32::NAN);
        tick(&mut state, -1.0);
        assert_eq!(state.entities()[0].pos.y, 10.0);
    }
}
