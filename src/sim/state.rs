//! Session state and its scoring transitions
//!
//! Score and lives change only inside `resolve_catch` and `resolve_miss`.
//! Level is recomputed from score after every change, never patched.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::{DifficultySchedule, SpawnTimer, level_for_score, schedule};
use super::entity::{Entity, SpawnBounds, spawn_entity};
use super::kind::{EffectKind, EntityKind, KindRegistry};
use crate::error::ConfigError;
use crate::renderer::Color;
use crate::settings::GameConfig;
use crate::{ms_to_secs, secs_to_ms};

/// Coarse session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Waiting for the first start
    #[default]
    Idle,
    /// Ticks and taps are processed
    Running,
    /// Lives ran out or the host ended the session
    Ended,
}

/// Remaining wall time per active effect (seconds)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    remaining: BTreeMap<EffectKind, f32>,
}

impl ActiveEffects {
    pub fn is_active(&self, effect: EffectKind) -> bool {
        self.remaining.contains_key(&effect)
    }

    pub fn remaining(&self, effect: EffectKind) -> Option<f32> {
        self.remaining.get(&effect).copied()
    }

    /// Activate, or extend an active effect, up to `cap` seconds
    pub fn extend(&mut self, effect: EffectKind, duration: f32, cap: f32) -> f32 {
        let slot = self.remaining.entry(effect).or_insert(0.0);
        *slot = (*slot + duration).min(cap);
        *slot
    }

    /// Subtract elapsed wall time and return the effects that ran out
    pub fn decay(&mut self, dt: f32) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        self.remaining.retain(|effect, left| {
            *left -= dt;
            if *left <= 0.0 {
                expired.push(*effect);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Longest-running effect, for the HUD
    pub fn label(&self) -> Option<String> {
        self.remaining
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(effect, left)| format!("{} ({:.1}s)", effect.label(), left))
    }
}

/// Score, lives and level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub score: u64,
    pub lives: i32,
    pub level: u32,
    pub effects: ActiveEffects,
}

impl ScoreState {
    pub fn new(initial_lives: i32) -> Self {
        Self {
            score: 0,
            lives: initial_lives,
            level: 1,
            effects: ActiveEffects::default(),
        }
    }

    #[inline]
    pub fn is_out_of_lives(&self) -> bool {
        self.lives <= 0
    }
}

/// Floating "+10" style text left where something was caught or missed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackMarker {
    pub pos: Vec2,
    pub text: String,
    pub color: Color,
    /// Seconds left on screen
    pub remaining: f32,
    pub lifetime: f32,
}

impl FeedbackMarker {
    /// 1.0 when fresh, 0.0 when about to disappear
    pub fn alpha(&self) -> f32 {
        if self.lifetime <= 0.0 {
            0.0
        } else {
            (self.remaining / self.lifetime).clamp(0.0, 1.0)
        }
    }
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted,
    ScoreChanged { score: u64, lives: i32, level: u32 },
    LevelChanged { from: u32, to: u32 },
    SpawnScheduleRearmed { interval_ms: u32 },
    Caught { id: u32, kind: EntityKind },
    Missed { id: u32 },
    EffectActivated { effect: EffectKind, remaining_ms: u32 },
    EffectExpired { effect: EffectKind },
    SessionEnded { final_score: u64 },
}

/// Read-only view for HUD rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub score: u64,
    pub lives: i32,
    pub level: u32,
    pub active_effect_label: Option<String>,
    pub phase: GamePhase,
}

/// One play-through: configuration, live entities, scoring and schedules.
///
/// Every transition appends to an event queue that is only emptied by
/// `drain_events`. Hosts are expected to drain it once per frame; the queue is
/// also cleared when a new session starts.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) registry: KindRegistry,
    pub(crate) bounds: SpawnBounds,
    pub(crate) phase: GamePhase,
    pub(crate) score: ScoreState,
    /// Live entities in spawn order (oldest first)
    pub(crate) entities: Vec<Entity>,
    pub(crate) feedback: Vec<FeedbackMarker>,
    pub(crate) difficulty: DifficultySchedule,
    pub(crate) spawner: SpawnTimer,
    pub(crate) events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Build an idle session. The configuration is validated here so nothing
    /// invalid reaches a tick.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);

        Ok(Self {
            registry: KindRegistry::from_config(&config),
            bounds: SpawnBounds {
                field_width: config.field_width,
                size: config.entity_size,
                min_speed: config.min_fall_speed,
                max_speed: config.max_fall_speed,
            },
            phase: GamePhase::Idle,
            score: ScoreState::new(config.initial_lives),
            entities: Vec::new(),
            feedback: Vec::new(),
            difficulty: schedule(1, 0, &config),
            spawner: SpawnTimer::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            config,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &KindRegistry {
        &self.registry
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn feedback(&self) -> &[FeedbackMarker] {
        &self.feedback
    }

    pub fn difficulty(&self) -> &DifficultySchedule {
        &self.difficulty
    }

    pub fn spawner(&self) -> &SpawnTimer {
        &self.spawner
    }

    /// Take all pending notifications. Call once per frame; undrained events
    /// accumulate until the next `start`.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.score.score,
            lives: self.score.lives,
            level: self.score.level,
            active_effect_label: self.score.effects.label(),
            phase: self.phase,
        }
    }

    /// Speed multiplier from active global effects
    pub fn speed_factor(&self) -> f32 {
        if self.score.effects.is_active(EffectKind::SlowTime) {
            self.config.slow_factor
        } else {
            1.0
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Roll a kind against the current schedule and spawn it above the field
    pub fn spawn(&mut self) -> u32 {
        let roll: f32 = self.rng.random();
        let band = self.difficulty.kind_thresholds.classify(roll);
        let kind = match band.plain_kind() {
            Some(kind) => kind,
            None => {
                let sub_roll: f32 = self.rng.random();
                EntityKind::PowerUp(self.registry.pick_power_up(sub_roll))
            }
        };
        self.spawn_kind(kind)
    }

    /// Spawn a specific kind above the field
    pub fn spawn_kind(&mut self, kind: EntityKind) -> u32 {
        let id = self.next_entity_id();
        let entity = spawn_entity(id, kind, &self.bounds, &self.difficulty, &mut self.rng);
        log::debug!(
            "Spawned {:?} #{} at x={:.1} speed={:.2}",
            kind,
            id,
            entity.pos.x,
            entity.base_speed
        );
        self.entities.push(entity);
        id
    }

    /// Put an entity directly into the live set (scripted scenarios, replays)
    pub fn insert_entity(&mut self, entity: Entity) {
        self.next_id = self.next_id.max(entity.id.wrapping_add(1));
        self.entities.push(entity);
    }

    /// Apply the catch of the entity at `index`: mark it struck, remove it,
    /// then apply its kind's effects. Returns the removed entity.
    pub(crate) fn resolve_catch(&mut self, index: usize) -> Option<Entity> {
        if self.phase != GamePhase::Running {
            return None;
        }
        let entity = self.entities.get_mut(index)?;
        if entity.struck {
            return None;
        }
        entity.struck = true;
        let entity = self.entities.remove(index);

        let spec = self.registry.spec(entity.kind).clone();

        let score = if spec.score_effect >= 0 {
            self.score.score.saturating_add(spec.score_effect as u64)
        } else {
            self.score.score.saturating_sub(spec.score_effect.unsigned_abs())
        };
        let score_delta = score as i64 - self.score.score as i64;
        self.score.score = score;
        self.score.lives = self.score.lives.saturating_add(spec.lives_effect);

        if let Some(effect) = spec.grants_effect {
            let remaining = self.score.effects.extend(
                effect,
                ms_to_secs(self.config.slow_time_duration_ms),
                ms_to_secs(self.config.max_slow_time_ms),
            );
            self.events.push(GameEvent::EffectActivated {
                effect,
                remaining_ms: secs_to_ms(remaining),
            });
        }

        let text = match (score_delta, spec.lives_effect, spec.grants_effect) {
            (d, _, _) if d > 0 => format!("+{d}"),
            (d, l, _) if d < 0 && l < 0 => format!("{d} / {l} \u{2665}"),
            (_, l, _) if l < 0 => format!("{l} \u{2665}"),
            (_, l, _) if l > 0 => format!("+{l} \u{2665}"),
            (_, _, Some(effect)) => effect.label().to_string(),
            _ => String::new(),
        };
        self.push_feedback(entity.center(), text, spec.fallback);

        self.events.push(GameEvent::Caught {
            id: entity.id,
            kind: entity.kind,
        });
        self.after_score_change();
        Some(entity)
    }

    /// Apply the boundary exit of an unstruck entity
    pub(crate) fn resolve_miss(&mut self, entity: &Entity) {
        if entity.struck {
            return;
        }
        let penalty = self.registry.spec(entity.kind).miss_lives_effect;
        if penalty == 0 {
            return;
        }
        self.score.lives = self.score.lives.saturating_add(penalty);

        let anchor = Vec2::new(entity.center().x, self.config.field_height - 20.0);
        self.push_feedback(anchor, format!("{penalty} \u{2665}"), Color::RED);
        self.events.push(GameEvent::Missed { id: entity.id });
        self.after_score_change();
    }

    /// Recompute level and schedule, notify, and end the session on zero lives
    fn after_score_change(&mut self) {
        let previous = self.score.level;
        let level = level_for_score(self.score.score, self.config.level_up_threshold);
        self.score.level = level;
        self.difficulty = schedule(level, self.score.score, &self.config);

        self.events.push(GameEvent::ScoreChanged {
            score: self.score.score,
            lives: self.score.lives,
            level,
        });

        if level != previous {
            log::info!(
                "Level {} -> {} at score {}, spawn interval {} ms",
                previous,
                level,
                self.score.score,
                self.difficulty.spawn_interval_ms
            );
            self.events.push(GameEvent::LevelChanged {
                from: previous,
                to: level,
            });
            self.spawner.rearm(self.difficulty.spawn_interval_ms);
            self.events.push(GameEvent::SpawnScheduleRearmed {
                interval_ms: self.difficulty.spawn_interval_ms,
            });
        }

        if self.score.is_out_of_lives() {
            self.end();
        }
    }

    fn push_feedback(&mut self, pos: Vec2, text: String, color: Color) {
        if text.is_empty() || self.config.feedback_lifetime_ms == 0 {
            return;
        }
        let lifetime = ms_to_secs(self.config.feedback_lifetime_ms);
        self.feedback.push(FeedbackMarker {
            pos,
            text,
            color,
            remaining: lifetime,
            lifetime,
        });
    }

    /// Reset everything a new session starts from
    pub(crate) fn reset(&mut self) {
        self.score = ScoreState::new(self.config.initial_lives);
        self.entities.clear();
        self.feedback.clear();
        self.events.clear();
        self.difficulty = schedule(1, 0, &self.config);
        self.spawner = SpawnTimer::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::kind::PowerUpKind;

    fn running_state(config: GameConfig) -> GameState {
        let mut state = GameState::new(GameConfig {
            seed: Some(42),
            ..config
        })
        .unwrap();
        state.phase = GamePhase::Running;
        state.spawner.arm(state.difficulty.spawn_interval_ms);
        state
    }

    fn entity_at(id: u32, kind: EntityKind, y: f32) -> Entity {
        Entity {
            id,
            kind,
            pos: Vec2::new(0.0, y),
            size: 50.0,
            base_speed: 2.0,
            struck: false,
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = GameConfig {
            field_width: 0.0,
            ..Default::default()
        };
        assert!(GameState::new(config).is_err());
    }

    #[test]
    fn test_effects_decay_by_wall_time() {
        let mut effects = ActiveEffects::default();
        effects.extend(EffectKind::SlowTime, 1.0, 3.0);
        assert!(effects.decay(0.4).is_empty());
        assert!(effects.decay(0.4).is_empty());
        assert_eq!(effects.decay(0.3), vec![EffectKind::SlowTime]);
        assert!(!effects.is_active(EffectKind::SlowTime));
    }

    #[test]
    fn test_effects_extend_is_capped() {
        let mut effects = ActiveEffects::default();
        effects.extend(EffectKind::SlowTime, 5.0, 12.0);
        effects.extend(EffectKind::SlowTime, 5.0, 12.0);
        let total = effects.extend(EffectKind::SlowTime, 5.0, 12.0);
        assert_eq!(total, 12.0);
        assert!(effects.label().unwrap().starts_with("Slow time"));
    }

    #[test]
    fn test_beneficial_catch_scores() {
        let mut state = running_state(GameConfig::default());
        state.insert_entity(entity_at(1, EntityKind::Beneficial, 100.0));

        let caught = state.resolve_catch(0).unwrap();
        assert!(caught.struck);
        assert!(state.entities.is_empty());
        assert_eq!(state.score.score, 10);
        assert_eq!(state.score.lives, 3);
        assert_eq!(state.feedback.len(), 1);
        assert_eq!(state.feedback[0].text, "+10");

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ScoreChanged {
            score: 10,
            lives: 3,
            level: 1
        }));
    }

    #[test]
    fn test_largest_point_value_still_raises_score() {
        let mut state = running_state(GameConfig {
            beneficial_points: crate::consts::MAX_POINTS,
            ..Default::default()
        });
        state.insert_entity(entity_at(1, EntityKind::Beneficial, 100.0));
        state.insert_entity(entity_at(2, EntityKind::Beneficial, 100.0));

        state.resolve_catch(1);
        assert_eq!(state.score.score, crate::consts::MAX_POINTS);
        state.resolve_catch(0);
        assert!(state.score.score >= crate::consts::MAX_POINTS);
    }

    #[test]
    fn test_harmful_catch_with_score_penalty_floors_at_zero() {
        let mut state = running_state(GameConfig {
            harmful_score_penalty: 25,
            ..Default::default()
        });
        state.score.score = 10;
        state.insert_entity(entity_at(1, EntityKind::Harmful, 100.0));

        state.resolve_catch(0);
        assert_eq!(state.score.score, 0);
        assert_eq!(state.score.lives, 2);
    }

    #[test]
    fn test_power_ups() {
        let mut state = running_state(GameConfig::default());
        state.insert_entity(entity_at(1, EntityKind::PowerUp(PowerUpKind::SlowTime), 0.0));
        state.insert_entity(entity_at(2, EntityKind::PowerUp(PowerUpKind::ExtraLife), 0.0));

        state.resolve_catch(0);
        assert!(state.score.effects.is_active(EffectKind::SlowTime));
        assert_eq!(state.speed_factor(), 0.5);

        state.resolve_catch(0);
        assert_eq!(state.score.lives, 4);
        assert_eq!(state.score.score, 0);
    }

    #[test]
    fn test_catch_ignored_when_not_running() {
        let mut state = GameState::new(GameConfig::default()).unwrap();
        state.insert_entity(entity_at(1, EntityKind::Beneficial, 0.0));
        assert!(state.resolve_catch(0).is_none());
        assert_eq!(state.score.score, 0);
        assert_eq!(state.entities.len(), 1);
    }

    #[test]
    fn test_miss_only_counts_beneficial() {
        let mut state = running_state(GameConfig::default());
        state.resolve_miss(&entity_at(1, EntityKind::Harmful, 700.0));
        assert_eq!(state.score.lives, 3);

        state.resolve_miss(&entity_at(2, EntityKind::Beneficial, 700.0));
        assert_eq!(state.score.lives, 2);

        let mut struck = entity_at(3, EntityKind::Beneficial, 700.0);
        struck.struck = true;
        state.resolve_miss(&struck);
        assert_eq!(state.score.lives, 2);
    }

    #[test]
    fn test_level_up_rearms_once() {
        let mut state = running_state(GameConfig {
            level_up_threshold: 100,
            ..Default::default()
        });
        state.score.score = 90;
        state.insert_entity(entity_at(1, EntityKind::Beneficial, 0.0));

        state.resolve_catch(0);
        assert_eq!(state.score.level, 2);
        assert_eq!(state.spawner.rearm_count(), 1);
        let rearms = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::SpawnScheduleRearmed { .. }))
            .count();
        assert_eq!(rearms, 1);
    }

    #[test]
    fn test_spawn_uses_schedule() {
        let mut state = running_state(GameConfig {
            harmful_chance: 1.0,
            harmful_chance_cap: 1.0,
            power_up_chance: 0.0,
            ..Default::default()
        });
        for _ in 0..20 {
            state.spawn();
        }
        assert!(state.entities.iter().all(|e| e.kind == EntityKind::Harmful));
        let ids: Vec<u32> = state.entities.iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids.len(), sorted.len());
    }

    #[test]
    fn test_snapshot() {
        let state = running_state(GameConfig::default());
        let snapshot = state.snapshot();
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.lives, 3);
        assert_eq!(snapshot.level, 1);
        assert_eq!(snapshot.active_effect_label, None);
        assert_eq!(snapshot.phase, GamePhase::Running);
    }
}
