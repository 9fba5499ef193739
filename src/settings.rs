//! Game configuration and presets
//!
//! Every tunable lives here so hosts can load a JSON document instead of
//! recompiling. Values are validated once, before a session is built.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// How a caught power-up picks its effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpSelection {
    /// 50/50 between the available effects
    #[default]
    Uniform,
    /// Proportional to the configured weights
    Weighted,
}

/// Named configurations matching the game's known variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Three lives, no score penalty
    #[default]
    Classic,
    /// Thirty lives, no power-ups
    Marathon,
    /// Bombs hurt twice and cost points, weighted power-ups
    Frantic,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Classic => "Classic",
            Preset::Marathon => "Marathon",
            Preset::Frantic => "Frantic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Preset::Classic),
            "marathon" | "long" => Some(Preset::Marathon),
            "frantic" | "hard" => Some(Preset::Frantic),
            _ => None,
        }
    }

    /// Configuration for this preset
    pub fn config(&self) -> GameConfig {
        let mut config = GameConfig::default();
        config.apply_preset(*self);
        config
    }
}

/// Full game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Session ===
    /// Lives at session start
    pub initial_lives: i32,
    /// Fixed RNG seed (None = host picks one)
    pub seed: Option<u64>,

    // === Field ===
    pub field_width: f32,
    pub field_height: f32,
    /// Edge of the square bounding box of every entity
    pub entity_size: f32,

    // === Motion ===
    /// Fall speed range at difficulty 1 (pixels per reference frame)
    pub min_fall_speed: f32,
    pub max_fall_speed: f32,
    /// Speed multiplier gained per point of score
    pub speed_growth_per_point: f32,

    // === Spawning ===
    pub spawn_interval_ms: u32,
    /// Interval reduction per level above 1
    pub spawn_interval_step_ms: u32,
    pub min_spawn_interval_ms: u32,

    // === Kind probabilities ===
    pub harmful_chance: f32,
    /// Added to the harmful chance per level above 1
    pub harmful_chance_growth: f32,
    pub harmful_chance_cap: f32,
    pub power_up_chance: f32,

    // === Power-ups ===
    pub power_up_selection: PowerUpSelection,
    pub slow_time_weight: f32,
    pub extra_life_weight: f32,
    pub slow_time_duration_ms: u32,
    /// Cap on stacked slow-time
    pub max_slow_time_ms: u32,
    /// Speed multiplier while slow-time is active
    pub slow_factor: f32,
    pub extra_life_bonus: i32,

    // === Scoring ===
    pub level_up_threshold: u64,
    pub beneficial_points: u64,
    pub harmful_life_penalty: i32,
    /// Points removed by a harmful catch (score floors at 0)
    pub harmful_score_penalty: u64,
    pub miss_life_penalty: i32,

    // === Feedback ===
    /// How long "+10" style markers stay on screen
    pub feedback_lifetime_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_lives: 3,
            seed: None,

            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            entity_size: ENTITY_SIZE,

            min_fall_speed: MIN_FALL_SPEED,
            max_fall_speed: MAX_FALL_SPEED,
            speed_growth_per_point: 1.0 / 200.0,

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            spawn_interval_step_ms: SPAWN_INTERVAL_STEP_MS,
            min_spawn_interval_ms: MIN_SPAWN_INTERVAL_MS,

            harmful_chance: 0.2,
            harmful_chance_growth: 0.1,
            harmful_chance_cap: 0.5,
            power_up_chance: 0.05,

            power_up_selection: PowerUpSelection::Uniform,
            slow_time_weight: 3.0,
            extra_life_weight: 1.0,
            slow_time_duration_ms: 5000,
            max_slow_time_ms: 15000,
            slow_factor: 0.5,
            extra_life_bonus: 1,

            level_up_threshold: LEVEL_UP_THRESHOLD,
            beneficial_points: 10,
            harmful_life_penalty: 1,
            harmful_score_penalty: 0,
            miss_life_penalty: 1,

            feedback_lifetime_ms: 600,
        }
    }
}

impl GameConfig {
    /// Apply a preset on top of the current values
    pub fn apply_preset(&mut self, preset: Preset) {
        match preset {
            Preset::Classic => {
                self.initial_lives = 3;
                self.harmful_score_penalty = 0;
                self.harmful_life_penalty = 1;
                self.power_up_selection = PowerUpSelection::Uniform;
            }
            Preset::Marathon => {
                self.initial_lives = 30;
                self.power_up_chance = 0.0;
                self.harmful_score_penalty = 0;
                self.harmful_life_penalty = 1;
            }
            Preset::Frantic => {
                self.initial_lives = 3;
                self.harmful_life_penalty = 2;
                self.harmful_score_penalty = 20;
                self.power_up_chance = 0.1;
                self.power_up_selection = PowerUpSelection::Weighted;
                self.min_spawn_interval_ms = 200;
                self.spawn_interval_step_ms = 50;
            }
        }
    }

    /// Parse a (possibly partial) JSON document and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded configuration: {} lives, field {}x{}",
            config.initial_lives,
            config.field_width,
            config.field_height
        );
        Ok(config)
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if !positive(self.field_width) || !positive(self.field_height) {
            return Err(ConfigError::FieldSize {
                width: self.field_width,
                height: self.field_height,
            });
        }
        if !positive(self.entity_size) || self.entity_size > self.field_width {
            return Err(ConfigError::EntitySize {
                size: self.entity_size,
                width: self.field_width,
            });
        }
        if !self.min_fall_speed.is_finite()
            || !self.max_fall_speed.is_finite()
            || self.min_fall_speed < 0.0
            || self.max_fall_speed < self.min_fall_speed
            || !self.speed_growth_per_point.is_finite()
            || self.speed_growth_per_point < 0.0
        {
            return Err(ConfigError::FallSpeed {
                min: self.min_fall_speed,
                max: self.max_fall_speed,
            });
        }
        if self.spawn_interval_ms == 0 || self.min_spawn_interval_ms == 0 {
            return Err(ConfigError::SpawnInterval {
                base_ms: self.spawn_interval_ms,
                min_ms: self.min_spawn_interval_ms,
            });
        }
        if self.min_spawn_interval_ms > self.spawn_interval_ms {
            return Err(ConfigError::SpawnFloor {
                base_ms: self.spawn_interval_ms,
                min_ms: self.min_spawn_interval_ms,
            });
        }

        for (name, value) in [
            ("harmful_chance", self.harmful_chance),
            ("harmful_chance_growth", self.harmful_chance_growth),
            ("harmful_chance_cap", self.harmful_chance_cap),
            ("power_up_chance", self.power_up_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }
        let harmful_peak = self.harmful_chance.max(self.harmful_chance_cap);
        if harmful_peak + self.power_up_chance > 1.0 {
            return Err(ConfigError::ProbabilitySum {
                harmful: harmful_peak,
                power_up: self.power_up_chance,
            });
        }

        if self.level_up_threshold == 0 {
            return Err(ConfigError::LevelThreshold);
        }
        if !(self.slow_factor > 0.0 && self.slow_factor <= 1.0) {
            return Err(ConfigError::SlowFactor(self.slow_factor));
        }
        if self.slow_time_duration_ms == 0 || self.slow_time_duration_ms > self.max_slow_time_ms {
            return Err(ConfigError::SlowDuration {
                duration_ms: self.slow_time_duration_ms,
                max_ms: self.max_slow_time_ms,
            });
        }
        if self.initial_lives <= 0 {
            return Err(ConfigError::Lives(self.initial_lives));
        }
        for (name, value) in [
            ("harmful_life_penalty", self.harmful_life_penalty),
            ("miss_life_penalty", self.miss_life_penalty),
            ("extra_life_bonus", self.extra_life_bonus),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeLives { name, value });
            }
        }
        for (name, value) in [
            ("beneficial_points", self.beneficial_points),
            ("harmful_score_penalty", self.harmful_score_penalty),
        ] {
            if value > MAX_POINTS {
                return Err(ConfigError::Points {
                    name,
                    value,
                    max: MAX_POINTS,
                });
            }
        }
        if self.power_up_selection == PowerUpSelection::Weighted {
            let weights = [self.slow_time_weight, self.extra_life_weight];
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0)
                || weights.iter().all(|w| *w <= 0.0)
            {
                return Err(ConfigError::PowerUpWeights);
            }
        }

        Ok(())
    }
}
