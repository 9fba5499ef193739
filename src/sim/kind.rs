//! Entity kinds and their data-driven effects
//!
//! Every kind carries a small record (weight, score and lives effect, visual
//! key, fallback colour). Catch resolution reads the record instead of
//! branching on the kind.

use serde::{Deserialize, Serialize};

use crate::renderer::Color;
use crate::settings::{GameConfig, PowerUpSelection};

/// Timed global modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Everything falls slower
    SlowTime,
}

impl EffectKind {
    pub fn label(&self) -> &'static str {
        match self {
            EffectKind::SlowTime => "Slow time",
        }
    }
}

/// Power-up variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    SlowTime,
    ExtraLife,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 2] = [PowerUpKind::SlowTime, PowerUpKind::ExtraLife];
}

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Catch for points, lose a life if it escapes
    Beneficial,
    /// Costs lives when caught, harmless when missed
    Harmful,
    PowerUp(PowerUpKind),
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Beneficial,
        EntityKind::Harmful,
        EntityKind::PowerUp(PowerUpKind::SlowTime),
        EntityKind::PowerUp(PowerUpKind::ExtraLife),
    ];

    /// Position in `ALL`
    pub const fn index(self) -> usize {
        match self {
            EntityKind::Beneficial => 0,
            EntityKind::Harmful => 1,
            EntityKind::PowerUp(PowerUpKind::SlowTime) => 2,
            EntityKind::PowerUp(PowerUpKind::ExtraLife) => 3,
        }
    }
}

/// Score effect for a configured point value (validation bounds it to i64)
fn points(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Effect of catching or missing a kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindSpec {
    pub kind: EntityKind,
    /// Relative weight inside the kind's probability band
    pub weight: f32,
    /// Score change on catch (negative = penalty)
    pub score_effect: i64,
    /// Lives change on catch
    pub lives_effect: i32,
    /// Lives change when it exits the field unstruck
    pub miss_lives_effect: i32,
    /// Timed effect granted on catch
    pub grants_effect: Option<EffectKind>,
    /// Asset key for the visual
    pub visual: &'static str,
    /// Drawn when the visual is not ready
    pub fallback: Color,
}

/// Lookup table from kind to its record, built from a validated config
#[derive(Debug, Clone, Serialize)]
pub struct KindRegistry {
    specs: Vec<KindSpec>,
    selection: PowerUpSelection,
}

impl KindRegistry {
    pub fn from_config(config: &GameConfig) -> Self {
        let specs = EntityKind::ALL
            .iter()
            .map(|&kind| match kind {
                EntityKind::Beneficial => KindSpec {
                    kind,
                    weight: 1.0,
                    score_effect: points(config.beneficial_points),
                    lives_effect: 0,
                    miss_lives_effect: config.miss_life_penalty.saturating_neg(),
                    grants_effect: None,
                    visual: "friend",
                    fallback: Color::GOLD,
                },
                EntityKind::Harmful => KindSpec {
                    kind,
                    weight: 1.0,
                    score_effect: points(config.harmful_score_penalty).saturating_neg(),
                    lives_effect: config.harmful_life_penalty.saturating_neg(),
                    miss_lives_effect: 0,
                    grants_effect: None,
                    visual: "bomb",
                    fallback: Color::DARK_RED,
                },
                EntityKind::PowerUp(PowerUpKind::SlowTime) => KindSpec {
                    kind,
                    weight: config.slow_time_weight,
                    score_effect: 0,
                    lives_effect: 0,
                    miss_lives_effect: 0,
                    grants_effect: Some(EffectKind::SlowTime),
                    visual: "hourglass",
                    fallback: Color::SKY_BLUE,
                },
                EntityKind::PowerUp(PowerUpKind::ExtraLife) => KindSpec {
                    kind,
                    weight: config.extra_life_weight,
                    score_effect: 0,
                    lives_effect: config.extra_life_bonus,
                    miss_lives_effect: 0,
                    grants_effect: None,
                    visual: "heart",
                    fallback: Color::HOT_PINK,
                },
            })
            .collect();

        Self {
            specs,
            selection: config.power_up_selection,
        }
    }

    /// Record for a kind. `specs` is built in `EntityKind::ALL` order.
    pub fn spec(&self, kind: EntityKind) -> &KindSpec {
        &self.specs[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &KindSpec> {
        self.specs.iter()
    }

    /// Pick a power-up variant from a uniform roll in [0, 1)
    pub fn pick_power_up(&self, roll: f32) -> PowerUpKind {
        let variants = PowerUpKind::ALL;
        match self.selection {
            PowerUpSelection::Uniform => {
                let idx = ((roll * variants.len() as f32) as usize).min(variants.len() - 1);
                variants[idx]
            }
            PowerUpSelection::Weighted => {
                let weights: Vec<f32> = variants
                    .iter()
                    .map(|&p| self.spec(EntityKind::PowerUp(p)).weight.max(0.0))
                    .collect();
                let total: f32 = weights.iter().sum();
                let mut target = roll * total;
                for (variant, weight) in variants.iter().zip(&weights) {
                    if *weight > 0.0 && target < *weight {
                        return *variant;
                    }
                    target -= weight;
                }
                // Rounding at roll ~1.0 lands past the last band
                variants
                    .iter()
                    .zip(&weights)
                    .rev()
                    .find(|(_, w)| **w > 0.0)
                    .map(|(v, _)| *v)
                    .unwrap_or(variants[0])
            }
        }
    }
}
