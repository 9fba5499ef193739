//! Difficulty curve and the spawn timer
//!
//! The schedule is a pure function of level and score. The spawn timer is the
//! single owner of spawn cadence: rearming replaces the old countdown in one
//! call, so two spawn streams can never run side by side.

use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use crate::consts::MAX_SPAWNS_PER_TICK;
use crate::settings::GameConfig;
use crate::{ms_to_secs, secs_to_ms};

/// Cumulative probability bands for the kind roll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KindThresholds {
    /// roll < harmful => Harmful
    pub harmful: f32,
    /// harmful <= roll < harmful + power_up => PowerUp
    pub power_up: f32,
}

impl KindThresholds {
    /// Map a uniform roll in [0, 1) to a kind band. Power-up variants are
    /// picked separately.
    pub fn classify(&self, roll: f32) -> KindBand {
        if roll < self.harmful {
            KindBand::Harmful
        } else if roll < self.harmful + self.power_up {
            KindBand::PowerUp
        } else {
            KindBand::Beneficial
        }
    }
}

/// Result of the first-stage kind roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindBand {
    Beneficial,
    Harmful,
    PowerUp,
}

impl KindBand {
    /// Concrete kind for the non-power-up bands
    pub fn plain_kind(&self) -> Option<EntityKind> {
        match self {
            KindBand::Beneficial => Some(EntityKind::Beneficial),
            KindBand::Harmful => Some(EntityKind::Harmful),
            KindBand::PowerUp => None,
        }
    }
}

/// Derived spawn parameters for the current progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultySchedule {
    pub spawn_interval_ms: u32,
    pub kind_thresholds: KindThresholds,
    pub speed_multiplier: f32,
}

impl Default for DifficultySchedule {
    fn default() -> Self {
        schedule(1, 0, &GameConfig::default())
    }
}

/// Level for a score: `floor(score / threshold) + 1`
#[inline]
pub fn level_for_score(score: u64, threshold: u64) -> u32 {
    let threshold = threshold.max(1);
    (score / threshold).saturating_add(1).min(u32::MAX as u64) as u32
}

/// Spawn parameters for `level` and `score`.
///
/// Monotone in progress: the interval never grows (floored at the minimum),
/// the harmful chance never shrinks (capped), the speed multiplier never
/// shrinks.
pub fn schedule(level: u32, score: u64, config: &GameConfig) -> DifficultySchedule {
    let steps = level.saturating_sub(1);

    let reduction = (steps as u64).saturating_mul(config.spawn_interval_step_ms as u64);
    let interval = (config.spawn_interval_ms as u64)
        .saturating_sub(reduction)
        .max(config.min_spawn_interval_ms as u64) as u32;

    let cap = config.harmful_chance_cap.max(config.harmful_chance);
    let harmful = (config.harmful_chance + steps as f32 * config.harmful_chance_growth).min(cap);

    let speed_multiplier = 1.0 + score as f32 * config.speed_growth_per_point;

    DifficultySchedule {
        spawn_interval_ms: interval,
        kind_thresholds: KindThresholds {
            harmful,
            power_up: config.power_up_chance,
        },
        speed_multiplier,
    }
}

/// Periodic spawn countdown driven by tick elapsed time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnTimer {
    /// Period in seconds
    interval: f32,
    /// Seconds until the next spawn; None while disarmed
    remaining: Option<f32>,
    /// Number of rearms since the session started
    rearms: u32,
}

impl SpawnTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh countdown with a full period before the first spawn
    pub fn arm(&mut self, interval_ms: u32) {
        self.interval = ms_to_secs(interval_ms.max(1));
        self.remaining = Some(self.interval);
        self.rearms = 0;
    }

    /// Replace the running countdown with a new period
    pub fn rearm(&mut self, interval_ms: u32) {
        self.disarm();
        self.interval = ms_to_secs(interval_ms.max(1));
        self.remaining = Some(self.interval);
        self.rearms += 1;
    }

    pub fn disarm(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn interval_ms(&self) -> u32 {
        secs_to_ms(self.interval)
    }

    pub fn rearm_count(&self) -> u32 {
        self.rearms
    }

    /// Advance by `dt` seconds and return how many spawns fell due
    pub fn advance(&mut self, dt: f32) -> u32 {
        let Some(mut remaining) = self.remaining else {
            return 0;
        };
        remaining -= dt.max(0.0);

        let mut due = 0;
        while remaining <= 0.0 {
            due += 1;
            remaining += self.interval;
            if due >= MAX_SPAWNS_PER_TICK {
                // Drop the backlog after a long stall instead of flooding the field
                remaining = remaining.max(self.interval);
                break;
            }
        }
        self.remaining = Some(remaining);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for_score(0, 50), 1);
        assert_eq!(level_for_score(49, 50), 1);
        assert_eq!(level_for_score(50, 50), 2);
        assert_eq!(level_for_score(90, 100), 1);
        assert_eq!(level_for_score(100, 100), 2);
        assert_eq!(level_for_score(10, 0), 11);
    }

    #[test]
    fn test_schedule_matches_classic_curve() {
        let config = GameConfig::default();

        let start = schedule(1, 0, &config);
        assert_eq!(start.spawn_interval_ms, 1000);
        assert!((start.kind_thresholds.harmful - 0.2).abs() < 1e-6);
        assert_eq!(start.speed_multiplier, 1.0);

        // Score 50 -> level 2: 1000 - 50/10
        let next = schedule(2, 50, &config);
        assert_eq!(next.spawn_interval_ms, 995);
        assert!((next.kind_thresholds.harmful - 0.3).abs() < 1e-6);
        assert!((next.speed_multiplier - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_schedule_floors_and_caps() {
        let config = GameConfig::default();
        let late = schedule(10_000, 500_000, &config);
        assert_eq!(late.spawn_interval_ms, config.min_spawn_interval_ms);
        assert!((late.kind_thresholds.harmful - config.harmful_chance_cap).abs() < 1e-6);
    }

    #[test]
    fn test_thresholds_classify() {
        let t = KindThresholds {
            harmful: 0.3,
            power_up: 0.1,
        };
        assert_eq!(t.classify(0.0), KindBand::Harmful);
        assert_eq!(t.classify(0.3), KindBand::PowerUp);
        assert_eq!(t.classify(0.39), KindBand::PowerUp);
        assert_eq!(t.classify(0.4), KindBand::Beneficial);
        assert_eq!(KindBand::PowerUp.plain_kind(), None);
    }

    #[test]
    fn test_timer_fires_once_per_period() {
        let mut timer = SpawnTimer::new();
        assert_eq!(timer.advance(10.0), 0, "disarmed timer never fires");

        timer.arm(1000);
        assert_eq!(timer.advance(0.5), 0);
        assert_eq!(timer.advance(0.5), 1);
        assert_eq!(timer.advance(0.999), 0);
        assert_eq!(timer.advance(0.002), 1);
    }

    #[test]
    fn test_timer_rearm_replaces_countdown() {
        let mut timer = SpawnTimer::new();
        timer.arm(1000);
        timer.advance(0.9);

        timer.rearm(500);
        assert_eq!(timer.rearm_count(), 1);
        assert_eq!(timer.interval_ms(), 500);
        // The old countdown (0.1 s left) is gone
        assert_eq!(timer.advance(0.2), 0);
        assert_eq!(timer.advance(0.3), 1);
    }

    #[test]
    fn test_timer_caps_backlog() {
        let mut timer = SpawnTimer::new();
        timer.arm(100);
        assert_eq!(timer.advance(60.0), MAX_SPAWNS_PER_TICK);
        assert_eq!(timer.advance(0.05), 0);
    }

    #[test]
    fn test_disarm_stops_spawns() {
        let mut timer = SpawnTimer::new();
        timer.arm(100);
        timer.disarm();
        assert!(!timer.is_armed());
        assert_eq!(timer.advance(1.0), 0);
    }
}
