//! Session lifecycle: start, end, restart

use super::state::{GameEvent, GamePhase, GameState};
use crate::error::SessionError;
use crate::platform::AssetProvider;

impl GameState {
    /// Begin a new play-through.
    ///
    /// Refuses (and changes nothing) until every visual has settled, loaded or
    /// failed. Otherwise resets score, lives, level, entities and effects,
    /// arms the spawn timer and enters `Running`.
    pub fn start(&mut self, assets: &impl AssetProvider) -> Result<(), SessionError> {
        ensure_assets_settled(assets)?;

        self.reset();
        self.spawner.arm(self.difficulty.spawn_interval_ms);
        self.phase = GamePhase::Running;

        self.events.push(GameEvent::SessionStarted);
        self.events.push(GameEvent::ScoreChanged {
            score: self.score.score,
            lives: self.score.lives,
            level: self.score.level,
        });
        log::info!(
            "Session started: {} lives, field {}x{}, spawn every {} ms",
            self.score.lives,
            self.config.field_width,
            self.config.field_height,
            self.difficulty.spawn_interval_ms
        );
        Ok(())
    }

    /// Stop the session. Disarms the spawn timer before returning, so no
    /// spawn or tick is processed afterwards. Returns the final score.
    pub fn end(&mut self) -> u64 {
        if self.phase != GamePhase::Running {
            return self.score.score;
        }
        self.spawner.disarm();
        self.phase = GamePhase::Ended;

        let final_score = self.score.score;
        self.events.push(GameEvent::SessionEnded { final_score });
        log::info!(
            "Session ended: score {} at level {}",
            final_score,
            self.score.level
        );
        final_score
    }

    /// End the current session (if any) and start a fresh one. A refused
    /// restart leaves the running session as it was.
    pub fn restart(&mut self, assets: &impl AssetProvider) -> Result<(), SessionError> {
        ensure_assets_settled(assets)?;
        self.end();
        self.start(assets)
    }
}

fn ensure_assets_settled(assets: &impl AssetProvider) -> Result<(), SessionError> {
    if assets.is_settled() {
        return Ok(());
    }
    let (settled, total) = assets.progress();
    log::warn!("Start refused: assets {}/{} settled", settled, total);
    Err(SessionError::AssetsNotReady { settled, total })
}
