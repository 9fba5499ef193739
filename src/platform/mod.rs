//! Platform abstraction layer
//!
//! Host-facing pieces that are not gameplay:
//! - Asset readiness (visuals load asynchronously in the browser)
//! - Frame timing (elapsed time between animation frames)

use std::collections::BTreeMap;

use crate::consts::MAX_FRAME_DT;

/// Read access to the loaded visuals, keyed by asset name
pub trait AssetProvider {
    /// Decoded visual type (an image element in the browser, `()` headless)
    type Handle;

    /// True once the named visual loaded successfully
    fn is_ready(&self, key: &str) -> bool {
        self.visual(key).is_some()
    }

    /// The loaded visual, if any. Pending or failed visuals return None.
    fn visual(&self, key: &str) -> Option<&Self::Handle>;

    /// Number of visuals that finished loading, successfully or not
    fn settled_count(&self) -> usize;

    /// Number of registered visuals
    fn total(&self) -> usize;

    /// (settled, total), for loading indicators
    fn progress(&self) -> (usize, usize) {
        (self.settled_count(), self.total())
    }

    /// Every registered visual has loaded or failed
    fn is_settled(&self) -> bool {
        self.settled_count() >= self.total()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum AssetStatus<H> {
    Pending,
    Ready(H),
    Failed,
}

/// Load-state bookkeeping for a fixed set of visuals
#[derive(Debug, Clone)]
pub struct AssetTracker<H> {
    assets: BTreeMap<String, AssetStatus<H>>,
}

impl<H> AssetTracker<H> {
    /// Register every key as pending
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            assets: keys
                .into_iter()
                .map(|k| (k.into(), AssetStatus::Pending))
                .collect(),
        }
    }

    pub fn mark_loaded(&mut self, key: &str, handle: H) {
        let Some(status) = self.assets.get_mut(key) else {
            log::warn!("Loaded unregistered asset '{}'", key);
            return;
        };
        *status = AssetStatus::Ready(handle);
        log::debug!("Asset '{}' loaded ({}/{})", key, self.settled_count(), self.total());
    }

    /// Record a failed load. The entity kind falls back to its colour.
    pub fn mark_failed(&mut self, key: &str, reason: &str) {
        match self.assets.get_mut(key) {
            Some(status) => {
                *status = AssetStatus::Failed;
                log::warn!("Asset '{}' failed to load: {}", key, reason);
            }
            None => log::warn!("Failed unregistered asset '{}': {}", key, reason),
        }
    }

    pub fn is_failed(&self, key: &str) -> bool {
        matches!(self.assets.get(key), Some(AssetStatus::Failed))
    }
}

impl<H> AssetProvider for AssetTracker<H> {
    type Handle = H;

    fn visual(&self, key: &str) -> Option<&H> {
        match self.assets.get(key) {
            Some(AssetStatus::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    fn settled_count(&self) -> usize {
        self.assets
            .values()
            .filter(|s| !matches!(s, AssetStatus::Pending))
            .count()
    }

    fn total(&self) -> usize {
        self.assets.len()
    }
}

/// Converts animation-frame timestamps into clamped tick deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous frame, clamped to [0, MAX_FRAME_DT].
    /// The first frame after a reset reports zero.
    pub fn step(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        }
    }

    /// Forget the previous frame (after a pause or a new session)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
