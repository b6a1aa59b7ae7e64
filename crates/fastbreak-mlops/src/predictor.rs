//! PredictorHandle — explicit, reloadable handle to the served model.
//!
//! The serving path initializes it once and checks staleness before use;
//! the retrain worker marks it stale after a successful execute-mode run.
//! There is no hidden singleton and no implicit invalidation: reloads are
//! the owner's explicit decision.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

/// Process-wide, share-by-Arc predictor state.
#[derive(Debug, Default)]
pub struct PredictorHandle {
    /// Epoch seconds of the last explicit load, 0 when never loaded.
    loaded_at: AtomicI64,
    /// Bumped on every load; lets callers detect a swap cheaply.
    generation: AtomicU64,
    stale: AtomicBool,
}

impl PredictorHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the serving path (re)loaded model artifacts.
    pub fn mark_loaded(&self, now: i64) {
        self.loaded_at.store(now, Ordering::Release);
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.stale.store(false, Ordering::Release);
    }

    /// Flag that newer artifacts exist than the ones currently served.
    pub fn mark_stale(&self) {
        self.stale.store(true, Ordering::Release);
    }

    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.load(Ordering::Acquire) != 0
    }

    /// Epoch seconds of the last load, None when never loaded.
    pub fn loaded_at(&self) -> Option<i64> {
        match self.loaded_at.load(Ordering::Acquire) {
            0 => None,
            at => Some(at),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
