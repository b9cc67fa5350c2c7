// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Capabilities the training loop is written against.
//
//   TrainingObserver  → called once after every epoch
//                       (BestCheckpoint, ThresholdStop)
//   CheckpointSink    → where the best weights go
//                       (CheckpointManager, or a test double)
//
// Observers compose by independent invocation: the loop calls
// each one in turn and stops if any of them asks to.

use crate::domain::epoch_metrics::EpochMetrics;
use crate::domain::error::TrainingError;

/// What an observer wants the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochSignal {
    Continue,
    Stop,
}

// ─── TrainingObserver ─────────────────────────────────────────────────────────
/// Hook invoked synchronously at the end of each epoch.
///
/// `M` is whatever the loop trains; observers that only look at
/// metrics ignore it.
pub trait TrainingObserver<M> {
    fn on_epoch_end(
        &mut self,
        epoch:   usize,
        metrics: &EpochMetrics,
        model:   &M,
    ) -> Result<EpochSignal, TrainingError>;
}

// ─── CheckpointSink ───────────────────────────────────────────────────────────
/// Persists a model snapshot, replacing the previous one.
pub trait CheckpointSink<M> {
    fn save(&mut self, model: &M) -> Result<(), TrainingError>;
}
