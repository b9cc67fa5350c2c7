// ============================================================
// Layer 5 — Training Observers
// ============================================================
// The two end-of-epoch hooks the training loop runs:
//
//   BestCheckpoint  persist weights when the monitored metric
//                   beats every earlier epoch (strictly lower)
//   ThresholdStop   ask the loop to stop once a metric crosses
//                   a threshold ("min": below, "max": above)
//
// Both implement TrainingObserver and know nothing of each other.

use std::{fmt, str::FromStr};

use crate::domain::epoch_metrics::{is_known_metric, EpochMetrics};
use crate::domain::error::{ObserverError, TrainingError};
use crate::domain::traits::{CheckpointSink, EpochSignal, TrainingObserver};

/// Metric the best-checkpoint observer watches by default.
pub const DEFAULT_MONITOR: &str = "image_loss";

fn lookup(metrics: &EpochMetrics, name: &str) -> Result<f64, TrainingError> {
    metrics
        .metric(name)
        .ok_or_else(|| TrainingError::UnknownMetric(name.to_string()))
}

// ─── BestCheckpoint ───────────────────────────────────────────────────────────
pub struct BestCheckpoint<S> {
    sink:    S,
    monitor: String,
    best:    f64,
    saves:   usize,
}

impl<S> BestCheckpoint<S> {
    pub fn new(sink: S, monitor: impl Into<String>) -> Self {
        Self { sink, monitor: monitor.into(), best: f64::INFINITY, saves: 0 }
    }

    /// Start from a best value carried over from an earlier run.
    pub fn with_best(mut self, best: Option<f64>) -> Self {
        if let Some(best) = best {
            self.best = best;
        }
        self
    }

    pub fn best(&self) -> f64 {
        self.best
    }

    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<M, S: CheckpointSink<M>> TrainingObserver<M> for BestCheckpoint<S> {
    fn on_epoch_end(
        &mut self,
        epoch:   usize,
        metrics: &EpochMetrics,
        model:   &M,
    ) -> Result<EpochSignal, TrainingError> {
        let value = lookup(metrics, &self.monitor)?;

        if value < self.best {
            tracing::info!(
                "Epoch {}: {} improved from {:.5} to {:.5}, saving checkpoint",
                epoch, self.monitor, self.best, value
            );
            self.sink.save(model)?;
            self.best = value;
            self.saves += 1;
        } else {
            tracing::info!(
                "Epoch {}: {} did not improve from {:.5}",
                epoch, self.monitor, self.best
            );
        }
        Ok(EpochSignal::Continue)
    }
}

// ─── ThresholdStop ────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    Min,
    Max,
}

impl FromStr for StopMode {
    type Err = ObserverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(ObserverError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for StopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdStop {
    metric:    String,
    mode:      StopMode,
    threshold: f64,
}

impl ThresholdStop {
    /// Fails with InvalidMode unless `mode` is "min" or "max".
    pub fn new(metric: impl Into<String>, mode: &str, threshold: f64) -> Result<Self, ObserverError> {
        Ok(Self::with_mode(metric, mode.parse()?, threshold))
    }

    pub fn with_mode(metric: impl Into<String>, mode: StopMode, threshold: f64) -> Self {
        Self { metric: metric.into(), mode, threshold }
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    /// Whether `value` is past the threshold.
    pub fn triggered(&self, value: f64) -> bool {
        match self.mode {
            StopMode::Min => value < self.threshold,
            StopMode::Max => value > self.threshold,
        }
    }

    /// Rejects metric names the loop never reports, before training starts.
    pub fn validate(&self) -> Result<(), TrainingError> {
        if is_known_metric(&self.metric) {
            Ok(())
        } else {
            Err(TrainingError::UnknownMetric(self.metric.clone()))
        }
    }
}

impl<M> TrainingObserver<M> for ThresholdStop {
    fn on_epoch_end(
        &mut self,
        epoch:   usize,
        metrics: &EpochMetrics,
        _model:  &M,
    ) -> Result<EpochSignal, TrainingError> {
        let value = lookup(metrics, &self.metric)?;
        if self.triggered(value) {
            tracing::info!(
                "Epoch {}: {}={:.5} crossed {} threshold {}, stopping",
                epoch, self.metric, value, self.mode, self.threshold
            );
            Ok(EpochSignal::Stop)
        } else {
            Ok(EpochSignal::Continue)
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Records which epochs were saved.
    #[derive(Default)]
    struct RecordingSink {
        saved: Vec<usize>,
        fail:  bool,
    }

    impl CheckpointSink<usize> for RecordingSink {
        fn save(&mut self, model: &usize) -> Result<(), TrainingError> {
            if self.fail {
                return Err(TrainingError::Storage("disk full".into()));
            }
            self.saved.push(*model);
            Ok(())
        }
    }

    fn with_image_loss(epoch: usize, image_loss: f64) -> EpochMetrics {
        EpochMetrics::new(epoch, image_loss, 1.0, 0.0)
    }

    #[test]
    fn test_saves_only_on_improvement() {
        let mut obs = BestCheckpoint::new(RecordingSink::default(), DEFAULT_MONITOR);
        for (i, loss) in [1.0, 0.8, 0.9, 0.5].into_iter().enumerate() {
            let epoch = i + 1;
            // the "model" is the epoch number so the sink shows who was saved
            let signal = obs.on_epoch_end(epoch, &with_image_loss(epoch, loss), &epoch).unwrap();
            assert_eq!(signal, EpochSignal::Continue);
        }
        assert_eq!(obs.saves(), 3);
        assert_eq!(obs.best(), 0.5);
        assert_eq!(obs.into_sink().saved, vec![1, 2, 4]);
    }

    #[test]
    fn test_equal_value_is_not_an_improvement() {
        let mut obs = BestCheckpoint::new(RecordingSink::default(), DEFAULT_MONITOR);
        obs.on_epoch_end(1, &with_image_loss(1, 0.5), &1).unwrap();
        obs.on_epoch_end(2, &with_image_loss(2, 0.5), &2).unwrap();
        assert_eq!(obs.into_sink().saved, vec![1]);
    }

    #[test]
    fn test_carried_best_suppresses_worse_epochs() {
        let mut obs = BestCheckpoint::new(RecordingSink::default(), DEFAULT_MONITOR).with_best(Some(0.3));
        obs.on_epoch_end(1, &with_image_loss(1, 0.4), &1).unwrap();
        obs.on_epoch_end(2, &with_image_loss(2, 0.2), &2).unwrap();
        assert_eq!(obs.into_sink().saved, vec![2]);
    }

    #[test]
    fn test_storage_failure_propagates() {
        let sink = RecordingSink { fail: true, ..Default::default() };
        let mut obs = BestCheckpoint::new(sink, DEFAULT_MONITOR);
        let err = obs.on_epoch_end(1, &with_image_loss(1, 0.5), &1).unwrap_err();
        assert!(matches!(err, TrainingError::Storage(_)));
        // A failed write is not a new best
        assert_eq!(obs.best(), f64::INFINITY);
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        assert_eq!(
            ThresholdStop::new("loss", "avg", 0.1).unwrap_err(),
            ObserverError::InvalidMode("avg".into())
        );
        assert!(ThresholdStop::new("loss", "MIN", 0.1).is_err());
    }

    #[test]
    fn test_min_mode_stops_exactly_below_threshold() {
        let mut stop = ThresholdStop::new("image_loss", "min", 0.01).unwrap();
        let signals: Vec<EpochSignal> = [0.5, 0.2, 0.009]
            .into_iter()
            .enumerate()
            .map(|(i, v)| stop.on_epoch_end(i + 1, &with_image_loss(i + 1, v), &()).unwrap())
            .collect();
        assert_eq!(signals, vec![EpochSignal::Continue, EpochSignal::Continue, EpochSignal::Stop]);
    }

    #[test]
    fn test_max_mode_stops_above_threshold() {
        let mut stop = ThresholdStop::new("sentence_accuracy", "max", 0.9).unwrap();
        let m = |acc| EpochMetrics::new(1, 0.1, 0.1, acc);
        assert_eq!(stop.on_epoch_end(1, &m(0.9), &()).unwrap(), EpochSignal::Continue);
        assert_eq!(stop.on_epoch_end(2, &m(0.95), &()).unwrap(), EpochSignal::Stop);
    }

    #[test]
    fn test_unknown_metric() {
        let stop = ThresholdStop::new("val_loss", "min", 0.1).unwrap();
        assert!(matches!(stop.validate(), Err(TrainingError::UnknownMetric(_))));

        let mut stop = stop;
        let err = stop.on_epoch_end(1, &with_image_loss(1, 0.1), &()).unwrap_err();
        assert!(matches!(err, TrainingError::UnknownMetric(_)));
    }
}
