// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Trains encoder and decoder jointly on endless synthetic batches
// using Adam.
//
//   for each epoch:
//     for each step:   batch → forward_loss → backward → Adam step
//     average the step metrics into EpochMetrics
//     append them to the metrics CSV
//     run every observer (checkpoint, early stop, ...)
//
// There is no validation split: every batch is fresh noise, so
// the training averages already measure unseen data.
//
// State machine:
//
//   Idle ─► Running ─┬─► Checkpointed   all epochs done
//                    ├─► Stopped        an observer asked to stop
//                    └─► Failed         a TrainingError aborted the run

use burn::{
    data::dataloader::batcher::Batcher,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::Rng;

use crate::data::{batcher::StegoBatcher, generator::SyntheticGenerator};
use crate::domain::epoch_metrics::EpochMetrics;
use crate::domain::error::{ConfigError, TrainingError};
use crate::domain::model_config::ModelConfiguration;
use crate::domain::traits::{EpochSignal, TrainingObserver};
use crate::infra::metrics::MetricsLogger;
use crate::ml::inferencer::{ModelHandle, TrainedModel};
use crate::ml::model::{sentence_accuracy, JointModel};

// ─── Schedule ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainSchedule {
    pub epochs:          usize,
    pub steps_per_epoch: usize,
    pub lr:              f64,
}

impl TrainSchedule {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps_per_epoch == 0 {
            return Err(ConfigError::Invalid("steps_per_epoch must be positive".into()));
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(ConfigError::Invalid(format!("learning rate {} must be positive", self.lr)));
        }
        Ok(())
    }
}

// ─── State ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Idle,
    Running { epoch: usize },
    /// Every scheduled epoch ran.
    Checkpointed,
    /// An observer ended the run after `epoch`.
    Stopped { epoch: usize },
    Failed,
}

impl TrainingState {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Checkpointed | Self::Stopped { .. } | Self::Failed)
    }
}

// ─── Trainer ──────────────────────────────────────────────────────────────────
pub struct Trainer<B: AutodiffBackend> {
    cfg:       ModelConfiguration,
    schedule:  TrainSchedule,
    observers: Vec<Box<dyn TrainingObserver<JointModel<B>>>>,
    metrics:   Option<MetricsLogger>,
    state:     TrainingState,
}

impl<B: AutodiffBackend> Trainer<B> {
    pub fn new(cfg: ModelConfiguration, schedule: TrainSchedule) -> Self {
        Self { cfg, schedule, observers: Vec::new(), metrics: None, state: TrainingState::Idle }
    }

    /// Observers run in the order they were added.
    pub fn with_observer(mut self, observer: impl TrainingObserver<JointModel<B>> + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn with_metrics(mut self, logger: MetricsLogger) -> Self {
        self.metrics = Some(logger);
        self
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Train `model` and hand back its inference form.
    /// The trainer keeps its final state for inspection afterwards.
    pub fn run<R: Rng>(
        &mut self,
        model:  JointModel<B>,
        rng:    R,
        device: &B::Device,
    ) -> Result<ModelHandle<B::InnerBackend>, TrainingError> {
        match self.train_loop(model, rng, device) {
            Ok(handle) => Ok(handle),
            Err(e) => {
                self.state = TrainingState::Failed;
                tracing::error!("Training failed: {e}");
                Err(e)
            }
        }
    }

    fn train_loop<R: Rng>(
        &mut self,
        mut model: JointModel<B>,
        rng:       R,
        device:    &B::Device,
    ) -> Result<ModelHandle<B::InnerBackend>, TrainingError> {
        let TrainSchedule { epochs, steps_per_epoch, lr } = self.schedule;
        self.state = TrainingState::Idle;
        let (h, w, c) = self.cfg.image_shape();

        let mut generator = SyntheticGenerator::new(&self.cfg, rng);
        let batcher = StegoBatcher::<B>::new(device.clone(), h, w, c);

        // ── Adam optimiser ────────────────────────────────────────────────────
        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

        tracing::info!(
            "Training for {} epochs x {} steps, batch_size={}, lr={}",
            epochs, steps_per_epoch, self.cfg.batch_size, lr
        );

        let mut completed = 0usize;

        // ── Epoch loop ────────────────────────────────────────────────────────
        for epoch in 1..=epochs {
            self.state = TrainingState::Running { epoch };

            let mut image_sum    = 0.0f64;
            let mut sentence_sum = 0.0f64;
            let mut accuracy_sum = 0.0f64;

            for step in 1..=steps_per_epoch {
                let batch = batcher.batch(generator.next_batch(self.cfg.batch_size));
                let out = model.forward_loss(batch.images, batch.sentences.clone());

                let loss_val = out.loss.clone().into_scalar().elem::<f64>();
                check_finite(epoch, step, loss_val)?;

                image_sum    += out.image_loss.clone().into_scalar().elem::<f64>();
                sentence_sum += out.sentence_loss.clone().into_scalar().elem::<f64>();
                accuracy_sum += sentence_accuracy(out.output.logits, batch.sentences);

                // Backward pass + Adam update
                let grads = out.loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(lr, model, grads);
            }

            let n = steps_per_epoch as f64;
            let metrics = EpochMetrics::new(epoch, image_sum / n, sentence_sum / n, accuracy_sum / n);
            completed = epoch;

            println!(
                "Epoch {:>3}/{} | loss={:.4} | image_loss={:.4} | sentence_loss={:.4} | accuracy={:.1}%",
                epoch, epochs, metrics.loss, metrics.image_loss, metrics.sentence_loss,
                metrics.sentence_accuracy * 100.0,
            );

            if let Some(logger) = &self.metrics {
                logger
                    .log(&metrics)
                    .map_err(|e| TrainingError::Storage(format!("{e:#}")))?;
            }

            // Every observer sees every epoch, even after one has asked to stop
            let mut stop = false;
            for observer in self.observers.iter_mut() {
                if observer.on_epoch_end(epoch, &metrics, &model)? == EpochSignal::Stop {
                    stop = true;
                }
            }

            if stop {
                self.state = TrainingState::Stopped { epoch };
                tracing::info!("Training stopped early after epoch {}", epoch);
                break;
            }
        }

        if !matches!(self.state, TrainingState::Stopped { .. }) {
            self.state = TrainingState::Checkpointed;
            tracing::info!("Training complete!");
        }

        if completed == 0 {
            return Ok(ModelHandle::Untrained);
        }
        Ok(ModelHandle::Trained(TrainedModel::from(model.valid())))
    }
}

fn check_finite(epoch: usize, step: usize, value: f64) -> Result<f64, TrainingError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TrainingError::NonFiniteLoss { epoch, step, value })
    }
}
