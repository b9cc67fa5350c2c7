// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a training run in order:
//
//   Step 1: Resolve the model configuration   (Layer 3 - domain)
//           fresh from the flags, or the saved record when resuming
//   Step 2: Build the model, load weights     (Layer 5/6 - ml, infra)
//           when resuming
//   Step 3: Save the configuration record     (Layer 6 - infra)
//   Step 4: Open the metrics CSV and recover  (Layer 6 - infra)
//           the best value of an earlier run
//   Step 5: Assemble observers                (Layer 5 - ml)
//   Step 6: Run the training loop             (Layer 5 - ml)

use anyhow::{bail, Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use std::fs;

use crate::domain::epoch_metrics::is_known_metric;
use crate::domain::model_config::ModelConfiguration;
use crate::infra::{checkpoint::CheckpointManager, metrics::MetricsLogger};
use crate::ml::backend::{default_device, Device, TrainBackend};
use crate::ml::model::{JointModel, JointModelConfig};
use crate::ml::observer::{BestCheckpoint, StopMode, ThresholdStop, DEFAULT_MONITOR};
use crate::ml::trainer::{TrainSchedule, Trainer, TrainingState};

// ─── Training Configuration ──────────────────────────────────────────────────
// Everything a training run needs. The model-shape part ends up in
// the ModelConfiguration record; the rest only steers this run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Base path shared by the weights, config record and metrics CSV
    pub checkpoint:        String,
    pub image_size:        usize,
    pub grey_scale:        bool,
    pub dictionary_length: usize,
    pub batch_size:        usize,
    pub epochs:            usize,
    pub steps_per_epoch:   usize,
    pub lr:                f64,
    /// Continue from the checkpoint at `checkpoint`
    pub load_existing:     bool,
    pub seed:              Option<u64>,
    /// Metric whose improvement triggers a checkpoint write
    pub monitor:           String,
    /// Early stop: no threshold observer when None
    pub stop_metric:       Option<String>,
    pub stop_mode:         String,
    pub stop_threshold:    f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            checkpoint:        "weights/best_grey".to_string(),
            image_size:        100,
            grey_scale:        true,
            dictionary_length: 200,
            batch_size:        32,
            epochs:            20,
            steps_per_epoch:   100,
            lr:                1e-3,
            load_existing:     false,
            seed:              None,
            monitor:           DEFAULT_MONITOR.to_string(),
            stop_metric:       None,
            stop_mode:         "min".to_string(),
            stop_threshold:    0.0,
        }
    }
}

impl TrainConfig {
    pub fn schedule(&self) -> TrainSchedule {
        TrainSchedule { epochs: self.epochs, steps_per_epoch: self.steps_per_epoch, lr: self.lr }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run training end to end and report how it ended.
    pub fn execute(&self) -> Result<TrainingState> {
        let cfg = &self.config;
        cfg.schedule().validate()?;
        if !is_known_metric(&cfg.monitor) {
            bail!("Unknown monitor metric '{}'", cfg.monitor);
        }
        let early_stop = self.early_stop()?;

        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint);
        let device = default_device();

        // ── Steps 1-2: Configuration and model ─────────────────────────────────
        let (model_cfg, model) = if cfg.load_existing {
            self.resume(&ckpt_manager, &device)?
        } else {
            let model_cfg = ModelConfiguration::new(
                cfg.image_size, cfg.grey_scale, cfg.dictionary_length, cfg.batch_size,
            )?;
            let model = JointModelConfig::from_configuration(&model_cfg).init::<TrainBackend>(&device);
            (model_cfg, model)
        };
        tracing::info!(
            "Model ready: {}x{}x{}, dictionary_length={}",
            model_cfg.image_size, model_cfg.image_size, model_cfg.channels(), model_cfg.dictionary_length
        );

        // ── Step 3: Config record before any weights ─────────────────────────
        // A fresh run must not leave an earlier run's weights beside the new record
        if !cfg.load_existing {
            ckpt_manager.remove_weights()?;
        }
        ckpt_manager.save_config(&model_cfg)?;

        // ── Step 4: Metrics CSV ───────────────────────────────────────────────
        let metrics_path = ckpt_manager.metrics_path();
        if !cfg.load_existing && metrics_path.exists() {
            fs::remove_file(&metrics_path)
                .with_context(|| format!("Cannot reset '{}'", metrics_path.display()))?;
        }
        let logger = MetricsLogger::new(&metrics_path)?;
        let best = logger.best(&cfg.monitor, false)?;
        if let Some(best) = best {
            tracing::info!("Resuming with best {} = {:.5}", cfg.monitor, best);
        }

        // ── Step 5: Observers ─────────────────────────────────────────────────
        let mut trainer = Trainer::<TrainBackend>::new(model_cfg, cfg.schedule())
            .with_metrics(logger)
            .with_observer(BestCheckpoint::new(ckpt_manager.clone(), cfg.monitor.clone()).with_best(best));

        if let Some(stop) = early_stop {
            trainer = trainer.with_observer(stop);
        }

        // ── Step 6: Training loop ─────────────────────────────────────────────
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        trainer.run(model, rng, &device)?;

        Ok(trainer.state())
    }

    /// The threshold observer, if one was asked for. Checked before
    /// any file is touched.
    fn early_stop(&self) -> Result<Option<ThresholdStop>> {
        let cfg = &self.config;
        let Some(metric) = &cfg.stop_metric else {
            return Ok(None);
        };

        let mode: StopMode = cfg.stop_mode.parse()?;
        let stop = ThresholdStop::with_mode(metric.clone(), mode, cfg.stop_threshold);
        stop.validate()?;
        tracing::info!("Early stop when {} crosses {} ({})", metric, cfg.stop_threshold, mode);
        Ok(Some(stop))
    }

    /// Restore configuration and weights saved by an earlier run.
    fn resume(
        &self,
        ckpt_manager: &CheckpointManager,
        device:       &Device,
    ) -> Result<(ModelConfiguration, JointModel<TrainBackend>)> {
        if !ckpt_manager.exists() {
            bail!(
                "Nothing to resume: no checkpoint at '{}'",
                ckpt_manager.base().display()
            );
        }

        let model_cfg = ckpt_manager.load_config()?;
        if model_cfg.image_size != self.config.image_size
            || model_cfg.grey_scale != self.config.grey_scale
            || model_cfg.dictionary_length != self.config.dictionary_length
        {
            tracing::warn!("Resuming with the saved configuration, ignoring the requested shape");
        }

        let model = JointModelConfig::from_configuration(&model_cfg).init::<TrainBackend>(device);
        let model = ckpt_manager.load_model(model, &model_cfg, device)?;
        Ok((model_cfg, model))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::ImageTensor;
    use crate::ml::backend::InferBackend;
    use crate::ml::inferencer::StegoCodec;

    fn tiny(dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            checkpoint:        dir.join("best").to_string_lossy().into_owned(),
            image_size:        4,
            grey_scale:        true,
            dictionary_length: 10,
            batch_size:        2,
            epochs:            2,
            steps_per_epoch:   2,
            seed:              Some(11),
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_train_then_load_for_inference() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny(dir.path());

        let state = TrainUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(state, TrainingState::Checkpointed);

        let ckpt = CheckpointManager::new(&cfg.checkpoint);
        assert!(ckpt.exists());
        assert_eq!(ckpt.load_config().unwrap(), ModelConfiguration::new(4, true, 10, 2).unwrap());

        let codec = StegoCodec::<InferBackend>::from_checkpoint(&ckpt, &Default::default()).unwrap();
        let message = codec.decode_from_image(&ImageTensor::filled(4, 4, &[0.5])).unwrap();
        assert!(message.chars().count() <= 4);
    }

    #[test]
    fn test_resume_appends_to_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny(dir.path());
        TrainUseCase::new(cfg.clone()).execute().unwrap();

        let resumed = TrainConfig { load_existing: true, ..cfg.clone() };
        TrainUseCase::new(resumed).execute().unwrap();

        let csv = fs::read_to_string(CheckpointManager::new(&cfg.checkpoint).metrics_path()).unwrap();
        // header + 2 epochs + 2 epochs
        assert_eq!(csv.lines().count(), 5);
    }

    #[test]
    fn test_fresh_run_drops_old_weights() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = tiny(dir.path());
        TrainUseCase::new(cfg.clone()).execute().unwrap();
        let ckpt = CheckpointManager::new(&cfg.checkpoint);
        assert!(ckpt.exists());

        // New shape, no epoch ever writes weights
        let reshaped = TrainConfig { image_size: 6, epochs: 0, ..cfg };
        TrainUseCase::new(reshaped).execute().unwrap();

        assert!(!ckpt.exists());
        assert_eq!(ckpt.load_config().unwrap().image_size, 6);
        assert!(StegoCodec::<InferBackend>::from_checkpoint(&ckpt, &Default::default()).is_err());
    }

    #[test]
    fn test_resume_without_checkpoint_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig { load_existing: true, ..tiny(dir.path()) };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_early_stop_and_bad_options() {
        let dir = tempfile::tempdir().unwrap();
        let stop = TrainConfig {
            epochs:         10,
            stop_metric:    Some("loss".into()),
            stop_mode:      "max".into(),
            stop_threshold: -1.0,
            ..tiny(dir.path())
        };
        assert_eq!(TrainUseCase::new(stop.clone()).execute().unwrap(), TrainingState::Stopped { epoch: 1 });

        let bad_mode = TrainConfig { stop_mode: "avg".into(), ..stop.clone() };
        assert!(TrainUseCase::new(bad_mode).execute().is_err());

        let bad_monitor = TrainConfig { monitor: "val_loss".into(), ..stop };
        assert!(TrainUseCase::new(bad_monitor).execute().is_err());
    }
}
