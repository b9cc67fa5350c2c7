// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the single best checkpoint of a model.
//
// Files, all sharing one base path (e.g. `weights/best_color`):
//
//   weights/best_color.json         ← ModelConfiguration record
//   weights/best_color.mpk          ← model weights (CompactRecorder)
//   weights/best_color.metrics.csv  ← per-epoch metrics (MetricsLogger)
//
// Every write lands in a `.partial` sibling first and is then
// renamed over the target, so a reader sees either the old file
// or the new one, never half of one.
//
// The configuration must exist before the first weights are
// written; inference rebuilds the model from it and only then
// loads the weights into that shape.

use anyhow::{Context, Result};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::domain::error::TrainingError;
use crate::domain::model_config::ModelConfiguration;
use crate::domain::traits::CheckpointSink;
use crate::ml::model::JointModel;

/// Extension CompactRecorder puts on the files it writes.
const WEIGHTS_EXTENSION: &str = "mpk";

#[derive(Debug, Clone)]
pub struct CheckpointManager {
    /// Base path without extension
    base: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager for `base`.
    /// The parent directory is created on the first write.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn weights_path(&self) -> PathBuf {
        with_suffix(&self.base, &format!(".{WEIGHTS_EXTENSION}"))
    }

    pub fn config_path(&self) -> PathBuf {
        with_suffix(&self.base, ".json")
    }

    pub fn metrics_path(&self) -> PathBuf {
        with_suffix(&self.base, ".metrics.csv")
    }

    /// True once both halves of a checkpoint are on disk.
    pub fn exists(&self) -> bool {
        self.config_path().is_file() && self.weights_path().is_file()
    }

    /// Persist the model weights, replacing the previous checkpoint.
    pub fn save_model<B: Backend>(&self, model: &JointModel<B>) -> Result<()> {
        self.ensure_parent()?;
        let partial = with_suffix(&self.base, ".partial");
        let written = with_suffix(&partial, &format!(".{WEIGHTS_EXTENSION}"));
        let target  = self.weights_path();

        CompactRecorder::new()
            .record(model.clone().into_record(), recorder_arg(&partial))
            .with_context(|| format!("Failed to save checkpoint to '{}'", written.display()))?;

        fs::rename(&written, &target).with_context(|| {
            format!("Failed to move '{}' over '{}'", written.display(), target.display())
        })?;

        tracing::debug!("Saved checkpoint '{}'", target.display());
        Ok(())
    }

    /// Load weights into `model` and verify they fit `cfg`.
    ///
    /// A checkpoint trained for other shapes is a ConfigMismatch,
    /// never silently reshaped.
    pub fn load_model<B: Backend>(
        &self,
        model:  JointModel<B>,
        cfg:    &ModelConfiguration,
        device: &B::Device,
    ) -> Result<JointModel<B>> {
        let path = self.weights_path();
        tracing::info!("Loading checkpoint '{}'", path.display());

        let record = CompactRecorder::new()
            .load(recorder_arg(&self.base), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        let model = model.load_record(record);
        model.check_shapes(cfg)
            .with_context(|| format!("Checkpoint '{}' does not fit its configuration", path.display()))?;
        Ok(model)
    }

    /// Write the configuration record next to the weights.
    pub fn save_config(&self, cfg: &ModelConfiguration) -> Result<()> {
        self.ensure_parent()?;
        let path = self.config_path();
        let json = serde_json::to_string_pretty(cfg)?;
        write_atomic(&path, json.as_bytes())
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved model configuration to '{}'", path.display());
        Ok(())
    }

    /// Delete the weights of an earlier run, if any.
    pub fn remove_weights(&self) -> Result<()> {
        let path = self.weights_path();
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Cannot remove stale weights '{}'", path.display()))?;
            tracing::info!("Removed stale weights '{}'", path.display());
        }
        Ok(())
    }

    /// Read the configuration record back, exactly as written.
    pub fn load_config(&self) -> Result<ModelConfiguration> {
        let path = self.config_path();
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before loading this model.",
                path.display()
            )
        })?;

        let cfg: ModelConfiguration = serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl CheckpointManager {
    fn ensure_parent(&self) -> Result<()> {
        match self.base.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::create_dir_all(parent).with_context(|| {
                format!("Cannot create checkpoint directory '{}'", parent.display())
            }),
            None => Ok(()),
        }
    }
}

impl<B: Backend> CheckpointSink<JointModel<B>> for CheckpointManager {
    fn save(&mut self, model: &JointModel<B>) -> Result<(), TrainingError> {
        self.save_model(model)
            .map_err(|e| TrainingError::Storage(format!("{e:#}")))
    }
}

/// `path` + `suffix`, without touching any dot already in the file name.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// File recorders replace the extension of the path they are given,
/// so hand them a throwaway one to keep the real file name intact.
fn recorder_arg(stem: &Path) -> PathBuf {
    with_suffix(stem, ".rec")
}

/// Write to a sibling temp file, then rename over `path`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = with_suffix(path, ".partial");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}
