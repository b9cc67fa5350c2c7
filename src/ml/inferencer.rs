// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Hides messages in images and reads them back with a trained
// model. Everything goes through &self, so one StegoCodec can
// serve any number of callers once loaded.
//
//   encode: image ─► normalize ─┐
//           message ─► preprocess (pepper) ─┴► encoder ─► embedded image
//
//   decode: image ─► normalize ─► decoder ─► argmax per row
//                              ─► code points ─► postprocess ─► message

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use burn::prelude::*;
use rand::Rng;

use crate::data::{batcher::StegoBatcher, codec, normalizer::normalize};
use crate::domain::dictionary::Dictionary;
use crate::domain::image::ImageTensor;
use crate::domain::model_config::ModelConfiguration;
use crate::domain::sentence::{decode_chars, postprocess, preprocess};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{ImageEncoder, JointModel, JointModelConfig, SentenceDecoder};

// ─── Model handle ─────────────────────────────────────────────────────────────
/// Encoder and decoder of a finished training run.
#[derive(Debug, Clone)]
pub struct TrainedModel<B: Backend> {
    pub encoder: ImageEncoder<B>,
    pub decoder: SentenceDecoder<B>,
}

impl<B: Backend> From<JointModel<B>> for TrainedModel<B> {
    fn from(model: JointModel<B>) -> Self {
        Self { encoder: model.encoder, decoder: model.decoder }
    }
}

/// What the training loop hands back. `Trained` only exists once
/// at least one epoch has updated the weights.
#[derive(Debug)]
pub enum ModelHandle<B: Backend> {
    Untrained,
    Trained(TrainedModel<B>),
}

impl<B: Backend> ModelHandle<B> {
    pub fn is_trained(&self) -> bool {
        matches!(self, Self::Trained(_))
    }

    pub fn into_trained(self) -> Option<TrainedModel<B>> {
        match self {
            Self::Trained(model) => Some(model),
            Self::Untrained => None,
        }
    }
}

// ─── StegoCodec ───────────────────────────────────────────────────────────────
pub struct StegoCodec<B: Backend> {
    model:      TrainedModel<B>,
    cfg:        ModelConfiguration,
    dictionary: Dictionary,
    batcher:    StegoBatcher<B>,
}

impl<B: Backend> StegoCodec<B> {
    pub fn new(model: TrainedModel<B>, cfg: ModelConfiguration, device: B::Device) -> Result<Self> {
        let dictionary = cfg.dictionary()?;
        let (h, w, c) = cfg.image_shape();
        let batcher = StegoBatcher::new(device, h, w, c);
        Ok(Self { model, cfg, dictionary, batcher })
    }

    /// Rebuild the model from the saved configuration, then load the weights into it.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager, device: &B::Device) -> Result<Self> {
        let cfg = ckpt_manager.load_config()?;
        let model = JointModelConfig::from_configuration(&cfg).init::<B>(device);
        let model = ckpt_manager.load_model(model, &cfg, device)?;
        tracing::info!(
            "Model loaded: image_size={}, grey_scale={}, dictionary_length={}",
            cfg.image_size, cfg.grey_scale, cfg.dictionary_length
        );
        Self::new(model.into(), cfg, device.clone())
    }

    pub fn config(&self) -> &ModelConfiguration {
        &self.cfg
    }

    /// Embed `message` into `image`. The result is the raw encoder
    /// output and may stray outside [0, 1].
    pub fn encode<R: Rng>(&self, image: &ImageTensor, message: &str, rng: &mut R) -> Result<ImageTensor> {
        let (h, w, c) = self.cfg.image_shape();

        // Validate the message first so a bad one never reaches the model
        let sentence = preprocess(message, self.cfg.sentence_length, &self.dictionary, rng)
            .context("Message cannot be embedded")?;
        let image = normalize(image, h, w, c)?;

        let batch = self.batcher.single(&image, &sentence);
        let embedded = self.model.encoder.forward(batch.images, batch.sentences);

        let chw: Vec<f32> = embedded
            .into_data()
            .to_vec()
            .map_err(|e| anyhow!("Cannot read embedded image: {e:?}"))?;
        Ok(ImageTensor::from_chw(h, w, c, &chw)?)
    }

    /// Recover the message from an image, without the pepper.
    pub fn decode_from_image(&self, image: &ImageTensor) -> Result<String> {
        let (h, w, c) = self.cfg.image_shape();
        let image = normalize(image, h, w, c)?;

        let predicted = self.model.decoder.predict(self.batcher.images(&[&image]));
        let codes: Vec<u32> = predicted
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| anyhow!("Cannot read predictions: {e:?}"))?
            .into_iter()
            .map(|code| code as u32)
            .collect();

        let decoded = decode_chars(&codes)?;
        let message = postprocess(&decoded, &self.dictionary);
        tracing::debug!(
            "Decoded {} positions, {} message characters",
            codes.len(),
            message.chars().count()
        );
        Ok(message)
    }

    pub fn decode_from_path(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let image = codec::read_image(path)
            .with_context(|| format!("Cannot read image '{}'", path.display()))?;
        self.decode_from_image(&image)
    }

    /// Read `src`, embed `message`, write the clipped result to `dst`.
    pub fn encode_to_path<R: Rng>(
        &self,
        src:     impl AsRef<Path>,
        message: &str,
        dst:     impl AsRef<Path>,
        rng:     &mut R,
    ) -> Result<ImageTensor> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        let image = codec::read_image(src)
            .with_context(|| format!("Cannot read image '{}'", src.display()))?;

        let embedded = self.encode(&image, message, rng)?.clipped();
        codec::write_image(dst, &embedded)
            .with_context(|| format!("Cannot write image '{}'", dst.display()))?;

        tracing::info!("Embedded {} characters into '{}'", message.chars().count(), dst.display());
        Ok(embedded)
    }
}
