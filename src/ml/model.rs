// ============================================================
// Layer 5 — Joint Embedding Model (Burn)
// ============================================================
// Encoder: hides a sentence in an image.
//
//   sentence [B, L] ─► Embedding(D → L) ─► [B, L, L] ─► [B, 1, H, W]  (sentence plane)
//   image [B, C, H, W] ─► Conv2d 1×1 (C → 20) + ReLU ─► [B, 20, H, W]
//   concat on channels ─► [B, 21, H, W] ─► Conv2d 1×1 (21 → C) + ReLU ─► embedded image
//
// Decoder: reads it back.
//
//   embedded [B, C, H, W] ─► Conv2d 1×1 (C → 1) ─► [B, L, L] ─► Linear(L → D) per row ─► [B, L, D]
//
// Every convolution is 1×1, so an output pixel only depends on the
// pixel at the same coordinate and on the sentence-plane value there.
// H = W = L throughout.

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation,
};

use crate::domain::error::ConfigError;
use crate::domain::model_config::ModelConfiguration;

/// Width of the learned per-pixel image projection.
pub const PROJECTION_CHANNELS: usize = 20;

#[derive(Config, Debug)]
pub struct JointModelConfig {
    /// Side length of the square image, also the sentence length
    pub image_size: usize,
    /// 1 for greyscale, 3 for colour
    pub channels: usize,
    pub dictionary_length: usize,
    #[config(default = 20)]
    pub projection_channels: usize,
}

impl JointModelConfig {
    pub fn from_configuration(cfg: &ModelConfiguration) -> Self {
        Self::new(cfg.image_size, cfg.channels(), cfg.dictionary_length)
            .with_projection_channels(PROJECTION_CHANNELS)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> JointModel<B> {
        let l = self.image_size;

        let encoder = ImageEncoder {
            sentence_embedding: EmbeddingConfig::new(self.dictionary_length, l).init(device),
            image_projection: Conv2dConfig::new([self.channels, self.projection_channels], [1, 1])
                .init(device),
            merge: Conv2dConfig::new([self.projection_channels + 1, self.channels], [1, 1])
                .init(device),
        };

        let decoder = SentenceDecoder {
            reduce:     Conv2dConfig::new([self.channels, 1], [1, 1]).init(device),
            classifier: LinearConfig::new(l, self.dictionary_length).init(device),
        };

        JointModel { encoder, decoder }
    }
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct ImageEncoder<B: Backend> {
    pub sentence_embedding: Embedding<B>,
    pub image_projection:   Conv2d<B>,
    pub merge:              Conv2d<B>,
}

impl<B: Backend> ImageEncoder<B> {
    /// images: [batch, C, H, W], sentences: [batch, L] → embedded [batch, C, H, W]
    pub fn forward(&self, images: Tensor<B, 4>, sentences: Tensor<B, 2, Int>) -> Tensor<B, 4> {
        let [batch_size, _, height, width] = images.dims();

        // Row h of the plane is the embedding of the code point at position h
        let plane = self
            .sentence_embedding
            .forward(sentences)
            .reshape([batch_size, 1, height, width]);

        let projected = activation::relu(self.image_projection.forward(images));
        let merged = Tensor::cat(vec![plane, projected], 1);
        activation::relu(self.merge.forward(merged))
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct SentenceDecoder<B: Backend> {
    pub reduce:     Conv2d<B>,
    pub classifier: Linear<B>,
}

impl<B: Backend> SentenceDecoder<B> {
    /// embedded: [batch, C, H, W] → logits [batch, L, D]
    pub fn forward(&self, embedded: Tensor<B, 4>) -> Tensor<B, 3> {
        let [batch_size, _, height, width] = embedded.dims();
        let field = self.reduce.forward(embedded).reshape([batch_size, height, width]);
        // Linear acts on the last axis, i.e. independently on each of the L rows
        self.classifier.forward(field)
    }

    /// Per-position categorical distribution over the dictionary.
    pub fn probabilities(&self, embedded: Tensor<B, 4>) -> Tensor<B, 3> {
        activation::softmax(self.forward(embedded), 2)
    }

    /// Most likely code point per position, [batch, L].
    pub fn predict(&self, embedded: Tensor<B, 4>) -> Tensor<B, 2, Int> {
        let logits = self.forward(embedded);
        let [batch_size, seq_len, _] = logits.dims();
        logits.argmax(2).reshape([batch_size, seq_len])
    }
}

// ─── Joint model ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct JointModel<B: Backend> {
    pub encoder: ImageEncoder<B>,
    pub decoder: SentenceDecoder<B>,
}

pub struct JointOutput<B: Backend> {
    pub embedded: Tensor<B, 4>,
    pub logits:   Tensor<B, 3>,
}

pub struct JointLoss<B: Backend> {
    /// image_loss + sentence_loss, the tensor to call backward() on
    pub loss:          Tensor<B, 1>,
    pub image_loss:    Tensor<B, 1>,
    pub sentence_loss: Tensor<B, 1>,
    pub output:        JointOutput<B>,
}

impl<B: Backend> JointModel<B> {
    pub fn forward(&self, images: Tensor<B, 4>, sentences: Tensor<B, 2, Int>) -> JointOutput<B> {
        let embedded = self.encoder.forward(images, sentences);
        let logits = self.decoder.forward(embedded.clone());
        JointOutput { embedded, logits }
    }

    pub fn forward_loss(&self, images: Tensor<B, 4>, sentences: Tensor<B, 2, Int>) -> JointLoss<B> {
        let output = self.forward(images.clone(), sentences.clone());
        let [batch_size, seq_len, dict_len] = output.logits.dims();

        // Mean absolute error keeps the perturbation small
        let image_loss = (output.embedded.clone() - images).abs().mean();

        // Cross-entropy over every (sample, position) pair
        let ce = CrossEntropyLossConfig::new().init(&output.logits.device());
        let sentence_loss = ce.forward(
            output.logits.clone().reshape([batch_size * seq_len, dict_len]),
            sentences.reshape([batch_size * seq_len]),
        );

        let loss = image_loss.clone() + sentence_loss.clone();
        JointLoss { loss, image_loss, sentence_loss, output }
    }

    /// Compare parameter shapes with what `cfg` implies.
    pub fn check_shapes(&self, cfg: &ModelConfiguration) -> Result<(), ConfigError> {
        let (l, c, d) = (cfg.image_size, cfg.channels(), cfg.dictionary_length);
        let p = PROJECTION_CHANNELS;

        let checks: [(&'static str, Vec<usize>, Vec<usize>); 5] = [
            ("encoder.sentence_embedding", vec![d, l],
                self.encoder.sentence_embedding.weight.val().dims().to_vec()),
            ("encoder.image_projection", vec![p, c, 1, 1],
                self.encoder.image_projection.weight.val().dims().to_vec()),
            ("encoder.merge", vec![c, p + 1, 1, 1],
                self.encoder.merge.weight.val().dims().to_vec()),
            ("decoder.reduce", vec![1, c, 1, 1],
                self.decoder.reduce.weight.val().dims().to_vec()),
            ("decoder.classifier", vec![l, d],
                self.decoder.classifier.weight.val().dims().to_vec()),
        ];

        for (parameter, expected, actual) in checks {
            if expected != actual {
                return Err(ConfigError::Mismatch { parameter, expected, actual });
            }
        }
        Ok(())
    }
}

/// Fraction of positions where the arg-max code point equals the target.
pub fn sentence_accuracy<B: Backend>(logits: Tensor<B, 3>, sentences: Tensor<B, 2, Int>) -> f64 {
    let [batch_size, seq_len, _] = logits.dims();
    let predicted = logits.argmax(2).reshape([batch_size, seq_len]);
    let correct: i64 = predicted
        .equal(sentences)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct as f64 / (batch_size * seq_len).max(1) as f64
}
