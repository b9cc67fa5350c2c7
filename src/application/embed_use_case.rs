// ============================================================
// Layer 2 — EmbedUseCase
// ============================================================
// Loads a trained checkpoint once, then embeds messages into
// image files or extracts them again.
//
//   Step 1: Load config + weights   (Layer 6 - infra)
//   Step 2: Encode or decode        (Layer 5 - ml)

use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use std::path::Path;

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::backend::{default_device, InferBackend};
use crate::ml::inferencer::StegoCodec;

pub struct EmbedUseCase {
    codec: StegoCodec<InferBackend>,
}

impl EmbedUseCase {
    /// Load the checkpoint stored under `checkpoint`.
    pub fn new(checkpoint: impl AsRef<Path>) -> Result<Self> {
        let ckpt_manager = CheckpointManager::new(checkpoint.as_ref());
        let codec = StegoCodec::from_checkpoint(&ckpt_manager, &default_device())?;
        Ok(Self { codec })
    }

    /// Hide `message` in the image at `src` and write the result to `dst`.
    /// A seed makes the pepper placement reproducible.
    pub fn embed(
        &self,
        src:     impl AsRef<Path>,
        message: &str,
        dst:     impl AsRef<Path>,
        seed:    Option<u64>,
    ) -> Result<()> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.codec.encode_to_path(src, message, dst, &mut rng)?;
        Ok(())
    }

    /// Read a message back out of the image at `path`.
    pub fn extract(&self, path: impl AsRef<Path>) -> Result<String> {
        self.codec.decode_from_path(path)
    }
}
