// ============================================================
// Layer 2 — CorruptUseCase
// ============================================================
// Damages an image file on purpose, to probe how much corruption
// an embedded message survives.
//
//   Step 1: Read the image        (Layer 4 - data)
//   Step 2: Overwrite pixels      (Layer 4 - data)
//   Step 3: Write the result      (Layer 4 - data)

use anyhow::{bail, Context, Result};
use rand::{rngs::StdRng, SeedableRng};
use std::path::Path;

use crate::data::{codec, corruptor};

#[derive(Debug, Clone)]
pub struct CorruptUseCase {
    proportion: f64,
    /// One value per channel, or a single value for all of them
    value:      Vec<f32>,
    seed:       Option<u64>,
}

impl CorruptUseCase {
    pub fn new(proportion: f64, value: Vec<f32>, seed: Option<u64>) -> Self {
        Self { proportion, value, seed }
    }

    /// Returns how many pixel overwrites were performed.
    pub fn execute(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<usize> {
        let (src, dst) = (src.as_ref(), dst.as_ref());
        let image = codec::read_image(src)
            .with_context(|| format!("Cannot read image '{}'", src.display()))?;

        let value = match self.value.as_slice() {
            [v] => vec![*v; image.channels()],
            values if values.len() == image.channels() => values.to_vec(),
            values => bail!(
                "{} corruption value(s) given, '{}' has {} channels",
                values.len(), src.display(), image.channels()
            ),
        };

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let corrupted = corruptor::corrupt(&image, self.proportion, &value, &mut rng)?;
        codec::write_image(dst, &corrupted)
            .with_context(|| format!("Cannot write image '{}'", dst.display()))?;

        let count = (self.proportion * (image.height() * image.width()) as f64) as usize;
        tracing::info!("Corrupted {} pixel draws of '{}' into '{}'", count, src.display(), dst.display());
        Ok(count)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::ImageTensor;

    #[test]
    fn test_corrupts_file_with_broadcast_value() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.png");
        let dst = dir.path().join("out.png");
        codec::write_image(&src, &ImageTensor::filled(10, 10, &[0.0, 0.0, 0.0])).unwrap();

        let count = CorruptUseCase::new(0.3, vec![1.0], Some(4)).execute(&src, &dst).unwrap();
        assert_eq!(count, 30);

        let out = codec::read_image(&dst).unwrap();
        let white = (0..10)
            .flat_map(|r| (0..10).map(move |c| (r, c)))
            .filter(|&(r, c)| out.pixel(r, c) == [1.0, 1.0, 1.0])
            .count();
        assert!(white > 0 && white <= 30);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.png");
        codec::write_image(&src, &ImageTensor::filled(4, 4, &[0.5, 0.5, 0.5])).unwrap();
        let dst = dir.path().join("out.png");

        assert!(CorruptUseCase::new(1.5, vec![0.0], None).execute(&src, &dst).is_err());
        assert!(CorruptUseCase::new(0.5, vec![0.0, 1.0], None).execute(&src, &dst).is_err());
        assert!(!dst.exists());
    }
}
