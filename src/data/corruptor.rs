// ============================================================
// Layer 4 — Pixel Corruptor
// ============================================================
// Overwrites a random share of pixels with a fixed colour, to see
// how much damage an embedded image can take before the decoder
// stops recovering the message.
//
// ⌊proportion · H · W⌋ positions are drawn with replacement, so
// the number of distinct damaged pixels can be smaller.

use rand::Rng;

use crate::domain::error::ImageError;
use crate::domain::image::ImageTensor;

pub fn corrupt<R: Rng>(
    image:      &ImageTensor,
    proportion: f64,
    value:      &[f32],
    rng:        &mut R,
) -> Result<ImageTensor, ImageError> {
    if !(0.0..=1.0).contains(&proportion) {
        return Err(ImageError::InvalidProportion(proportion));
    }
    if value.len() != image.channels() {
        return Err(ImageError::CorruptValue { expected: image.channels(), actual: value.len() });
    }

    let mut out = image.clone();
    let (h, w, _) = image.shape();
    if h == 0 || w == 0 {
        return Ok(out);
    }
    let count = (proportion * (h * w) as f64) as usize;

    for _ in 0..count {
        let row = rng.gen_range(0..h);
        let col = rng.gen_range(0..w);
        out.pixel_mut(row, col).copy_from_slice(value);
    }

    tracing::debug!("Corrupted {} pixel draws of {}x{}", count, h, w);
    Ok(out)
}
