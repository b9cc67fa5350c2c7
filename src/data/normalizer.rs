// ============================================================
// Layer 4 — Image Normalizer
// ============================================================
// Fits an arbitrary image into the canonical (H, W, C) shape
// a trained model expects.
//
//   1. Crop any axis that is too long, keeping the origin side
//   2. Average the cropped pixels per channel
//   3. Fill an (H, W, C) buffer with that average colour
//   4. Paste the cropped image centred into the buffer
//
// Example, canonical 4x4, source 2 rows x 7 cols:
//
//   source     crop cols → 2x4     centred (offset 1, 0)
//   abcdefg    abcd                . . . .
//   hijklmn    hijk                a b c d
//                                  h i j k
//                                  . . . .      (. = average colour)
//
// Offsets use floor division, so an odd leftover row or column
// of padding ends up on the bottom / right side.

use crate::domain::error::ImageError;
use crate::domain::image::ImageTensor;

pub fn normalize(
    source:   &ImageTensor,
    height:   usize,
    width:    usize,
    channels: usize,
) -> Result<ImageTensor, ImageError> {
    let (src_h, src_w, src_c) = source.shape();
    if src_h == 0 || src_w == 0 || src_c == 0 {
        return Err(ImageError::EmptyImage { height: src_h, width: src_w, channels: src_c });
    }
    if src_c < channels {
        return Err(ImageError::ChannelMismatch { expected: channels, actual: src_c });
    }

    // ── Step 1: crop from the origin ────────────────────────────────────────
    let crop_h = src_h.min(height);
    let crop_w = src_w.min(width);

    // ── Step 2: average colour of the cropped region ────────────────────────
    let average = average_color(source, crop_h, crop_w, channels);

    // ── Step 3 + 4: fill, then paste centred ────────────────────────────────
    let mut out = ImageTensor::filled(height, width, &average);
    let offset_h = (height - crop_h) / 2;
    let offset_w = (width - crop_w) / 2;

    for row in 0..crop_h {
        for col in 0..crop_w {
            let src = &source.pixel(row, col)[..channels];
            out.pixel_mut(offset_h + row, offset_w + col).copy_from_slice(src);
        }
    }

    tracing::trace!(
        "Normalized {}x{}x{} → {}x{}x{} (offset {}, {})",
        src_h, src_w, src_c, height, width, channels, offset_h, offset_w
    );
    Ok(out)
}

/// Per-channel mean over the top-left `rows x cols` block, first `channels` only.
fn average_color(image: &ImageTensor, rows: usize, cols: usize, channels: usize) -> Vec<f32> {
    let mut sums = vec![0.0f64; channels];
    for row in 0..rows {
        for col in 0..cols {
            for (sum, &v) in sums.iter_mut().zip(image.pixel(row, col)) {
                *sum += v as f64;
            }
        }
    }
    let count = (rows * cols) as f64;
    sums.into_iter().map(|s| (s / count) as f32).collect()
}
