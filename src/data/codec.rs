// ============================================================
// Layer 4 — Raster Image Codec
// ============================================================
// Thin adapter over the `image` crate.
//
//   read_image  : file → ImageTensor, f32 in [0, 1], 3 channels
//   write_image : ImageTensor → 8-bit file (format from extension)
//
// Values are clipped to [0, 1] before writing, so model output
// can be passed in directly.

use std::path::Path;

use image::{ColorType, DynamicImage};

use crate::domain::error::ImageError;
use crate::domain::image::ImageTensor;

/// Decode any supported raster file into an RGB tensor.
/// Greyscale sources are expanded to three equal channels.
pub fn read_image(path: impl AsRef<Path>) -> Result<ImageTensor, ImageError> {
    let path = path.as_ref();
    let img: DynamicImage = image::open(path)?;
    let rgb = img.to_rgb32f();
    let (width, height) = rgb.dimensions();

    tracing::debug!("Read {}x{} image from '{}'", width, height, path.display());
    ImageTensor::new(height as usize, width as usize, 3, rgb.into_raw())
}

/// Encode a tensor with 1 or 3 channels to disk.
pub fn write_image(path: impl AsRef<Path>, tensor: &ImageTensor) -> Result<(), ImageError> {
    let path = path.as_ref();
    let color = match tensor.channels() {
        1 => ColorType::L8,
        3 => ColorType::Rgb8,
        n => return Err(ImageError::ChannelMismatch { expected: 3, actual: n }),
    };

    let bytes = to_bytes(&tensor.clipped());
    image::save_buffer(
        path,
        &bytes,
        tensor.width() as u32,
        tensor.height() as u32,
        color,
    )?;

    tracing::debug!(
        "Wrote {}x{}x{} image to '{}'",
        tensor.height(), tensor.width(), tensor.channels(), path.display()
    );
    Ok(())
}

/// [0, 1] floats → 0..=255 bytes, rounded to nearest.
fn to_bytes(tensor: &ImageTensor) -> Vec<u8> {
    tensor
        .data()
        .iter()
        .map(|&v| (v * 255.0).round() as u8)
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_round_trip_within_quantisation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("round.png");

        let data: Vec<f32> = (0..4 * 3 * 3).map(|i| i as f32 / 35.0).collect();
        let img = ImageTensor::new(4, 3, 3, data).unwrap();
        write_image(&path, &img).unwrap();

        let back = read_image(&path).unwrap();
        assert_eq!(back.shape(), (4, 3, 3));
        for (a, b) in img.data().iter().zip(back.data()) {
            assert!((a - b).abs() <= 0.5 / 255.0 + 1e-6);
        }
    }

    #[test]
    fn test_out_of_range_values_are_clipped_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.png");

        let img = ImageTensor::new(1, 2, 1, vec![-3.0, 2.5]).unwrap();
        write_image(&path, &img).unwrap();

        let back = read_image(&path).unwrap();
        assert_eq!(back.pixel(0, 0), &[0.0, 0.0, 0.0]);
        assert_eq!(back.pixel(0, 1), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_missing_file_is_a_codec_error() {
        assert!(matches!(read_image("/definitely/not/here.png"), Err(ImageError::Codec(_))));
    }
}
