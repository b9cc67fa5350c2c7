// ============================================================
// Layer 4 — Stego Batcher
// ============================================================
// Implements Burn's Batcher trait to turn Vec<StegoSample> into
// tensors for the joint model.
//
//   images    [N, H·W·C] HWC floats → [N, C, H, W] (NCHW for Conv2d)
//   sentences [N, L] code points    → [N, L] Int
//
// All samples share one shape, so batching is flatten + reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::generator::StegoSample;
use crate::domain::image::{hwc_to_chw, ImageTensor};

// ─── StegoBatch ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct StegoBatch<B: Backend> {
    /// Shape [batch_size, channels, height, width]
    pub images: Tensor<B, 4>,

    /// Shape [batch_size, sentence_length]
    pub sentences: Tensor<B, 2, Int>,
}

// ─── StegoBatcher ─────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct StegoBatcher<B: Backend> {
    pub device:   B::Device,
    pub height:   usize,
    pub width:    usize,
    pub channels: usize,
}

impl<B: Backend> StegoBatcher<B> {
    pub fn new(device: B::Device, height: usize, width: usize, channels: usize) -> Self {
        Self { device, height, width, channels }
    }

    /// Build a one-image batch, e.g. for inference.
    pub fn single(&self, image: &ImageTensor, sentence: &[u32]) -> StegoBatch<B> {
        self.batch(vec![StegoSample {
            image:    image.data().to_vec(),
            sentence: sentence.to_vec(),
        }])
    }

    /// Images only, [N, C, H, W].
    pub fn images(&self, images: &[&ImageTensor]) -> Tensor<B, 4> {
        let flat: Vec<f32> = images.iter().flat_map(|img| img.to_chw()).collect();
        Tensor::<B, 4>::from_data(
            TensorData::new(flat, [images.len(), self.channels, self.height, self.width]),
            &self.device,
        )
    }
}

impl<B: Backend> Batcher<StegoSample, StegoBatch<B>> for StegoBatcher<B> {
    fn batch(&self, items: Vec<StegoSample>) -> StegoBatch<B> {
        let batch_size = items.len();
        let seq_len    = items[0].sentence.len();

        // ── HWC → CHW per sample, then stack ─────────────────────────────────
        let image_flat: Vec<f32> = items
            .iter()
            .flat_map(|s| hwc_to_chw(&s.image, self.channels))
            .collect();

        // Burn Int tensors are built from i32 slices
        let sentence_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.sentence.iter().map(|&x| x as i32))
            .collect();

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(image_flat, [batch_size, self.channels, self.height, self.width]),
            &self.device,
        );

        let sentences = Tensor::<B, 1, Int>::from_ints(
            sentence_flat.as_slice(), &self.device
        ).reshape([batch_size, seq_len]);

        StegoBatch { images, sentences }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::backend::InferBackend;

    #[test]
    fn test_batch_shapes_and_layout() {
        let device = Default::default();
        let batcher = StegoBatcher::<InferBackend>::new(device, 1, 2, 3);

        // One 1x2 RGB image: px0 = (1,2,3), px1 = (4,5,6)
        let items = vec![
            StegoSample { image: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], sentence: vec![7, 8] },
            StegoSample { image: vec![0.0; 6], sentence: vec![9, 1] },
        ];
        let batch = batcher.batch(items);

        assert_eq!(batch.images.dims(), [2, 3, 1, 2]);
        assert_eq!(batch.sentences.dims(), [2, 2]);

        let pixels: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        assert_eq!(&pixels[..6], &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);

        let codes: Vec<i64> = batch
            .sentences
            .into_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(codes, vec![7, 8, 9, 1]);
    }

    #[test]
    fn test_batch_matches_image_layout() {
        let device = Default::default();
        let batcher = StegoBatcher::<InferBackend>::new(device, 2, 2, 3);
        let image = ImageTensor::from_chw(2, 2, 3, &(0..12).map(|v| v as f32).collect::<Vec<_>>()).unwrap();

        let batch = batcher.single(&image, &[1, 2]);
        let pixels: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        assert_eq!(pixels, image.to_chw());
    }
}
