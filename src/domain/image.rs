// ============================================================
// Layer 3 — Image Tensor
// ============================================================
// A plain (height, width, channels) pixel buffer, row-major HWC,
// values nominally in [0, 1]. Model outputs use the same type and
// may leave that range until `clipped()` is called.

use crate::domain::error::ImageError;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    height:   usize,
    width:    usize,
    channels: usize,
    data:     Vec<f32>,
}

impl ImageTensor {
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<f32>) -> Result<Self, ImageError> {
        let expected = height * width * channels;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                height, width, channels, expected, actual: data.len(),
            });
        }
        Ok(Self { height, width, channels, data })
    }

    /// An image with every channel of every pixel set from `color`.
    pub fn filled(height: usize, width: usize, color: &[f32]) -> Self {
        let channels = color.len();
        let mut data = Vec::with_capacity(height * width * channels);
        for _ in 0..height * width {
            data.extend_from_slice(color);
        }
        Self { height, width, channels, data }
    }

    pub fn height(&self) -> usize { self.height }
    pub fn width(&self) -> usize { self.width }
    pub fn channels(&self) -> usize { self.channels }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> f32 {
        self.data[self.index(row, col, channel)]
    }

    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: f32) {
        let i = self.index(row, col, channel);
        self.data[i] = value;
    }

    /// All channel values of one pixel.
    pub fn pixel(&self, row: usize, col: usize) -> &[f32] {
        let start = self.index(row, col, 0);
        &self.data[start..start + self.channels]
    }

    pub fn pixel_mut(&mut self, row: usize, col: usize) -> &mut [f32] {
        let start = self.index(row, col, 0);
        &mut self.data[start..start + self.channels]
    }

    /// Copy with every value clamped into [0, 1]; NaN maps to 0.
    pub fn clipped(&self) -> Self {
        let data = self
            .data
            .iter()
            .map(|&v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) })
            .collect();
        Self { data, ..*self }
    }

    /// Channel-major copy of the pixels (CHW), the layout burn's conv layers take.
    pub fn to_chw(&self) -> Vec<f32> {
        hwc_to_chw(&self.data, self.channels)
    }

    /// Build an image from a channel-major (CHW) buffer.
    pub fn from_chw(height: usize, width: usize, channels: usize, chw: &[f32]) -> Result<Self, ImageError> {
        let expected = height * width * channels;
        if chw.len() != expected {
            return Err(ImageError::BufferSize {
                height, width, channels, expected, actual: chw.len(),
            });
        }
        let plane = height * width;
        let mut data = vec![0.0; expected];
        for c in 0..channels {
            for i in 0..plane {
                data[i * channels + c] = chw[c * plane + i];
            }
        }
        Ok(Self { height, width, channels, data })
    }

    fn index(&self, row: usize, col: usize, channel: usize) -> usize {
        (row * self.width + col) * self.channels + channel
    }
}

/// Reorder an interleaved HWC buffer into channel planes.
pub fn hwc_to_chw(hwc: &[f32], channels: usize) -> Vec<f32> {
    let mut out = vec![0.0; hwc.len()];
    let plane = hwc.len() / channels;
    for (i, px) in hwc.chunks_exact(channels).enumerate() {
        for (c, &v) in px.iter().enumerate() {
            out[c * plane + i] = v;
        }
    }
    out
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_buffer_size() {
        assert!(matches!(
            ImageTensor::new(2, 2, 3, vec![0.0; 11]),
            Err(ImageError::BufferSize { expected: 12, actual: 11, .. })
        ));
    }

    #[test]
    fn test_clipped_bounds_values() {
        let img = ImageTensor::new(1, 2, 1, vec![-0.5, 1.7]).unwrap();
        assert_eq!(img.clipped().data(), &[0.0, 1.0]);
    }

    #[test]
    fn test_chw_layout() {
        // 1x2 image, 3 channels: px0 = (1,2,3), px1 = (4,5,6)
        let img = ImageTensor::new(1, 2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let chw = img.to_chw();
        assert_eq!(chw, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
        assert_eq!(ImageTensor::from_chw(1, 2, 3, &chw).unwrap(), img);
    }

    #[test]
    fn test_pixel_accessors() {
        let mut img = ImageTensor::filled(2, 2, &[0.25, 0.5]);
        img.set(1, 0, 1, 0.9);
        assert_eq!(img.pixel(1, 0), &[0.25, 0.9]);
        assert_eq!(img.get(0, 1, 0), 0.25);
    }
}
