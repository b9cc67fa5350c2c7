// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between raw pixels / random noise and tensors.
//
// Training:
//
//   SyntheticGenerator  → random (image, sentence) samples
//       │
//       ▼
//   StegoBatcher        → stacks samples into NCHW / Int tensors
//
// Inference:
//
//   codec::read_image   → file to ImageTensor
//       │
//       ▼
//   normalizer          → crop / pad to the canonical shape
//
// corruptor damages pixels on purpose for robustness probes.

/// Reads and writes raster files through the `image` crate
pub mod codec;

/// Crops and pads images into the model's canonical shape
pub mod normalizer;

/// Overwrites random pixels with a fixed colour
pub mod corruptor;

/// Endless stream of random training samples
pub mod generator;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
