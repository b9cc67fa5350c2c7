// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model, optimiser and backend code lives here.
//
//   backend.rs    — picks NdArray or Wgpu, plus the Autodiff wrapper
//
//   model.rs      — the joint encoder / decoder network and its loss
//
//   observer.rs   — end-of-epoch hooks: best checkpoint, threshold stop
//
//   trainer.rs    — the training loop over synthetic batches
//
//   inferencer.rs — StegoCodec: embed and extract messages with a
//                   trained model

/// Backend type aliases and device selection
pub mod backend;

/// Joint steganography model architecture
pub mod model;

/// BestCheckpoint and ThresholdStop observers
pub mod observer;

/// Training loop with observers and metrics logging
pub mod trainer;

/// Inference engine — loads a checkpoint, encodes and decodes messages
pub mod inferencer;
