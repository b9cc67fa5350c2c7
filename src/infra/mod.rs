// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// File persistence shared by training and inference:
//
//   checkpoint.rs — best weights (CompactRecorder) and the
//                   ModelConfiguration record (JSON), written
//                   atomically under one base path
//
//   metrics.rs    — per-epoch metrics appended to a CSV file

/// Model checkpoint and configuration saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
