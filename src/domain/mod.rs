// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust types and rules of the system:
//
//   dictionary     — code-point alphabet and its pepper range
//   sentence       — text ↔ code points, pepper padding protocol
//   image          — (H, W, C) pixel buffer
//   model_config   — the persisted shape record
//   epoch_metrics  — per-epoch training numbers
//   traits         — observer and checkpoint capabilities
//   error          — typed failures
//
// No burn types and no file I/O in this layer.

pub mod dictionary;
pub mod sentence;
pub mod image;
pub mod model_config;
pub mod epoch_metrics;
pub mod traits;
pub mod error;
