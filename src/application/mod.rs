// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer wires the other layers together for one goal each:
// training, embedding/extracting, or corrupting an image.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination and anyhow context

// The training workflow
pub mod train_use_case;

// Embed a message into an image file, or extract it again
pub mod embed_use_case;

// Pixel corruption for robustness probes
pub mod corrupt_use_case;
