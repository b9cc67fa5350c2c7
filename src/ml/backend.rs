// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// One place that decides which Burn backend the binary runs on.
//
//   default          NdArray (CPU)
//   --features wgpu  Wgpu (GPU)
//
// Training wraps the inference backend in Autodiff so gradients
// are tracked; `model.valid()` hands back the plain backend.

#[cfg(not(any(feature = "ndarray", feature = "wgpu")))]
compile_error!("enable the `ndarray` or the `wgpu` feature to pick a backend");

#[cfg(feature = "wgpu")]
pub type InferBackend = burn::backend::Wgpu;

#[cfg(all(feature = "ndarray", not(feature = "wgpu")))]
pub type InferBackend = burn::backend::NdArray;

pub type TrainBackend = burn::backend::Autodiff<InferBackend>;

pub type Device = <InferBackend as burn::tensor::backend::Backend>::Device;

pub fn default_device() -> Device {
    let device = Device::default();
    tracing::debug!("Using device: {:?}", device);
    device
}
