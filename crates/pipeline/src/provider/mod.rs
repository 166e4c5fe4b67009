use decoder::RawTensor;
use ndarray::{Array, IxDyn};

#[cfg(feature = "ort-backend")]
pub mod ort;

/// Source of raw detection tensors.
///
/// `Ok(None)` is the "no output" signal: inference ran but produced nothing
/// usable. The session renders a placeholder for that frame and keeps the
/// loop alive. Timeouts and cancellation of the underlying call are the
/// provider's concern, not the decoder's.
pub trait InferenceProvider {
    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<Option<RawTensor>>;
}
