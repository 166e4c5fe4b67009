use super::InferenceProvider;
use decoder::RawTensor;
use ndarray::{Array, IxDyn};
use ort::{
    session::{Session, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use std::path::Path;

/// ONNX Runtime backed provider. Holds one session per loaded model; the
/// caller builds a new provider when it switches models.
pub struct OrtProvider {
    session: Session,
    input_name: String,
    output_name: String,
}

impl OrtProvider {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        // Initialize ORT environment (idempotent)
        let _ = ort::init().commit();

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| anyhow::anyhow!("model declares no inputs"))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| anyhow::anyhow!("model declares no outputs"))?;

        tracing::info!(path = %path.display(), "Model loaded");
        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }
}

impl InferenceProvider for OrtProvider {
    fn infer(&mut self, input: &Array<f32, IxDyn>) -> anyhow::Result<Option<RawTensor>> {
        let outputs = self.session.run(ort::inputs![
            self.input_name.as_str() => TensorRef::from_array_view(input.view())?
        ])?;

        let raw = outputs[self.output_name.as_str()].try_extract_array::<f32>()?;

        Ok(Some(RawTensor::from_array(raw.into_owned())))
    }
}
