use crate::decode::ModelFamily;
use thiserror::Error;

/// Failure modes of a decode call.
///
/// All of these are recoverable per frame: a live loop logs the error,
/// renders a placeholder, and keeps going. Row-level problems (NaN values,
/// out-of-range class ids) never surface here; those rows are dropped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("tensor is missing or has an empty shape")]
    InvalidInput,
    #[error("model resolution {width}x{height} must be positive in both dimensions")]
    InvalidConfiguration { width: u32, height: u32 },
    #[error("tensor shape {shape:?} does not match the {family:?} row layout")]
    UnsupportedShape {
        family: ModelFamily,
        shape: Vec<usize>,
    },
    #[error("no decoder registered for model identifier `{identifier}`")]
    UnsupportedModel { identifier: String },
}
