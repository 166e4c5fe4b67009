pub mod classes;
pub mod color;
pub mod decode;
pub mod error;
pub mod tensor;

// Re-export commonly used types for convenience
pub use classes::ClassTable;
pub use color::{Rgb, confidence_to_color};
pub use decode::{BoxRect, DEFAULT_THRESHOLD, Detection, ModelFamily, decode};
pub use error::DecodeError;
pub use tensor::{DisplayFrame, ModelResolution, RawTensor};
