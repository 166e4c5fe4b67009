pub mod config;
pub mod logging;
pub mod preprocess;
pub mod provider;
pub mod registry;
pub mod render;
pub mod service;
pub mod store;

// Re-export commonly used types for convenience
pub use config::PipelineConfig;
pub use provider::InferenceProvider;
pub use registry::{ModelEntry, ModelRegistry};
pub use render::{OverlayBox, RenderSink, TracingRender, overlay_plan};
pub use service::{DetectionSession, SessionHandle};
pub use store::{DetectedObject, DetectionStore, JsonlStore, MemoryStore, RecordId};
