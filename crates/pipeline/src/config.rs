use std::env;

pub use common::Environment;
use decoder::{DEFAULT_THRESHOLD, DisplayFrame};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub environment: Environment,
    pub model_dir: String,
    pub model_index: usize,
    pub confidence_threshold: f32,
    pub display: DisplayFrame,
    pub detections_path: String,
    pub frames_dir: String,
}

impl PipelineConfig {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let environment = Environment::from_env();

        let model_dir = env::var("MODEL_DIR").unwrap_or_else(|_| "models".to_string());

        let model_index = env::var("MODEL_INDEX")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let confidence_threshold = env::var("CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_THRESHOLD);

        let display_width = env::var("DISPLAY_WIDTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(640);

        let display_height = env::var("DISPLAY_HEIGHT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(480);

        let detections_path =
            env::var("DETECTIONS_PATH").unwrap_or_else(|_| "detections.jsonl".to_string());

        let frames_dir = env::var("FRAMES_DIR").unwrap_or_else(|_| "frames".to_string());

        Ok(Self {
            environment,
            model_dir,
            model_index,
            confidence_threshold,
            display: DisplayFrame::new(display_width, display_height),
            detections_path,
            frames_dir,
        })
    }

    /// Create default configuration for testing
    #[cfg(test)]
    pub fn test_default() -> Self {
        Self {
            environment: Environment::Development,
            model_dir: "models".to_string(),
            model_index: 1,
            confidence_threshold: DEFAULT_THRESHOLD,
            display: DisplayFrame::new(640, 480),
            detections_path: "detections.jsonl".to_string(),
            frames_dir: "frames".to_string(),
        }
    }
}
