use crate::config::PipelineConfig;

pub fn setup_logging(config: &PipelineConfig) {
    common::setup_logging(config.environment.clone());
}
