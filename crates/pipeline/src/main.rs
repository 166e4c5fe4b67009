use decoder::ClassTable;
use pipeline::{
    DetectionSession, JsonlStore, ModelRegistry, PipelineConfig, TracingRender,
    logging::setup_logging, provider::ort::OrtProvider,
};
use std::path::{Path, PathBuf};

fn main() -> anyhow::Result<()> {
    let config = PipelineConfig::from_env()?;
    setup_logging(&config);

    tracing::info!(
        config = ?config,
        "Loaded configuration"
    );

    let mut registry = ModelRegistry::default_set()?;
    if !registry.select(config.model_index) {
        anyhow::bail!(
            "MODEL_INDEX {} is out of range for {} registered models",
            config.model_index,
            registry.len()
        );
    }
    let entry = registry.active().clone();

    tracing::info!(model = %entry.identifier, "Loading inference model");
    let model_path = Path::new(&config.model_dir).join(&entry.identifier);
    let provider = OrtProvider::load(&model_path)?;
    tracing::info!("Model loaded successfully");

    let frames = load_frames(&config.frames_dir)?;
    let store = JsonlStore::create(Path::new(&config.detections_path))?;

    let mut session = DetectionSession::new(
        provider,
        TracingRender,
        store,
        registry,
        ClassTable::coco(),
        config,
    );
    session.run(frames)
}

fn load_frames(dir: &str) -> anyhow::Result<Vec<image::RgbImage>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|ext| ext.to_str()),
                Some("jpg" | "jpeg" | "png")
            )
        })
        .collect();
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in &paths {
        frames.push(image::open(path)?.to_rgb8());
    }

    tracing::info!(count = frames.len(), dir, "Loaded input frames");
    Ok(frames)
}
