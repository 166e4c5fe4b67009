use crate::{
    config::PipelineConfig,
    preprocess::preprocess_image,
    provider::InferenceProvider,
    registry::ModelRegistry,
    render::{RenderSink, overlay_plan},
    store::{DetectedObject, DetectionStore},
};
use decoder::{ClassTable, DecodeError, decode};
use image::RgbImage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Cancellation handle for a running session. Cloned out to whoever owns
/// the consuming surface; flipping it stops the loop between frames.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    active: Arc<AtomicBool>,
}

impl SessionHandle {
    fn new() -> Self {
        Self {
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Drives capture output through inference, decoding, rendering, and
/// persistence, one frame at a time.
///
/// The loop is synchronous, so there is never more than one inference in
/// flight per session. Every per-frame failure (provider errors, missing
/// output, rejected tensors) downgrades to a placeholder render and a log
/// line; nothing a single frame does can end the loop.
pub struct DetectionSession<P, R, S> {
    provider: P,
    render: R,
    store: S,
    registry: ModelRegistry,
    classes: ClassTable,
    config: PipelineConfig,
    handle: SessionHandle,
    frames_processed: u64,
    total_detections: u64,
}

impl<P, R, S> DetectionSession<P, R, S>
where
    P: InferenceProvider,
    R: RenderSink,
    S: DetectionStore,
{
    pub fn new(
        provider: P,
        render: R,
        store: S,
        registry: ModelRegistry,
        classes: ClassTable,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            render,
            store,
            registry,
            classes,
            config,
            handle: SessionHandle::new(),
            frames_processed: 0,
            total_detections: 0,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn total_detections(&self) -> u64 {
        self.total_detections
    }

    pub fn render_sink(&self) -> &R {
        &self.render
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn run<I>(&mut self, frames: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = RgbImage>,
    {
        tracing::info!(
            model = %self.registry.active().identifier,
            "Detection session starting"
        );

        for frame in frames {
            if !self.handle.is_active() {
                tracing::info!("Session cancelled, stopping frame loop");
                break;
            }

            let start = Instant::now();
            self.process_frame(&frame);
            self.frames_processed += 1;

            if self.frames_processed.is_multiple_of(10) {
                tracing::debug!(
                    frames_processed = self.frames_processed,
                    total_detections = self.total_detections,
                    last_frame_ms = start.elapsed().as_millis() as u64,
                    "Frame processed"
                );
            }
        }

        tracing::info!(
            frames_processed = self.frames_processed,
            total_detections = self.total_detections,
            "Detection session finished"
        );
        Ok(())
    }

    fn process_frame(&mut self, frame: &RgbImage) {
        let entry = self.registry.active().clone();

        let input = match preprocess_image(frame, entry.resolution) {
            Ok(input) => input,
            Err(e) => {
                tracing::error!(error = %e, "Failed to preprocess frame");
                self.render.placeholder("no detections");
                return;
            }
        };

        let tensor = match self.provider.infer(&input) {
            Ok(Some(tensor)) => tensor,
            Ok(None) => {
                tracing::debug!(model = %entry.identifier, "Inference produced no output");
                self.render.placeholder("no detections");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Inference failed");
                self.render.placeholder("no detections");
                return;
            }
        };

        match decode(
            &tensor,
            entry.family,
            entry.resolution,
            self.config.display,
            &self.classes,
            self.config.confidence_threshold,
        ) {
            Ok(detections) => {
                self.total_detections += detections.len() as u64;
                let plan = overlay_plan(&detections);
                self.render.render(&plan);

                if !detections.is_empty() {
                    let items: Vec<DetectedObject> =
                        detections.iter().map(DetectedObject::from).collect();
                    if let Err(e) = self.store.save(&entry.identifier, &items) {
                        tracing::warn!(error = %e, "Failed to persist detections");
                    }
                }
            }
            Err(e @ DecodeError::UnsupportedShape { .. }) => {
                tracing::error!(error = %e, model = %entry.identifier, "Tensor shape rejected");
                self.render.placeholder(&e.to_string());
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to decode tensor");
                self.render.placeholder(&e.to_string());
            }
        }
    }
}
