use decoder::{BoxRect, Detection, Rgb, confidence_to_color};
use serde::Serialize;

/// One rectangle the rendering surface should draw: geometry, outline
/// color, and the caption text placed above the box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayBox {
    pub rect: BoxRect,
    pub color: Rgb,
    pub caption: String,
}

/// Turn decoded detections into drawing instructions. Order matches the
/// detection order; the caption carries the confidence as a percentage
/// with one decimal.
pub fn overlay_plan(detections: &[Detection]) -> Vec<OverlayBox> {
    detections
        .iter()
        .map(|det| OverlayBox {
            rect: det.rect,
            color: confidence_to_color(det.confidence),
            caption: format!("{} {:.1}%", det.label, det.confidence * 100.0),
        })
        .collect()
}

/// Destination for per-frame drawing instructions. The decoder returns
/// data only; everything visual happens behind this trait.
pub trait RenderSink {
    fn render(&mut self, boxes: &[OverlayBox]);

    /// Shown instead of boxes when a frame produced nothing drawable
    /// (inference failure, no output, rejected tensor).
    fn placeholder(&mut self, note: &str);
}

/// Headless sink that logs the overlay instead of drawing it.
#[derive(Debug, Default)]
pub struct TracingRender;

impl RenderSink for TracingRender {
    fn render(&mut self, boxes: &[OverlayBox]) {
        for overlay in boxes {
            tracing::debug!(
                x = overlay.rect.x,
                y = overlay.rect.y,
                width = overlay.rect.width,
                height = overlay.rect.height,
                caption = %overlay.caption,
                "overlay box"
            );
        }
    }

    fn placeholder(&mut self, note: &str) {
        tracing::debug!(note, "nothing to draw");
    }
}
