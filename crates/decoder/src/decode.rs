use crate::{
    classes::ClassTable,
    error::DecodeError,
    tensor::{DisplayFrame, ModelResolution, RawTensor},
};
use ndarray::ArrayViewD;
use serde::{Deserialize, Serialize};

/// Confidence cutoff applied when the caller has no opinion.
pub const DEFAULT_THRESHOLD: f32 = 0.25;

/// Output-tensor row layouts this decoder understands.
///
/// Resolved once at model-selection time from the model identifier; the hot
/// decode path only ever sees the enum, never a name string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Shape `[N, 7]`, rows of `(batch_id, x0, y0, x1, y1, class_id, score)`.
    FlatBatch,
    /// Shape `[1, N, 6]`, rows of `(x0, y0, x1, y1, score, class_id)`.
    BatchedTriplet,
}

impl ModelFamily {
    fn check_shape(self, shape: &[usize]) -> Result<(), DecodeError> {
        let matches = match self {
            ModelFamily::FlatBatch => shape.len() == 2 && shape[1] == 7,
            ModelFamily::BatchedTriplet => shape.len() == 3 && shape[0] == 1 && shape[2] == 6,
        };
        if matches {
            Ok(())
        } else {
            Err(DecodeError::UnsupportedShape {
                family: self,
                shape: shape.to_vec(),
            })
        }
    }

    fn row_count(self, shape: &[usize]) -> usize {
        match self {
            ModelFamily::FlatBatch => shape[0],
            ModelFamily::BatchedTriplet => shape[1],
        }
    }

    /// Candidate fields in `(x0, y0, x1, y1, score, class_id)` order.
    fn extract(self, view: &ArrayViewD<'_, f32>, row: usize) -> [f32; 6] {
        match self {
            // Column 0 is the batch id, which the decoder has no use for.
            ModelFamily::FlatBatch => [
                view[[row, 1]],
                view[[row, 2]],
                view[[row, 3]],
                view[[row, 4]],
                view[[row, 6]],
                view[[row, 5]],
            ],
            ModelFamily::BatchedTriplet => [
                view[[0, row, 0]],
                view[[0, row, 1]],
                view[[0, row, 2]],
                view[[0, row, 3]],
                view[[0, row, 4]],
                view[[0, row, 5]],
            ],
        }
    }
}

/// Display-space box: top-left corner plus width and height in pixels of
/// the destination surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One decoded object. Created per decode call and handed to the caller;
/// the decoder keeps nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub rect: BoxRect,
}

/// Decode a raw detection tensor into labeled, display-space boxes.
///
/// Rows are dropped when the score is below `threshold` (strict comparison:
/// a score exactly at the threshold passes), when the rounded class id falls
/// outside the table, when any field is non-finite, or when the scaled box
/// has no area. Survivors come back in input row order. Pixel coordinates
/// and class ids round half away from zero (`f32::round`).
///
/// No overlap suppression is performed: the tensor is trusted as already
/// filtered upstream, so duplicate boxes for one object pass through. Known
/// limitation of the deployed models, preserved here.
#[tracing::instrument(skip(tensor, table, display))]
pub fn decode(
    tensor: &RawTensor,
    family: ModelFamily,
    model_res: ModelResolution,
    display: DisplayFrame,
    table: &ClassTable,
    threshold: f32,
) -> Result<Vec<Detection>, DecodeError> {
    if tensor.shape().is_empty() {
        return Err(DecodeError::InvalidInput);
    }
    if model_res.width == 0 || model_res.height == 0 {
        return Err(DecodeError::InvalidConfiguration {
            width: model_res.width,
            height: model_res.height,
        });
    }
    family.check_shape(tensor.shape())?;

    let scale_x = display.width as f32 / model_res.width as f32;
    let scale_y = display.height as f32 / model_res.height as f32;

    let view = tensor.view();
    let rows = family.row_count(tensor.shape());
    let mut detections = Vec::new();

    for row in 0..rows {
        let fields = family.extract(&view, row);

        // A corrupt row must not take down the frame; treat it like a miss.
        if fields.iter().any(|v| !v.is_finite()) {
            continue;
        }
        let [x0, y0, x1, y1, score, class_raw] = fields;

        if score < threshold {
            continue;
        }

        let class_id = class_raw.round();
        if class_id < 0.0 || class_id >= table.len() as f32 {
            continue;
        }
        let class_id = class_id as usize;

        let x = (x0 * scale_x).round();
        let y = (y0 * scale_y).round();
        let width = ((x1 - x0) * scale_x).round();
        let height = ((y1 - y0) * scale_y).round();
        if width <= 0.0 || height <= 0.0 {
            continue;
        }

        let label = match table.label_for(class_id) {
            Some(name) => name.to_string(),
            None => format!("Class {class_id}"),
        };

        detections.push(Detection {
            label,
            confidence: score,
            rect: BoxRect {
                x: x as i32,
                y: y as i32,
                width: width as u32,
                height: height as u32,
            },
        });
    }

    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_100: ModelResolution = ModelResolution::new(100, 100);
    const DISPLAY_100: DisplayFrame = DisplayFrame::new(100, 100);

    /// Rows in `(batch_id, x0, y0, x1, y1, class_id, score)` order.
    fn flat_batch(rows: &[[f32; 7]]) -> RawTensor {
        let data: Vec<f32> = rows.iter().flatten().copied().collect();
        RawTensor::from_shape_vec(&[rows.len(), 7], data).unwrap()
    }

    /// Rows in `(x0, y0, x1, y1, score, class_id)` order.
    fn batched_triplet(rows: &[[f32; 6]]) -> RawTensor {
        let data: Vec<f32> = rows.iter().flatten().copied().collect();
        RawTensor::from_shape_vec(&[1, rows.len(), 6], data).unwrap()
    }

    fn decode_flat(tensor: &RawTensor, threshold: f32) -> Result<Vec<Detection>, DecodeError> {
        decode(
            tensor,
            ModelFamily::FlatBatch,
            SQUARE_100,
            DISPLAY_100,
            &ClassTable::coco(),
            threshold,
        )
    }

    // ========== Threshold handling ==========

    #[test]
    fn all_scores_below_threshold_yields_empty() {
        let tensor = flat_batch(&[
            [0.0, 10.0, 10.0, 50.0, 50.0, 0.0, 0.1],
            [0.0, 20.0, 20.0, 60.0, 60.0, 1.0, 0.24],
        ]);
        let detections = decode_flat(&tensor, DEFAULT_THRESHOLD).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn score_equal_to_threshold_is_retained() {
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, 0.0, 0.25]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert_eq!(detections.len(), 1, "boundary score must pass");
    }

    #[test]
    fn score_just_below_threshold_is_dropped() {
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, 0.0, 0.2499]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert!(detections.is_empty());
    }

    // ========== Class id handling ==========

    #[test]
    fn negative_class_id_is_excluded() {
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, -1.0, 0.9]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert!(detections.is_empty(), "score does not rescue a bad class id");
    }

    #[test]
    fn class_id_beyond_table_is_excluded() {
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, 80.0, 0.9]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert!(detections.is_empty());
    }

    #[test]
    fn class_id_rounds_half_away_from_zero() {
        let tensor = flat_batch(&[
            [0.0, 10.0, 10.0, 50.0, 50.0, 0.5, 0.9],
            [0.0, 10.0, 10.0, 50.0, 50.0, 16.4, 0.9],
        ]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert_eq!(detections[0].label, "bicycle", "0.5 rounds up to class 1");
        assert_eq!(detections[1].label, "dog", "16.4 rounds down to class 16");
    }

    #[test]
    fn incomplete_table_falls_back_to_synthetic_label() {
        let table = ClassTable::from_names(["person", ""]);
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, 1.0, 0.9]]);
        let detections = decode(
            &tensor,
            ModelFamily::FlatBatch,
            SQUARE_100,
            DISPLAY_100,
            &table,
            0.25,
        )
        .unwrap();
        assert_eq!(detections[0].label, "Class 1");
    }

    // ========== Coordinate scaling ==========

    #[test]
    fn boxes_scale_from_model_to_display_space() {
        let tensor = flat_batch(&[[0.0, 100.0, 100.0, 200.0, 200.0, 0.0, 0.9]]);
        let detections = decode(
            &tensor,
            ModelFamily::FlatBatch,
            ModelResolution::new(320, 320),
            DisplayFrame::new(640, 480),
            &ClassTable::coco(),
            0.25,
        )
        .unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(
            detections[0].rect,
            BoxRect {
                x: 200,
                y: 150,
                width: 200,
                height: 150,
            },
            "scale_x=2.0, scale_y=1.5"
        );
    }

    #[test]
    fn zero_area_box_is_dropped() {
        let tensor = flat_batch(&[[0.0, 50.0, 10.0, 50.0, 60.0, 0.0, 0.9]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert!(detections.is_empty(), "x0 == x1 scales to zero width");
    }

    #[test]
    fn inverted_box_is_dropped() {
        let tensor = flat_batch(&[[0.0, 60.0, 60.0, 10.0, 10.0, 0.0, 0.9]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert!(detections.is_empty(), "negative extents never surface");
    }

    // ========== Shape and input validation ==========

    #[test]
    fn unsupported_shape_reports_actual_shape() {
        let tensor = RawTensor::from_shape_vec(&[2, 6], vec![0.0; 12]).unwrap();
        let err = decode_flat(&tensor, 0.25).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnsupportedShape {
                family: ModelFamily::FlatBatch,
                shape: vec![2, 6],
            }
        );
    }

    #[test]
    fn batched_triplet_requires_unit_batch() {
        let tensor = RawTensor::from_shape_vec(&[2, 1, 6], vec![0.0; 12]).unwrap();
        let err = decode(
            &tensor,
            ModelFamily::BatchedTriplet,
            SQUARE_100,
            DISPLAY_100,
            &ClassTable::coco(),
            0.25,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedShape { .. }));
    }

    #[test]
    fn scalar_tensor_is_invalid_input() {
        let tensor = RawTensor::from_shape_vec(&[], vec![0.0]).unwrap();
        let err = decode_flat(&tensor, 0.25).unwrap_err();
        assert_eq!(err, DecodeError::InvalidInput);
    }

    #[test]
    fn zero_model_resolution_is_invalid_configuration() {
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, 0.0, 0.9]]);
        let err = decode(
            &tensor,
            ModelFamily::FlatBatch,
            ModelResolution::new(0, 320),
            DISPLAY_100,
            &ClassTable::coco(),
            0.25,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidConfiguration {
                width: 0,
                height: 320,
            }
        );
    }

    #[test]
    fn empty_candidate_tensor_decodes_to_empty() {
        let tensor = flat_batch(&[]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert!(detections.is_empty());
    }

    // ========== Malformed rows ==========

    #[test]
    fn nan_row_is_dropped_without_killing_the_frame() {
        let tensor = flat_batch(&[
            [0.0, f32::NAN, 10.0, 50.0, 50.0, 0.0, 0.9],
            [0.0, 10.0, 10.0, 50.0, 50.0, 16.0, 0.8],
        ]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert_eq!(detections.len(), 1, "valid row survives its corrupt neighbor");
        assert_eq!(detections[0].label, "dog");
    }

    #[test]
    fn nan_score_counts_as_below_threshold() {
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, 0.0, f32::NAN]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert!(detections.is_empty());
    }

    // ========== Layout differences ==========

    #[test]
    fn batched_triplet_reads_score_and_class_from_trailing_columns() {
        let tensor = batched_triplet(&[[10.0, 20.0, 60.0, 70.0, 0.8, 2.0]]);
        let detections = decode(
            &tensor,
            ModelFamily::BatchedTriplet,
            SQUARE_100,
            DISPLAY_100,
            &ClassTable::coco(),
            0.25,
        )
        .unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "car");
        assert_eq!(detections[0].confidence, 0.8);
        assert_eq!(
            detections[0].rect,
            BoxRect {
                x: 10,
                y: 20,
                width: 50,
                height: 50,
            }
        );
    }

    #[test]
    fn flat_batch_ignores_batch_id_column() {
        let tensor = flat_batch(&[[7.0, 10.0, 10.0, 50.0, 50.0, 0.0, 0.9]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert_eq!(detections.len(), 1);
    }

    // ========== Output contract ==========

    #[test]
    fn output_preserves_input_row_order() {
        let tensor = flat_batch(&[
            [0.0, 10.0, 10.0, 50.0, 50.0, 2.0, 0.5],
            [0.0, 20.0, 20.0, 60.0, 60.0, 0.0, 0.9],
        ]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        let labels: Vec<&str> = detections.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, ["car", "person"], "no re-sorting by confidence");
    }

    #[test]
    fn decode_is_idempotent() {
        let tensor = flat_batch(&[
            [0.0, 10.0, 10.0, 50.0, 50.0, 0.0, 0.9],
            [0.0, 20.0, 20.0, 60.0, 60.0, 16.0, 0.7],
        ]);
        let first = decode_flat(&tensor, 0.25).unwrap();
        let second = decode_flat(&tensor, 0.25).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn end_to_end_single_detection() {
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, 0.0, 0.9]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        assert_eq!(detections.len(), 1);
        let det = &detections[0];
        assert_eq!(det.label, "person");
        assert_eq!(det.confidence, 0.9);
        assert_eq!(
            det.rect,
            BoxRect {
                x: 10,
                y: 10,
                width: 40,
                height: 40,
            }
        );
    }

    #[test]
    fn detection_serializes_for_the_api_boundary() {
        let tensor = flat_batch(&[[0.0, 10.0, 10.0, 50.0, 50.0, 0.0, 0.9]]);
        let detections = decode_flat(&tensor, 0.25).unwrap();
        let json = serde_json::to_value(&detections[0]).unwrap();
        assert_eq!(json["label"], "person");
        assert_eq!(json["rect"]["width"], 40);
    }
}
