// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Post-processing for raw detector outputs.
//!
//! This module decodes the per-anchor output tensor of a YOLO-style detector
//! into vehicle detections and removes duplicates with NMS.

use ndarray::{ArrayView1, ArrayView2, s};

use crate::config::ProximityConfig;
use crate::error::{ProximityError, Result};
use crate::geometry::Rect;
use crate::results::Detection;
use crate::utils::nms;

/// Memory layout of a detector output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// `[features, anchors]`: one row per box coordinate or class score.
    /// This is the native YOLOv8 export layout, e.g. `[1, 84, 8400]`.
    ChannelMajor { num_anchors: usize },
    /// `[anchors, features]`: one row per anchor, e.g. `[1, 8400, 84]`.
    AnchorMajor { num_anchors: usize },
}

impl TensorLayout {
    #[must_use]
    pub const fn num_anchors(&self) -> usize {
        match self {
            Self::ChannelMajor { num_anchors } | Self::AnchorMajor { num_anchors } => *num_anchors,
        }
    }
}

/// Decode and suppress one frame's detector output.
///
/// # Arguments
///
/// * `output` - Flat tensor data.
/// * `shape` - Tensor shape, with or without a leading batch dimension of 1.
/// * `image_size` - Target image (width, height) the boxes are rescaled to.
/// * `config` - Pipeline configuration.
///
/// # Returns
///
/// Detections in confidence-descending order, at most `config.max_detections`
/// of them when a cap is set.
///
/// # Errors
///
/// Returns [`ProximityError::InvalidInputShape`] if the tensor does not match
/// the configured layout or the image has a zero dimension.
pub fn postprocess(
    output: &[f32],
    shape: &[usize],
    image_size: (u32, u32),
    config: &ProximityConfig,
) -> Result<Vec<Detection>> {
    let candidates = decode(output, shape, image_size, config)?;
    let mut detections = suppress(candidates, config);
    limit(&mut detections, config);
    Ok(detections)
}

/// Apply NMS with the configured IoU threshold.
#[must_use]
pub fn suppress(candidates: Vec<Detection>, config: &ProximityConfig) -> Vec<Detection> {
    nms(candidates, config.iou_threshold)
}

/// Truncate confidence-ordered detections to `config.max_detections`, if set.
pub fn limit(detections: &mut Vec<Detection>, config: &ProximityConfig) {
    if let Some(max) = config.max_detections {
        detections.truncate(max);
    }
}

/// Decode a raw detector tensor into candidate detections.
///
/// For every anchor the best class is found (lowest index wins ties). The
/// anchor is kept only if that score is strictly above the confidence
/// threshold and the class is retained by the class filter. Boxes are
/// converted from center/size to corners, rescaled from the square model input
/// to the image per axis, and clamped to the image bounds.
///
/// # Returns
///
/// Candidates in anchor order; empty if nothing qualifies.
///
/// # Errors
///
/// Returns [`ProximityError::InvalidInputShape`] if the tensor does not match
/// the configured layout or the image has a zero dimension. No partial result
/// is produced.
pub fn decode(
    output: &[f32],
    shape: &[usize],
    image_size: (u32, u32),
    config: &ProximityConfig,
) -> Result<Vec<Detection>> {
    let (image_width, image_height) = image_size;
    if image_width == 0 || image_height == 0 {
        return Err(ProximityError::InvalidInputShape(format!(
            "image dimensions must be non-zero, got {image_width}x{image_height}"
        )));
    }

    let layout = parse_detect_shape(shape, output.len(), config)?;
    let anchors = anchor_rows(output, layout, config.num_features())?;

    #[allow(clippy::cast_precision_loss)]
    let (width, height, input_size) = (
        image_width as f32,
        image_height as f32,
        config.input_size as f32,
    );
    let scale_x = width / input_size;
    let scale_y = height / input_size;

    let mut candidates = Vec::new();
    for row in anchors.rows() {
        let Some((class_id, confidence)) = best_class(row.slice(s![4..])) else {
            continue;
        };

        if confidence <= config.confidence_threshold {
            continue;
        }
        let Some(label) = config.classes.get(class_id) else {
            continue;
        };

        let rect = Rect::from_xywh(row[0], row[1], row[2], row[3])
            .scale(scale_x, scale_y)
            .clamp(width, height);
        let proximity = rect.height() / height;

        candidates.push(Detection {
            rect,
            class_id,
            label: label.to_string(),
            confidence,
            proximity,
        });
    }

    Ok(candidates)
}

/// Determine the tensor layout from its shape.
///
/// Accepts `[F, A]`, `[1, F, A]`, `[A, F]` and `[1, A, F]` where
/// `F = 4 + num_classes` and `A` is the configured anchor count (any count if
/// unset). When both readings fit, the channel-major one wins.
///
/// # Errors
///
/// Returns [`ProximityError::InvalidInputShape`] for any other shape, a batch
/// size other than 1, or a data length that disagrees with the shape.
pub fn parse_detect_shape(
    shape: &[usize],
    data_len: usize,
    config: &ProximityConfig,
) -> Result<TensorLayout> {
    let invalid = |reason: String| -> Result<TensorLayout> {
        Err(ProximityError::InvalidInputShape(format!(
            "{reason} (shape {shape:?}, expected [{}, anchors] or [anchors, {}])",
            config.num_features(),
            config.num_features()
        )))
    };

    let (a, b) = match *shape {
        [a, b] => (a, b),
        [1, a, b] => (a, b),
        [batch, _, _] => return invalid(format!("batch size must be 1, got {batch}")),
        _ => return invalid(format!("expected 2 or 3 dimensions, got {}", shape.len())),
    };

    if a.checked_mul(b) != Some(data_len) {
        return invalid(format!("data length {data_len} does not match"));
    }

    let features = config.num_features();
    let anchors_ok = |n: usize| n > 0 && config.num_anchors.is_none_or(|expected| expected == n);

    if a == features && anchors_ok(b) {
        Ok(TensorLayout::ChannelMajor { num_anchors: b })
    } else if b == features && anchors_ok(a) {
        Ok(TensorLayout::AnchorMajor { num_anchors: a })
    } else {
        invalid("feature or anchor count mismatch".to_string())
    }
}

/// View the flat tensor as one row per anchor, without copying.
fn anchor_rows(
    output: &[f32],
    layout: TensorLayout,
    num_features: usize,
) -> Result<ArrayView2<'_, f32>> {
    let num_anchors = layout.num_anchors();
    let view = match layout {
        TensorLayout::ChannelMajor { .. } => {
            ArrayView2::from_shape((num_features, num_anchors), output).map(|v| v.reversed_axes())
        }
        TensorLayout::AnchorMajor { .. } => {
            ArrayView2::from_shape((num_anchors, num_features), output)
        }
    };
    view.map_err(|e| ProximityError::InvalidInputShape(e.to_string()))
}

/// Index and value of the highest class score.
///
/// Strict comparison keeps the first of equal maxima; NaN scores are skipped.
fn best_class(scores: ArrayView1<'_, f32>) -> Option<(usize, f32)> {
    scores
        .iter()
        .enumerate()
        .fold(None, |best, (idx, &score)| {
            if score.is_nan() {
                return best;
            }
            match best {
                Some((_, best_score)) if score <= best_score => best,
                _ => Some((idx, score)),
            }
        })
}
