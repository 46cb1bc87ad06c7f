// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Utility functions for the proximity library

use crate::results::Detection;

/// Class-agnostic Non-Maximum Suppression (NMS) for filtering overlapping detections
///
/// Candidates are visited in confidence-descending order (stable, so equal
/// confidences keep their input order). A candidate is accepted only if its
/// `IoU` with every already accepted detection is at most `iou_threshold`.
/// Boxes of different classes suppress each other: overlapping vehicles are
/// one hazard.
///
/// # Arguments
///
/// * `candidates` - Decoded detections
/// * `iou_threshold` - `IoU` threshold for suppression
///
/// # Returns
///
/// Accepted detections in acceptance order
#[must_use]
pub fn nms(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Detection> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if keep
            .iter()
            .all(|kept| kept.rect.iou(&candidate.rect) <= iou_threshold)
        {
            keep.push(candidate);
        }
    }

    keep
}

/// Plural form of a vehicle label.
#[must_use]
pub fn pluralize(word: &str) -> String {
    match word {
        "bus" => "buses".to_string(),
        "person" => "people".to_string(),
        _ => {
            if word.ends_with('s') || word.ends_with("ch") || word.ends_with("sh") {
                format!("{word}es")
            } else {
                format!("{word}s")
            }
        }
    }
}
