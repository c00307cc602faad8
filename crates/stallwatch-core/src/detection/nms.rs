//! Non-maximum suppression over raw detector output

use super::object::RawDetection;

/// Drop detections under `min_confidence`, then greedily keep the most
/// confident box and suppress every remaining box whose IoU with it
/// exceeds `iou_threshold`.
///
/// Only boxes of the same class suppress each other unless `agnostic` is set.
pub fn suppress_overlaps(
    mut detections: Vec<RawDetection>,
    min_confidence: f64,
    iou_threshold: f64,
    agnostic: bool,
) -> Vec<RawDetection> {
    detections.retain(|detection| detection.confidence >= min_confidence);
    if detections.is_empty() {
        return detections;
    }

    // stable sort keeps detector order among equal confidences
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }

        for j in (i + 1)..detections.len() {
            if suppressed[j] {
                continue;
            }
            if !agnostic && detections[i].class_label != detections[j].class_label {
                continue;
            }
            if detections[i].bbox.iou(&detections[j].bbox) > iou_threshold {
                suppressed[j] = true;
            }
        }

        keep.push(detections[i].clone());
    }

    keep
}
