//! Fraction of a detection's box that sits inside a stall

use super::polygon::{clip_convex, polygon_area};
use super::{BBox, Point};

/// Intersection area of `bbox` with the convex `polygon`, divided by the
/// area of `bbox` itself.
///
/// This is deliberately not IoU: a truck spanning two stalls reports a
/// partial ratio against each of them. Returns 0 for empty boxes, disjoint
/// shapes and intersections with fewer than 3 vertices.
pub fn overlap_ratio(bbox: &BBox, polygon: &[Point]) -> f64 {
    // inverted corners also yield a positive product, so check each side
    if !(bbox.width() > 0.0 && bbox.height() > 0.0) || polygon.len() < 3 {
        return 0.0;
    }
    let bbox_area = bbox.area();

    let intersection = clip_convex(&bbox.corners(), polygon);
    if intersection.len() < 3 {
        return 0.0;
    }

    let ratio = polygon_area(&intersection) / bbox_area;
    if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 }
}
