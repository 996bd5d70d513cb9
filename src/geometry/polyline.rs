//! Measures over ordered point sequences.

use nalgebra::Point2;

/// Total length of the polyline's segments.
pub fn arc_length(points: &[Point2<f64>]) -> f64 {
    points
        .windows(2)
        .map(|seg| (seg[1] - seg[0]).norm())
        .sum()
}

/// Segment-length-weighted centroid of a polyline.
///
/// Weighting by segment length makes the centroid independent of how densely
/// the curve was sampled. Falls back to the plain vertex average when the
/// polyline has no extent.
pub fn centroid(points: &[Point2<f64>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    let mut acc_x = 0.0;
    let mut acc_y = 0.0;
    let mut total = 0.0;
    for seg in points.windows(2) {
        let len = (seg[1] - seg[0]).norm();
        let mid_x = (seg[0].x + seg[1].x) * 0.5;
        let mid_y = (seg[0].y + seg[1].y) * 0.5;
        acc_x += mid_x * len;
        acc_y += mid_y * len;
        total += len;
    }
    if total <= f64::EPSILON {
        let n = points.len() as f64;
        let sx: f64 = points.iter().map(|p| p.x).sum();
        let sy: f64 = points.iter().map(|p| p.y).sum();
        return Point2::new(sx / n, sy / n);
    }
    Point2::new(acc_x / total, acc_y / total)
}
