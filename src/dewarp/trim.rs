//! Pure trimming/extension of a polyline against the vertical bounds.
//!
//! Each end of the curve is handled by an independent clipping pass against
//! one bound. A pass either clips (the curve crosses the bound and the part
//! beyond it is cut at the exact intersection) or extends (the curve falls
//! short and its end segment is extrapolated to the bound). Both passes are
//! idempotent and order-independent, and neither mutates its input.

use super::traced::CurveRejection;
use crate::geometry::{polyline, Line};
use nalgebra::Point2;

/// Tolerance for on-the-bound tests, in pixels of signed distance.
const SIDE_EPS: f64 = 1e-6;
/// Consecutive points closer than this collapse into one.
const DEDUP_EPS: f64 = 1e-9;
/// Minimum arc length of a usable trimmed curve.
const MIN_TRIMMED_LENGTH: f64 = 1e-6;

/// Trims or extends `points` so the result spans exactly from `front` to
/// `back`. The first/last result points lie on the respective bounds.
pub(crate) fn trim_to_bounds(
    points: &[Point2<f64>],
    front: &Line,
    back: &Line,
) -> Result<Vec<Point2<f64>>, CurveRejection> {
    // Collapse duplicate vertices first; the clipping passes rely on
    // consecutive points being distinct.
    let points = dedup(points.to_vec());
    if points.len() < 2 {
        return Err(CurveRejection::TooShort);
    }
    let front_keep = interior_side(front, back);
    let back_keep = interior_side(back, front);

    let clipped = clip_front(&points, front, front_keep)?;
    let clipped = dedup(clipped);
    if clipped.len() < 2 {
        return Err(CurveRejection::TooShort);
    }

    let mut reversed = clipped;
    reversed.reverse();
    let clipped = clip_front(&reversed, back, back_keep)?;
    let mut result = dedup(clipped);
    result.reverse();

    if result.len() < 2 || polyline::arc_length(&result) <= MIN_TRIMMED_LENGTH {
        return Err(CurveRejection::TooShort);
    }
    Ok(result)
}

/// Sign of the half-plane of `bound` that faces the interior, probed with
/// two carrier points of the opposite bound (the farther one wins, so
/// crossing bounds stay well-defined). Zero when the bounds coincide.
fn interior_side(bound: &Line, other: &Line) -> f64 {
    let a = bound.signed_distance(&other.origin());
    let b = bound.signed_distance(&(other.origin() + other.dir()));
    let probe = if a.abs() >= b.abs() { a } else { b };
    if probe.abs() <= SIDE_EPS {
        0.0
    } else {
        probe.signum()
    }
}

/// Makes the leading end of `points` start exactly on `bound`: drops leading
/// points on the far side and cuts at the intersection, or extrapolates the
/// first segment backwards when the curve falls short of the bound.
fn clip_front(
    points: &[Point2<f64>],
    bound: &Line,
    keep_sign: f64,
) -> Result<Vec<Point2<f64>>, CurveRejection> {
    let kept = |p: &Point2<f64>| {
        keep_sign == 0.0 || bound.signed_distance(p) * keep_sign >= -SIDE_EPS
    };
    let Some(first) = points.iter().position(kept) else {
        return Err(CurveRejection::OutsideBounds);
    };

    let mut out = Vec::with_capacity(points.len() - first + 1);
    if first == 0 {
        if bound.distance(&points[0]) <= SIDE_EPS {
            // Already anchored; zero-length trim.
            out.extend_from_slice(points);
        } else {
            let carrier = Line::from_points(points[1], points[0]);
            let anchor = carrier
                .intersect(bound)
                .ok_or(CurveRejection::ParallelToBound)?;
            out.push(anchor);
            out.extend_from_slice(points);
        }
    } else {
        let carrier = Line::from_points(points[first - 1], points[first]);
        let anchor = carrier.intersect(bound).unwrap_or(points[first]);
        out.push(anchor);
        out.extend_from_slice(&points[first..]);
    }
    Ok(out)
}

fn dedup(points: Vec<Point2<f64>>) -> Vec<Point2<f64>> {
    let mut out: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |prev| (p - prev).norm() > DEDUP_EPS) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical(x: f64) -> Line {
        Line::from_points(Point2::new(x, 0.0), Point2::new(x, 10.0))
    }

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn approx_pt(p: Point2<f64>, x: f64, y: f64) -> bool {
        (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9
    }

    #[test]
    fn overshooting_curve_is_clipped_at_the_bound() {
        // Crosses the left bound at x=0 between its first two points.
        let curve = pts(&[(-20.0, 5.0), (20.0, 5.0), (80.0, 5.0)]);
        let out = trim_to_bounds(&curve, &vertical(0.0), &vertical(80.0)).unwrap();
        assert!(approx_pt(out[0], 0.0, 5.0), "got {:?}", out[0]);
        assert!(approx_pt(*out.last().unwrap(), 80.0, 5.0));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn short_curve_is_extended_to_both_bounds() {
        let curve = pts(&[(20.0, 5.0), (40.0, 6.0), (60.0, 7.0)]);
        let out = trim_to_bounds(&curve, &vertical(0.0), &vertical(100.0)).unwrap();
        // Linear extrapolation of the end segments.
        assert!(approx_pt(out[0], 0.0, 4.0), "got {:?}", out[0]);
        assert!(approx_pt(*out.last().unwrap(), 100.0, 9.0));
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn trimming_is_idempotent() {
        let curve = pts(&[(-20.0, 5.0), (30.0, 6.0), (120.0, 5.0)]);
        let front = vertical(0.0);
        let back = vertical(100.0);
        let once = trim_to_bounds(&curve, &front, &back).unwrap();
        let twice = trim_to_bounds(&once, &front, &back).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn endpoint_on_bound_is_a_zero_length_trim() {
        let curve = pts(&[(0.0, 5.0), (50.0, 5.0), (100.0, 5.0)]);
        let out = trim_to_bounds(&curve, &vertical(0.0), &vertical(100.0)).unwrap();
        assert_eq!(out, curve);
    }

    #[test]
    fn curve_beyond_the_far_bound_is_rejected() {
        let curve = pts(&[(120.0, 5.0), (160.0, 5.0)]);
        let result = trim_to_bounds(&curve, &vertical(0.0), &vertical(100.0));
        assert!(matches!(result, Err(CurveRejection::OutsideBounds)));
    }

    #[test]
    fn collapsing_to_a_point_is_too_short() {
        // Only the exact boundary point survives the front clip.
        let curve = pts(&[(-50.0, 5.0), (0.0, 5.0)]);
        let result = trim_to_bounds(&curve, &vertical(0.0), &vertical(100.0));
        assert!(matches!(result, Err(CurveRejection::TooShort)));
    }
}
