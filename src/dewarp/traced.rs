//! Per-curve preparation: trimming to the bounds and spline fitting.

use super::trim;
use crate::geometry::{polyline, Line, Spline};
use nalgebra::Point2;

/// Controls kept when fitting the directrix spline through a trimmed curve.
const MAX_SPLINE_CONTROLS: usize = 10;

/// A curve prepared for the consensus search: trimmed/extended so it spans
/// bound-to-bound, with a spline whose endpoints sit exactly on the bounds.
/// Created fresh per build attempt, never persisted.
#[derive(Clone, Debug)]
pub(crate) struct TracedCurve {
    pub(crate) trimmed: Vec<Point2<f64>>,
    pub(crate) centroid: Point2<f64>,
    pub(crate) spline: Spline,
}

/// Why a single curve was excluded from the candidate pool. Curve-level
/// only; the build carries on with the remaining curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CurveRejection {
    /// Nothing left after trimming, or no measurable extent.
    TooShort,
    /// Every point lies beyond one of the bounds.
    OutsideBounds,
    /// The end segment runs parallel to the bound it must be extended to.
    ParallelToBound,
    /// The trimmed points could not be fitted with a spline.
    DegenerateFit,
}

impl std::fmt::Display for CurveRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::TooShort => "too short after trimming",
            Self::OutsideBounds => "entirely outside the bounds",
            Self::ParallelToBound => "end segment parallel to a bound",
            Self::DegenerateFit => "spline fit degenerate",
        };
        f.write_str(reason)
    }
}

/// Trims/extends `points` against the two bounds and fits the spline.
///
/// The bound nearer to the polyline's first point acts as the front bound.
/// `points` must have at least two vertices (enforced upstream at
/// accumulation time).
pub(crate) fn trace_curve(
    points: &[Point2<f64>],
    bound1: &Line,
    bound2: &Line,
) -> Result<TracedCurve, CurveRejection> {
    debug_assert!(points.len() >= 2);
    let (front, back) = if bound1.distance(&points[0]) <= bound2.distance(&points[0]) {
        (bound1, bound2)
    } else {
        (bound2, bound1)
    };
    let trimmed = trim::trim_to_bounds(points, front, back)?;
    let spline = Spline::fit(&trimmed, MAX_SPLINE_CONTROLS).ok_or(CurveRejection::DegenerateFit)?;
    let centroid = polyline::centroid(&trimmed);
    Ok(TracedCurve {
        trimmed,
        centroid,
        spline,
    })
}
