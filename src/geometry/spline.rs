//! Parametric curve interpolating a set of control points.
//!
//! The curve is a chord-length parameterized Catmull–Rom spline evaluated in
//! Hermite form with finite-difference tangents. It passes exactly through
//! every control point, so anchoring the first and last control on the
//! vertical bounds pins the curve endpoints to those bounds.

use nalgebra::{Point2, Vector2};
use serde::Serialize;

const EPS: f64 = 1e-9;

#[derive(Clone, Debug, Default, Serialize)]
pub struct Spline {
    controls: Vec<Point2<f64>>,
    /// Normalized chord-length parameter of each control, strictly
    /// increasing from 0 to 1.
    knots: Vec<f64>,
}

impl Spline {
    /// Fits a spline through `points`, decimating to at most `max_controls`
    /// controls chosen evenly by arc length. The first and last input points
    /// are always kept. Returns `None` when the input has fewer than two
    /// distinct points or no extent.
    pub fn fit(points: &[Point2<f64>], max_controls: usize) -> Option<Spline> {
        assert!(max_controls >= 2, "a curve needs at least two controls");
        let mut cumulative = Vec::with_capacity(points.len());
        let mut deduped = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for &p in points {
            if let Some(&prev) = deduped.last() {
                let diff: Vector2<f64> = p - prev;
                let step = diff.norm();
                if step <= EPS {
                    continue;
                }
                total += step;
            }
            deduped.push(p);
            cumulative.push(total);
        }
        if deduped.len() < 2 || total <= EPS {
            return None;
        }

        let picked = if deduped.len() <= max_controls {
            (0..deduped.len()).collect::<Vec<_>>()
        } else {
            pick_even_by_arc(&cumulative, max_controls)
        };

        let controls: Vec<Point2<f64>> = picked.iter().map(|&i| deduped[i]).collect();
        let knots: Vec<f64> = picked.iter().map(|&i| cumulative[i] / total).collect();
        Some(Spline { controls, knots })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn controls(&self) -> &[Point2<f64>] {
        &self.controls
    }

    /// First control point. Meaningless on an empty (default) spline.
    pub fn start(&self) -> Point2<f64> {
        self.controls.first().copied().unwrap_or_else(Point2::origin)
    }

    /// Last control point. Meaningless on an empty (default) spline.
    pub fn end(&self) -> Point2<f64> {
        self.controls.last().copied().unwrap_or_else(Point2::origin)
    }

    /// Evaluates the curve at `t` clamped to `[0, 1]`.
    pub fn at(&self, t: f64) -> Point2<f64> {
        let n = self.controls.len();
        if n == 0 {
            return Point2::origin();
        }
        if n == 1 {
            return self.controls[0];
        }
        let t = t.clamp(0.0, 1.0);
        let seg = self.segment_index(t);
        let (u0, u1) = (self.knots[seg], self.knots[seg + 1]);
        let h = u1 - u0;
        let s = (t - u0) / h;

        let p0 = self.controls[seg];
        let p1 = self.controls[seg + 1];
        let m0 = self.tangent(seg);
        let m1 = self.tangent(seg + 1);

        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        Point2::from(p0.coords * h00 + m0 * (h10 * h) + p1.coords * h01 + m1 * (h11 * h))
    }

    /// Samples `n >= 2` points evenly in parameter space.
    pub fn sample(&self, n: usize) -> Vec<Point2<f64>> {
        assert!(n >= 2, "sampling needs at least two points");
        if self.controls.is_empty() {
            return Vec::new();
        }
        (0..n)
            .map(|i| self.at(i as f64 / (n - 1) as f64))
            .collect()
    }

    fn segment_index(&self, t: f64) -> usize {
        let last = self.knots.len() - 2;
        match self.knots.iter().rposition(|&u| u <= t) {
            Some(i) => i.min(last),
            None => 0,
        }
    }

    /// Finite-difference tangent at control `i`, one-sided at the ends.
    fn tangent(&self, i: usize) -> Vector2<f64> {
        let last = self.controls.len() - 1;
        let (lo, hi) = if i == 0 {
            (0, 1)
        } else if i == last {
            (last - 1, last)
        } else {
            (i - 1, i + 1)
        };
        (self.controls[hi] - self.controls[lo]) / (self.knots[hi] - self.knots[lo])
    }
}

/// Picks at most `count` strictly increasing indices spread evenly over the
/// cumulative arc length, always including the first and last vertex.
fn pick_even_by_arc(cumulative: &[f64], count: usize) -> Vec<usize> {
    let total = *cumulative.last().expect("non-empty cumulative lengths");
    let last = cumulative.len() - 1;
    let mut picked = vec![0usize];
    for j in 1..count - 1 {
        let target = total * j as f64 / (count - 1) as f64;
        let idx = nearest_index(cumulative, target);
        let prev = *picked.last().expect("picked starts non-empty");
        if idx > prev && idx < last {
            picked.push(idx);
        }
    }
    picked.push(last);
    picked
}

/// Index of the cumulative arc position closest to `target`.
fn nearest_index(cumulative: &[f64], target: f64) -> usize {
    let last = cumulative.len() - 1;
    match cumulative.binary_search_by(|c| c.partial_cmp(&target).expect("finite arc lengths")) {
        Ok(i) => i,
        Err(0) => 0,
        Err(i) if i > last => last,
        Err(i) => {
            if target - cumulative[i - 1] <= cumulative[i] - target {
                i - 1
            } else {
                i
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn fit_rejects_degenerate_input() {
        assert!(Spline::fit(&[], 8).is_none());
        assert!(Spline::fit(&pts(&[(1.0, 1.0)]), 8).is_none());
        assert!(Spline::fit(&pts(&[(1.0, 1.0), (1.0, 1.0)]), 8).is_none());
    }

    #[test]
    fn endpoints_are_interpolated_exactly() {
        let s = Spline::fit(&pts(&[(0.0, 5.0), (4.0, 7.0), (10.0, 5.0)]), 8).unwrap();
        let a = s.at(0.0);
        let b = s.at(1.0);
        assert!(approx_eq(a.x, 0.0) && approx_eq(a.y, 5.0));
        assert!(approx_eq(b.x, 10.0) && approx_eq(b.y, 5.0));
    }

    #[test]
    fn straight_input_stays_straight() {
        let s = Spline::fit(
            &pts(&[(0.0, 2.0), (3.0, 2.0), (7.0, 2.0), (10.0, 2.0)]),
            8,
        )
        .unwrap();
        for i in 0..=10 {
            let p = s.at(i as f64 / 10.0);
            assert!(approx_eq(p.y, 2.0), "y deviated at t={}: {}", i, p.y);
        }
    }

    #[test]
    fn passes_through_interior_controls() {
        let input = pts(&[(0.0, 0.0), (2.0, 3.0), (5.0, 1.0), (9.0, 4.0)]);
        let s = Spline::fit(&input, 8).unwrap();
        for (&u, &c) in s.knots.iter().zip(s.controls.iter()) {
            let p = s.at(u);
            assert!(approx_eq(p.x, c.x) && approx_eq(p.y, c.y));
        }
    }

    #[test]
    fn decimation_keeps_both_ends() {
        let input: Vec<Point2<f64>> =
            (0..100).map(|i| Point2::new(i as f64, (i as f64 * 0.1).sin())).collect();
        let s = Spline::fit(&input, 10).unwrap();
        assert!(s.controls().len() <= 10);
        assert!(approx_eq(s.start().x, 0.0));
        assert!(approx_eq(s.end().x, 99.0));
    }

    #[test]
    fn duplicate_points_are_collapsed() {
        let input = pts(&[(0.0, 0.0), (0.0, 0.0), (5.0, 0.0), (5.0, 0.0), (10.0, 0.0)]);
        let s = Spline::fit(&input, 8).unwrap();
        assert_eq!(s.controls().len(), 3);
    }
}
