//! Consensus search over candidate directrix pairs.
//!
//! Two distinct curves are sampled as a top/bottom hypothesis. The pair
//! implies the warp `P(t, v) = (1-v)·T(t) + v·B(t)`; a curve consistent with
//! that warp follows an iso-`v` path, so its per-sample interpolation
//! coordinate `v_k` is near-constant. A curve's deviation is the standard
//! deviation of its `v_k` scaled to pixels by the mean top-to-bottom span.
//! Hypotheses are ranked by inlier count, then by error: the summed squared
//! deviation of the inliers plus the spread of the pair's own span. A page
//! warp varies smoothly, so directrix pairs implying an erratic span lose
//! ties against coherent ones; that is what lets two agreeing curves beat
//! a wild outlier when no third curve is left to vote.
//!
//! When the number of distinct pairs fits the trial budget the search is
//! exhaustive and fully deterministic; otherwise pairs are drawn from a
//! seeded generator so runs stay reproducible.

use super::traced::TracedCurve;
use nalgebra::{Point2, Vector2};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Knobs for the consensus search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RansacOptions {
    /// Trial budget for the pair sampling loop.
    pub max_trials: usize,
    /// Sampled search stops early after this many trials without
    /// improvement.
    pub no_improvement_window: usize,
    /// Seed for the pair sampling generator.
    pub seed: u64,
}

impl Default for RansacOptions {
    fn default() -> Self {
        Self {
            max_trials: 200,
            no_improvement_window: 32,
            seed: 0,
        }
    }
}

/// Winning hypothesis, referencing curves by index into the candidate pool.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RansacModel {
    pub(crate) top: usize,
    pub(crate) bottom: usize,
    pub(crate) inliers: usize,
    pub(crate) error: f64,
}

/// Points sampled per curve when scoring a hypothesis.
const SAMPLES_PER_CURVE: usize = 16;
/// A model needs at least this many mutually consistent curves.
const MIN_CONSENSUS: usize = 2;
/// Pairs closer together than this mean span carry no warp information.
const MIN_PAIR_SPAN: f64 = 1.0;
/// Inlier deviation cap in pixels, whichever of the absolute and
/// span-relative value is larger.
const ABS_INLIER_THRESHOLD: f64 = 2.0;
const REL_INLIER_THRESHOLD: f64 = 0.005;

pub(crate) fn search(
    curves: &[TracedCurve],
    down: Vector2<f64>,
    options: &RansacOptions,
) -> Option<RansacModel> {
    let n = curves.len();
    if n < MIN_CONSENSUS {
        return None;
    }

    let mut best: Option<RansacModel> = None;
    let pairs = n * (n - 1) / 2;
    if pairs <= options.max_trials {
        for i in 0..n {
            for j in i + 1..n {
                consider(&mut best, assess_pair(curves, i, j, down));
            }
        }
    } else {
        let mut rng = StdRng::seed_from_u64(options.seed);
        let mut stale = 0usize;
        for _ in 0..options.max_trials {
            let i = rng.gen_range(0..n);
            let mut j = rng.gen_range(0..n - 1);
            if j >= i {
                j += 1;
            }
            if consider(&mut best, assess_pair(curves, i, j, down)) {
                stale = 0;
            } else {
                stale += 1;
                if stale >= options.no_improvement_window {
                    break;
                }
            }
            if best.as_ref().is_some_and(|m| m.inliers == n) {
                break;
            }
        }
    }

    best.filter(|m| m.inliers >= MIN_CONSENSUS)
}

/// Replaces `best` when `candidate` ranks higher. Returns true on
/// improvement.
fn consider(best: &mut Option<RansacModel>, candidate: Option<RansacModel>) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    let improved = match best {
        Some(current) => {
            candidate.inliers > current.inliers
                || (candidate.inliers == current.inliers && candidate.error < current.error)
        }
        None => true,
    };
    if improved {
        *best = Some(candidate);
    }
    improved
}

fn assess_pair(
    curves: &[TracedCurve],
    i: usize,
    j: usize,
    down: Vector2<f64>,
) -> Option<RansacModel> {
    // Orient the hypothesis: the curve whose centroid projects less onto the
    // down direction is the top directrix.
    let (ti, bi) = if curves[i].centroid.coords.dot(&down) <= curves[j].centroid.coords.dot(&down)
    {
        (i, j)
    } else {
        (j, i)
    };

    let top: Vec<Point2<f64>> = sample_spline(&curves[ti]);
    let bottom: Vec<Point2<f64>> = sample_spline(&curves[bi]);
    let spans: Vec<Vector2<f64>> = top
        .iter()
        .zip(bottom.iter())
        .map(|(t, b)| b - t)
        .collect();
    let mut span_sum = 0.0;
    let mut span_sq = 0.0;
    for s in &spans {
        let norm = s.norm();
        span_sum += norm;
        span_sq += norm * norm;
    }
    let mean_span = span_sum / SAMPLES_PER_CURVE as f64;
    if mean_span <= MIN_PAIR_SPAN {
        return None;
    }
    let span_spread = (span_sq / SAMPLES_PER_CURVE as f64 - mean_span * mean_span).max(0.0);

    let threshold = ABS_INLIER_THRESHOLD.max(REL_INLIER_THRESHOLD * mean_span);
    let mut inliers = MIN_CONSENSUS; // the sampled pair is consistent with itself
    let mut error = span_spread;
    for (k, curve) in curves.iter().enumerate() {
        if k == ti || k == bi {
            continue;
        }
        let dev = deviation(curve, &top, &spans, mean_span);
        if dev <= threshold {
            inliers += 1;
            error += dev * dev;
        }
    }

    Some(RansacModel {
        top: ti,
        bottom: bi,
        inliers,
        error,
    })
}

fn sample_spline(curve: &TracedCurve) -> Vec<Point2<f64>> {
    curve.spline.sample(SAMPLES_PER_CURVE)
}

/// Pixel-scale spread of the curve's interpolation coordinate under the
/// hypothesis described by `top` samples and per-sample `spans`.
fn deviation(
    curve: &TracedCurve,
    top: &[Point2<f64>],
    spans: &[Vector2<f64>],
    mean_span: f64,
) -> f64 {
    let samples = sample_spline(curve);
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut count = 0usize;
    for k in 0..SAMPLES_PER_CURVE {
        let len_sq = spans[k].norm_squared();
        if len_sq <= f64::EPSILON {
            continue;
        }
        let v = (samples[k] - top[k]).dot(&spans[k]) / len_sq;
        sum += v;
        sum_sq += v * v;
        count += 1;
    }
    if count == 0 {
        return f64::INFINITY;
    }
    let mean = sum / count as f64;
    let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
    variance.sqrt() * mean_span
}
