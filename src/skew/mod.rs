//! Global skew estimation via a multi-resolution shear-projection search.
//!
//! The finder scores candidate angles on a threshold-reduced copy of the
//! input (fast, coarse), then refines the winner on a higher-resolution copy
//! with a narrower window, halving the step until the desired accuracy is
//! reached. Scores are sums of squared sheared-row counts; see the `score`
//! submodule for the metric.

mod score;

use crate::image::{reduce_times, BinaryImage};
use log::debug;
use score::{flat_profile_energy, score_at_angle};
use serde::{Deserialize, Serialize};

/// The result of the find-skew operation.
///
/// The angle is in degrees, positive for clockwise skews. Confidence starts
/// at 0 (worst); anything at or above [`Skew::GOOD_CONFIDENCE`] is a
/// trustworthy estimate. A low-confidence result is not an error, just a
/// weakly supported one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Skew {
    pub angle: f64,
    pub confidence: f64,
}

impl Skew {
    /// Threshold separating good and poor confidence values.
    ///
    /// Confidence is the ratio of the best profile energy to the energy of
    /// the same ink spread uniformly, minus one. Text pages concentrate ink
    /// into line rows and land well above this; noise lands near zero.
    pub const GOOD_CONFIDENCE: f64 = 1.5;
}

/// Configuration for [`SkewFinder`], checked by [`SkewFinderOptions::validate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SkewFinderOptions {
    /// Search half-range in degrees; both directions up to this magnitude
    /// are examined. Can't exceed 45.
    pub max_angle: f64,
    /// Angles below this magnitude are treated as noise and reported as
    /// exactly zero. Can't exceed `max_angle`.
    pub min_angle: f64,
    /// Desired angular resolution of the final answer, in degrees.
    pub accuracy: f64,
    /// Number of 2× reductions applied before the coarse search. The default
    /// suits 300 dpi scans; overly aggressive reduction destroys line
    /// structure and produces garbage angles.
    pub coarse_reduction: u32,
    /// Number of 2× reductions applied before the fine refinement.
    pub fine_reduction: u32,
    /// Horizontal optical resolution divided by vertical. Corrects the angle
    /// geometry when pixels aren't square.
    pub resolution_ratio: f64,
}

impl SkewFinderOptions {
    pub const DEFAULT_MAX_ANGLE: f64 = 7.0;
    pub const DEFAULT_MIN_ANGLE: f64 = 0.05;
    pub const DEFAULT_ACCURACY: f64 = 0.1;
    pub const DEFAULT_COARSE_REDUCTION: u32 = 2;
    pub const DEFAULT_FINE_REDUCTION: u32 = 1;

    pub fn validate(&self) -> Result<(), SkewOptionsError> {
        if !(self.max_angle > 0.0 && self.max_angle <= 45.0) {
            return Err(SkewOptionsError::MaxAngleOutOfRange(self.max_angle));
        }
        if !(self.min_angle >= 0.0 && self.min_angle <= self.max_angle) {
            return Err(SkewOptionsError::MinAngleOutOfRange {
                min: self.min_angle,
                max: self.max_angle,
            });
        }
        if !(self.accuracy > 0.0) {
            return Err(SkewOptionsError::NonPositiveAccuracy(self.accuracy));
        }
        if !(self.resolution_ratio > 0.0) {
            return Err(SkewOptionsError::NonPositiveResolutionRatio(
                self.resolution_ratio,
            ));
        }
        Ok(())
    }
}

impl Default for SkewFinderOptions {
    fn default() -> Self {
        Self {
            max_angle: Self::DEFAULT_MAX_ANGLE,
            min_angle: Self::DEFAULT_MIN_ANGLE,
            accuracy: Self::DEFAULT_ACCURACY,
            coarse_reduction: Self::DEFAULT_COARSE_REDUCTION,
            fine_reduction: Self::DEFAULT_FINE_REDUCTION,
            resolution_ratio: 1.0,
        }
    }
}

/// Configuration rejected by [`SkewFinderOptions::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum SkewOptionsError {
    /// `max_angle` must be in (0, 45].
    MaxAngleOutOfRange(f64),
    /// `min_angle` must be in [0, max_angle].
    MinAngleOutOfRange { min: f64, max: f64 },
    /// `accuracy` must be positive.
    NonPositiveAccuracy(f64),
    /// `resolution_ratio` must be positive.
    NonPositiveResolutionRatio(f64),
}

impl std::fmt::Display for SkewOptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaxAngleOutOfRange(v) => {
                write!(f, "max angle {} outside (0, 45] degrees", v)
            }
            Self::MinAngleOutOfRange { min, max } => {
                write!(f, "min angle {} outside [0, {}] degrees", min, max)
            }
            Self::NonPositiveAccuracy(v) => write!(f, "accuracy {} must be positive", v),
            Self::NonPositiveResolutionRatio(v) => {
                write!(f, "resolution ratio {} must be positive", v)
            }
        }
    }
}

impl std::error::Error for SkewOptionsError {}

/// Absolute score floor below which no reliable line structure exists and
/// the angle is forced to zero.
const LOW_SCORE: f64 = 1000.0;
/// Seed evaluations per side of zero before step halving takes over. The
/// grid is bounded and independent of the requested accuracy; without it
/// the halving search can stall on the flat part of the score profile.
const COARSE_GRID_POINTS: usize = 14;
/// The coarse stage never refines below this step (degrees); the fine stage
/// takes over from there.
const COARSE_STEP_FLOOR: f64 = 0.25;
/// 2×2-block black-pixel count required to keep a reduced pixel black.
const REDUCE_BLACK_THRESHOLD: u32 = 2;
/// Safety cap on step-halving rounds.
const MAX_REFINE_ROUNDS: usize = 64;

/// Multi-resolution skew estimator. Stateless across calls; construct once
/// and reuse, or keep one per worker thread.
#[derive(Clone, Debug)]
pub struct SkewFinder {
    options: SkewFinderOptions,
}

impl SkewFinder {
    /// Validates the options and builds a finder.
    pub fn new(options: SkewFinderOptions) -> Result<Self, SkewOptionsError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &SkewFinderOptions {
        &self.options
    }

    /// Processes the image and determines its skew.
    ///
    /// If the image contains text columns at slightly different angles, one
    /// of those angles is found, with a lower confidence.
    pub fn find_skew(&self, image: &BinaryImage) -> Skew {
        let o = &self.options;
        if image.width() == 0 || image.height() == 0 || image.count_black() == 0 {
            return Skew::default();
        }

        let coarse = reduce_times(image, o.coarse_reduction, REDUCE_BLACK_THRESHOLD);
        let coarse_step = o.accuracy.max(COARSE_STEP_FLOOR);
        let grid_step = o.max_angle / COARSE_GRID_POINTS as f64;
        let seed = self.grid_scan(&coarse, grid_step);
        let (coarse_angle, coarse_score) = self.refine(&coarse, seed, grid_step, coarse_step);
        debug!(
            "coarse skew search: angle={:.3} score={:.1}",
            coarse_angle, coarse_score
        );

        let fine = if o.fine_reduction == o.coarse_reduction {
            coarse
        } else {
            reduce_times(image, o.fine_reduction, REDUCE_BLACK_THRESHOLD)
        };
        let fine_window = (coarse_step * 2.0).min(o.max_angle);
        let (mut angle, best) = self.refine(&fine, coarse_angle, fine_window, o.accuracy);

        let flat = flat_profile_energy(&fine);
        let confidence = if flat > 0.0 {
            (best / flat - 1.0).max(0.0)
        } else {
            0.0
        };
        if best <= LOW_SCORE || angle.abs() < o.min_angle {
            angle = 0.0;
        }
        debug!("skew: angle={:.3} confidence={:.3}", angle, confidence);
        Skew { angle, confidence }
    }

    /// Best angle on the symmetric seed grid with spacing `step`.
    fn grid_scan(&self, image: &BinaryImage, step: f64) -> f64 {
        let ratio = self.options.resolution_ratio;
        let mut best_angle = 0.0;
        let mut best = score_at_angle(image, 0.0, ratio);
        for i in 1..=COARSE_GRID_POINTS {
            let magnitude = step * i as f64;
            for cand in [magnitude, -magnitude] {
                let s = score_at_angle(image, cand, ratio);
                if s > best {
                    best = s;
                    best_angle = cand;
                }
            }
        }
        best_angle
    }

    /// Hill-climbs the projection score from `center`, halving the step each
    /// time neither neighbor improves, until the step reaches `target`.
    fn refine(
        &self,
        image: &BinaryImage,
        center: f64,
        initial_step: f64,
        target: f64,
    ) -> (f64, f64) {
        let max_angle = self.options.max_angle;
        let ratio = self.options.resolution_ratio;
        let mut center = center.clamp(-max_angle, max_angle);
        let mut best = score_at_angle(image, center, ratio);
        let mut step = initial_step.max(target);
        for _ in 0..MAX_REFINE_ROUNDS {
            let mut moved = false;
            for cand in [center - step, center + step] {
                if cand.abs() > max_angle + 1e-9 {
                    continue;
                }
                let s = score_at_angle(image, cand, ratio);
                if s > best {
                    best = s;
                    center = cand;
                    moved = true;
                }
            }
            if !moved {
                if step <= target {
                    break;
                }
                step *= 0.5;
            }
        }
        (center, best)
    }
}

impl Default for SkewFinder {
    fn default() -> Self {
        Self {
            options: SkewFinderOptions::default(),
        }
    }
}
