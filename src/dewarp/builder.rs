use super::model::DistortionModel;
use super::ransac::{self, RansacOptions};
use super::traced::{trace_curve, TracedCurve};
use super::visualize::{self, DebugImages};
use crate::geometry::line::{apply_affine, apply_linear};
use crate::geometry::{polyline, Line};
use log::debug;
use nalgebra::{Matrix3, Point2, Vector2};

/// Polylines shorter than this carry no usable shape and are dropped at
/// accumulation time.
const MIN_CURVE_LENGTH: f64 = 1e-6;

/// Accumulates vertical bounds and traced horizontal curves, then tries to
/// build a [`DistortionModel`].
///
/// The accumulation methods mutate the builder; [`try_build_model`] is a
/// pure read of the accumulated state. One instance belongs to one thread,
/// but distinct instances are fully independent.
///
/// [`try_build_model`]: DistortionModelBuilder::try_build_model
#[derive(Clone, Debug)]
pub struct DistortionModelBuilder {
    down: Vector2<f64>,
    right: Vector2<f64>,
    bounds: Option<(Line, Line)>,
    /// Stored curves, kept sorted left-to-right in terms of content.
    curves: Vec<StoredCurve>,
    ransac: RansacOptions,
}

#[derive(Clone, Debug)]
struct StoredCurve {
    points: Vec<Point2<f64>>,
    /// Centroid projected onto the right direction; the sort key.
    key: f64,
}

impl DistortionModelBuilder {
    /// Creates a builder for a page whose content-down direction is `down`
    /// (for an upright page this is `(0, 1)`). The vector can't be
    /// zero-length.
    pub fn new(down: Vector2<f64>) -> Self {
        assert!(down.norm_squared() > 0.0, "down direction can't be zero");
        Self {
            right: right_of(down),
            down,
            bounds: None,
            curves: Vec::new(),
            ransac: RansacOptions::default(),
        }
    }

    /// Overrides the consensus-search options (trial budget, seed).
    pub fn set_ransac_options(&mut self, options: RansacOptions) {
        self.ransac = options;
    }

    /// Sets the two vertical content bounds, replacing any previous pair.
    ///
    /// These are infinite lines, not segments, so endpoint positions along
    /// each line don't matter. It is also not specified which one is the
    /// left bound and which one is the right.
    pub fn set_vertical_bounds(&mut self, bound1: Line, bound2: Line) {
        self.bounds = Some((bound1, bound2));
    }

    /// Returns the current bounds in storage order, if set. Not guaranteed
    /// to be (left, right).
    pub fn vertical_bounds(&self) -> Option<(Line, Line)> {
        self.bounds
    }

    /// Adds a curve that's meant to become straight and horizontal after
    /// dewarping.
    ///
    /// The curve doesn't have to touch or cross the vertical bounds, though
    /// longer curves constrain the model better. Empty or near-zero-length
    /// polylines are dropped silently.
    pub fn add_horizontal_curve(&mut self, points: Vec<Point2<f64>>) {
        if points.len() < 2 || polyline::arc_length(&points) <= MIN_CURVE_LENGTH {
            debug!("degenerate polyline dropped at accumulation");
            return;
        }
        let key = polyline::centroid(&points).coords.dot(&self.right);
        let pos = self.curves.partition_point(|c| c.key <= key);
        self.curves.insert(pos, StoredCurve { points, key });
    }

    /// Accumulated curves in left-to-right order of their centroids.
    pub fn horizontal_curves(&self) -> impl Iterator<Item = &[Point2<f64>]> {
        self.curves.iter().map(|c| c.points.as_slice())
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    /// Re-expresses the accumulated state in a different coordinate frame
    /// by applying an affine transform (homogeneous 3×3, last row
    /// `[0, 0, 1]`) to the bounds, every stored polyline, and the content
    /// directions.
    pub fn transform(&mut self, xform: &Matrix3<f64>) {
        if let Some((a, b)) = self.bounds {
            self.bounds = Some((a.transformed(xform), b.transformed(xform)));
        }
        self.down = apply_linear(xform, &self.down);
        assert!(
            self.down.norm_squared() > 0.0,
            "transform collapsed the down direction"
        );
        self.right = right_of(self.down);
        for curve in &mut self.curves {
            for p in &mut curve.points {
                *p = apply_affine(xform, p);
            }
            curve.key = polyline::centroid(&curve.points).coords.dot(&self.right);
        }
        self.curves
            .sort_by(|a, b| a.key.partial_cmp(&b.key).expect("finite sort keys"));
    }

    /// Tries to build a distortion model from the information provided so
    /// far. The returned model may be invalid; see
    /// [`DistortionModel::is_valid`].
    ///
    /// With a debug sink attached, overlays of the trimmed curves and of
    /// the chosen model are rendered as a side channel; they never affect
    /// the returned model.
    pub fn try_build_model(&self, mut debug_sink: Option<&mut DebugImages>) -> DistortionModel {
        let Some((bound1, bound2)) = self.bounds else {
            debug!("no vertical bounds set; model invalid");
            return DistortionModel::default();
        };

        let mut traced: Vec<TracedCurve> = Vec::with_capacity(self.curves.len());
        for stored in &self.curves {
            match trace_curve(&stored.points, &bound1, &bound2) {
                Ok(curve) => traced.push(curve),
                Err(rejection) => debug!("curve rejected: {rejection}"),
            }
        }
        if let Some(sink) = debug_sink.as_deref_mut() {
            visualize::draw_trimmed_curves(sink, &traced);
        }
        if traced.len() < 2 {
            debug!("{} usable curve(s); model invalid", traced.len());
            return DistortionModel::default();
        }

        let Some(winner) = ransac::search(&traced, self.down, &self.ransac) else {
            debug!("no consistent curve pair found; model invalid");
            return DistortionModel::default();
        };
        debug!(
            "model from curves {} and {}: {} inliers",
            winner.top, winner.bottom, winner.inliers
        );
        let model = DistortionModel {
            valid: true,
            top: traced[winner.top].spline.clone(),
            bottom: traced[winner.bottom].spline.clone(),
        };
        if let Some(sink) = debug_sink {
            visualize::draw_model(sink, &model);
        }
        model
    }
}

fn right_of(down: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(down.y, -down.x)
}
