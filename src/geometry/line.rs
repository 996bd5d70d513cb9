use nalgebra::{Matrix3, Point2, Vector2};

/// Infinite line in 2D, stored as an anchor point plus a direction.
///
/// Endpoint positions along the line carry no meaning; two lines built from
/// different point pairs on the same carrier compare as geometrically equal
/// even though their fields differ.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    origin: Point2<f64>,
    dir: Vector2<f64>,
}

impl Line {
    /// Builds a line through `origin` along `dir`. The direction can't be
    /// zero-length.
    pub fn new(origin: Point2<f64>, dir: Vector2<f64>) -> Self {
        assert!(dir.norm_squared() > 0.0, "line direction can't be zero");
        Self { origin, dir }
    }

    /// Builds a line through two distinct points.
    pub fn from_points(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self::new(a, b - a)
    }

    #[inline]
    pub fn origin(&self) -> Point2<f64> {
        self.origin
    }

    #[inline]
    pub fn dir(&self) -> Vector2<f64> {
        self.dir
    }

    /// Intersects two lines. Returns `None` when they are parallel.
    pub fn intersect(&self, other: &Line) -> Option<Point2<f64>> {
        let denom = self.dir.perp(&other.dir);
        if denom.abs() <= 1e-12 * self.dir.norm() * other.dir.norm() {
            return None;
        }
        let t = (other.origin - self.origin).perp(&other.dir) / denom;
        Some(self.origin + self.dir * t)
    }

    /// Signed perpendicular distance from `p` to the line. The sign tells
    /// which half-plane `p` lies in; the magnitude is in the same units as
    /// the points.
    pub fn signed_distance(&self, p: &Point2<f64>) -> f64 {
        self.dir.perp(&(p - self.origin)) / self.dir.norm()
    }

    /// Unsigned perpendicular distance from `p` to the line.
    pub fn distance(&self, p: &Point2<f64>) -> f64 {
        self.signed_distance(p).abs()
    }

    /// Maps the line through an affine transform given as a homogeneous
    /// 3×3 matrix (last row `[0, 0, 1]`).
    pub fn transformed(&self, xform: &Matrix3<f64>) -> Line {
        let a = apply_affine(xform, &self.origin);
        let b = apply_affine(xform, &(self.origin + self.dir));
        Line::from_points(a, b)
    }
}

/// Applies a homogeneous affine matrix to a point.
pub fn apply_affine(xform: &Matrix3<f64>, p: &Point2<f64>) -> Point2<f64> {
    Point2::new(
        xform[(0, 0)] * p.x + xform[(0, 1)] * p.y + xform[(0, 2)],
        xform[(1, 0)] * p.x + xform[(1, 1)] * p.y + xform[(1, 2)],
    )
}

/// Applies only the linear part of a homogeneous affine matrix to a vector.
pub fn apply_linear(xform: &Matrix3<f64>, v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(
        xform[(0, 0)] * v.x + xform[(0, 1)] * v.y,
        xform[(1, 0)] * v.x + xform[(1, 1)] * v.y,
    )
}
