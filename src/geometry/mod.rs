//! Geometric primitives shared by both estimators: infinite lines,
//! polyline measures, and the parametric curve used for directrices.

pub mod line;
pub mod polyline;
pub mod spline;

pub use self::line::Line;
pub use self::spline::Spline;
