#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod dewarp;
pub mod geometry;
pub mod image;
pub mod skew;

// --- High-level re-exports -------------------------------------------------

// Main entry points: the two estimators and their results.
pub use crate::dewarp::{DistortionModel, DistortionModelBuilder, RansacOptions};
pub use crate::skew::{Skew, SkewFinder, SkewFinderOptions};

// Debug overlay sink shared by diagnostic rendering.
pub use crate::dewarp::visualize::DebugImages;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use page_rectify::prelude::*;
///
/// # fn main() {
/// let image = BinaryImage::new(640, 480);
/// let skew = SkewFinder::default().find_skew(&image);
/// println!("angle={:.2} confidence={:.2}", skew.angle, skew.confidence);
/// # }
/// ```
pub mod prelude {
    pub use crate::dewarp::{DistortionModel, DistortionModelBuilder};
    pub use crate::geometry::Line;
    pub use crate::image::BinaryImage;
    pub use crate::skew::{Skew, SkewFinder, SkewFinderOptions};
}
