//! Distortion model estimation from traced curves.
//!
//! Overview
//! - Accumulates two vertical content bounds and any number of polylines
//!   that should become straight and horizontal after dewarping, kept in
//!   left-to-right order by centroid projection.
//! - At build time each polyline is trimmed or extended so it spans
//!   bound-to-bound, then a parametric spline is fitted with its endpoints
//!   anchored on the bounds. Degenerate curves are rejected individually and
//!   never abort the build.
//! - A seeded consensus search samples curve pairs as top/bottom directrix
//!   hypotheses, scores every other curve against the interpolated warp each
//!   pair implies, and keeps the best-supported pair.
//! - The result is a [`DistortionModel`] that may be invalid; callers must
//!   check the flag before use.
//!
//! Modules
//! - [`model`] – the output value object.
//! - [`ransac`] – the consensus search and its options.
//! - `trim` – pure polyline clipping/extension against the bounds.
//! - `traced` – per-curve trimming + spline fitting with rejection reasons.
//! - [`visualize`] – optional debug overlays; purely observational.

mod builder;
pub mod model;
pub mod ransac;
mod traced;
mod trim;
pub mod visualize;

pub use builder::DistortionModelBuilder;
pub use model::DistortionModel;
pub use ransac::RansacOptions;
