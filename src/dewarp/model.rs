use crate::geometry::Spline;
use serde::Serialize;

/// Output of the model build: a pair of directrix curves describing the
/// page warp, plus a validity flag.
///
/// Both directrices span the vertical bounds exactly (their endpoints lie on
/// the bounds). The model is valid only when at least two mutually
/// consistent curves were found; the curves of an invalid model are empty
/// and meaningless. Immutable once returned.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DistortionModel {
    pub valid: bool,
    /// Directrix closer to the top of the page in terms of content.
    pub top: Spline,
    /// Directrix closer to the bottom of the page in terms of content.
    pub bottom: Spline,
}

impl DistortionModel {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}
