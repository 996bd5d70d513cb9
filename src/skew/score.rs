//! Projection-profile scoring of a candidate skew angle.
//!
//! A candidate angle is applied as a vertical shear: column `x` shifts by
//! `-x * tan(angle) / resolution_ratio` rows, which for the small angles in
//! scope is equivalent to rotating the page content. Black pixels are
//! accumulated into sheared row buckets and the score is the sum of squared
//! bucket counts. Aligned text lines concentrate ink into few rows and score
//! high; misaligned text smears the profile and scores low.

use crate::image::BinaryImage;

/// Score of the image sheared by `angle_deg` (degrees, positive clockwise).
pub(crate) fn score_at_angle(img: &BinaryImage, angle_deg: f64, resolution_ratio: f64) -> f64 {
    let w = img.width();
    let h = img.height();
    if w == 0 || h == 0 {
        return 0.0;
    }
    // Pixel-space slope of a physically horizontal line skewed by the
    // candidate angle, corrected for non-square pixel aspect.
    let slope = -angle_deg.to_radians().tan() / resolution_ratio;
    let shift = |x: usize| (slope * x as f64).round() as i64;

    let extreme = shift(w - 1);
    let offset = (-extreme.min(0)) as usize;
    let buckets_len = h + extreme.unsigned_abs() as usize;
    let mut buckets = vec![0u64; buckets_len];

    // Columns sharing the same integer shift form contiguous runs; count
    // black pixels per row over each run with word-level popcounts.
    let mut x = 0usize;
    while x < w {
        let s = shift(x);
        let mut end = x + 1;
        while end < w && shift(end) == s {
            end += 1;
        }
        let base = (s + offset as i64) as usize;
        for (y, bucket) in buckets[base..base + h].iter_mut().enumerate() {
            *bucket += img.count_row_range(y, x, end) as u64;
        }
        x = end;
    }

    buckets.iter().map(|&c| (c as f64) * (c as f64)).sum()
}

/// Energy of a uniform profile carrying the same total ink: the baseline
/// against which a peaked profile is judged.
pub(crate) fn flat_profile_energy(img: &BinaryImage) -> f64 {
    if img.height() == 0 {
        return 0.0;
    }
    let total = img.count_black() as f64;
    total * total / img.height() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Horizontal bands of `thickness` rows every `pitch` rows, each band
    /// following the pixel slope `tan(angle_deg)`.
    fn banded_image(w: usize, h: usize, pitch: usize, thickness: usize, angle_deg: f64) -> BinaryImage {
        let slope = angle_deg.to_radians().tan();
        let mut img = BinaryImage::new(w, h);
        for x in 0..w {
            let dy = (slope * x as f64).round() as i64;
            for base in (0..h as i64).step_by(pitch) {
                for t in 0..thickness as i64 {
                    let y = base + t + dy;
                    if (0..h as i64).contains(&y) {
                        img.set(x, y as usize, true);
                    }
                }
            }
        }
        img
    }

    #[test]
    fn aligned_bands_beat_misaligned_candidates() {
        let img = banded_image(256, 144, 24, 4, 0.0);
        let at_zero = score_at_angle(&img, 0.0, 1.0);
        assert!(at_zero > score_at_angle(&img, 3.0, 1.0));
        assert!(at_zero > score_at_angle(&img, -3.0, 1.0));
    }

    #[test]
    fn skewed_bands_peak_at_their_angle() {
        let img = banded_image(256, 144, 24, 4, 2.0);
        let at_truth = score_at_angle(&img, 2.0, 1.0);
        assert!(at_truth > score_at_angle(&img, 0.0, 1.0));
        assert!(at_truth > score_at_angle(&img, 4.0, 1.0));
    }

    #[test]
    fn flat_energy_matches_uniform_profile() {
        let mut img = BinaryImage::new(64, 4);
        for y in 0..4 {
            for x in 0..10 {
                img.set(x, y, true);
            }
        }
        // 40 black pixels over 4 rows: flat = 40^2 / 4 = 400, which equals
        // the actual profile energy of this perfectly uniform image.
        assert_eq!(flat_profile_energy(&img), 400.0);
        assert_eq!(score_at_angle(&img, 0.0, 1.0), 400.0);
    }

    #[test]
    fn empty_image_scores_zero() {
        let img = BinaryImage::new(0, 0);
        assert_eq!(score_at_angle(&img, 1.0, 1.0), 0.0);
        assert_eq!(flat_profile_energy(&img), 0.0);
    }
}
