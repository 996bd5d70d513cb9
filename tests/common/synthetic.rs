//! Synthetic page rasters for the estimator tests.

use page_rectify::image::BinaryImage;
use rand::prelude::*;

/// Page of horizontal text-line bands: `thickness` black rows every `pitch`
/// rows, each band skewed clockwise by `angle_deg`.
pub fn banded_page(
    width: usize,
    height: usize,
    pitch: usize,
    thickness: usize,
    angle_deg: f64,
) -> BinaryImage {
    banded_page_slope(width, height, pitch, thickness, angle_deg.to_radians().tan())
}

/// Like [`banded_page`] but with the band slope given directly in pixels of
/// drop per pixel of run, for simulating non-square pixel aspect.
pub fn banded_page_slope(
    width: usize,
    height: usize,
    pitch: usize,
    thickness: usize,
    slope: f64,
) -> BinaryImage {
    assert!(pitch > thickness, "bands must leave white gaps");
    let mut img = BinaryImage::new(width, height);
    for x in 0..width {
        let dy = (slope * x as f64).round() as i64;
        for base in (0..height as i64).step_by(pitch) {
            for t in 0..thickness as i64 {
                let y = base + t + dy;
                if (0..height as i64).contains(&y) {
                    img.set(x, y as usize, true);
                }
            }
        }
    }
    img
}

/// Unstructured salt noise covering roughly `fill` of the page.
pub fn noise_page(width: usize, height: usize, fill: f64, seed: u64) -> BinaryImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = BinaryImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if rng.gen::<f64>() < fill {
                img.set(x, y, true);
            }
        }
    }
    img
}
