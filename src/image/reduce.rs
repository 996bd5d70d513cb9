//! 2× area reduction for bitonal rasters.
//!
//! Each output pixel covers a 2×2 source block and turns black when at least
//! `threshold` of the four source pixels are black. Threshold 1 behaves like
//! a dilating OR, threshold 4 like an eroding AND; 2 approximates area
//! averaging and is what the skew search uses. Blocks hanging over the right
//! or bottom edge treat the missing pixels as white.

use super::BinaryImage;

/// Downscales `src` by 2× in both dimensions.
pub fn reduce_threshold(src: &BinaryImage, threshold: u32) -> BinaryImage {
    assert!((1..=4).contains(&threshold), "threshold must be in 1..=4");
    let nw = src.width().div_ceil(2);
    let nh = src.height().div_ceil(2);
    let mut out = BinaryImage::new(nw, nh);
    for y in 0..nh {
        let sy = y * 2;
        for x in 0..nw {
            let sx = x * 2;
            let mut black = 0u32;
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let px = sx + dx;
                let py = sy + dy;
                if px < src.width() && py < src.height() && src.get(px, py) {
                    black += 1;
                }
            }
            if black >= threshold {
                out.set(x, y, true);
            }
        }
    }
    out
}

/// Applies `times` successive 2× reductions. Zero reductions clone the input.
pub fn reduce_times(src: &BinaryImage, times: u32, threshold: u32) -> BinaryImage {
    let mut current = src.clone();
    for _ in 0..times {
        if current.width() <= 1 && current.height() <= 1 {
            break;
        }
        current = reduce_threshold(&current, threshold);
    }
    current
}
