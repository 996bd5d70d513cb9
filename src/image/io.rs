//! I/O helpers for bitonal rasters and JSON.
//!
//! - `load_binary_image`: read a PNG/JPEG/etc., grayscale it, and threshold
//!   to a `BinaryImage` (darker than the threshold = black content).
//! - `save_binary_image`: write a `BinaryImage` to a grayscale PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.

use super::BinaryImage;
use image::{GrayImage, Luma};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and binarize it at `threshold` (0..=255).
pub fn load_binary_image(path: &Path, threshold: u8) -> Result<BinaryImage, String> {
    let gray = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_luma8();
    Ok(binarize(&gray, threshold))
}

/// Threshold an 8-bit grayscale buffer into a `BinaryImage`.
pub fn binarize(gray: &GrayImage, threshold: u8) -> BinaryImage {
    let mut out = BinaryImage::new(gray.width() as usize, gray.height() as usize);
    for (x, y, Luma([v])) in gray.enumerate_pixels() {
        if *v < threshold {
            out.set(x as usize, y as usize, true);
        }
    }
    out
}

/// Save a binary image to a grayscale PNG (black content on white).
pub fn save_binary_image(img: &BinaryImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(img.width() as u32, img.height() as u32);
    for y in 0..img.height() {
        for x in 0..img.width() {
            let v = if img.get(x, y) { 0u8 } else { 255u8 };
            out.put_pixel(x as u32, y as u32, Luma([v]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
