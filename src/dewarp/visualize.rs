//! Debug overlay rendering for the model build.
//!
//! Purely observational side channel: overlays of the trimmed curves and of
//! the chosen model, collected into a [`DebugImages`] sink the caller can
//! inspect or save. Never required for correctness.

use super::model::DistortionModel;
use super::traced::TracedCurve;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use nalgebra::Point2;
use std::path::Path;

const PALETTE: [Rgb<u8>; 6] = [
    Rgb([200, 40, 40]),
    Rgb([40, 120, 200]),
    Rgb([40, 160, 60]),
    Rgb([200, 140, 20]),
    Rgb([140, 60, 180]),
    Rgb([20, 160, 160]),
];
const TOP_COLOR: Rgb<u8> = Rgb([200, 40, 40]);
const BOTTOM_COLOR: Rgb<u8> = Rgb([40, 120, 200]);
/// Points per directrix in the model overlay.
const MODEL_SAMPLES: usize = 64;
/// Margin around auto-sized canvases, in pixels.
const CANVAS_PAD: u32 = 16;

/// Collector of labeled diagnostic overlays.
///
/// With a background attached, overlays are drawn on top of a copy of it;
/// otherwise each overlay gets a white canvas sized to its content.
#[derive(Clone, Debug, Default)]
pub struct DebugImages {
    background: Option<RgbImage>,
    images: Vec<(String, RgbImage)>,
}

impl DebugImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(background: RgbImage) -> Self {
        Self {
            background: Some(background),
            images: Vec::new(),
        }
    }

    pub fn add(&mut self, label: impl Into<String>, image: RgbImage) {
        self.images.push((label.into(), image));
    }

    pub fn images(&self) -> &[(String, RgbImage)] {
        &self.images
    }

    /// Writes every collected overlay as `<label>.png` under `dir`.
    pub fn save_all(&self, dir: &Path) -> Result<(), String> {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        for (label, image) in &self.images {
            let path = dir.join(format!("{label}.png"));
            image
                .save(&path)
                .map_err(|e| format!("Failed to save {}: {e}", path.display()))?;
        }
        Ok(())
    }
}

/// Overlay of every trimmed/extended curve, one palette color each.
pub(crate) fn draw_trimmed_curves(sink: &mut DebugImages, curves: &[TracedCurve]) {
    let mut canvas = canvas_for(sink, curves.iter().flat_map(|c| c.trimmed.iter().copied()));
    for (idx, curve) in curves.iter().enumerate() {
        draw_polyline(&mut canvas, &curve.trimmed, PALETTE[idx % PALETTE.len()]);
    }
    sink.add("trimmed-curves", canvas);
}

/// Overlay of the chosen model's two directrices.
pub(crate) fn draw_model(sink: &mut DebugImages, model: &DistortionModel) {
    let top = model.top.sample(MODEL_SAMPLES);
    let bottom = model.bottom.sample(MODEL_SAMPLES);
    let mut canvas = canvas_for(sink, top.iter().chain(bottom.iter()).copied());
    draw_polyline(&mut canvas, &top, TOP_COLOR);
    draw_polyline(&mut canvas, &bottom, BOTTOM_COLOR);
    sink.add("distortion-model", canvas);
}

fn canvas_for(sink: &DebugImages, points: impl Iterator<Item = Point2<f64>>) -> RgbImage {
    if let Some(background) = &sink.background {
        return background.clone();
    }
    let mut max_x = 0.0f64;
    let mut max_y = 0.0f64;
    for p in points {
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let w = max_x.ceil() as u32 + CANVAS_PAD;
    let h = max_y.ceil() as u32 + CANVAS_PAD;
    RgbImage::from_pixel(w.max(1), h.max(1), Rgb([255, 255, 255]))
}

fn draw_polyline(canvas: &mut RgbImage, points: &[Point2<f64>], color: Rgb<u8>) {
    for seg in points.windows(2) {
        draw_line_segment_mut(
            canvas,
            (seg[0].x as f32, seg[0].y as f32),
            (seg[1].x as f32, seg[1].y as f32),
            color,
        );
    }
}
