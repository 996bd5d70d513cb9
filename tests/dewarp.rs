use nalgebra::{Matrix3, Point2, Vector2};
use page_rectify::geometry::{Line, Spline};
use page_rectify::{DebugImages, DistortionModelBuilder};

const W: f64 = 1024.0;

fn vertical(x: f64) -> Line {
    Line::from_points(Point2::new(x, 0.0), Point2::new(x, 1400.0))
}

fn builder_with_bounds() -> DistortionModelBuilder {
    let mut builder = DistortionModelBuilder::new(Vector2::new(0.0, 1.0));
    builder.set_vertical_bounds(vertical(0.0), vertical(W));
    builder
}

// A consistent warp family: every curve is an interpolation between a bowed
// top and a flatter bottom, exactly the shape a cylinder-like page produces.
fn top_base(x: f64) -> f64 {
    120.0 + 120.0 * (x / W) * (1.0 - x / W)
}

fn bottom_base(x: f64) -> f64 {
    900.0 + 40.0 * (x / W) * (1.0 - x / W)
}

fn family_y(v: f64, x: f64) -> f64 {
    (1.0 - v) * top_base(x) + v * bottom_base(x)
}

/// Family curve sampled every 24 px, stopping 24 px short of each bound so
/// the build has to extend it.
fn family_curve(v: f64) -> Vec<Point2<f64>> {
    let mut points = Vec::new();
    let mut x = 24.0;
    while x <= W - 24.0 {
        points.push(Point2::new(x, family_y(v, x)));
        x += 24.0;
    }
    points
}

/// Max vertical distance between a directrix and the closest iso-curve of
/// the generated family.
fn residual_to_family(spline: &Spline) -> f64 {
    let mid = spline.at(0.5);
    let v = (mid.y - top_base(mid.x)) / (bottom_base(mid.x) - top_base(mid.x));
    (0..=8)
        .map(|i| {
            let p = spline.at(i as f64 / 8.0);
            (p.y - family_y(v, p.x)).abs()
        })
        .fold(0.0, f64::max)
}

#[test]
fn consistent_curves_build_a_valid_model() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut builder = builder_with_bounds();
    for v in [0.0, 0.3, 0.65, 1.0] {
        builder.add_horizontal_curve(family_curve(v));
    }
    let model = builder.try_build_model(None);
    assert!(model.valid);

    // Directrices span bound-to-bound exactly.
    assert!(model.top.start().x.abs() < 1e-6);
    assert!((model.top.end().x - W).abs() < 1e-6);
    assert!(model.bottom.start().x.abs() < 1e-6);
    assert!((model.bottom.end().x - W).abs() < 1e-6);

    // Both directrices follow the generated family closely.
    assert!(residual_to_family(&model.top) < 2.5);
    assert!(residual_to_family(&model.bottom) < 2.5);

    // And they are ordered top above bottom.
    assert!(model.top.at(0.5).y < model.bottom.at(0.5).y);
}

#[test]
fn fewer_than_two_curves_is_always_invalid() {
    let mut builder = builder_with_bounds();
    assert!(!builder.try_build_model(None).valid);
    builder.add_horizontal_curve(family_curve(0.5));
    assert!(!builder.try_build_model(None).valid);
}

#[test]
fn insertion_order_does_not_change_the_stored_order() {
    let left = vec![Point2::new(10.0, 50.0), Point2::new(200.0, 50.0)];
    let mid = vec![Point2::new(400.0, 60.0), Point2::new(620.0, 60.0)];
    let right = vec![Point2::new(800.0, 70.0), Point2::new(1000.0, 70.0)];
    let orders: [[&Vec<Point2<f64>>; 3]; 3] = [
        [&left, &mid, &right],
        [&right, &left, &mid],
        [&mid, &right, &left],
    ];
    for order in orders {
        let mut builder = builder_with_bounds();
        for curve in order {
            builder.add_horizontal_curve(curve.clone());
        }
        let stored: Vec<_> = builder.horizontal_curves().collect();
        assert_eq!(stored, vec![&left[..], &mid[..], &right[..]]);
    }
}

#[test]
fn insertion_order_does_not_change_the_model() {
    let build = |vs: &[f64]| {
        let mut builder = builder_with_bounds();
        for &v in vs {
            builder.add_horizontal_curve(family_curve(v));
        }
        builder.try_build_model(None)
    };
    let a = build(&[0.0, 0.3, 0.65, 1.0]);
    let b = build(&[0.65, 1.0, 0.0, 0.3]);
    assert!(a.valid && b.valid);
    for i in 0..=8 {
        let t = i as f64 / 8.0;
        assert!((a.top.at(t) - b.top.at(t)).norm() < 1e-9);
        assert!((a.bottom.at(t) - b.bottom.at(t)).norm() < 1e-9);
    }
}

#[test]
fn single_outlier_is_outvoted_by_the_consensus() {
    let mut builder = builder_with_bounds();
    for v in [0.0, 0.35, 0.7, 1.0] {
        builder.add_horizontal_curve(family_curve(v));
    }
    // A wildly divergent trace bowing the opposite way.
    let outlier: Vec<Point2<f64>> = (1..43)
        .map(|i| {
            let x = i as f64 * 24.0;
            Point2::new(x, 500.0 - 2400.0 * (x / W) * (1.0 - x / W))
        })
        .collect();
    builder.add_horizontal_curve(outlier);

    let model = builder.try_build_model(None);
    assert!(model.valid);
    assert!(
        residual_to_family(&model.top) < 2.5,
        "top directrix strayed from the consensus family"
    );
    assert!(
        residual_to_family(&model.bottom) < 2.5,
        "bottom directrix strayed from the consensus family"
    );
}

#[test]
fn identity_transform_leaves_the_model_unchanged() {
    let mut builder = builder_with_bounds();
    for v in [0.0, 0.5, 1.0] {
        builder.add_horizontal_curve(family_curve(v));
    }
    let before = builder.try_build_model(None);
    builder.transform(&Matrix3::identity());
    let after = builder.try_build_model(None);
    assert!(before.valid && after.valid);
    for i in 0..=8 {
        let t = i as f64 / 8.0;
        assert!((before.top.at(t) - after.top.at(t)).norm() < 1e-12);
        assert!((before.bottom.at(t) - after.bottom.at(t)).norm() < 1e-12);
    }
}

#[test]
fn translation_shifts_the_model_with_the_frame() {
    let mut builder = builder_with_bounds();
    for v in [0.0, 0.5, 1.0] {
        builder.add_horizontal_curve(family_curve(v));
    }
    let before = builder.try_build_model(None);
    let shift = Matrix3::new(1.0, 0.0, 10.0, 0.0, 1.0, 20.0, 0.0, 0.0, 1.0);
    builder.transform(&shift);
    let after = builder.try_build_model(None);
    assert!(before.valid && after.valid);
    for i in 0..=8 {
        let t = i as f64 / 8.0;
        let moved = before.top.at(t) + Vector2::new(10.0, 20.0);
        assert!((after.top.at(t) - moved).norm() < 1e-9);
    }
}

#[test]
fn curve_outside_the_bounds_is_ignored_at_build_time() {
    let mut builder = builder_with_bounds();
    builder.add_horizontal_curve(family_curve(0.0));
    builder.add_horizontal_curve(family_curve(1.0));
    builder.add_horizontal_curve(vec![
        Point2::new(W + 50.0, 400.0),
        Point2::new(W + 200.0, 400.0),
    ]);
    assert_eq!(builder.curve_count(), 3);
    let model = builder.try_build_model(None);
    assert!(model.valid);
    assert!(residual_to_family(&model.top) < 2.5);
    assert!(residual_to_family(&model.bottom) < 2.5);
}

#[test]
fn debug_sink_collects_both_overlays() {
    let mut builder = builder_with_bounds();
    builder.add_horizontal_curve(family_curve(0.0));
    builder.add_horizontal_curve(family_curve(1.0));
    let mut sink = DebugImages::new();
    let model = builder.try_build_model(Some(&mut sink));
    assert!(model.valid);
    let labels: Vec<&str> = sink.images().iter().map(|(l, _)| l.as_str()).collect();
    assert_eq!(labels, ["trimmed-curves", "distortion-model"]);
}
