use adas::{DetectionConfig, DistanceEstimator, Labels, ModelGeometry, PostProcessor};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;

// Deterministic pseudo-random model output with `classes` class scores per row
fn synthetic_output(rows: usize, classes: usize) -> Array2<f32> {
    let cols = 5 + classes;
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        let noise = ((r * 31 + c * 17) % 97) as f32 / 97.0;
        match c {
            0 | 1 => 320.0 + (noise - 0.5) * 400.0,
            2 | 3 => 20.0 + noise * 200.0,
            _ => noise,
        }
    })
}

fn processor() -> PostProcessor {
    PostProcessor::new(&DetectionConfig::default(), Labels::default(), ModelGeometry::default())
}

fn bench_select_best_small(c: &mut Criterion) {
    let output = synthetic_output(100, 6);
    let processor = processor();

    c.bench_function("select_best_100x11", |b| {
        b.iter(|| {
            let mut estimator = DistanceEstimator::default();
            processor.select_best(black_box(output.view()), 1280, 720, &mut estimator)
        })
    });
}

fn bench_select_best_full(c: &mut Criterion) {
    let output = synthetic_output(8400, 80);
    let processor = processor();

    c.bench_function("select_best_8400x85", |b| {
        b.iter(|| {
            let mut estimator = DistanceEstimator::default();
            processor.select_best(black_box(output.view()), 1280, 720, &mut estimator)
        })
    });
}

criterion_group!(benches, bench_select_best_small, bench_select_best_full);
criterion_main!(benches);
