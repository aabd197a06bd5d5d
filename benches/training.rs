use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kestrel_ml::dataset::{SeriesCollection, TrainingSeries, TrainingSet};
use kestrel_ml::models::regression::RegressionModel;
use kestrel_ml::models::series::SeriesClassifier;

fn create_regression_set(n_rows: usize, n_features: usize) -> TrainingSet {
    let mut set = TrainingSet::new();

    for row in 0..n_rows {
        let inputs: Vec<f64> = (0..n_features)
            .map(|col| ((row * n_features + col) as f64 * 0.37).sin() * 10.0)
            .collect();
        // Target as sum of features plus a small deterministic ripple
        let target = inputs.iter().sum::<f64>() + (row as f64 * 0.11).cos() * 0.1;
        set.add(&inputs, &[target]);
    }

    set
}

fn create_wave_series(label: &str, phase: f64, len: usize) -> TrainingSeries {
    let mut series = TrainingSeries::new();
    series.set_label(label);
    for t in 0..len {
        series.add_frame(&[
            (t as f64 * 0.2 + phase).sin(),
            (t as f64 * 0.1 + phase).cos(),
        ]);
    }
    series
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    for n_rows in [1000, 5000, 10000].iter() {
        let set = create_regression_set(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("fit", n_rows), &set, |b, set| {
            b.iter(|| {
                let mut model = RegressionModel::default();
                model.train(black_box(set)).unwrap()
            })
        });
    }

    group.finish();
}

fn bench_series_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_classification");

    for template_len in [32, 64, 128].iter() {
        let mut collection = SeriesCollection::new();
        for i in 0..8 {
            let label = format!("class_{}", i % 4);
            collection.add(&create_wave_series(&label, i as f64 * 0.7, *template_len));
        }

        let mut model = SeriesClassifier::default();
        model.train(&collection).unwrap();

        let query = create_wave_series("query", 0.35, *template_len);
        let frames = query.frames().to_vec();

        group.bench_with_input(
            BenchmarkId::new("classify", template_len),
            &frames,
            |b, frames| {
                b.iter(|| model.run(black_box(frames)).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_series_classification);
criterion_main!(benches);
