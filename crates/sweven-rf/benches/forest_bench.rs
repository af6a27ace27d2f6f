//! Criterion benchmarks for forest training, prediction and cross-validation.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use sweven_data::{Dataset, make_classification};
use sweven_rf::{CrossValidation, RandomForestConfig};

fn dataset(n_samples: usize) -> Dataset<usize> {
    make_classification(n_samples, 10, 2, 42).unwrap()
}

fn bench_train(c: &mut Criterion) {
    let data = dataset(1000);
    let mut group = c.benchmark_group("rf_train_1000x10");
    for n_trees in [10, 100] {
        let cfg = RandomForestConfig::new(n_trees).unwrap().with_seed(42);
        group.bench_with_input(BenchmarkId::from_parameter(n_trees), &cfg, |b, cfg| {
            b.iter(|| {
                cfg.fit(data.features(), data.targets(), data.feature_names())
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_predict_batch(c: &mut Criterion) {
    let data = dataset(1000);
    let forest = RandomForestConfig::new(100)
        .unwrap()
        .fit(data.features(), data.targets(), data.feature_names())
        .unwrap()
        .into_forest();

    c.bench_function("rf_predict_batch_1000x10_100trees", |b| {
        b.iter(|| forest.predict_batch(data.features()).unwrap());
    });
}

fn bench_cross_validation(c: &mut Criterion) {
    let data = dataset(500);
    let cfg = RandomForestConfig::new(20).unwrap();
    let cv = CrossValidation::new(5).unwrap();

    c.bench_function("rf_cv5_500x10_20trees", |b| {
        b.iter(|| {
            cv.evaluate(&cfg, data.features(), data.targets(), data.feature_names())
                .unwrap()
        });
    });
}

criterion_group!(benches, bench_train, bench_predict_batch, bench_cross_validation);
criterion_main!(benches);
