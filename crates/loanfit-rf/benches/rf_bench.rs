//! Criterion benchmarks for loanfit-rf: tree and forest training, batch prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use loanfit_rf::{DecisionTreeConfig, RandomForestConfig};

/// Loan-sized table: 19 numeric columns, binary label driven by two of them.
fn make_classification(n_samples: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let row: Vec<f64> = (0..19).map(|_| rng.r#gen::<f64>()).collect();
        labels.push(usize::from(row[0] - row[3] > 0.2));
        features.push(row);
    }
    (features, labels)
}

fn bench_tree_train(c: &mut Criterion) {
    let (features, labels) = make_classification(2000, 42);
    let cfg = DecisionTreeConfig::new();

    c.bench_function("tree_train_2000x19", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

fn bench_rf_train(c: &mut Criterion) {
    let (features, labels) = make_classification(2000, 42);
    let cfg = RandomForestConfig::new(100).unwrap().with_seed(42);

    c.bench_function("rf_train_2000x19_100trees", |b| {
        b.iter(|| cfg.fit(&features, &labels).unwrap());
    });
}

fn bench_rf_predict_batch(c: &mut Criterion) {
    let (features, labels) = make_classification(2000, 42);
    let forest = RandomForestConfig::new(100)
        .unwrap()
        .with_seed(42)
        .fit(&features, &labels)
        .unwrap();

    c.bench_function("rf_predict_batch_2000x19_100trees", |b| {
        b.iter(|| forest.predict_batch(&features).unwrap());
    });
}

criterion_group!(benches, bench_tree_train, bench_rf_train, bench_rf_predict_batch);
criterion_main!(benches);
