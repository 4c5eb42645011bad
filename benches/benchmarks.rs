use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tami::index::{time_adjusted_market_index, IncrementalTami, IndexBuilder};
use tami::pipeline::{filter_extreme_outliers, filter_probable_outliers, sort_transactions};
use tami::types::Transaction;

fn synthetic_history(transactions: usize, items: u64) -> Vec<Transaction> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..transactions as u64)
        .map(|i| {
            let item_id = i % items;
            let price = 100.0 + (item_id as f64) * 5.0 + ((i * 31) % 97) as f64;
            Transaction::new(item_id, price, base + Duration::minutes(i as i64))
        })
        .collect()
}

fn benchmark_batch_index(c: &mut Criterion) {
    let transactions = synthetic_history(10_000, 250);

    c.bench_function("batch_index_10k", |b| {
        b.iter(|| {
            let history = IndexBuilder::build(black_box(&transactions));
            time_adjusted_market_index(&history)
        });
    });
}

fn benchmark_incremental_index(c: &mut Criterion) {
    let transactions = synthetic_history(10_000, 250);

    c.bench_function("incremental_index_10k", |b| {
        b.iter(|| IncrementalTami::compute(black_box(&transactions)));
    });
}

fn benchmark_outlier_filters(c: &mut Criterion) {
    let transactions = synthetic_history(10_000, 250);

    c.bench_function("outlier_filters_10k", |b| {
        b.iter(|| {
            let kept = filter_extreme_outliers(black_box(&transactions));
            filter_probable_outliers(&kept)
        });
    });
}

fn benchmark_sort(c: &mut Criterion) {
    let mut transactions = synthetic_history(50_000, 500);
    transactions.reverse();

    c.bench_function("sort_50k", |b| {
        b.iter(|| sort_transactions(black_box(&transactions)));
    });
}

criterion_group!(
    benches,
    benchmark_batch_index,
    benchmark_incremental_index,
    benchmark_outlier_filters,
    benchmark_sort
);
criterion_main!(benches);
