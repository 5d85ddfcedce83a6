//! Calculator benchmarks: full-scan aggregation cost as the journals grow.
//!
//! The materialized balance cache exists because this fold is linear in
//! history size; these benchmarks track the fold itself.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use hideledger_core::{Category, CompanyId, StockKey, WorkerId};
use hideledger_stock::{
    net_stock, EntryStatus, RemovalLogEntry, RemovalRequest, StockEntry, SubmitterMeta,
};

fn meta() -> SubmitterMeta {
    SubmitterMeta {
        submitter: WorkerId::new(),
        company: CompanyId::new(),
    }
}

fn build_ledger(keys: usize, rows_per_key: usize) -> (Vec<StockEntry>, Vec<RemovalLogEntry>) {
    let mut entries = Vec::new();
    let mut removals = Vec::new();

    for k in 0..keys {
        let key = StockKey::normalized(&format!("leather type {k}")).unwrap();
        for _ in 0..rows_per_key {
            let mut entry =
                StockEntry::submit(Category::Leather, key.clone(), 100, meta(), Utc::now())
                    .unwrap();
            entry.set_status(EntryStatus::Approved).unwrap();
            entries.push(entry);

            let request = RemovalRequest {
                category: Category::Leather,
                key: key.clone(),
                remove_quantity: 40,
                purpose: "sale".to_string(),
                confirmed_by: "Admin".to_string(),
                removal_date: Utc::now(),
            };
            removals.push(RemovalLogEntry::completed(&request, 100, Utc::now()).unwrap());
        }
    }

    (entries, removals)
}

fn bench_net_stock(c: &mut Criterion) {
    let mut group = c.benchmark_group("net_stock_full_scan");

    for (keys, rows) in [(10, 10), (100, 10), (100, 100)] {
        let (entries, removals) = build_ledger(keys, rows);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{keys}keys_x_{rows}rows")),
            &(entries, removals),
            |b, (entries, removals)| {
                b.iter(|| {
                    black_box(net_stock(
                        Category::Leather,
                        black_box(entries),
                        black_box(removals),
                    ))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_net_stock);
criterion_main!(benches);
