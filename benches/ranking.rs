//! Ranking benchmarks for PureMark.
//!
//! Run with: cargo bench
//!
//! Ranking runs on every keystroke, so it has to stay well under a frame
//! even for large collections.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use puremark::db::Bookmark;
use puremark::navigation::{Key, Selection};
use puremark::search::{self, click_rating};

fn collection(size: usize) -> Vec<Bookmark> {
    (0..size)
        .map(|i| {
            Bookmark::new(
                format!("id-{}", i),
                format!("Bookmark {} - Documentation Page", i),
                format!("https://site{}.example.com/docs/{}", i % 97, i),
            )
            .with_tags([format!("tag{}", i % 13), "reference".to_string()])
            .with_clicks((i % 23) as i64)
        })
        .collect()
}

/// Benchmark ranking against collections of increasing size.
fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for size in [100, 1_000, 10_000] {
        let bookmarks = collection(size);
        group.bench_with_input(BenchmarkId::new("docs", size), &bookmarks, |b, bookmarks| {
            b.iter(|| black_box(search::rank(black_box("docs"), bookmarks)))
        });
    }

    group.finish();
}

/// Benchmark query shapes on a fixed collection.
fn bench_queries(c: &mut Criterion) {
    let bookmarks = collection(1_000);
    let queries = ["d", "site4", "tag12", "no match at all"];

    let mut group = c.benchmark_group("rank_queries");

    for query in queries {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, query| {
            b.iter(|| black_box(search::rank(black_box(query), &bookmarks)))
        });
    }

    group.finish();
}

/// Benchmark rating and selection, the per-keystroke bookkeeping around ranking.
fn bench_rating_and_selection(c: &mut Criterion) {
    c.bench_function("click_rating", |b| {
        b.iter(|| {
            for clicks in 0..100 {
                black_box(click_rating(black_box(clicks), 99));
            }
        })
    });

    c.bench_function("selection_cycle", |b| {
        let mut selection = Selection::new();
        b.iter(|| {
            for _ in 0..16 {
                black_box(selection.handle(8, Key::ArrowDown.into()));
            }
        })
    });
}

criterion_group!(benches, bench_rank, bench_queries, bench_rating_and_selection);
criterion_main!(benches);
