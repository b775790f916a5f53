//! Criterion benchmark: time vs memory strategy for each query on a synthetic dump.
//! Run with: cargo bench -p tweetlens-core --bench query_strategies

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use tweetlens_core::{run_query, Optimization, Query, QueryConfig};

const TWEETS: usize = 20_000;

fn write_fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("bench.jsonl.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
    for i in 0..TWEETS {
        let line = serde_json::json!({
            "date": format!("2021-02-{:02}T10:00:00+00:00", 1 + i % 28),
            "user": { "username": format!("user{}", i % 500) },
            "content": format!("tweet {i} 🚜🙏 @user{} @user{}", i % 97, i % 13),
        });
        writeln!(enc, "{line}").unwrap();
    }
    enc.finish().unwrap();
    path
}

fn bench_strategies(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir);
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cfg = QueryConfig::default();

    let mut group = c.benchmark_group("query_strategies");
    group.sample_size(10);
    for query in Query::ALL {
        for optimization in Optimization::ALL {
            group.bench_function(format!("{query}_{optimization}"), |b| {
                b.iter(|| {
                    let out = rt
                        .block_on(run_query(query, optimization, &path, &cfg))
                        .unwrap();
                    black_box(out)
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
