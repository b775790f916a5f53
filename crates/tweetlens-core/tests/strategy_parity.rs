mod common;

use tweetlens_core::{run_query, Optimization, Query, QueryConfig, QueryOutput};

fn config() -> QueryConfig {
    QueryConfig {
        workers: 4,
        min_chunk: 64,
        ..QueryConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn strategies_and_formats_agree_on_every_query() {
    let dir = tempfile::tempdir().unwrap();
    let lines = common::synthetic_lines(2_000);
    let paths = [
        common::write_plain(dir.path(), &lines),
        common::write_gzip(dir.path(), &lines),
        common::write_zip(dir.path(), &lines),
    ];

    for query in Query::ALL {
        let reference = run_query(query, Optimization::Time, &paths[0], &config())
            .await
            .unwrap();
        assert!(!reference.is_empty(), "{query} returned nothing");
        for path in &paths {
            for optimization in Optimization::ALL {
                let got = run_query(query, optimization, path, &config()).await.unwrap();
                assert_eq!(got, reference, "{query} {optimization} {}", path.display());
            }
        }
    }
}

#[tokio::test]
async fn q1_rows_are_ordered_and_capped() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_plain(dir.path(), &common::synthetic_lines(1_500));
    let out = run_query(Query::Q1, Optimization::Memory, &path, &config())
        .await
        .unwrap();
    let QueryOutput::Dates(rows) = out else {
        panic!("expected date rows");
    };
    assert_eq!(rows.len(), 10);
    for pair in rows.windows(2) {
        assert!(
            pair[0].tweets > pair[1].tweets
                || (pair[0].tweets == pair[1].tweets && pair[0].date < pair[1].date),
            "bad order: {pair:?}"
        );
    }
    assert!(rows
        .iter()
        .all(|r| common::USERS.contains(&r.username.as_str())));
}

#[tokio::test]
async fn counts_rows_are_ordered_by_count_then_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_gzip(dir.path(), &common::synthetic_lines(1_000));
    for query in [Query::Q2, Query::Q3] {
        let out = run_query(query, Optimization::Time, &path, &config())
            .await
            .unwrap();
        let QueryOutput::Counts(rows) = out else {
            panic!("expected count rows");
        };
        assert!(rows.len() <= 10);
        for pair in rows.windows(2) {
            assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].key < pair[1].key),
                "bad order for {query}: {pair:?}"
            );
        }
    }
}

#[tokio::test]
async fn q2_counts_every_emoji_occurrence() {
    let dir = tempfile::tempdir().unwrap();
    let n = 700;
    let path = common::write_plain(dir.path(), &common::synthetic_lines(n));
    let out = run_query(Query::Q2, Optimization::Memory, &path, &config())
        .await
        .unwrap();
    let QueryOutput::Counts(rows) = out else {
        panic!("expected count rows");
    };
    // "💪🏾" contributes the arm and the skin tone separately.
    let total: u64 = rows.iter().map(|r| r.count).sum();
    let toned = (0..n).filter(|i| i % 7 % 4 == 3).count() as u64;
    assert_eq!(total, n as u64 + toned);
    assert!(rows.iter().any(|r| r.key == "🏾"));
}
