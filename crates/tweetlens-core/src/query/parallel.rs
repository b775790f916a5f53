use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::Span;

use crate::errors::QueryError;

/// `len / (workers * 2)` records per chunk, never below `min_chunk`.
pub(crate) fn chunk_size(len: usize, workers: usize, min_chunk: usize) -> usize {
    (len / (workers.max(1) * 2)).max(min_chunk).max(1)
}

/// Splits `lines` into owned chunks and runs `work` on each from the blocking
/// pool, passing the 1-based line number of the chunk's first line. Results
/// come back in completion order.
pub(crate) async fn map_chunks<T, F>(
    lines: Vec<String>,
    size: usize,
    work: F,
) -> Result<Vec<T>, QueryError>
where
    T: Send + 'static,
    F: Fn(u64, &[String]) -> T + Send + Sync + 'static,
{
    let work = Arc::new(work);
    let parent = Span::current();
    let total = lines.len();
    let mut set = JoinSet::new();
    let mut iter = lines.into_iter();
    let mut index = 0usize;
    loop {
        let chunk: Vec<String> = iter.by_ref().take(size).collect();
        if chunk.is_empty() {
            break;
        }
        let first_line = (index * size) as u64 + 1;
        let work = Arc::clone(&work);
        let parent = parent.clone();
        set.spawn_blocking(move || {
            let span = tracing::info_span!(parent: &parent, "count_chunk", index, records = chunk.len());
            let _entered = span.enter();
            (index, chunk.len(), work(first_line, &chunk))
        });
        index += 1;
    }

    tracing::debug!(chunks = index, records = total, "dispatched chunks");
    let mut done = 0usize;
    let mut results = Vec::with_capacity(index);
    while let Some(joined) = set.join_next().await {
        let (chunk, records, value) = joined?;
        done += records;
        tracing::debug!(chunk, done, total, "chunk finished");
        results.push(value);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_respects_minimum() {
        assert_eq!(chunk_size(100, 4, 1000), 1000);
        assert_eq!(chunk_size(80_000, 4, 1000), 10_000);
        assert_eq!(chunk_size(0, 0, 0), 1);
    }

    #[tokio::test]
    async fn every_line_is_processed_once() {
        let lines: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        let mut sums = map_chunks(lines, 4, |_, chunk| chunk.len()).await.unwrap();
        sums.sort_unstable();
        assert_eq!(sums.len(), 7);
        assert_eq!(sums.iter().sum::<usize>(), 25);
        assert_eq!(sums[0], 1);
    }

    #[tokio::test]
    async fn chunks_know_their_first_file_line() {
        let lines: Vec<String> = (1..=10).map(|i| i.to_string()).collect();
        let mut firsts = map_chunks(lines, 3, |first, chunk| {
            assert_eq!(chunk[0], first.to_string());
            first
        })
        .await
        .unwrap();
        firsts.sort_unstable();
        assert_eq!(firsts, vec![1, 4, 7, 10]);
    }

    #[tokio::test]
    async fn empty_input_spawns_nothing() {
        let out = map_chunks(Vec::new(), 10, |_, chunk: &[String]| chunk.len())
            .await
            .unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn worker_panic_surfaces_as_error() {
        let lines = vec!["boom".to_string()];
        let err = map_chunks(lines, 1, |_, _chunk: &[String]| -> usize { panic!("chunk failed") })
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::Worker(_)));
    }
}
