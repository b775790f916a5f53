//! Shared driver for the "count keys found in tweet text" queries (q2, q3).

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use tracing::Instrument;

use super::counter::{merge_counts, top_n, BoundedCounter};
use super::parallel::{chunk_size, map_chunks};
use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::model::{Ranked, Tweet};
use crate::source::{ScanStats, SkipLog, TweetSource};

pub(crate) trait KeyExtractor: Copy + Send + Sync + 'static {
    type Key: Hash + Eq + Ord + Clone + Display + Send + 'static;

    /// Used in log lines, e.g. "emojis".
    const LABEL: &'static str;

    fn keys<'a>(self, text: &'a str) -> impl Iterator<Item = Self::Key> + 'a;
}

fn count_chunk<E: KeyExtractor>(
    extractor: E,
    first_line: u64,
    lines: &[String],
    log: &SkipLog,
) -> (HashMap<E::Key, u64>, ScanStats) {
    let mut counts = HashMap::new();
    let mut stats = ScanStats::default();
    for (line_no, line) in (first_line..).zip(lines) {
        stats.lines += 1;
        if line.is_empty() {
            continue;
        }
        match Tweet::parse_line(line) {
            Ok(tweet) => {
                stats.parsed += 1;
                if let Some(text) = tweet.text() {
                    for key in extractor.keys(text) {
                        *counts.entry(key).or_insert(0) += 1;
                    }
                }
            }
            Err(e) => stats.record_skip(line_no, &e, log),
        }
    }
    (counts, stats)
}

fn to_ranked<K: Display>(ranked: Vec<(K, u64)>) -> Vec<Ranked> {
    ranked
        .into_iter()
        .map(|(key, count)| Ranked::new(key.to_string(), count))
        .collect()
}

/// Loads the dump and counts keys per chunk on the blocking pool.
async fn count_by_chunks<E: KeyExtractor>(
    source: &TweetSource,
    config: &QueryConfig,
    extractor: E,
) -> Result<(HashMap<E::Key, u64>, ScanStats), QueryError> {
    let loaded = super::read_all(source).await?;
    let size = chunk_size(loaded.lines.len(), config.workers, config.min_chunk);
    let log = Arc::new(SkipLog::default());
    let partials = map_chunks(loaded.lines, size, move |first, chunk| {
        count_chunk(extractor, first, chunk, &log)
    })
    .instrument(tracing::info_span!("count", chunk_size = size))
    .await?;

    let mut counts: HashMap<E::Key, u64> = HashMap::new();
    let mut stats = ScanStats::default();
    for (partial, chunk_stats) in partials {
        stats.merge(chunk_stats);
        merge_counts(&mut counts, partial);
    }
    Ok((counts, stats))
}

pub(crate) async fn by_time<E: KeyExtractor>(
    source: &TweetSource,
    config: &QueryConfig,
    extractor: E,
) -> Result<Vec<Ranked>, QueryError> {
    let (counts, stats) = count_by_chunks(source, config, extractor).await?;

    Ok(tracing::info_span!("rank").in_scope(|| {
        if counts.is_empty() {
            tracing::warn!(parsed = stats.parsed, "no {} found in any tweet", E::LABEL);
        } else {
            tracing::info!(
                parsed = stats.parsed,
                skipped = stats.skipped,
                first_skipped = stats.first_skipped,
                distinct = counts.len(),
                "counted {}",
                E::LABEL
            );
        }
        to_ranked(top_n(counts, config.top_n))
    }))
}

/// Single streaming pass into a [`BoundedCounter`].
pub(crate) fn by_memory<E: KeyExtractor>(
    source: &TweetSource,
    config: &QueryConfig,
    extractor: E,
) -> Result<Vec<Ranked>, QueryError> {
    let mut counter = BoundedCounter::new(config.counter_capacity, config.prune_every);
    let stats = {
        let _span = tracing::info_span!("scan").entered();
        source.scan(|tweet| {
            if let Some(text) = tweet.text() {
                counter.observe(extractor.keys(text));
            }
        })?
    };

    let _span = tracing::info_span!("rank").entered();
    if counter.keys_seen() == 0 {
        tracing::warn!(parsed = stats.parsed, "no {} found in any tweet", E::LABEL);
        return Ok(Vec::new());
    }
    tracing::info!(
        parsed = stats.parsed,
        skipped = stats.skipped,
        first_skipped = stats.first_skipped,
        tweets_with_text = counter.records(),
        found = counter.keys_seen(),
        distinct = counter.distinct(),
        prunes = counter.prunes(),
        "counted {}",
        E::LABEL
    );
    Ok(to_ranked(counter.top(config.top_n)))
}
