//! q1: busiest dates and the most active user on each.

use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::Instrument;

use super::counter::{merge_counts, top_n};
use super::parallel::{chunk_size, map_chunks};
use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::model::{DateLeader, Tweet};
use crate::source::{ScanStats, SkipLog, TweetSource};

type UsersByDate = HashMap<NaiveDate, HashMap<String, u64>>;

fn dated_author(tweet: &Tweet) -> Option<(NaiveDate, &str)> {
    Some((tweet.day()?, tweet.username()?))
}

fn count_chunk(first_line: u64, lines: &[String], log: &SkipLog) -> (UsersByDate, ScanStats) {
    let mut by_date = UsersByDate::new();
    let mut stats = ScanStats::default();
    for (line_no, line) in (first_line..).zip(lines) {
        stats.lines += 1;
        if line.is_empty() {
            continue;
        }
        match Tweet::parse_line(line) {
            Ok(tweet) => {
                stats.parsed += 1;
                if let Some((day, user)) = dated_author(&tweet) {
                    *by_date
                        .entry(day)
                        .or_default()
                        .entry(user.to_string())
                        .or_insert(0) += 1;
                }
            }
            Err(e) => stats.record_skip(line_no, &e, log),
        }
    }
    (by_date, stats)
}

fn leaders(
    totals: impl IntoIterator<Item = (NaiveDate, u64)>,
    users: &UsersByDate,
    n: usize,
) -> Vec<DateLeader> {
    top_n(totals, n)
        .into_iter()
        .filter_map(|(date, tweets)| {
            let per_user = users.get(&date)?;
            let (username, _) = top_n(per_user.iter().map(|(u, c)| (u.as_str(), *c)), 1)
                .into_iter()
                .next()?;
            Some(DateLeader {
                date,
                username: username.to_string(),
                tweets,
            })
        })
        .collect()
}

/// Loads every line, counts per chunk on the blocking pool, merges.
pub(crate) async fn by_time(
    source: &TweetSource,
    config: &QueryConfig,
) -> Result<Vec<DateLeader>, QueryError> {
    let loaded = super::read_all(source).await?;
    let size = chunk_size(loaded.lines.len(), config.workers, config.min_chunk);
    let log = Arc::new(SkipLog::default());
    let partials = map_chunks(loaded.lines, size, move |first, chunk| {
        count_chunk(first, chunk, &log)
    })
    .instrument(tracing::info_span!("count", chunk_size = size))
    .await?;
    Ok(tracing::info_span!("rank").in_scope(|| merge_and_rank(partials, config.top_n)))
}

fn merge_and_rank(partials: Vec<(UsersByDate, ScanStats)>, n: usize) -> Vec<DateLeader> {
    let mut users = UsersByDate::new();
    let mut stats = ScanStats::default();
    for (partial, chunk_stats) in partials {
        stats.merge(chunk_stats);
        for (date, per_user) in partial {
            merge_counts(users.entry(date).or_default(), per_user);
        }
    }
    let totals: Vec<(NaiveDate, u64)> = users
        .iter()
        .map(|(date, per_user)| (*date, per_user.values().sum()))
        .collect();
    tracing::info!(
        parsed = stats.parsed,
        skipped = stats.skipped,
        first_skipped = stats.first_skipped,
        dates = users.len(),
        "date ranking complete"
    );
    leaders(totals, &users, n)
}

/// Two streaming passes: per-date totals first, then per-user counts only for
/// the dates that made the cut.
pub(crate) fn by_memory(
    source: &TweetSource,
    config: &QueryConfig,
) -> Result<Vec<DateLeader>, QueryError> {
    let totals = {
        let _span = tracing::info_span!("scan_dates").entered();
        let mut totals: HashMap<NaiveDate, u64> = HashMap::new();
        let stats = source.scan(|tweet| {
            if let Some((day, _)) = dated_author(&tweet) {
                *totals.entry(day).or_insert(0) += 1;
            }
        })?;
        tracing::info!(
            parsed = stats.parsed,
            skipped = stats.skipped,
            dates = totals.len(),
            "counted tweets per date"
        );
        top_n(totals, config.top_n)
    };
    if totals.is_empty() {
        return Ok(Vec::new());
    }

    let wanted: HashSet<NaiveDate> = totals.iter().map(|(d, _)| *d).collect();
    let users = {
        let _span = tracing::info_span!("scan_users", dates = wanted.len()).entered();
        let mut users = UsersByDate::new();
        source.scan(|tweet| {
            if let Some((day, user)) = dated_author(&tweet) {
                if wanted.contains(&day) {
                    *users
                        .entry(day)
                        .or_default()
                        .entry(user.to_string())
                        .or_insert(0) += 1;
                }
            }
        })?;
        users
    };

    let _span = tracing::info_span!("rank").entered();
    Ok(leaders(totals, &users, config.top_n))
}
