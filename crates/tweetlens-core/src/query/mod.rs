//! The three tweet queries and the two strategies that execute them.
//!
//! * q1 [`Strategy::top_dates`]: busiest dates with their most active user.
//! * q2 [`Strategy::top_emojis`]: most used emojis.
//! * q3 [`Strategy::top_mentions`]: most mentioned users.
//!
//! [`TimeStrategy`] loads the dump into memory and counts in parallel chunks;
//! [`MemoryStrategy`] streams it and keeps bounded state.

pub mod counter;
mod dates;
mod emojis;
pub mod extract;
mod keyed;
mod mentions;
mod parallel;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::Instrument;

use crate::config::QueryConfig;
use crate::errors::QueryError;
use crate::model::{DateLeader, Ranked};
use crate::source::{LoadedLines, TweetSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Query {
    Q1,
    Q2,
    Q3,
}

impl Query {
    pub const ALL: [Query; 3] = [Query::Q1, Query::Q2, Query::Q3];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Q1 => "q1",
            Self::Q2 => "q2",
            Self::Q3 => "q3",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Q1 => "dates with the most tweets and their most active user",
            Self::Q2 => "most used emojis",
            Self::Q3 => "most mentioned users",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Query {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "q1" => Ok(Self::Q1),
            "q2" => Ok(Self::Q2),
            "q3" => Ok(Self::Q3),
            other => Err(format!("unknown query '{other}' (expected q1, q2 or q3)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimization {
    Time,
    Memory,
}

impl Optimization {
    pub const ALL: [Optimization; 2] = [Optimization::Time, Optimization::Memory];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for Optimization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Optimization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "memory" => Ok(Self::Memory),
            other => Err(format!(
                "unknown optimization '{other}' (expected time or memory)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "lowercase")]
pub enum QueryOutput {
    Dates(Vec<DateLeader>),
    Counts(Vec<Ranked>),
}

impl QueryOutput {
    pub fn len(&self) -> usize {
        match self {
            Self::Dates(rows) => rows.len(),
            Self::Counts(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
pub trait Strategy: Send + Sync {
    fn optimization(&self) -> Optimization;

    async fn top_dates(&self, source: &TweetSource) -> Result<Vec<DateLeader>, QueryError>;

    async fn top_emojis(&self, source: &TweetSource) -> Result<Vec<Ranked>, QueryError>;

    async fn top_mentions(&self, source: &TweetSource) -> Result<Vec<Ranked>, QueryError>;

    async fn run(&self, query: Query, source: &TweetSource) -> Result<QueryOutput, QueryError> {
        Ok(match query {
            Query::Q1 => QueryOutput::Dates(self.top_dates(source).await?),
            Query::Q2 => QueryOutput::Counts(self.top_emojis(source).await?),
            Query::Q3 => QueryOutput::Counts(self.top_mentions(source).await?),
        })
    }
}

/// Whole dump in memory, counted across the blocking pool.
#[derive(Debug, Clone)]
pub struct TimeStrategy {
    config: QueryConfig,
}

impl TimeStrategy {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Strategy for TimeStrategy {
    fn optimization(&self) -> Optimization {
        Optimization::Time
    }

    async fn top_dates(&self, source: &TweetSource) -> Result<Vec<DateLeader>, QueryError> {
        dates::by_time(source, &self.config).await
    }

    async fn top_emojis(&self, source: &TweetSource) -> Result<Vec<Ranked>, QueryError> {
        keyed::by_time(source, &self.config, emojis::Emojis).await
    }

    async fn top_mentions(&self, source: &TweetSource) -> Result<Vec<Ranked>, QueryError> {
        keyed::by_time(source, &self.config, mentions::Mentions).await
    }
}

/// Streams the dump on a single blocking worker with bounded state.
#[derive(Debug, Clone)]
pub struct MemoryStrategy {
    config: QueryConfig,
}

impl MemoryStrategy {
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    async fn blocking<T, F>(&self, source: &TweetSource, work: F) -> Result<T, QueryError>
    where
        T: Send + 'static,
        F: FnOnce(&TweetSource, &QueryConfig) -> Result<T, QueryError> + Send + 'static,
    {
        let source = source.clone();
        let config = self.config.clone();
        let span = tracing::Span::current();
        tokio::task::spawn_blocking(move || span.in_scope(|| work(&source, &config))).await?
    }
}

#[async_trait]
impl Strategy for MemoryStrategy {
    fn optimization(&self) -> Optimization {
        Optimization::Memory
    }

    async fn top_dates(&self, source: &TweetSource) -> Result<Vec<DateLeader>, QueryError> {
        self.blocking(source, dates::by_memory).await
    }

    async fn top_emojis(&self, source: &TweetSource) -> Result<Vec<Ranked>, QueryError> {
        self.blocking(source, |s, c| keyed::by_memory(s, c, emojis::Emojis))
            .await
    }

    async fn top_mentions(&self, source: &TweetSource) -> Result<Vec<Ranked>, QueryError> {
        self.blocking(source, |s, c| keyed::by_memory(s, c, mentions::Mentions))
            .await
    }
}

pub fn strategy_for(optimization: Optimization, config: QueryConfig) -> Box<dyn Strategy> {
    match optimization {
        Optimization::Time => Box::new(TimeStrategy::new(config)),
        Optimization::Memory => Box::new(MemoryStrategy::new(config)),
    }
}

/// Opens `path` and runs one query under one strategy.
pub async fn run_query(
    query: Query,
    optimization: Optimization,
    path: &Path,
    config: &QueryConfig,
) -> Result<QueryOutput, QueryError> {
    config.validate()?;
    let source = TweetSource::open(path)?;
    let strategy = strategy_for(optimization, config.clone());
    let span = tracing::info_span!(
        "query",
        query = %query,
        optimization = %optimization,
        top_n = config.top_n
    );
    async move {
        tracing::info!(path = %source.path().display(), "starting query");
        let output = strategy.run(query, &source).await?;
        if output.is_empty() {
            tracing::warn!("query produced no rows");
        }
        tracing::info!(rows = output.len(), "query finished");
        Ok(output)
    }
    .instrument(span)
    .await
}

/// Reads the whole dump on the blocking pool.
pub(crate) async fn read_all(source: &TweetSource) -> Result<LoadedLines, QueryError> {
    let source = source.clone();
    let span = tracing::info_span!("read");
    let loaded = tokio::task::spawn_blocking(move || span.in_scope(|| source.load())).await??;
    tracing::info!(
        lines = loaded.lines.len(),
        undecodable = loaded.undecodable,
        "loaded tweet lines"
    );
    Ok(loaded)
}
