//! Query tuning knobs and the optional `tweetlens.yaml` file that sets them.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::QueryError;

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_MIN_CHUNK: usize = 1000;
pub const DEFAULT_COUNTER_CAPACITY: usize = 100;
pub const DEFAULT_PRUNE_EVERY: u64 = 10_000;
pub const DEFAULT_DATA_FILE: &str = "data/tweets.json.zip";
pub const CONFIG_FILE_NAME: &str = "tweetlens.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryConfig {
    pub top_n: usize,
    /// Blocking workers used by the time strategy.
    pub workers: usize,
    /// Lower bound on records per time-strategy chunk.
    pub min_chunk: usize,
    /// Keys retained by the memory strategy's bounded counters. 0 = unbounded.
    pub counter_capacity: usize,
    /// Records between two bounded-counter prunes.
    pub prune_every: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            workers: default_workers(),
            min_chunk: DEFAULT_MIN_CHUNK,
            counter_capacity: DEFAULT_COUNTER_CAPACITY,
            prune_every: DEFAULT_PRUNE_EVERY,
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.top_n == 0 {
            return Err(QueryError::Config("top_n must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(QueryError::Config("workers must be at least 1".into()));
        }
        if self.min_chunk == 0 {
            return Err(QueryError::Config("min_chunk must be at least 1".into()));
        }
        if self.prune_every == 0 {
            return Err(QueryError::Config("prune_every must be at least 1".into()));
        }
        if self.counter_capacity != 0 && self.counter_capacity < self.top_n {
            return Err(QueryError::Config(format!(
                "counter_capacity ({}) must be 0 or at least top_n ({})",
                self.counter_capacity, self.top_n
            )));
        }
        Ok(())
    }
}

/// One core is left to the async runtime driving the workers.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

/// On-disk shape of `tweetlens.yaml`. Every field is optional; absent fields
/// fall back to [`QueryConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub min_chunk: Option<usize>,
    #[serde(default)]
    pub memory: MemorySection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemorySection {
    #[serde(default)]
    pub counter_capacity: Option<usize>,
    #[serde(default)]
    pub prune_every: Option<u64>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Loads `path` if given, else `tweetlens.yaml` under `root` when it exists.
    pub fn discover(path: Option<&Path>, root: &Path) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        let implicit = root.join(CONFIG_FILE_NAME);
        if implicit.is_file() {
            tracing::debug!(path = %implicit.display(), "loading implicit config");
            return Self::from_file(&implicit);
        }
        Ok(Self::default())
    }

    pub fn to_query_config(&self) -> QueryConfig {
        let defaults = QueryConfig::default();
        QueryConfig {
            top_n: self.top_n.unwrap_or(defaults.top_n),
            workers: self.workers.unwrap_or(defaults.workers),
            min_chunk: self.min_chunk.unwrap_or(defaults.min_chunk),
            counter_capacity: self
                .memory
                .counter_capacity
                .unwrap_or(defaults.counter_capacity),
            prune_every: self.memory.prune_every.unwrap_or(defaults.prune_every),
        }
    }
}
