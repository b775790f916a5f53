//! In-process profilers, installed as extra `tracing` layers.
//!
//! The query engine opens a span for each phase (`query`, `read`, `count`,
//! `count_chunk`, `scan`, `rank`, ...). [`SpanTimer`] aggregates wall time per
//! span name; [`MemorySampler`] samples the process RSS as spans open and close.

mod memory;
mod timing;

pub use memory::{MemoryRow, MemorySampler};
pub use timing::{SpanTimer, TimeRow};

use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tweetlens_core::{Optimization, Query};

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[default]
    None,
    /// Cumulative wall time per span
    Time,
    /// Process RSS sampled at span boundaries
    Memory,
}

impl ProfileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Time => "time",
            Self::Memory => "memory",
        }
    }
}

/// Handle kept by the command after its layer has been registered.
#[derive(Clone)]
pub enum Profiler {
    Time(SpanTimer),
    Memory(MemorySampler),
}

impl Profiler {
    pub fn new(kind: ProfileKind) -> anyhow::Result<Option<Self>> {
        Ok(match kind {
            ProfileKind::None => None,
            ProfileKind::Time => Some(Self::Time(SpanTimer::default())),
            ProfileKind::Memory => Some(Self::Memory(MemorySampler::for_current_process()?)),
        })
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            Self::Time(_) => ProfileKind::Time,
            Self::Memory(_) => ProfileKind::Memory,
        }
    }

    pub fn timer(&self) -> Option<SpanTimer> {
        match self {
            Self::Time(timer) => Some(timer.clone()),
            Self::Memory(_) => None,
        }
    }

    pub fn sampler(&self) -> Option<MemorySampler> {
        match self {
            Self::Memory(sampler) => Some(sampler.clone()),
            Self::Time(_) => None,
        }
    }

    pub fn report(&self, query: Query, optimization: Optimization) -> ProfileReport {
        let rows = match self {
            Self::Time(timer) => ProfileRows::Time(timer.rows()),
            Self::Memory(sampler) => ProfileRows::Memory(sampler.rows()),
        };
        ProfileReport {
            kind: self.kind(),
            query,
            optimization,
            peak_rss_bytes: match self {
                Self::Memory(sampler) => sampler.peak(),
                Self::Time(_) => None,
            },
            rows,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileRows {
    Time(Vec<TimeRow>),
    Memory(Vec<MemoryRow>),
}

#[derive(Debug, Serialize)]
pub struct ProfileReport {
    pub kind: ProfileKind,
    pub query: Query,
    pub optimization: Optimization,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_rss_bytes: Option<u64>,
    pub rows: ProfileRows,
}

impl ProfileReport {
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}-{}.json",
            self.query,
            self.optimization,
            self.kind.as_str()
        )
    }

    /// Writes the report under `<root>/.tweetlens/profiles/` and returns its path.
    pub fn save(&self, root: &Path) -> anyhow::Result<PathBuf> {
        let dir = crate::fs::ensure_profile_dir(root)
            .with_context(|| format!("failed to create profile dir under {}", root.display()))?;
        let path = dir.join(self.file_name());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write profile {}", path.display()))?;
        Ok(path)
    }

    pub fn write_text(&self, w: &mut impl Write) -> std::io::Result<()> {
        writeln!(w)?;
        match &self.rows {
            ProfileRows::Time(rows) => timing::write_table(w, rows),
            ProfileRows::Memory(rows) => memory::write_table(w, rows, self.peak_rss_bytes),
        }
    }
}
