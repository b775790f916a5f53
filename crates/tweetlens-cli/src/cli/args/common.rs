//! Argument types shared by `run` and `compare`.

use clap::ValueEnum;
use std::path::PathBuf;
use tweetlens_core::{Optimization, Query};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryArg {
    /// Top dates by tweet count, with the most active user of each
    Q1,
    /// Most used emojis
    Q2,
    /// Most mentioned users
    Q3,
}

impl From<QueryArg> for Query {
    fn from(arg: QueryArg) -> Self {
        match arg {
            QueryArg::Q1 => Query::Q1,
            QueryArg::Q2 => Query::Q2,
            QueryArg::Q3 => Query::Q3,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OptimizationArg {
    /// Load everything, count in parallel
    #[default]
    Time,
    /// Stream the file, keep bounded state
    Memory,
}

impl From<OptimizationArg> for Optimization {
    fn from(arg: OptimizationArg) -> Self {
        match arg {
            OptimizationArg::Time => Optimization::Time,
            OptimizationArg::Memory => Optimization::Memory,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Where to read tweets from and how to tune the queries. Flags win over the
/// config file, which wins over built-in defaults.
#[derive(clap::Args, Clone, Debug, Default)]
pub struct InputArgs {
    /// Tweet dump: .zip, .gz or plain JSON lines [default: data/tweets.json.zip]
    #[arg(long, env = "TWEETLENS_FILE")]
    pub file: Option<PathBuf>,

    /// YAML config file [default: tweetlens.yaml when present]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of rows to report
    #[arg(long)]
    pub top: Option<usize>,

    /// Blocking workers for the time strategy
    #[arg(long)]
    pub workers: Option<usize>,
}
