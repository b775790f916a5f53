//! Core of tweetlens: reads a tweet dump and answers three ranking queries
//! under a time-optimized or a memory-optimized strategy.

pub mod config;
pub mod errors;
pub mod model;
pub mod query;
pub mod source;

pub use config::{FileConfig, QueryConfig};
pub use errors::{QueryError, QueryErrorKind};
pub use model::{DateLeader, Ranked, Tweet};
pub use query::{
    run_query, strategy_for, MemoryStrategy, Optimization, Query, QueryOutput, Strategy,
    TimeStrategy,
};
pub use source::{Format, ScanStats, TweetSource};
