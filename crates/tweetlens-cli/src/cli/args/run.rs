//! Run and compare command arguments.

use clap::Parser;

use super::{InputArgs, OptimizationArg, OutputFormat, QueryArg};
use crate::profile::ProfileKind;

#[derive(Parser, Clone, Debug)]
pub struct RunArgs {
    #[arg(long, value_enum)]
    pub query: QueryArg,

    #[arg(long, value_enum, default_value_t = OptimizationArg::Time)]
    pub optimization: OptimizationArg,

    #[command(flatten)]
    pub input: InputArgs,

    /// Profile the run and write a report to .tweetlens/profiles
    #[arg(long, value_enum, default_value_t = ProfileKind::None)]
    pub profile: ProfileKind,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Clone, Debug)]
pub struct CompareArgs {
    #[arg(long, value_enum)]
    pub query: QueryArg,

    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}
