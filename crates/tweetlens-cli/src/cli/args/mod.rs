use clap::{Parser, Subcommand};

pub mod common;
pub mod run;
pub use common::*;
pub use run::*;

use crate::profile::ProfileKind;

#[derive(Parser)]
#[command(
    name = "tweetlens",
    version,
    about = "Rank dates, emojis and mentions in a tweet dump, optimizing for time or memory"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one query under one strategy
    Run(RunArgs),
    /// Run one query under both strategies and compare the results
    Compare(CompareArgs),
    Version,
}

impl Cli {
    /// Profiler requested on the command line, decided before logging starts.
    pub fn profile_kind(&self) -> ProfileKind {
        match &self.cmd {
            Command::Run(args) => args.profile,
            Command::Compare(_) | Command::Version => ProfileKind::None,
        }
    }
}
