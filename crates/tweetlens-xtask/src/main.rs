use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;

mod clean;
mod runner;
mod targets;

use runner::{ProcessSpawner, Runner, RunnerBin};
use targets::Target;

/// Task runner for tweetlens: `cargo xtask [target]`.
#[derive(Parser)]
#[command(name = "xtask")]
struct Opts {
    /// Task to run; prints the task list when omitted
    #[arg(value_enum)]
    target: Option<Target>,
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let root = workspace_root()?;
    let mut runner = Runner::new(
        root,
        RunnerBin::from_env(),
        ProcessSpawner,
        std::io::stdout(),
    );
    let code = runner.run(opts.target.unwrap_or(Target::Help))?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn workspace_root() -> anyhow::Result<PathBuf> {
    // CARGO_MANIFEST_DIR points to crates/tweetlens-xtask
    let xtask_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = xtask_dir
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .context("Failed to resolve workspace root from CARGO_MANIFEST_DIR")?;
    Ok(root.to_path_buf())
}
