use super::super::args::*;
use crate::exit_codes::SUCCESS;
use crate::profile::Profiler;

pub async fn dispatch(cli: Cli, profiler: Option<Profiler>) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => super::run::run(args, profiler).await,
        Command::Compare(args) => super::compare::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
