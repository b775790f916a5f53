use clap::Parser;

mod cli;
pub mod exit_codes;
pub mod fs;
mod logging;
mod profile;

use cli::args::Cli;
use cli::commands::dispatch;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    let profiler = match logging::init(cli.profile_kind()) {
        Ok(profiler) => profiler,
        Err(e) => {
            eprintln!("fatal: {e:?}");
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };
    let code = match dispatch(cli, profiler).await {
        Ok(code) => code,
        // Settings failures already came back as CONFIG_ERROR; anything
        // left is writing results or profiles.
        Err(e) => {
            eprintln!("fatal: {e:?}");
            exit_codes::QUERY_FAILED
        }
    };
    std::process::exit(code);
}
