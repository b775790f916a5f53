use std::io::Write;
use std::time::Instant;
use tweetlens_core::{run_query, Optimization, Query};

use super::super::args::{OutputFormat, RunArgs};
use super::output::{self, RunRecord};
use super::settings::Settings;
use crate::exit_codes;
use crate::profile::Profiler;

pub async fn run(args: RunArgs, profiler: Option<Profiler>) -> anyhow::Result<i32> {
    let settings = match Settings::resolve(&args.input) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let query = Query::from(args.query);
    let optimization = Optimization::from(args.optimization);

    let started = Instant::now();
    let result = run_query(query, optimization, &settings.file, &settings.config).await;
    let elapsed = started.elapsed();
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(%query, %optimization, "query failed: {e}");
            eprintln!("error: {e}");
            return Ok(exit_codes::for_query_error(&e));
        }
    };

    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Text => {
            output::write_text(&mut stdout, query, settings.config.top_n, elapsed, &result)?
        }
        OutputFormat::Json => output::write_json(
            &mut stdout,
            &RunRecord::new(query, optimization, &settings.file, elapsed, &result),
        )?,
    }

    if let Some(profiler) = profiler {
        let report = profiler.report(query, optimization);
        if args.format == OutputFormat::Text {
            report.write_text(&mut stdout)?;
        }
        stdout.flush()?;
        let path = report.save(&settings.root)?;
        tracing::info!(path = %path.display(), kind = report.kind.as_str(), "profile written");
    }
    Ok(exit_codes::SUCCESS)
}
