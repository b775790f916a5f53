//! `tweetlens compare`: the same query under both strategies, back to back.
//!
//! Disagreement is reported but is not a failure: the memory strategy's
//! bounded counters may drop keys once a dump has more distinct keys than
//! their capacity.

use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tweetlens_core::{run_query, Optimization, Query, QueryOutput};

use super::super::args::{CompareArgs, OutputFormat};
use super::output::{self, RunRecord};
use super::settings::Settings;
use crate::exit_codes;

#[derive(Serialize)]
struct Comparison<'a> {
    query: Query,
    file: &'a Path,
    agree: bool,
    runs: Vec<RunRecord<'a>>,
}

pub async fn run(args: CompareArgs) -> anyhow::Result<i32> {
    let settings = match Settings::resolve(&args.input) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e:#}");
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let query = Query::from(args.query);

    let mut runs: Vec<(Optimization, Duration, QueryOutput)> = Vec::new();
    for optimization in Optimization::ALL {
        let started = Instant::now();
        match run_query(query, optimization, &settings.file, &settings.config).await {
            Ok(result) => runs.push((optimization, started.elapsed(), result)),
            Err(e) => {
                tracing::error!(%query, %optimization, "query failed: {e}");
                eprintln!("error: {e}");
                return Ok(exit_codes::for_query_error(&e));
            }
        }
    }
    let agree = runs.windows(2).all(|pair| pair[0].2 == pair[1].2);
    if !agree {
        tracing::warn!(%query, "strategies disagree");
    }

    let mut stdout = std::io::stdout().lock();
    match args.format {
        OutputFormat::Text => {
            for (optimization, elapsed, result) in &runs {
                output::write_banner(&mut stdout, &format!("{query} / {optimization}"))?;
                output::write_text(&mut stdout, query, settings.config.top_n, *elapsed, result)?;
            }
            output::write_banner(&mut stdout, "summary")?;
            for (optimization, elapsed, _) in &runs {
                output::write_timing(&mut stdout, *optimization, *elapsed)?;
            }
            output::write_agreement(&mut stdout, agree)?;
        }
        OutputFormat::Json => {
            let comparison = Comparison {
                query,
                file: &settings.file,
                agree,
                runs: runs
                    .iter()
                    .map(|(optimization, elapsed, result)| {
                        RunRecord::new(query, *optimization, &settings.file, *elapsed, result)
                    })
                    .collect(),
            };
            output::write_json(&mut stdout, &comparison)?;
        }
    }
    Ok(exit_codes::SUCCESS)
}
