//! Rendering of query results: the text layout people read and a JSON shape
//! for scripts.

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tweetlens_core::{Optimization, Query, QueryOutput};

const RULE_WIDTH: usize = 50;

#[derive(Debug, Serialize)]
pub(crate) struct RunRecord<'a> {
    pub query: Query,
    pub optimization: Optimization,
    pub file: &'a Path,
    pub elapsed_ms: f64,
    pub result: &'a QueryOutput,
}

impl<'a> RunRecord<'a> {
    pub(crate) fn new(
        query: Query,
        optimization: Optimization,
        file: &'a Path,
        elapsed: Duration,
        result: &'a QueryOutput,
    ) -> Self {
        Self {
            query,
            optimization,
            file,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            result,
        }
    }
}

pub(crate) fn write_text(
    w: &mut impl Write,
    query: Query,
    top_n: usize,
    elapsed: Duration,
    result: &QueryOutput,
) -> io::Result<()> {
    writeln!(w, "Execution time: {:.2} seconds", elapsed.as_secs_f64())?;
    writeln!(w)?;
    writeln!(w, "Top {top_n} {}:", query.describe())?;
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))?;
    if result.is_empty() {
        writeln!(w, "(no results)")?;
        return Ok(());
    }
    match result {
        QueryOutput::Dates(rows) => {
            for row in rows {
                writeln!(w, "{}: {} ({} tweets)", row.date, row.username, row.tweets)?;
            }
        }
        QueryOutput::Counts(rows) => {
            for row in rows {
                writeln!(w, "{}: {}", row.key, row.count)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn write_banner(w: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "== {title} ==")
}

pub(crate) fn write_timing(
    w: &mut impl Write,
    optimization: Optimization,
    elapsed: Duration,
) -> io::Result<()> {
    writeln!(
        w,
        "{:<8} {:.2} seconds",
        optimization.as_str(),
        elapsed.as_secs_f64()
    )
}

pub(crate) fn write_agreement(w: &mut impl Write, agree: bool) -> io::Result<()> {
    if agree {
        writeln!(w, "Strategies agree: yes")
    } else {
        writeln!(w, "Strategies agree: no")
    }
}

pub(crate) fn write_json(w: &mut impl Write, value: &impl Serialize) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)
}
