use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::span;
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

#[derive(Debug, Default, Clone, Copy)]
struct SpanStat {
    calls: u64,
    total: Duration,
    max: Duration,
}

struct OpenedAt(Instant);

/// Wall time from span creation to close, summed per span name.
#[derive(Clone, Default)]
pub struct SpanTimer {
    stats: Arc<Mutex<HashMap<&'static str, SpanStat>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeRow {
    pub span: String,
    pub calls: u64,
    pub cumulative_ms: f64,
    pub max_ms: f64,
}

impl SpanTimer {
    fn record(&self, name: &'static str, elapsed: Duration) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        let stat = stats.entry(name).or_default();
        stat.calls += 1;
        stat.total += elapsed;
        stat.max = stat.max.max(elapsed);
    }

    /// Most expensive span first.
    pub fn rows(&self) -> Vec<TimeRow> {
        let stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<(&'static str, SpanStat)> =
            stats.iter().map(|(name, stat)| (*name, *stat)).collect();
        entries.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        entries
            .into_iter()
            .map(|(name, stat)| TimeRow {
                span: name.to_string(),
                calls: stat.calls,
                cumulative_ms: millis(stat.total),
                max_ms: millis(stat.max),
            })
            .collect()
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

impl<S> Layer<S> for SpanTimer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(OpenedAt(Instant::now()));
        }
    }

    fn on_close(&self, id: span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let opened = span.extensions().get::<OpenedAt>().map(|o| o.0);
        if let Some(opened) = opened {
            self.record(span.name(), opened.elapsed());
        }
    }
}

pub(super) fn write_table(w: &mut impl Write, rows: &[TimeRow]) -> std::io::Result<()> {
    writeln!(w, "Cumulative time by span")?;
    writeln!(
        w,
        "{:<16} {:>8} {:>16} {:>12}",
        "span", "calls", "cumulative_ms", "max_ms"
    )?;
    for row in rows {
        writeln!(
            w,
            "{:<16} {:>8} {:>16.3} {:>12.3}",
            row.span, row.calls, row.cumulative_ms, row.max_ms
        )?;
    }
    Ok(())
}
