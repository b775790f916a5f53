use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use sysinfo::{Pid, System};
use tracing::span;
use tracing::Subscriber;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Default, Clone, Copy)]
struct SpanMemory {
    calls: u64,
    increment: i64,
    peak: u64,
}

struct RssAtOpen(u64);

struct Inner {
    pid: Pid,
    system: Mutex<System>,
    stats: Mutex<HashMap<&'static str, SpanMemory>>,
    peak: AtomicU64,
}

/// Samples this process's resident set size whenever a span opens or closes.
///
/// Per span name it keeps the number of closes, the summed RSS delta between
/// open and close, and the highest RSS seen at either edge. Allocations that
/// come and go between two samples are invisible to it.
#[derive(Clone)]
pub struct MemorySampler {
    inner: Arc<Inner>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryRow {
    pub span: String,
    pub calls: u64,
    pub increment_bytes: i64,
    pub peak_rss_bytes: u64,
}

impl MemorySampler {
    pub fn for_current_process() -> anyhow::Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| anyhow::anyhow!("cannot determine current pid: {e}"))?;
        let sampler = Self {
            inner: Arc::new(Inner {
                pid,
                system: Mutex::new(System::new()),
                stats: Mutex::new(HashMap::new()),
                peak: AtomicU64::new(0),
            }),
        };
        sampler.sample();
        Ok(sampler)
    }

    fn sample(&self) -> Option<u64> {
        let mut system = self
            .inner
            .system
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !system.refresh_process(self.inner.pid) {
            return None;
        }
        let rss = system.process(self.inner.pid)?.memory();
        self.inner.peak.fetch_max(rss, Ordering::Relaxed);
        Some(rss)
    }

    fn record(&self, name: &'static str, opened: u64, closed: u64) {
        let mut stats = self
            .inner
            .stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let stat = stats.entry(name).or_default();
        stat.calls += 1;
        stat.increment += closed as i64 - opened as i64;
        stat.peak = stat.peak.max(opened).max(closed);
    }

    /// Highest RSS sampled so far, if any sample succeeded.
    pub fn peak(&self) -> Option<u64> {
        match self.inner.peak.load(Ordering::Relaxed) {
            0 => None,
            peak => Some(peak),
        }
    }

    /// Largest peak first.
    pub fn rows(&self) -> Vec<MemoryRow> {
        let stats = self
            .inner
            .stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<MemoryRow> = stats
            .iter()
            .map(|(name, stat)| MemoryRow {
                span: name.to_string(),
                calls: stat.calls,
                increment_bytes: stat.increment,
                peak_rss_bytes: stat.peak,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.peak_rss_bytes
                .cmp(&a.peak_rss_bytes)
                .then_with(|| a.span.cmp(&b.span))
        });
        rows
    }
}

impl<S> Layer<S> for MemorySampler
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        let Some(rss) = self.sample() else {
            return;
        };
        if let Some(span) = ctx.span(id) {
            span.extensions_mut().insert(RssAtOpen(rss));
        }
    }

    fn on_close(&self, id: span::Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        let opened = span.extensions().get::<RssAtOpen>().map(|r| r.0);
        if let (Some(opened), Some(closed)) = (opened, self.sample()) {
            self.record(span.name(), opened, closed);
        }
    }
}

fn mib(bytes: f64) -> f64 {
    bytes / MIB
}

pub(super) fn write_table(
    w: &mut impl Write,
    rows: &[MemoryRow],
    peak: Option<u64>,
) -> std::io::Result<()> {
    writeln!(w, "Memory by span")?;
    writeln!(
        w,
        "{:<16} {:>8} {:>16} {:>12}",
        "span", "calls", "increment_mib", "peak_mib"
    )?;
    for row in rows {
        writeln!(
            w,
            "{:<16} {:>8} {:>16.2} {:>12.2}",
            row.span,
            row.calls,
            mib(row.increment_bytes as f64),
            mib(row.peak_rss_bytes as f64)
        )?;
    }
    if let Some(peak) = peak {
        writeln!(w, "Peak RSS: {:.2} MiB", mib(peak as f64))?;
    }
    Ok(())
}
