use anyhow::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::profile::{ProfileKind, Profiler};

const DEFAULT_FILTER: &str = "info";

/// Installs the global subscriber: human-readable logs on stderr filtered by
/// `RUST_LOG` (default `info`), plus the requested profiler layer.
///
/// The profiler layers are unfiltered so a quiet `RUST_LOG` does not hide
/// spans from them.
pub fn init(kind: ProfileKind) -> anyhow::Result<Option<Profiler>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter);

    let profiler = Profiler::new(kind)?;
    let timer = profiler.as_ref().and_then(Profiler::timer);
    let sampler = profiler.as_ref().and_then(Profiler::sampler);

    tracing_subscriber::registry()
        .with(fmt)
        .with(timer)
        .with(sampler)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(profiler)
}
