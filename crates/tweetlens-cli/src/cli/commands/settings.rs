use anyhow::Context;
use std::path::PathBuf;
use tweetlens_core::config::DEFAULT_DATA_FILE;
use tweetlens_core::{FileConfig, QueryConfig};

use super::super::args::InputArgs;
use crate::fs;

/// Input file, tuning and project root after merging flags, config file and
/// defaults.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub root: PathBuf,
    pub file: PathBuf,
    pub config: QueryConfig,
}

impl Settings {
    pub(crate) fn resolve(args: &InputArgs) -> anyhow::Result<Self> {
        let root = fs::project_root().context("failed to determine project root")?;
        let config_path = args.config.as_deref().map(|p| fs::resolve(&root, p));
        let file_config = FileConfig::discover(config_path.as_deref(), &root)?;

        let file = args
            .file
            .clone()
            .or_else(|| file_config.file.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let mut config = file_config.to_query_config();
        if let Some(top) = args.top {
            config.top_n = top;
        }
        if let Some(workers) = args.workers {
            config.workers = workers;
        }
        config.validate()?;

        tracing::debug!(root = %root.display(), ?config, "resolved settings");
        Ok(Self {
            file: fs::resolve(&root, &file),
            root,
            config,
        })
    }
}
