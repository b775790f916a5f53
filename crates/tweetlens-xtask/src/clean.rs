use anyhow::Context as _;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

const CACHE_DIRS: &[&str] = &[".tweetlens"];
const ARTIFACT_FILES: &[&str] = &["*.profraw", "*.profdata"];
const SKIP_DIRS: &[&str] = &["target", ".git"];

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub dirs_removed: usize,
    pub files_removed: usize,
}

fn glob_set(patterns: &[&str]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("bad glob {pattern}"))?);
    }
    Ok(builder.build()?)
}

/// Removes cache directories and profiler artifacts under `root`. Running it
/// twice removes nothing the second time.
pub fn clean(root: &Path) -> anyhow::Result<CleanReport> {
    let dirs = glob_set(CACHE_DIRS)?;
    let files = glob_set(ARTIFACT_FILES)?;
    let mut report = CleanReport::default();
    walk(root, &dirs, &files, &mut report)?;
    Ok(report)
}

fn walk(
    dir: &Path,
    dirs: &GlobSet,
    files: &GlobSet,
    report: &mut CleanReport,
) -> anyhow::Result<()> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        let path = entry.path();
        let name = entry.file_name();
        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to stat {}", path.display()))?;

        if file_type.is_dir() {
            if dirs.is_match(&name) {
                std::fs::remove_dir_all(&path)
                    .with_context(|| format!("failed to remove {}", path.display()))?;
                report.dirs_removed += 1;
            } else if !SKIP_DIRS.iter().any(|skip| name == *skip) {
                walk(&path, dirs, files, report)?;
            }
        } else if files.is_match(&name) {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
            report.files_removed += 1;
        }
    }
    Ok(())
}
