use std::io;
use std::path::{Path, PathBuf};

pub const ROOT_ENV: &str = "TWEETLENS_ROOT";

/// `TWEETLENS_ROOT` when set, else the current directory.
pub fn project_root() -> io::Result<PathBuf> {
    match std::env::var_os(ROOT_ENV) {
        Some(root) if !root.is_empty() => Ok(PathBuf::from(root)),
        _ => std::env::current_dir(),
    }
}

/// Joins relative paths onto `root`; absolute paths pass through.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Ensures `<root>/.tweetlens/profiles` exists and returns it.
pub fn ensure_profile_dir(root: &Path) -> io::Result<PathBuf> {
    let dir = root.join(".tweetlens").join("profiles");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}
