//! Tweet dump reader: zip archives (first file entry), gzip streams, or plain
//! JSON lines.

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::QueryError;
use crate::model::Tweet;

/// Malformed lines past this many per file are logged at debug instead of warn.
const LOUD_SKIP_LIMIT: u64 = 20;

/// Warning budget for malformed lines, shared by every chunk of one file.
#[derive(Debug, Default)]
pub(crate) struct SkipLog {
    reported: AtomicU64,
}

impl SkipLog {
    fn report(&self, line: u64, reason: &dyn std::fmt::Display) {
        if self.reported.fetch_add(1, Ordering::Relaxed) < LOUD_SKIP_LIMIT {
            tracing::warn!(line, %reason, "skipping malformed tweet line");
        } else {
            tracing::debug!(line, %reason, "skipping malformed tweet line");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Zip,
    Gzip,
    Lines,
}

impl Format {
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("zip") => Self::Zip,
            Some("gz") => Self::Gzip,
            _ => Self::Lines,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub lines: u64,
    pub parsed: u64,
    pub skipped: u64,
    /// 1-based file line of the earliest skipped line.
    pub first_skipped: Option<u64>,
}

impl ScanStats {
    pub fn merge(&mut self, other: ScanStats) {
        self.lines += other.lines;
        self.parsed += other.parsed;
        self.skipped += other.skipped;
        self.first_skipped = match (self.first_skipped, other.first_skipped) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
    }

    pub(crate) fn record_skip(
        &mut self,
        line: u64,
        reason: &dyn std::fmt::Display,
        log: &SkipLog,
    ) {
        self.skipped += 1;
        self.first_skipped.get_or_insert(line);
        log.report(line, reason);
    }
}

#[derive(Debug, Clone)]
pub struct TweetSource {
    path: PathBuf,
    format: Format,
}

/// Raw lines of a dump held in memory, in file order. Blank and undecodable
/// lines are kept as empty strings so `lines[i]` is file line `i + 1`.
#[derive(Debug, Default)]
pub struct LoadedLines {
    pub lines: Vec<String>,
    /// Lines that were not valid UTF-8. Counted here, never parsed.
    pub undecodable: u64,
}

impl TweetSource {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, QueryError> {
        let path = path.into();
        let meta = std::fs::metadata(&path).map_err(|e| QueryError::io(&path, e))?;
        if !meta.is_file() {
            return Err(QueryError::invalid_format(path, "not a regular file"));
        }
        let format = Format::detect(&path);
        tracing::debug!(path = %path.display(), ?format, "opened tweet source");
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Streams parsed tweets to `visit` one line at a time.
    pub fn scan<F>(&self, mut visit: F) -> Result<ScanStats, QueryError>
    where
        F: FnMut(Tweet),
    {
        self.with_reader(|reader| {
            let mut stats = ScanStats::default();
            let log = SkipLog::default();
            let mut buf = Vec::with_capacity(4096);
            loop {
                buf.clear();
                let n = reader
                    .read_until(b'\n', &mut buf)
                    .map_err(|e| self.read_error(e))?;
                if n == 0 {
                    break;
                }
                stats.lines += 1;
                let line = match std::str::from_utf8(&buf) {
                    Ok(line) => line.trim(),
                    Err(e) => {
                        stats.record_skip(stats.lines, &e, &log);
                        continue;
                    }
                };
                if line.is_empty() {
                    continue;
                }
                match Tweet::parse_line(line) {
                    Ok(tweet) => {
                        stats.parsed += 1;
                        visit(tweet);
                    }
                    Err(e) => stats.record_skip(stats.lines, &e, &log),
                }
            }
            Ok(stats)
        })
    }

    /// Reads every line into memory without parsing it.
    pub fn load(&self) -> Result<LoadedLines, QueryError> {
        self.with_reader(|reader| {
            let mut loaded = LoadedLines::default();
            let mut buf = Vec::with_capacity(4096);
            loop {
                buf.clear();
                let n = reader
                    .read_until(b'\n', &mut buf)
                    .map_err(|e| self.read_error(e))?;
                if n == 0 {
                    break;
                }
                match String::from_utf8(std::mem::take(&mut buf)) {
                    Ok(mut line) => {
                        let trimmed = line.trim_end().len();
                        line.truncate(trimmed);
                        if line.trim_start().is_empty() {
                            line.clear();
                        }
                        loaded.lines.push(line);
                    }
                    Err(_) => {
                        loaded.undecodable += 1;
                        loaded.lines.push(String::new());
                    }
                }
            }
            Ok(loaded)
        })
    }

    fn with_reader<T>(
        &self,
        f: impl FnOnce(&mut dyn BufRead) -> Result<T, QueryError>,
    ) -> Result<T, QueryError> {
        let file = File::open(&self.path).map_err(|e| QueryError::io(&self.path, e))?;
        match self.format {
            Format::Lines => f(&mut BufReader::new(file)),
            Format::Gzip => f(&mut BufReader::new(MultiGzDecoder::new(file))),
            Format::Zip => {
                let mut archive = zip::ZipArchive::new(BufReader::new(file))
                    .map_err(|e| QueryError::invalid_format(&self.path, e))?;
                let index = (0..archive.len())
                    .find(|&i| archive.by_index(i).is_ok_and(|entry| !entry.is_dir()))
                    .ok_or_else(|| QueryError::EmptyArchive {
                        path: self.path.clone(),
                    })?;
                let entry = archive
                    .by_index(index)
                    .map_err(|e| QueryError::invalid_format(&self.path, e))?;
                tracing::info!(entry = entry.name(), "reading archive entry");
                let mut reader = BufReader::new(entry);
                f(&mut reader)
            }
        }
    }

    fn read_error(&self, err: std::io::Error) -> QueryError {
        match err.kind() {
            std::io::ErrorKind::InvalidData | std::io::ErrorKind::InvalidInput => {
                QueryError::invalid_format(&self.path, err)
            }
            _ => QueryError::io(&self.path, err),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    fn sample() -> Vec<String> {
        vec![
            tweet_line("2021-02-24T09:23:35+00:00", "alice", "first"),
            "{broken".to_string(),
            String::new(),
            tweet_line("2021-02-25T10:00:00+00:00", "bob", "second"),
        ]
    }

    fn collect(source: &TweetSource) -> (Vec<String>, ScanStats) {
        let mut users = Vec::new();
        let stats = source
            .scan(|t| users.push(t.username().unwrap_or_default().to_string()))
            .unwrap();
        (users, stats)
    }

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(Format::detect(Path::new("a/tweets.json.zip")), Format::Zip);
        assert_eq!(Format::detect(Path::new("tweets.JSONL.GZ")), Format::Gzip);
        assert_eq!(Format::detect(Path::new("tweets.jsonl")), Format::Lines);
        assert_eq!(Format::detect(Path::new("tweets")), Format::Lines);
    }

    #[test]
    fn all_formats_yield_the_same_records() {
        let dir = tempfile::tempdir().unwrap();
        let lines = sample();
        let paths = [
            write_lines(dir.path(), "t.jsonl", &lines),
            write_gzip(dir.path(), "t.jsonl.gz", &lines),
            write_zip(dir.path(), "t.json.zip", &lines),
        ];
        for path in paths {
            let source = TweetSource::open(&path).unwrap();
            let (users, stats) = collect(&source);
            assert_eq!(users, vec!["alice", "bob"], "{}", path.display());
            assert_eq!(stats.parsed, 2);
            assert_eq!(stats.skipped, 1);
            assert_eq!(stats.first_skipped, Some(2));
        }
    }

    #[test]
    fn load_keeps_file_line_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_zip(dir.path(), "t.zip", &sample());
        let loaded = TweetSource::open(path).unwrap().load().unwrap();
        assert_eq!(loaded.lines.len(), 4);
        assert_eq!(loaded.lines[1], "{broken");
        assert_eq!(loaded.lines[2], "");
        assert!(loaded.lines[3].contains("bob"));
        assert_eq!(loaded.undecodable, 0);
    }

    #[test]
    fn merged_stats_keep_the_earliest_skip() {
        let mut a = ScanStats {
            lines: 3,
            skipped: 1,
            first_skipped: Some(9),
            ..ScanStats::default()
        };
        a.merge(ScanStats::default());
        assert_eq!(a.first_skipped, Some(9));
        a.merge(ScanStats {
            lines: 3,
            skipped: 2,
            first_skipped: Some(4),
            ..ScanStats::default()
        });
        assert_eq!(a.first_skipped, Some(4));
        assert_eq!(a.skipped, 3);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = TweetSource::open(dir.path().join("nope.zip")).unwrap_err();
        assert!(matches!(err, QueryError::NotFound { .. }));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = TweetSource::open(dir.path()).unwrap_err();
        assert!(matches!(err, QueryError::InvalidFormat { .. }));
    }

    #[test]
    fn empty_zip_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        let file = std::fs::File::create(&path).unwrap();
        zip::ZipWriter::new(file).finish().unwrap();
        let err = TweetSource::open(&path).unwrap().scan(|_| {}).unwrap_err();
        assert!(matches!(err, QueryError::EmptyArchive { .. }), "{err}");
    }

    #[test]
    fn garbage_zip_is_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.zip");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        let err = TweetSource::open(&path).unwrap().load().unwrap_err();
        assert!(matches!(err, QueryError::InvalidFormat { .. }), "{err}");
    }

    #[test]
    fn invalid_utf8_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.jsonl");
        let mut body = tweet_line("2021-02-24T09:23:35+00:00", "alice", "ok").into_bytes();
        body.extend_from_slice(b"\n\xff\xfe\n");
        std::fs::write(&path, body).unwrap();

        let source = TweetSource::open(&path).unwrap();
        let (users, stats) = collect(&source);
        assert_eq!(users, vec!["alice"]);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.first_skipped, Some(2));
        let loaded = source.load().unwrap();
        assert_eq!(loaded.undecodable, 1);
        assert_eq!(loaded.lines.len(), 2);
    }
}
