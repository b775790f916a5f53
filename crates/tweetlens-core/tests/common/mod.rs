#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

pub const USERS: [&str; 5] = ["ravi", "simran", "kisan_ekta", "amit", "neha"];
pub const EMOJIS: [&str; 4] = ["🙏", "🚜", "🌾", "💪🏾"];

/// Deterministic synthetic dump: `n` tweets over 12 days with a skewed mix of
/// users, emojis and mentions, plus one malformed line every 97 tweets.
pub fn synthetic_lines(n: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(n + n / 97);
    for i in 0..n {
        let day = if i % 3 == 0 { 1 + i % 4 } else { 1 + i % 12 };
        let user = USERS[(i / 3 + day) % USERS.len()];
        let emoji = EMOJIS[i % 7 % EMOJIS.len()];
        let mention = USERS[(i * 7) % USERS.len()];
        let content = format!("day {day} {emoji} @{mention} #FarmersProtest");
        lines.push(
            serde_json::json!({
                "date": format!("2021-02-{day:02}T{:02}:15:00+00:00", i % 24),
                "user": { "username": user },
                "content": content,
            })
            .to_string(),
        );
        if i % 97 == 0 {
            lines.push("{\"truncated\": ".to_string());
        }
    }
    lines
}

pub fn write_plain(dir: &Path, lines: &[String]) -> PathBuf {
    let path = dir.join("tweets.jsonl");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

pub fn write_gzip(dir: &Path, lines: &[String]) -> PathBuf {
    let path = dir.join("tweets.jsonl.gz");
    let file = std::fs::File::create(&path).unwrap();
    let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
    for line in lines {
        writeln!(enc, "{line}").unwrap();
    }
    enc.finish().unwrap();
    path
}

pub fn write_zip(dir: &Path, lines: &[String]) -> PathBuf {
    let path = dir.join("tweets.json.zip");
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.add_directory("data/", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.start_file("data/tweets.json", zip::write::SimpleFileOptions::default())
        .unwrap();
    for line in lines {
        writeln!(zip, "{line}").unwrap();
    }
    zip.finish().unwrap();
    path
}
