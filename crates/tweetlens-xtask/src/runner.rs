use anyhow::Context as _;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use crate::clean;
use crate::targets::{QueryRun, Target, ALL_SEQUENCE};

pub const BIN_ENV: &str = "TWEETLENS_BIN";
pub const ROOT_ENV: &str = "TWEETLENS_ROOT";

/// How to start the query runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerBin {
    /// A prebuilt `tweetlens` binary.
    Binary(PathBuf),
    /// `cargo run --quiet --release --bin tweetlens --`
    Cargo,
}

impl RunnerBin {
    pub fn from_env() -> Self {
        match std::env::var_os(BIN_ENV) {
            Some(bin) if !bin.is_empty() => Self::Binary(PathBuf::from(bin)),
            _ => Self::Cargo,
        }
    }
}

/// One fully resolved child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<String>,
    pub env: Vec<(String, OsString)>,
    pub current_dir: PathBuf,
}

pub trait Spawner {
    /// Runs `invocation` to completion and returns its exit code.
    fn spawn(&mut self, invocation: &Invocation) -> anyhow::Result<i32>;
}

pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn(&mut self, invocation: &Invocation) -> anyhow::Result<i32> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .current_dir(&invocation.current_dir)
            .status()
            .with_context(|| format!("failed to start {}", invocation.program.to_string_lossy()))?;
        // Killed by a signal: no code, report a plain failure.
        Ok(status.code().unwrap_or(1))
    }
}

pub struct Runner<S, W> {
    root: PathBuf,
    bin: RunnerBin,
    spawner: S,
    out: W,
}

impl<S: Spawner, W: Write> Runner<S, W> {
    pub fn new(root: PathBuf, bin: RunnerBin, spawner: S, out: W) -> Self {
        Self {
            root,
            bin,
            spawner,
            out,
        }
    }

    pub fn invocation(&self, run: &QueryRun) -> Invocation {
        let (program, mut args) = match &self.bin {
            RunnerBin::Binary(path) => (path.clone().into_os_string(), Vec::new()),
            RunnerBin::Cargo => (
                OsString::from("cargo"),
                ["run", "--quiet", "--release", "--bin", "tweetlens", "--"]
                    .map(String::from)
                    .to_vec(),
            ),
        };
        args.extend(run.args());
        Invocation {
            program,
            args,
            env: vec![(ROOT_ENV.to_string(), self.root.clone().into_os_string())],
            current_dir: self.root.clone(),
        }
    }

    /// Runs `target` and returns the exit code of the last process it started
    /// (0 when it started none).
    pub fn run(&mut self, target: Target) -> anyhow::Result<i32> {
        match target {
            Target::Help => {
                self.help()?;
                Ok(0)
            }
            Target::Clean => {
                writeln!(self.out, "Cleaning caches and profiler artifacts...")?;
                let report = clean::clean(&self.root)?;
                writeln!(
                    self.out,
                    "Removed {} directories and {} files",
                    report.dirs_removed, report.files_removed
                )?;
                Ok(0)
            }
            Target::All => {
                self.run(Target::Clean)?;
                let mut code = 0;
                for step in ALL_SEQUENCE {
                    code = self.run(step)?;
                    if code != 0 {
                        writeln!(self.out, "{step} failed with exit code {code}; stopping")?;
                        break;
                    }
                }
                Ok(code)
            }
            query => {
                let run = query
                    .query_run()
                    .with_context(|| format!("{query} has no query invocation"))?;
                writeln!(self.out, "Running {query}: {}...", query.description())?;
                self.out.flush()?;
                let invocation = self.invocation(&run);
                self.spawner.spawn(&invocation)
            }
        }
    }

    fn help(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "Usage: cargo xtask [target]")?;
        writeln!(self.out)?;
        writeln!(self.out, "Targets:")?;
        for target in Target::ALL {
            writeln!(self.out, "  {target:<20} {}", target.description())?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_parts(self) -> (S, W) {
        (self.spawner, self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockSpawner {
        calls: Vec<Invocation>,
        /// Exit code returned for a given `--query`/`--optimization` pair.
        fail: Option<(&'static str, &'static str, i32)>,
    }

    impl Spawner for MockSpawner {
        fn spawn(&mut self, invocation: &Invocation) -> anyhow::Result<i32> {
            self.calls.push(invocation.clone());
            if let Some((query, optimization, code)) = self.fail {
                let args = &invocation.args;
                if args.iter().any(|a| a == query) && args.iter().any(|a| a == optimization) {
                    return Ok(code);
                }
            }
            Ok(0)
        }
    }

    fn runner(root: PathBuf, spawner: MockSpawner) -> Runner<MockSpawner, Vec<u8>> {
        Runner::new(
            root,
            RunnerBin::Binary(PathBuf::from("/bin/tweetlens")),
            spawner,
            Vec::new(),
        )
    }

    fn query_pairs(calls: &[Invocation]) -> Vec<(String, String)> {
        calls
            .iter()
            .map(|c| (c.args[2].clone(), c.args[4].clone()))
            .collect()
    }

    #[test]
    fn every_query_target_maps_to_its_invocation() {
        let root = PathBuf::from("/work/tweetlens");
        for target in Target::ALL {
            let Some(run) = target.query_run() else {
                continue;
            };
            let mut r = runner(root.clone(), MockSpawner::default());
            assert_eq!(r.run(target).unwrap(), 0);
            let (spawner, out) = r.into_parts();
            assert_eq!(spawner.calls.len(), 1, "{target}");
            let call = &spawner.calls[0];
            assert_eq!(call.program, OsString::from("/bin/tweetlens"));
            assert_eq!(call.args, run.args());
            assert_eq!(
                call.env,
                vec![(ROOT_ENV.to_string(), OsString::from("/work/tweetlens"))]
            );
            assert_eq!(call.current_dir, root);
            let status = String::from_utf8(out).unwrap();
            assert!(status.starts_with(&format!("Running {target}")), "{status}");
        }
    }

    #[test]
    fn cargo_runner_prefixes_cargo_run() {
        let r = Runner::new(
            PathBuf::from("/w"),
            RunnerBin::Cargo,
            MockSpawner::default(),
            Vec::new(),
        );
        let inv = r.invocation(&Target::Q3Time.query_run().unwrap());
        assert_eq!(inv.program, OsString::from("cargo"));
        assert_eq!(
            inv.args,
            [
                "run",
                "--quiet",
                "--release",
                "--bin",
                "tweetlens",
                "--",
                "run",
                "--query",
                "q3",
                "--optimization",
                "time"
            ]
        );
    }

    #[test]
    fn help_lists_every_target_without_spawning() {
        let mut r = runner(PathBuf::from("/w"), MockSpawner::default());
        assert_eq!(r.run(Target::Help).unwrap(), 0);
        let (spawner, out) = r.into_parts();
        assert!(spawner.calls.is_empty());
        let text = String::from_utf8(out).unwrap();
        for target in Target::ALL {
            assert!(
                text.lines()
                    .any(|l| l.split_whitespace().next() == Some(target.name())),
                "{target} missing from help"
            );
        }
    }

    #[test]
    fn all_cleans_then_runs_six_targets_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".tweetlens/profiles")).unwrap();
        let mut r = runner(dir.path().to_path_buf(), MockSpawner::default());
        assert_eq!(r.run(Target::All).unwrap(), 0);
        assert!(!dir.path().join(".tweetlens").exists());
        let (spawner, out) = r.into_parts();
        assert_eq!(
            query_pairs(&spawner.calls),
            [
                ("q1", "time"),
                ("q1", "memory"),
                ("q2", "time"),
                ("q2", "memory"),
                ("q3", "time"),
                ("q3", "memory"),
            ]
            .map(|(q, o)| (q.to_string(), o.to_string()))
        );
        assert!(spawner.calls.iter().all(|c| !c.args.contains(&"--profile".into())));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Cleaning"));
    }

    #[test]
    fn all_halts_on_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = MockSpawner {
            fail: Some(("q2", "time", 3)),
            ..MockSpawner::default()
        };
        let mut r = runner(dir.path().to_path_buf(), spawner);
        assert_eq!(r.run(Target::All).unwrap(), 3);
        let (spawner, out) = r.into_parts();
        assert_eq!(spawner.calls.len(), 3);
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("q2-time failed with exit code 3"));
    }

    #[test]
    fn child_exit_code_is_propagated() {
        let spawner = MockSpawner {
            fail: Some(("q1", "memory", 1)),
            ..MockSpawner::default()
        };
        let mut r = runner(PathBuf::from("/w"), spawner);
        assert_eq!(r.run(Target::Q1MemoryDetailed).unwrap(), 1);
    }

    #[test]
    fn clean_failure_fails_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut r = runner(dir.path().join("absent"), MockSpawner::default());
        assert!(r.run(Target::Clean).is_err());
        assert!(r.run(Target::All).is_err());
        let (spawner, _) = r.into_parts();
        assert!(spawner.calls.is_empty());
    }
}
