//! The fixed table of tasks `cargo xtask` understands.

use clap::ValueEnum;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Help,
    All,
    Q1Time,
    Q1Memory,
    Q1TimeDetailed,
    Q1MemoryDetailed,
    Q2Time,
    Q2Memory,
    Q2TimeDetailed,
    Q2MemoryDetailed,
    Q3Time,
    Q3Memory,
    Clean,
}

/// Steps of `all`, after `clean`.
pub const ALL_SEQUENCE: [Target; 6] = [
    Target::Q1Time,
    Target::Q1Memory,
    Target::Q2Time,
    Target::Q2Memory,
    Target::Q3Time,
    Target::Q3Memory,
];

/// Arguments the query runner receives for one query target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRun {
    pub query: &'static str,
    pub optimization: &'static str,
    pub profile: Option<&'static str>,
}

impl QueryRun {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--query".to_string(),
            self.query.to_string(),
            "--optimization".to_string(),
            self.optimization.to_string(),
        ];
        if let Some(profile) = self.profile {
            args.push("--profile".to_string());
            args.push(profile.to_string());
        }
        args
    }
}

impl Target {
    pub const ALL: [Target; 13] = [
        Target::Help,
        Target::All,
        Target::Q1Time,
        Target::Q1Memory,
        Target::Q1TimeDetailed,
        Target::Q1MemoryDetailed,
        Target::Q2Time,
        Target::Q2Memory,
        Target::Q2TimeDetailed,
        Target::Q2MemoryDetailed,
        Target::Q3Time,
        Target::Q3Memory,
        Target::Clean,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::All => "all",
            Self::Q1Time => "q1-time",
            Self::Q1Memory => "q1-memory",
            Self::Q1TimeDetailed => "q1-time-detailed",
            Self::Q1MemoryDetailed => "q1-memory-detailed",
            Self::Q2Time => "q2-time",
            Self::Q2Memory => "q2-memory",
            Self::Q2TimeDetailed => "q2-time-detailed",
            Self::Q2MemoryDetailed => "q2-memory-detailed",
            Self::Q3Time => "q3-time",
            Self::Q3Memory => "q3-memory",
            Self::Clean => "clean",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Help => "Show this list",
            Self::All => "Clean, then run every query in both modes",
            Self::Q1Time => "Top dates and their most active user (time-optimized)",
            Self::Q1Memory => "Top dates and their most active user (memory-optimized)",
            Self::Q1TimeDetailed => "q1-time with cumulative time per span",
            Self::Q1MemoryDetailed => "q1-memory with memory sampled per span",
            Self::Q2Time => "Top emojis (time-optimized)",
            Self::Q2Memory => "Top emojis (memory-optimized)",
            Self::Q2TimeDetailed => "q2-time with cumulative time per span",
            Self::Q2MemoryDetailed => "q2-memory with memory sampled per span",
            Self::Q3Time => "Top mentioned users (time-optimized)",
            Self::Q3Memory => "Top mentioned users (memory-optimized)",
            Self::Clean => "Remove .tweetlens caches and profiler artifacts",
        }
    }

    /// `None` for targets that do not spawn the query runner themselves.
    pub fn query_run(self) -> Option<QueryRun> {
        let (query, optimization, profile) = match self {
            Self::Help | Self::All | Self::Clean => return None,
            Self::Q1Time => ("q1", "time", None),
            Self::Q1Memory => ("q1", "memory", None),
            Self::Q1TimeDetailed => ("q1", "time", Some("time")),
            Self::Q1MemoryDetailed => ("q1", "memory", Some("memory")),
            Self::Q2Time => ("q2", "time", None),
            Self::Q2Memory => ("q2", "memory", None),
            Self::Q2TimeDetailed => ("q2", "time", Some("time")),
            Self::Q2MemoryDetailed => ("q2", "memory", Some("memory")),
            Self::Q3Time => ("q3", "time", None),
            Self::Q3Memory => ("q3", "memory", None),
        };
        Some(QueryRun {
            query,
            optimization,
            profile,
        })
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_counterpart(target: Target) -> Option<Target> {
        match target {
            Target::Q1TimeDetailed => Some(Target::Q1Time),
            Target::Q1MemoryDetailed => Some(Target::Q1Memory),
            Target::Q2TimeDetailed => Some(Target::Q2Time),
            Target::Q2MemoryDetailed => Some(Target::Q2Memory),
            _ => None,
        }
    }

    #[test]
    fn names_match_clap_values() {
        for target in Target::ALL {
            let value = target.to_possible_value().unwrap();
            assert_eq!(value.get_name(), target.name());
            assert_eq!(Target::from_str(target.name(), false).unwrap(), target);
        }
        assert_eq!(Target::value_variants().len(), Target::ALL.len());
    }

    #[test]
    fn query_targets_forward_query_and_optimization() {
        let run = Target::Q2Memory.query_run().unwrap();
        assert_eq!(
            run.args(),
            ["run", "--query", "q2", "--optimization", "memory"]
        );
        assert!(Target::Clean.query_run().is_none());
        assert!(Target::All.query_run().is_none());
        assert!(Target::Help.query_run().is_none());
    }

    #[test]
    fn detailed_targets_only_add_a_profiler() {
        for target in Target::ALL {
            let Some(simple) = simple_counterpart(target) else {
                continue;
            };
            let detailed = target.query_run().unwrap().args();
            let plain = simple.query_run().unwrap().args();
            assert_eq!(detailed[..plain.len()], plain[..], "{target}");
            let expected = if target.name().contains("-time-") {
                "time"
            } else {
                "memory"
            };
            assert_eq!(detailed[plain.len()..], ["--profile", expected], "{target}");
        }
    }

    #[test]
    fn all_sequence_is_the_six_simple_targets() {
        let names: Vec<_> = ALL_SEQUENCE.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            ["q1-time", "q1-memory", "q2-time", "q2-memory", "q3-time", "q3-memory"]
        );
    }
}
