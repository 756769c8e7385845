//! Ranking of detected runs for "top N" views.
//!
//! Detection always returns runs in start order; these helpers produce
//! sorted copies. Sorts are stable, so ties keep start order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::{Run, RunKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    /// Deepest drawdown / highest run-up first.
    #[default]
    Severity,
    /// Longest first; runs without a duration go last.
    Duration,
    /// Most non-cash-flow rows first.
    Operations,
}

impl std::str::FromStr for RankBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "severity" => Ok(RankBy::Severity),
            "duration" => Ok(RankBy::Duration),
            "operations" | "ops" => Ok(RankBy::Operations),
            other => Err(format!("unknown ranking '{other}' (expected severity, duration, operations)")),
        }
    }
}

impl std::fmt::Display for RankBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RankBy::Severity => "severity",
            RankBy::Duration => "duration",
            RankBy::Operations => "operations",
        })
    }
}

/// Sorted copy of `runs`.
pub fn rank_runs(runs: &[Run], by: RankBy) -> Vec<Run> {
    let mut ranked = runs.to_vec();
    ranked.sort_by(|a, b| compare(a, b, by));
    ranked
}

/// First `n` runs after ranking.
pub fn top_runs(runs: &[Run], by: RankBy, n: usize) -> Vec<Run> {
    let mut ranked = rank_runs(runs, by);
    ranked.truncate(n);
    ranked
}

fn compare(a: &Run, b: &Run, by: RankBy) -> Ordering {
    match by {
        RankBy::Severity => {
            let ord = a
                .extremum_value
                .partial_cmp(&b.extremum_value)
                .unwrap_or(Ordering::Equal);
            // Mixed kinds fall back to drawdown ordering.
            match a.kind {
                RunKind::Drawdown => ord,
                RunKind::Runup => ord.reverse(),
            }
        }
        RankBy::Duration => match (a.duration, b.duration) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        RankBy::Operations => b.operation_count.cmp(&a.operation_count),
    }
}
