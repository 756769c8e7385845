//! Aggregate statistics over a set of runs.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::{Run, RunKind};

/// Aggregate view of all runs of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub kind: RunKind,
    pub count: usize,
    /// Runs still open at the end of the ledger (0 or 1).
    pub open_count: usize,
    pub mean_operations: f64,
    pub max_operations: usize,
    /// Deepest drawdown or highest run-up across runs, 0.0 if none.
    pub extreme_value: f64,
    /// Longest known duration in seconds.
    pub longest_duration_secs: Option<i64>,
}

impl RunSummary {
    pub fn from_runs(kind: RunKind, runs: &[Run]) -> Self {
        let runs: Vec<&Run> = runs.iter().filter(|r| r.kind == kind).collect();
        let count = runs.len();

        let mean_operations = if count == 0 {
            0.0
        } else {
            runs.iter().map(|r| r.operation_count).sum::<usize>() as f64 / count as f64
        };

        let extreme_value = runs.iter().fold(0.0_f64, |acc, r| {
            if kind.is_more_extreme(r.extremum_value, acc) {
                r.extremum_value
            } else {
                acc
            }
        });

        Self {
            kind,
            count,
            open_count: runs.iter().filter(|r| r.is_open()).count(),
            mean_operations,
            max_operations: runs.iter().map(|r| r.operation_count).max().unwrap_or(0),
            extreme_value,
            longest_duration_secs: runs
                .iter()
                .filter_map(|r| r.duration)
                .max()
                .map(|d| d.num_seconds()),
        }
    }
}

/// Render a duration as `"3d 04h 05m"`, or `"04h 05m"` under a day.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    if days > 0 {
        format!("{sign}{days}d {hours:02}h {minutes:02}m")
    } else {
        format!("{sign}{hours:02}h {minutes:02}m")
    }
}
