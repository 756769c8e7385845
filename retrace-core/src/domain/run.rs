//! Run: a contiguous stretch of drawdown or run-up.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Which side of the reference extremum a run lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    /// Below the running peak (negative percentages).
    Drawdown,
    /// Above the running trough (positive percentages).
    Runup,
}

impl RunKind {
    /// True if `value` lies strictly on this kind's side of zero.
    pub fn is_active(self, value: f64) -> bool {
        match self {
            RunKind::Drawdown => value < 0.0,
            RunKind::Runup => value > 0.0,
        }
    }

    /// True if `candidate` is more extreme than `current` for this kind.
    pub fn is_more_extreme(self, candidate: f64, current: f64) -> bool {
        match self {
            RunKind::Drawdown => candidate < current,
            RunKind::Runup => candidate > current,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RunKind::Drawdown => "drawdown",
            RunKind::Runup => "runup",
        }
    }
}

impl std::fmt::Display for RunKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A maximal run of drawdown or run-up rows.
///
/// Runs are derived values: recomputed from the point sequence on every
/// evaluation, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub kind: RunKind,
    /// First row of the run (inclusive).
    pub start_index: usize,
    /// Last row of the run (inclusive).
    pub end_index: usize,
    /// Most negative (drawdown) or most positive (run-up) percentage.
    pub extremum_value: f64,
    /// `timestamp[end] - timestamp[start]`, if both are known.
    #[serde(with = "duration_secs")]
    pub duration: Option<Duration>,
    /// Rows in `[start_index, end_index]` that are not cash flows.
    pub operation_count: usize,
    /// Row that brought the series back to flat. `None` while still open.
    pub recovery_index: Option<usize>,
}

impl Run {
    /// Number of rows spanned, cash flows included. An inverted span
    /// (possible only in hand-edited JSON) counts as one row.
    pub fn row_count(&self) -> usize {
        self.end_index.saturating_sub(self.start_index) + 1
    }

    /// Still in progress when the sequence ended.
    pub fn is_open(&self) -> bool {
        self.recovery_index.is_none()
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..=self.end_index).contains(&index)
    }
}

/// Serialize an optional duration as whole seconds.
mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&d.num_seconds()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<i64>::deserialize(d)?.map(Duration::seconds))
    }
}
