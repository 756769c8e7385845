//! Run detection: segments a retracement series into drawdown or run-up runs.
//!
//! Detection is a two-state machine (`Flat` ↔ `Open`) driven one row at a
//! time by [`step`]:
//!
//! - `Flat` + value on the kind's side of zero → `Open` at this row.
//! - `Open` + value on the kind's side → stays open, extremum updated.
//! - `Open` + zero, opposite sign, or `None` → closes. The closing row is the
//!   run's recovery row; the run itself ends on the row before it.
//! - End of input with the machine `Open` → run ends on the last row, no
//!   recovery row.
//!
//! [`RunPolicy`] carries the variants: with [`FlatPolicy::Pause`] an exact
//! zero keeps the run open instead of closing it. Paused rows never become
//! the run's end: a run ends on its last active row, and if it never goes
//! active again its recovery row is the first paused zero.

use serde::{Deserialize, Serialize};

use crate::domain::{BalancePoint, Run, RunKind};

/// What an exact-zero value does to an open run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatPolicy {
    /// Zero is a return to flat and closes the run.
    #[default]
    Close,
    /// Zero pauses the run; only `None`, an opposite sign, or end of input close it.
    Pause,
}

/// Detection options. `Default` is the canonical behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunPolicy {
    #[serde(default)]
    pub flat: FlatPolicy,
}

/// Detector state between rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunState {
    Flat,
    Open {
        start: usize,
        extremum: f64,
        /// Last row on the kind's side of zero.
        last_active: usize,
        /// First zero absorbed since `last_active`, under `Pause`.
        paused_at: Option<usize>,
    },
}

impl RunState {
    fn opened(index: usize, extremum: f64) -> Self {
        RunState::Open {
            start: index,
            extremum,
            last_active: index,
            paused_at: None,
        }
    }
}

/// A finished run before operation counts and timing are attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub extremum: f64,
    pub recovery: Option<usize>,
}

/// What a single row did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Flat before and after.
    Stay,
    /// A run opened on this row.
    Open,
    /// An open run absorbed this row.
    Extend,
    /// Zero under [`FlatPolicy::Pause`]: run stays open.
    Pause,
    /// This row closed a run.
    Close(Span),
}

/// Advance the detector by one row.
pub fn step(
    state: RunState,
    index: usize,
    value: Option<f64>,
    kind: RunKind,
    policy: &RunPolicy,
) -> (RunState, Transition) {
    let value = value.filter(|v| v.is_finite());

    match state {
        RunState::Flat => match value {
            Some(v) if kind.is_active(v) => (RunState::opened(index, v), Transition::Open),
            _ => (RunState::Flat, Transition::Stay),
        },
        RunState::Open {
            start,
            extremum,
            last_active,
            paused_at,
        } => match value {
            Some(v) if kind.is_active(v) => {
                let extremum = if kind.is_more_extreme(v, extremum) {
                    v
                } else {
                    extremum
                };
                let state = RunState::Open {
                    start,
                    extremum,
                    last_active: index,
                    paused_at: None,
                };
                (state, Transition::Extend)
            }
            Some(v) if v == 0.0 && policy.flat == FlatPolicy::Pause => {
                let state = RunState::Open {
                    start,
                    extremum,
                    last_active,
                    paused_at: paused_at.or(Some(index)),
                };
                (state, Transition::Pause)
            }
            _ => {
                let span = Span {
                    start,
                    end: last_active,
                    extremum,
                    recovery: Some(paused_at.unwrap_or(index)),
                };
                (RunState::Flat, Transition::Close(span))
            }
        },
    }
}

/// Close out a run still open when the input ends.
///
/// A run whose trailing rows were all paused zeros has recovered on the
/// first of them.
pub fn finish(state: RunState) -> Option<Span> {
    match state {
        RunState::Flat => None,
        RunState::Open {
            start,
            extremum,
            last_active,
            paused_at,
        } => Some(Span {
            start,
            end: last_active,
            extremum,
            recovery: paused_at,
        }),
    }
}

/// Detect runs of `kind` with the default policy.
///
/// `series` and `points` are parallel slices. Runs come back in start order;
/// ranking them is up to the caller.
pub fn detect_runs(series: &[Option<f64>], points: &[BalancePoint], kind: RunKind) -> Vec<Run> {
    detect_runs_with(series, points, kind, &RunPolicy::default())
}

/// Detect runs of `kind` under an explicit policy.
pub fn detect_runs_with(
    series: &[Option<f64>],
    points: &[BalancePoint],
    kind: RunKind,
    policy: &RunPolicy,
) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut state = RunState::Flat;

    for (index, &value) in series.iter().enumerate() {
        let (next, transition) = step(state, index, value, kind, policy);
        if let Transition::Close(span) = transition {
            runs.push(materialize(span, points, kind));
        }
        state = next;
    }

    if let Some(span) = finish(state) {
        runs.push(materialize(span, points, kind));
    }
    runs
}

/// Attach operation count and duration to a span.
///
/// Indices past the end of `points` count as no operation and no timestamp.
fn materialize(span: Span, points: &[BalancePoint], kind: RunKind) -> Run {
    let operation_count = (span.start..=span.end)
        .filter(|&i| points.get(i).is_some_and(|p| !p.is_cash_flow))
        .count();

    let timestamp = |i: usize| points.get(i).and_then(|p| p.timestamp);
    let duration = match (timestamp(span.start), timestamp(span.end)) {
        (Some(start), Some(end)) => Some(end - start),
        _ => None,
    };

    Run {
        kind,
        start_index: span.start,
        end_index: span.end,
        extremum_value: span.extremum,
        duration,
        operation_count,
        recovery_index: span.recovery,
    }
}
