//! Retracement series: per-row percentage distance from the running peak
//! (drawdown) or running trough (run-up).
//!
//! Every function is pure: balance points in, one value per point out.
//! A point without a balance yields `None` and leaves the running reference
//! untouched. A reference at or below zero yields `0.0` instead of dividing.

use serde::{Deserialize, Serialize};

use crate::domain::{BalancePoint, RunKind};

/// Drawdown and run-up series computed side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetracementSeries {
    /// Values `<= 0.0`: percentage below the running peak.
    pub drawdown: Vec<Option<f64>>,
    /// Values `>= 0.0`: percentage above the running trough.
    pub runup: Vec<Option<f64>>,
}

impl RetracementSeries {
    pub fn len(&self) -> usize {
        self.drawdown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawdown.is_empty()
    }

    /// The series matching a run kind.
    pub fn for_kind(&self, kind: RunKind) -> &[Option<f64>] {
        match kind {
            RunKind::Drawdown => &self.drawdown,
            RunKind::Runup => &self.runup,
        }
    }
}

/// Compute both series in one call.
pub fn compute_series(points: &[BalancePoint]) -> RetracementSeries {
    RetracementSeries {
        drawdown: compute_retracement_series(points),
        runup: compute_runup_series(points),
    }
}

/// Percentage retracement from the running peak, one value per point.
///
/// The first defined balance sets the peak and yields `0.0`; so does every
/// later balance above it. Otherwise the value is `-(peak - b) / peak * 100`.
pub fn compute_retracement_series(points: &[BalancePoint]) -> Vec<Option<f64>> {
    track_reference(points, RunKind::Drawdown)
}

/// Percentage advance from the running trough, one value per point.
///
/// Mirror image of [`compute_retracement_series`]: a new low resets the
/// trough and yields `0.0`, any other balance yields `(b - trough) / trough * 100`.
pub fn compute_runup_series(points: &[BalancePoint]) -> Vec<Option<f64>> {
    track_reference(points, RunKind::Runup)
}

/// Deepest drawdown in the series (most negative value), `0.0` if none.
pub fn max_retracement(series: &[Option<f64>]) -> f64 {
    series.iter().flatten().fold(0.0_f64, |acc, &v| acc.min(v))
}

/// Largest run-up in the series, `0.0` if none.
pub fn max_runup(series: &[Option<f64>]) -> f64 {
    series.iter().flatten().fold(0.0_f64, |acc, &v| acc.max(v))
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Walk the points keeping a running peak (drawdown) or trough (run-up).
fn track_reference(points: &[BalancePoint], kind: RunKind) -> Vec<Option<f64>> {
    let mut reference: Option<f64> = None;

    points
        .iter()
        .map(|point| {
            let balance = point.balance()?;
            let current = match reference {
                None => {
                    reference = Some(balance);
                    return Some(0.0);
                }
                Some(r) => r,
            };
            let new_extreme = match kind {
                RunKind::Drawdown => balance > current,
                RunKind::Runup => balance < current,
            };
            if new_extreme {
                reference = Some(balance);
                return Some(0.0);
            }
            Some(percent_from(current, balance))
        })
        .collect()
}

/// `(balance - reference) / reference * 100`, or `0.0` for a non-positive reference.
fn percent_from(reference: f64, balance: f64) -> f64 {
    if reference <= 0.0 {
        return 0.0;
    }
    (balance - reference) / reference * 100.0
}
