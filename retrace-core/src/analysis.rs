//! One-call analysis: series, runs, rankings, and summaries for a ledger.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::domain::{BalancePoint, Run, RunKind};
use crate::ledger::exclude_cash_flows;
use crate::ranking::top_runs;
use crate::retracement::{compute_series, max_retracement, max_runup, RetracementSeries};
use crate::runs::detect_runs_with;
use crate::summary::RunSummary;

/// Everything the reporting layer needs from one ledger.
///
/// Indices in runs and series refer to `points`, which is the input after
/// any pre-engine filtering the config asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub points: Vec<BalancePoint>,
    pub series: RetracementSeries,
    pub drawdowns: Vec<Run>,
    pub runups: Vec<Run>,
    pub top_drawdowns: Vec<Run>,
    pub top_runups: Vec<Run>,
    pub drawdown_summary: RunSummary,
    pub runup_summary: RunSummary,
    pub max_drawdown: f64,
    pub max_runup: f64,
}

impl Analysis {
    pub fn runs(&self, kind: RunKind) -> &[Run] {
        match kind {
            RunKind::Drawdown => &self.drawdowns,
            RunKind::Runup => &self.runups,
        }
    }

    pub fn top(&self, kind: RunKind) -> &[Run] {
        match kind {
            RunKind::Drawdown => &self.top_drawdowns,
            RunKind::Runup => &self.top_runups,
        }
    }
}

/// Run the engine over `points` with the given options.
pub fn analyze(points: &[BalancePoint], config: &AnalysisConfig) -> Analysis {
    let points = if config.exclude_cash_flows {
        exclude_cash_flows(points)
    } else {
        points.to_vec()
    };

    let series = compute_series(&points);
    let policy = &config.run_policy;
    let drawdowns = detect_runs_with(&series.drawdown, &points, RunKind::Drawdown, policy);
    let runups = detect_runs_with(&series.runup, &points, RunKind::Runup, policy);

    Analysis {
        top_drawdowns: top_runs(&drawdowns, config.rank_by, config.top_n),
        top_runups: top_runs(&runups, config.rank_by, config.top_n),
        drawdown_summary: RunSummary::from_runs(RunKind::Drawdown, &drawdowns),
        runup_summary: RunSummary::from_runs(RunKind::Runup, &runups),
        max_drawdown: max_retracement(&series.drawdown),
        max_runup: max_runup(&series.runup),
        drawdowns,
        runups,
        series,
        points,
    }
}
