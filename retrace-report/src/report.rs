//! Report assembly: an `Analysis` plus the provenance needed to trust it.

use retrace_core::ledger::trading_profit;
use retrace_core::streaks::{longest_streak, mean_streak};
use retrace_core::{analyze, profit_streaks, Analysis, AnalysisConfig, BalancePoint, StreakSign};
use serde::{Deserialize, Serialize};

use crate::loader::{BalanceSource, LoadedLedger};

/// Current report schema. Bumped whenever a persisted field changes meaning.
pub const SCHEMA_VERSION: u32 = 1;

/// Win/loss streak statistics for a profit-layout ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakStats {
    pub longest_win: usize,
    pub longest_loss: usize,
    pub mean_win: f64,
    pub mean_loss: f64,
}

/// A complete, persistable analysis of one ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: u32,
    pub name: String,
    /// BLAKE3 over the balance points fed to the engine.
    pub dataset_hash: String,
    pub row_count: usize,
    pub config: AnalysisConfig,
    /// How balances were obtained. `None` when built from raw points.
    pub source: Option<BalanceSource>,
    pub unparsed_cells: usize,
    /// Sum of trade profits, cash flows excluded. Profit layout only.
    pub trading_profit: Option<f64>,
    pub streaks: Option<StreakStats>,
    pub analysis: Analysis,
}

impl Report {
    /// Build a report from balance points alone.
    pub fn build(name: impl Into<String>, points: &[BalancePoint], config: &AnalysisConfig) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            name: name.into(),
            dataset_hash: compute_dataset_hash(points),
            row_count: points.len(),
            config: config.clone(),
            source: None,
            unparsed_cells: 0,
            trading_profit: None,
            streaks: None,
            analysis: analyze(points, config),
        }
    }

    /// Build a report from a loaded ledger, including trade-level statistics
    /// when the ledger carries per-trade profits.
    pub fn from_ledger(name: impl Into<String>, ledger: &LoadedLedger, config: &AnalysisConfig) -> Self {
        let mut report = Self::build(name, &ledger.points, config);
        report.source = Some(ledger.source);
        report.unparsed_cells = ledger.unparsed_cells;

        if ledger.source == BalanceSource::Profit {
            let streaks = profit_streaks(&ledger.rows);
            report.trading_profit = Some(trading_profit(&ledger.rows));
            report.streaks = Some(StreakStats {
                longest_win: longest_streak(&streaks, StreakSign::Win),
                longest_loss: longest_streak(&streaks, StreakSign::Loss),
                mean_win: mean_streak(&streaks, StreakSign::Win),
                mean_loss: mean_streak(&streaks, StreakSign::Loss),
            });
        }
        report
    }
}

/// Deterministic BLAKE3 hash over every point in order.
///
/// Missing timestamps and balances hash as a distinct tag byte so that
/// `None` never collides with a real value.
pub fn compute_dataset_hash(points: &[BalancePoint]) -> String {
    let mut hasher = blake3::Hasher::new();
    for p in points {
        hasher.update(&(p.index as u64).to_le_bytes());
        match p.timestamp {
            Some(ts) => {
                hasher.update(&[1]);
                hasher.update(ts.to_string().as_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        match p.cumulative_balance {
            Some(b) => {
                hasher.update(&[1]);
                hasher.update(&b.to_le_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        hasher.update(&[u8::from(p.is_cash_flow)]);
    }
    hasher.finalize().to_hex().to_string()
}
