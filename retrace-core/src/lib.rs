//! Retrace Core: drawdown and run-up analytics for a trading journal.
//!
//! This crate contains the engine and the types around it:
//! - Domain types (balance points, runs)
//! - Retracement series from the running peak / trough
//! - Run detection as an explicit flat ↔ open state machine
//! - Ledger building (trade rows → cumulative balances) and cell parsing
//! - Profit streaks, run ranking, and run summaries
//! - TOML-configurable one-call analysis
//!
//! Everything here is a pure function of its input. No I/O, no logging.

pub mod analysis;
pub mod config;
pub mod domain;
pub mod ledger;
pub mod parse;
pub mod ranking;
pub mod retracement;
pub mod runs;
pub mod streaks;
pub mod summary;

pub use analysis::{analyze, Analysis};
pub use config::{AnalysisConfig, ConfigError};
pub use domain::{BalancePoint, Run, RunKind};
pub use ledger::{build_balance_points, exclude_cash_flows, TradeRow};
pub use ranking::{rank_runs, top_runs, RankBy};
pub use retracement::{
    compute_retracement_series, compute_runup_series, compute_series, RetracementSeries,
};
pub use runs::{detect_runs, detect_runs_with, FlatPolicy, RunPolicy, RunState};
pub use streaks::{profit_streaks, Streak, StreakSign};
pub use summary::{format_duration, RunSummary};
