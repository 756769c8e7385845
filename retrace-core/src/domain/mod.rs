//! Domain types for the retracement engine

pub mod point;
pub mod run;

pub use point::{points_from_balances, BalancePoint};
pub use run::{Run, RunKind};
