//! Ledger: turns trade-log rows into the balance points the engine reads.
//!
//! The cumulative balance is a running sum of per-row profit. A row with no
//! profit value gets no balance and leaves the running sum where it was, so
//! one bad cell never shifts every later balance.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::BalancePoint;

/// One row of the trade log, already parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    pub opened_at: Option<NaiveDateTime>,
    /// Realized P&L of the row. For cash-flow rows, the signed amount moved.
    pub profit: Option<f64>,
    pub deposit: Option<f64>,
    pub withdrawal: Option<f64>,
}

impl TradeRow {
    pub fn trade(opened_at: Option<NaiveDateTime>, profit: Option<f64>) -> Self {
        Self {
            opened_at,
            profit,
            ..Self::default()
        }
    }

    /// A deposit or withdrawal rather than a trading result.
    pub fn is_cash_flow(&self) -> bool {
        let nonzero = |v: Option<f64>| v.is_some_and(|x| x != 0.0);
        nonzero(self.deposit) || nonzero(self.withdrawal)
    }
}

/// Cumulative-sum the rows' profit into balance points.
pub fn build_balance_points(rows: &[TradeRow]) -> Vec<BalancePoint> {
    let mut running = 0.0;
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let balance = row.profit.filter(|p| p.is_finite()).map(|p| {
                running += p;
                running
            });
            BalancePoint {
                index,
                timestamp: row.opened_at,
                cumulative_balance: balance,
                is_cash_flow: row.is_cash_flow(),
            }
        })
        .collect()
}

/// Drop cash-flow rows and renumber the survivors.
///
/// This is a pre-engine filter: the balances are kept as they were, so the
/// running peak still reflects money that came in or out.
pub fn exclude_cash_flows(points: &[BalancePoint]) -> Vec<BalancePoint> {
    points
        .iter()
        .filter(|p| !p.is_cash_flow)
        .enumerate()
        .map(|(index, p)| BalancePoint {
            index,
            ..p.clone()
        })
        .collect()
}

/// Total realized profit from trading rows only.
pub fn trading_profit(rows: &[TradeRow]) -> f64 {
    rows.iter()
        .filter(|r| !r.is_cash_flow())
        .filter_map(|r| r.profit)
        .filter(|p| p.is_finite())
        .sum()
}
