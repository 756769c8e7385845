//! BalancePoint: one row of the trade log as seen by the engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Cumulative balance observation for a single trade-log row.
///
/// Insertion order is the primary key: `index` is the row's position in the
/// sequence and never changes while the sequence is in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub index: usize,
    /// When the position was opened. `None` if the date could not be parsed.
    pub timestamp: Option<NaiveDateTime>,
    /// Running total P&L after this row. `None` means "no data".
    pub cumulative_balance: Option<f64>,
    /// Deposit or withdrawal rather than a trading result.
    pub is_cash_flow: bool,
}

impl BalancePoint {
    pub fn new(index: usize, timestamp: Option<NaiveDateTime>, cumulative_balance: Option<f64>) -> Self {
        Self {
            index,
            timestamp,
            cumulative_balance,
            is_cash_flow: false,
        }
    }

    pub fn cash_flow(mut self) -> Self {
        self.is_cash_flow = true;
        self
    }

    /// Balance if present and finite. NaN and infinities count as missing.
    pub fn balance(&self) -> Option<f64> {
        self.cumulative_balance.filter(|b| b.is_finite())
    }
}

/// Build undated, non-cash-flow points from raw balances. Handy for callers
/// that only have a balance column.
pub fn points_from_balances(balances: &[Option<f64>]) -> Vec<BalancePoint> {
    balances
        .iter()
        .enumerate()
        .map(|(i, &b)| BalancePoint::new(i, None, b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_balance_is_missing() {
        let p = BalancePoint::new(0, None, Some(f64::NAN));
        assert_eq!(p.balance(), None);
        let p = BalancePoint::new(0, None, Some(f64::INFINITY));
        assert_eq!(p.balance(), None);
    }

    #[test]
    fn points_from_balances_keeps_order() {
        let points = points_from_balances(&[Some(1.0), None, Some(3.0)]);
        assert_eq!(points.len(), 3);
        assert_eq!(points[1].index, 1);
        assert_eq!(points[1].cumulative_balance, None);
        assert!(!points[2].is_cash_flow);
    }

    #[test]
    fn cash_flow_builder_sets_flag() {
        let p = BalancePoint::new(4, None, Some(10.0)).cash_flow();
        assert!(p.is_cash_flow);
        assert_eq!(p.index, 4);
    }
}
