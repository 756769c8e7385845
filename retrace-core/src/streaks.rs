//! Profit streaks: consecutive trades sharing the sign of their profit.

use serde::{Deserialize, Serialize};

use crate::ledger::TradeRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakSign {
    Win,
    Loss,
    Flat,
}

impl StreakSign {
    pub fn of(profit: f64) -> Self {
        if profit > 0.0 {
            StreakSign::Win
        } else if profit < 0.0 {
            StreakSign::Loss
        } else {
            StreakSign::Flat
        }
    }
}

/// A maximal group of consecutive trades with the same profit sign.
///
/// `start_index`/`end_index` are row positions in the ledger; `length`
/// counts trades only, so it can be smaller than the index span when
/// skipped rows sit inside the streak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub sign: StreakSign,
    pub start_index: usize,
    pub end_index: usize,
    pub length: usize,
}

/// Group trades into streaks.
///
/// Cash-flow rows and rows without a profit are skipped and do not break
/// the streak around them.
pub fn profit_streaks(rows: &[TradeRow]) -> Vec<Streak> {
    let mut streaks: Vec<Streak> = Vec::new();

    let trades = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.is_cash_flow())
        .filter_map(|(i, r)| r.profit.filter(|p| p.is_finite()).map(|p| (i, p)));

    for (index, profit) in trades {
        let sign = StreakSign::of(profit);
        match streaks.last_mut() {
            Some(current) if current.sign == sign => {
                current.end_index = index;
                current.length += 1;
            }
            _ => streaks.push(Streak {
                sign,
                start_index: index,
                end_index: index,
                length: 1,
            }),
        }
    }
    streaks
}

/// Length of the longest streak with the given sign, 0 if none.
pub fn longest_streak(streaks: &[Streak], sign: StreakSign) -> usize {
    streaks
        .iter()
        .filter(|s| s.sign == sign)
        .map(|s| s.length)
        .max()
        .unwrap_or(0)
}

/// Mean length of streaks with the given sign, 0.0 if none.
pub fn mean_streak(streaks: &[Streak], sign: StreakSign) -> f64 {
    let lengths: Vec<usize> = streaks
        .iter()
        .filter(|s| s.sign == sign)
        .map(|s| s.length)
        .collect();
    if lengths.is_empty() {
        return 0.0;
    }
    lengths.iter().sum::<usize>() as f64 / lengths.len() as f64
}
