//! CSV ledger loading.
//!
//! Two layouts are accepted, told apart by the header row:
//! - **profit**: `opened_at, profit[, deposit, withdrawal]`. Balances are the
//!   running sum of `profit`.
//! - **balance**: `opened_at, balance[, deposit, withdrawal]`. Balances are
//!   taken as given.
//!
//! Header names are matched case-insensitively. Cells that do not parse become
//! missing values; they are counted and logged, never fatal.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use retrace_core::ledger::{build_balance_points, TradeRow};
use retrace_core::parse::{parse_amount, parse_timestamp};
use retrace_core::BalancePoint;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

const TIMESTAMP_COLUMNS: &[&str] = &["opened_at", "timestamp", "date", "opened"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Where the balances in a ledger came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSource {
    Profit,
    Balance,
}

/// A parsed ledger ready for analysis.
#[derive(Debug, Clone)]
pub struct LoadedLedger {
    /// Per-row trade data. `profit` is `None` for every row of a balance-layout file.
    pub rows: Vec<TradeRow>,
    pub points: Vec<BalancePoint>,
    pub source: BalanceSource,
    /// Non-empty cells that could not be parsed.
    pub unparsed_cells: usize,
}

/// Load a ledger CSV from disk.
pub fn load_ledger_csv(path: &Path) -> Result<LoadedLedger, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let ledger = read_ledger(file)?;
    info!(
        path = %path.display(),
        rows = ledger.points.len(),
        source = ?ledger.source,
        "loaded ledger"
    );
    Ok(ledger)
}

/// Read a ledger from any CSV source.
pub fn read_ledger<R: Read>(reader: R) -> Result<LoadedLedger, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();
    let column = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let timestamp_col = column(TIMESTAMP_COLUMNS);
    let profit_col = column(&["profit"]);
    let balance_col = column(&["balance", "cumulative_balance"]);
    let deposit_col = column(&["deposit"]);
    let withdrawal_col = column(&["withdrawal"]);

    let (value_col, source) = match (profit_col, balance_col) {
        (Some(c), _) => (c, BalanceSource::Profit),
        (None, Some(c)) => (c, BalanceSource::Balance),
        (None, None) => return Err(LoadError::MissingColumn("profit or balance")),
    };

    let mut unparsed_cells = 0;
    let mut rows = Vec::new();
    let mut values = Vec::new();

    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let line = line + 2;
        let cell = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("");

        let opened_at = parse_cell(cell(timestamp_col), line, &mut unparsed_cells, parse_timestamp);
        let value = parse_cell(cell(Some(value_col)), line, &mut unparsed_cells, parse_amount);
        let deposit = parse_cell(cell(deposit_col), line, &mut unparsed_cells, parse_amount);
        let withdrawal = parse_cell(cell(withdrawal_col), line, &mut unparsed_cells, parse_amount);

        values.push(value);
        rows.push(TradeRow {
            opened_at,
            profit: match source {
                BalanceSource::Profit => value,
                BalanceSource::Balance => None,
            },
            deposit,
            withdrawal,
        });
    }

    let points = match source {
        BalanceSource::Profit => build_balance_points(&rows),
        BalanceSource::Balance => rows
            .iter()
            .zip(&values)
            .enumerate()
            .map(|(index, (row, &balance))| BalancePoint {
                index,
                timestamp: row.opened_at,
                cumulative_balance: balance,
                is_cash_flow: row.is_cash_flow(),
            })
            .collect(),
    };

    if unparsed_cells > 0 {
        warn!(unparsed_cells, "ledger contains cells that could not be parsed");
    }

    Ok(LoadedLedger {
        rows,
        points,
        source,
        unparsed_cells,
    })
}

/// Parse one cell. Empty cells are simply missing; malformed ones are
/// tallied in `unparsed`. `line` is the 1-based file line, header included.
fn parse_cell<T>(
    raw: &str,
    line: usize,
    unparsed: &mut usize,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    if raw.is_empty() {
        return None;
    }
    let parsed = parse(raw);
    if parsed.is_none() {
        *unparsed += 1;
        debug!(line, cell = %raw, "unparseable cell");
    }
    parsed
}
