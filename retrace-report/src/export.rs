//! Report export: JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: per-row series and the run list, for spreadsheets and plotting
//! - **Markdown**: a human-readable summary with ranked run tables
//!
//! Persisted reports carry a `schema_version`. Newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use retrace_core::{format_duration, BalancePoint, Run, RunKind, RunSummary};

use crate::report::{Report, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `Report` to pretty JSON.
pub fn export_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize Report to JSON")
}

/// Deserialize a `Report` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<Report> {
    let report: Report = serde_json::from_str(json).context("failed to deserialize Report from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the per-row balance and retracement series.
///
/// Columns: index, timestamp, balance, drawdown_pct, runup_pct, cash_flow.
/// Missing values are written as empty cells.
pub fn export_series_csv(report: &Report) -> Result<String> {
    let analysis = &report.analysis;
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["index", "timestamp", "balance", "drawdown_pct", "runup_pct", "cash_flow"])?;

    for (i, p) in analysis.points.iter().enumerate() {
        let dd = analysis.series.drawdown.get(i).copied().flatten();
        let ru = analysis.series.runup.get(i).copied().flatten();
        wtr.write_record([
            p.index.to_string(),
            p.timestamp.map(|t| t.to_string()).unwrap_or_default(),
            fmt_opt(p.cumulative_balance, 2),
            fmt_opt(dd, 4),
            fmt_opt(ru, 4),
            p.is_cash_flow.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export every drawdown and run-up run, drawdowns first.
///
/// Columns: kind, start_index, end_index, start_time, end_time, extremum_pct,
/// duration, operations, recovery_index, open
pub fn export_runs_csv(report: &Report) -> Result<String> {
    let analysis = &report.analysis;
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "kind",
        "start_index",
        "end_index",
        "start_time",
        "end_time",
        "extremum_pct",
        "duration",
        "operations",
        "recovery_index",
        "open",
    ])?;

    for run in analysis.drawdowns.iter().chain(&analysis.runups) {
        wtr.write_record([
            run.kind.label().to_string(),
            run.start_index.to_string(),
            run.end_index.to_string(),
            timestamp_at(&analysis.points, run.start_index),
            timestamp_at(&analysis.points, run.end_index),
            format!("{:.4}", run.extremum_value),
            run.duration.map(format_duration).unwrap_or_default(),
            run.operation_count.to_string(),
            run.recovery_index.map(|i| i.to_string()).unwrap_or_default(),
            run.is_open().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one report.
///
/// Creates a directory named `{name}_{timestamp}/` under `output_dir`
/// (with a `_2`, `_3`, ... suffix when that name is taken) containing:
/// - `report.json`: the full `Report`
/// - `series.csv`: per-row balance, drawdown and run-up
/// - `runs.csv`: every detected run
/// - `report.md`: the Markdown summary
///
/// Returns the path to the created directory.
pub fn save_report(report: &Report, output_dir: &Path) -> Result<PathBuf> {
    let base = format!(
        "{}_{}",
        sanitize(&report.name),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = create_unique_dir(output_dir, &base)?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("series.csv"), export_series_csv(report)?)?;
    std::fs::write(run_dir.join("runs.csv"), export_runs_csv(report)?)?;
    std::fs::write(run_dir.join("report.md"), generate_markdown(report))?;

    Ok(run_dir)
}

/// Create `output_dir/base`, or the first free `base_N`. `create_dir` is
/// atomic, so concurrent saves never share a directory.
fn create_unique_dir(output_dir: &Path, base: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let mut suffix = 1usize;
    loop {
        let name = if suffix == 1 {
            base.to_string()
        } else {
            format!("{base}_{suffix}")
        };
        let candidate = output_dir.join(name);
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => suffix += 1,
            Err(e) => {
                return Err(e).with_context(|| format!("failed to create artifact dir: {}", candidate.display()))
            }
        }
    }
}

/// Load a `Report` from an artifact directory's report.json.
pub fn load_report(dir: &Path) -> Result<Report> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Generate a Markdown report: metadata, per-kind summaries, and the
/// ranked top-N tables.
pub fn generate_markdown(report: &Report) -> String {
    let a = &report.analysis;
    let mut md = String::with_capacity(2048);

    md.push_str(&format!("# Retracement Report: {}\n\n", report.name));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Rows | {} |\n", report.row_count));
    if let Some(source) = report.source {
        md.push_str(&format!("| Balance Source | {source:?} |\n"));
    }
    if report.unparsed_cells > 0 {
        md.push_str(&format!("| Unparsed Cells | {} |\n", report.unparsed_cells));
    }
    if report.config.exclude_cash_flows {
        md.push_str("| Cash Flows | excluded |\n");
    }
    md.push_str(&format!("| Ranked By | {} |\n", report.config.rank_by));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    md.push('\n');

    md.push_str("## Summary\n\n");
    md.push_str("| Metric | Drawdowns | Run-ups |\n");
    md.push_str("| --- | ---: | ---: |\n");
    summary_rows(&mut md, &a.drawdown_summary, &a.runup_summary);
    if let Some(profit) = report.trading_profit {
        md.push_str(&format!("\nTrading profit: {profit:.2}\n"));
    }
    if let Some(s) = &report.streaks {
        md.push_str(&format!(
            "\nLongest winning streak: {} (mean {:.1}). Longest losing streak: {} (mean {:.1}).\n",
            s.longest_win, s.mean_win, s.longest_loss, s.mean_loss
        ));
    }
    md.push('\n');

    for kind in [RunKind::Drawdown, RunKind::Runup] {
        md.push_str(&format!("## Top {}s\n\n", heading(kind)));
        run_table(&mut md, a.top(kind), &a.points);
        md.push('\n');
    }

    md
}

// ─── Helpers ────────────────────────────────────────────────────────

fn summary_rows(md: &mut String, dd: &RunSummary, ru: &RunSummary) {
    md.push_str(&format!("| Runs | {} | {} |\n", dd.count, ru.count));
    md.push_str(&format!("| Open | {} | {} |\n", dd.open_count, ru.open_count));
    md.push_str(&format!(
        "| Extreme | {:.2}% | {:.2}% |\n",
        dd.extreme_value, ru.extreme_value
    ));
    md.push_str(&format!(
        "| Mean Operations | {:.1} | {:.1} |\n",
        dd.mean_operations, ru.mean_operations
    ));
    md.push_str(&format!(
        "| Max Operations | {} | {} |\n",
        dd.max_operations, ru.max_operations
    ));
    let longest = |s: &RunSummary| {
        s.longest_duration_secs
            .map(|secs| format_duration(chrono::Duration::seconds(secs)))
            .unwrap_or_else(|| "-".into())
    };
    md.push_str(&format!("| Longest | {} | {} |\n", longest(dd), longest(ru)));
}

fn run_table(md: &mut String, runs: &[Run], points: &[BalancePoint]) {
    if runs.is_empty() {
        md.push_str("_None._\n");
        return;
    }
    md.push_str("| # | Rows | From | To | Extremum | Duration | Ops | Status |\n");
    md.push_str("| ---: | --- | --- | --- | ---: | --- | ---: | --- |\n");
    for (rank, run) in runs.iter().enumerate() {
        let status = match run.recovery_index {
            Some(i) => format!("recovered at {i}"),
            None => "open".into(),
        };
        md.push_str(&format!(
            "| {} | {}-{} | {} | {} | {:.2}% | {} | {} | {} |\n",
            rank + 1,
            run.start_index,
            run.end_index,
            or_dash(timestamp_at(points, run.start_index)),
            or_dash(timestamp_at(points, run.end_index)),
            run.extremum_value,
            run.duration.map(format_duration).unwrap_or_else(|| "-".into()),
            run.operation_count,
            status,
        ));
    }
}

fn heading(kind: RunKind) -> &'static str {
    match kind {
        RunKind::Drawdown => "Drawdown",
        RunKind::Runup => "Run-up",
    }
}

fn timestamp_at(points: &[BalancePoint], index: usize) -> String {
    points
        .get(index)
        .and_then(|p| p.timestamp)
        .map(|t| t.to_string())
        .unwrap_or_default()
}

fn or_dash(s: String) -> String {
    if s.is_empty() {
        "-".into()
    } else {
        s
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map(|v| format!("{v:.decimals$}")).unwrap_or_default()
}

/// Keep directory names portable.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "report".into()
    } else {
        cleaned
    }
}
