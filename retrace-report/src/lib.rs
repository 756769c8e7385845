//! Retrace Report: loading, reporting, and export around `retrace-core`.
//!
//! This crate builds on `retrace-core` to provide:
//! - CSV ledger loading (profit or balance layout)
//! - Report assembly with a BLAKE3 dataset hash and trade streak stats
//! - JSON, CSV, and Markdown export plus on-disk artifact bundles
//! - Parallel batch analysis over many ledgers

pub mod batch;
pub mod export;
pub mod loader;
pub mod report;

pub use batch::{analyze_batch, analyze_file, BatchOutcome};
pub use export::{
    export_json, export_runs_csv, export_series_csv, generate_markdown, import_json, load_report,
    save_report,
};
pub use loader::{load_ledger_csv, read_ledger, BalanceSource, LoadError, LoadedLedger};
pub use report::{compute_dataset_hash, Report, StreakStats, SCHEMA_VERSION};
