//! Parallel analysis of many ledgers.
//!
//! Each file is loaded and analyzed independently on the rayon pool. A
//! failure in one file never aborts the others; outcomes come back in the
//! order the paths were given.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use retrace_core::AnalysisConfig;
use tracing::{debug, info, warn};

use crate::loader::load_ledger_csv;
use crate::report::Report;

/// Result of analyzing one file.
#[derive(Debug)]
pub struct BatchOutcome {
    pub path: PathBuf,
    pub result: Result<Report>,
}

impl BatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Load and analyze every path in parallel.
pub fn analyze_batch(paths: &[PathBuf], config: &AnalysisConfig) -> Vec<BatchOutcome> {
    info!(files = paths.len(), "starting batch analysis");

    let outcomes: Vec<BatchOutcome> = paths
        .par_iter()
        .map(|path| {
            let result = analyze_file(path, config);
            match &result {
                Ok(report) => debug!(
                    path = %path.display(),
                    rows = report.row_count,
                    drawdowns = report.analysis.drawdowns.len(),
                    "analyzed"
                ),
                Err(e) => warn!(path = %path.display(), error = %e, "analysis failed"),
            }
            BatchOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    info!(files = outcomes.len(), failed, "batch analysis finished");
    outcomes
}

/// Load one ledger and build its report, named after the file stem.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<Report> {
    let ledger = load_ledger_csv(path).with_context(|| format!("failed to load {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ledger".into());
    Ok(Report::from_ledger(name, &ledger, config))
}
