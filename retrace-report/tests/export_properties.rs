//! Property tests for report persistence.
//!
//! Uses proptest to verify, over random ledgers and policies:
//! 1. JSON: import after export keeps provenance, config, and every run
//! 2. CSV: one series line per point, one runs line per detected run

use proptest::prelude::*;
use retrace_core::domain::points_from_balances;
use retrace_core::{AnalysisConfig, BalancePoint, FlatPolicy, Run, RunPolicy};
use retrace_report::{export_json, export_runs_csv, export_series_csv, import_json, Report};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_points() -> impl Strategy<Value = Vec<BalancePoint>> {
    (
        prop::collection::vec(prop::option::weighted(0.9, 1.0..5_000.0_f64), 0..60),
        prop::collection::vec(prop::bool::weighted(0.1), 60),
    )
        .prop_map(|(balances, flags)| {
            let mut points = points_from_balances(&balances);
            for (p, flag) in points.iter_mut().zip(flags) {
                p.is_cash_flow = flag;
            }
            points
        })
}

fn arb_config() -> impl Strategy<Value = AnalysisConfig> {
    (1usize..10, any::<bool>()).prop_map(|(top_n, pause)| AnalysisConfig {
        top_n,
        run_policy: RunPolicy {
            flat: if pause { FlatPolicy::Pause } else { FlatPolicy::Close },
        },
        ..AnalysisConfig::default()
    })
}

fn same_runs(a: &[Run], b: &[Run]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.kind == y.kind
                && x.start_index == y.start_index
                && x.end_index == y.end_index
                && x.recovery_index == y.recovery_index
                && x.operation_count == y.operation_count
                && x.duration == y.duration
                && (x.extremum_value - y.extremum_value).abs() <= 1e-9 * x.extremum_value.abs().max(1.0)
        })
}

// ── 1. JSON ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn json_import_restores_report(points in arb_points(), config in arb_config()) {
        let original = Report::build("journal", &points, &config);
        let restored = import_json(&export_json(&original).unwrap()).unwrap();

        prop_assert_eq!(&restored.name, &original.name);
        prop_assert_eq!(&restored.dataset_hash, &original.dataset_hash);
        prop_assert_eq!(restored.row_count, original.row_count);
        prop_assert_eq!(&restored.config, &original.config);
        prop_assert_eq!(restored.analysis.points.len(), original.analysis.points.len());
        prop_assert!(same_runs(&restored.analysis.drawdowns, &original.analysis.drawdowns));
        prop_assert!(same_runs(&restored.analysis.runups, &original.analysis.runups));
        prop_assert!(same_runs(&restored.analysis.top_drawdowns, &original.analysis.top_drawdowns));
    }
}

// ── 2. CSV ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn csv_exports_have_one_line_per_item(points in arb_points(), config in arb_config()) {
        let report = Report::build("journal", &points, &config);

        let series = export_series_csv(&report).unwrap();
        prop_assert_eq!(series.lines().count(), report.analysis.points.len() + 1);

        let runs = export_runs_csv(&report).unwrap();
        let expected = report.analysis.drawdowns.len() + report.analysis.runups.len() + 1;
        prop_assert_eq!(runs.lines().count(), expected);
    }
}
