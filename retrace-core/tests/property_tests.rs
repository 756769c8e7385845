//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Shape: one output per input, `None` exactly where the balance is missing
//! 2. Sign: drawdown values are <= 0, run-up values >= 0, all finite
//! 3. Monotone inputs: constant, increasing, and decreasing balances
//! 4. Coverage: runs are disjoint, ascending, and cover exactly the non-flat rows
//! 5. Idempotence: same input, bit-identical output
//! 6. Operation counts: never exceed the rows spanned
//! 7. Pause policy: runs start and end on active rows

use proptest::prelude::*;
use retrace_core::domain::points_from_balances;
use retrace_core::{
    compute_retracement_series, compute_runup_series, detect_runs, detect_runs_with, BalancePoint,
    FlatPolicy, RunKind, RunPolicy,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_balances() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(prop::option::weighted(0.9, -1_000.0..5_000.0_f64), 0..80)
}

fn arb_points() -> impl Strategy<Value = Vec<BalancePoint>> {
    (arb_balances(), prop::collection::vec(any::<bool>(), 80)).prop_map(|(balances, flags)| {
        let mut points = points_from_balances(&balances);
        for (p, flag) in points.iter_mut().zip(flags) {
            p.is_cash_flow = flag;
        }
        points
    })
}

fn arb_increasing() -> impl Strategy<Value = Vec<f64>> {
    (1.0..1_000.0_f64, prop::collection::vec(0.01..100.0_f64, 1..60)).prop_map(|(start, steps)| {
        let mut out = vec![start];
        for s in steps {
            let next = out.last().copied().unwrap_or(start) + s;
            out.push(next);
        }
        out
    })
}

fn arb_decreasing() -> impl Strategy<Value = Vec<f64>> {
    (100.0..1_000.0_f64, prop::collection::vec(0.01..50.0_f64, 1..60)).prop_map(|(start, steps)| {
        let mut out = vec![start];
        for s in steps {
            let next = out.last().copied().unwrap_or(start) - s;
            out.push(next);
        }
        out
    })
}

fn defined(values: &[f64]) -> Vec<BalancePoint> {
    let raw: Vec<Option<f64>> = values.iter().map(|&v| Some(v)).collect();
    points_from_balances(&raw)
}

// ── 1–2. Shape and sign ──────────────────────────────────────────────

proptest! {
    #[test]
    fn one_output_per_input(points in arb_points()) {
        let dd = compute_retracement_series(&points);
        let ru = compute_runup_series(&points);
        prop_assert_eq!(dd.len(), points.len());
        prop_assert_eq!(ru.len(), points.len());
        for (i, p) in points.iter().enumerate() {
            prop_assert_eq!(dd[i].is_none(), p.cumulative_balance.is_none());
            prop_assert_eq!(ru[i].is_none(), p.cumulative_balance.is_none());
        }
    }

    #[test]
    fn signs_and_finiteness(points in arb_points()) {
        for v in compute_retracement_series(&points).into_iter().flatten() {
            prop_assert!(v.is_finite());
            prop_assert!(v <= 0.0);
        }
        for v in compute_runup_series(&points).into_iter().flatten() {
            prop_assert!(v.is_finite());
            prop_assert!(v >= 0.0);
        }
    }

    #[test]
    fn first_defined_row_is_flat(points in arb_points()) {
        let dd = compute_retracement_series(&points);
        if let Some(first) = dd.iter().flatten().next() {
            prop_assert_eq!(*first, 0.0);
        }
    }
}

// ── 3. Monotone inputs ───────────────────────────────────────────────

proptest! {
    #[test]
    fn constant_balances_never_open_a_run(value in -500.0..500.0_f64, n in 0usize..50) {
        let points = defined(&vec![value; n]);
        let dd = compute_retracement_series(&points);
        let ru = compute_runup_series(&points);
        prop_assert!(dd.iter().all(|v| *v == Some(0.0)));
        prop_assert!(ru.iter().all(|v| *v == Some(0.0)));
        prop_assert!(detect_runs(&dd, &points, RunKind::Drawdown).is_empty());
        prop_assert!(detect_runs(&ru, &points, RunKind::Runup).is_empty());
    }

    #[test]
    fn increasing_balances(values in arb_increasing()) {
        let points = defined(&values);
        let dd = compute_retracement_series(&points);
        prop_assert!(dd.iter().all(|v| *v == Some(0.0)));

        let ru = compute_runup_series(&points);
        let trough = values[0];
        for (i, v) in ru.iter().enumerate() {
            let expected = (values[i] - trough) / trough * 100.0;
            prop_assert!((v.unwrap() - expected).abs() < 1e-9);
        }

        let runs = detect_runs(&ru, &points, RunKind::Runup);
        prop_assert_eq!(runs.len(), 1);
        prop_assert_eq!(runs[0].start_index, 1);
        prop_assert_eq!(runs[0].end_index, values.len() - 1);
        prop_assert!(runs[0].is_open());
    }

    #[test]
    fn decreasing_balances(values in arb_decreasing()) {
        let points = defined(&values);
        let dd = compute_retracement_series(&points);
        let runs = detect_runs(&dd, &points, RunKind::Drawdown);

        prop_assert_eq!(runs.len(), 1);
        prop_assert_eq!(runs[0].start_index, 1);
        prop_assert_eq!(runs[0].end_index, values.len() - 1);
        prop_assert!(runs[0].is_open());
        prop_assert_eq!(Some(runs[0].extremum_value), dd[values.len() - 1]);
    }
}

// ── 4–6. Runs ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn runs_cover_exactly_the_non_flat_rows(points in arb_points()) {
        for kind in [RunKind::Drawdown, RunKind::Runup] {
            let series = match kind {
                RunKind::Drawdown => compute_retracement_series(&points),
                RunKind::Runup => compute_runup_series(&points),
            };
            let runs = detect_runs(&series, &points, kind);

            for pair in runs.windows(2) {
                prop_assert!(pair[0].end_index < pair[1].start_index);
            }

            let mut covered = vec![false; series.len()];
            for run in &runs {
                prop_assert!(run.start_index <= run.end_index);
                for slot in &mut covered[run.start_index..=run.end_index] {
                    *slot = true;
                }
            }
            for (i, v) in series.iter().enumerate() {
                let active = v.is_some_and(|x| kind.is_active(x));
                prop_assert_eq!(covered[i], active, "row {} kind {}", i, kind);
            }
        }
    }

    #[test]
    fn detection_is_idempotent(points in arb_points()) {
        let a = compute_retracement_series(&points);
        let b = compute_retracement_series(&points);
        let bits = |s: &[Option<f64>]| s.iter().map(|v| v.map(f64::to_bits)).collect::<Vec<_>>();
        prop_assert_eq!(bits(&a), bits(&b));
        prop_assert_eq!(
            detect_runs(&a, &points, RunKind::Drawdown),
            detect_runs(&b, &points, RunKind::Drawdown)
        );
    }

    #[test]
    fn operation_counts_match_flags(points in arb_points()) {
        let series = compute_retracement_series(&points);
        for run in detect_runs(&series, &points, RunKind::Drawdown) {
            let expected = points[run.start_index..=run.end_index]
                .iter()
                .filter(|p| !p.is_cash_flow)
                .count();
            prop_assert_eq!(run.operation_count, expected);
            prop_assert!(run.operation_count <= run.row_count());
            if let Some(recovery) = run.recovery_index {
                prop_assert_eq!(recovery, run.end_index + 1);
            }
        }
    }
}

// ── 7. Pause policy ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn paused_runs_end_on_active_rows(points in arb_points()) {
        let pause = RunPolicy { flat: FlatPolicy::Pause };
        for kind in [RunKind::Drawdown, RunKind::Runup] {
            let series = match kind {
                RunKind::Drawdown => compute_retracement_series(&points),
                RunKind::Runup => compute_runup_series(&points),
            };
            let active = |i: usize| series[i].is_some_and(|x| kind.is_active(x));

            for run in detect_runs_with(&series, &points, kind, &pause) {
                prop_assert!(active(run.start_index));
                prop_assert!(active(run.end_index), "row {} kind {}", run.end_index, kind);
                match run.recovery_index {
                    Some(recovery) => {
                        prop_assert!(recovery > run.end_index);
                        prop_assert!(!active(recovery));
                        prop_assert!((run.end_index + 1..=recovery).all(|i| !active(i)));
                    }
                    None => prop_assert_eq!(run.end_index, series.len() - 1),
                }
            }
        }
    }
}
