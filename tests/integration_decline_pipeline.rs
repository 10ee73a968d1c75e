//! Integration tests for the decline fitting and forecasting pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from raw `(timestamp, rate)` columns,
//!   through window selection and regression, to calendar forecasts and
//!   percentile curves.
//! - Exercise realistic production histories (monthly and daily sampling,
//!   multiple regimes, noisy data) rather than unit-level edge cases only.
//!
//! Coverage
//! --------
//! - `decline::fit`: parameter recovery for every regime, windowed
//!   calibration, refinement, and parallel batch fitting.
//! - `decline::forecast`: date lists, frequency grids, economic-limit
//!   masking, and batch concatenation.
//! - `decline::uncertainty`: P90 ≤ P50 ≤ P10 ordering on fitted data.
//! - `schedule`: boundary-policy nesting of window masks.
//!
//! Exclusions
//! ----------
//! - Optimizer internals and numerical-stability helpers, which are
//!   covered by unit tests.
//! - Python bindings.
use approx::assert_relative_eq;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decline::{
    decline::{
        DateSpec, DeclineError, DeclineModel, EntitySeries, FitOptions, ForecastOptions,
        ModeOrExponent, Regime, RefineOptions, fit, fit_batch, run, run_batch,
    },
    schedule::{Frequency, Inclusive, TimeIndex, TimeWindow},
};

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|x| x.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

/// Monthly samples of `truth` from 2019-01-01 through 2021-12-01.
fn monthly_history(truth: &DeclineModel) -> (Vec<NaiveDateTime>, Vec<f64>) {
    let stamps = TimeIndex::build(&[(at(2019, 1, 1), at(2021, 12, 31))], Frequency::MonthStart(1))
        .expect("valid monthly grid");
    let rates = stamps.iter().map(|&s| truth.rate_on(s)).collect();
    (stamps, rates)
}

#[test]
// Purpose
// -------
// Recover the generating parameters for exponents across the admissible range.
//
// Given
// -----
// - Noiseless monthly histories with `q_i = 1500`, `D_i = 0.004`,
//   `b ∈ {0, 0.3, 0.7, 1}`, referenced at the first sample.
//
// Expect
// ------
// - `(q_i, D_i)` within 1e-8 relative; R² ≈ 1; regime normalized.
fn round_trip_recovers_parameters_for_all_exponents() {
    for b in [0.0, 0.3, 0.7, 1.0] {
        // Arrange
        let regime = Regime::from_exponent(b).expect("valid exponent");
        let truth = DeclineModel::new(regime, 1500.0, 0.004, at(2019, 1, 1)).expect("valid model");
        let (stamps, rates) = monthly_history(&truth);

        // Act
        let res = fit(&stamps, &rates, &[], b, &FitOptions::default()).expect("clean decline");

        // Assert
        assert_relative_eq!(res.model.initial_rate(), 1500.0, max_relative = 1e-8);
        assert_relative_eq!(res.model.initial_decline(), 0.004, max_relative = 1e-8);
        assert_relative_eq!(res.r_squared, 1.0, epsilon = 1e-10);
        assert_eq!(res.regime(), regime);
    }
}

#[test]
// Purpose
// -------
// Reproduce the canonical exponential example.
//
// Given
// -----
// - Six daily samples `100 e^(−0.05 t)`, `t = 0..5`.
//
// Expect
// ------
// - `q_i ≈ 100`, `D_i ≈ 0.05` within 1e-6; R² ≈ 1.
fn exponential_reference_example() {
    // Arrange
    let stamps: Vec<_> = (0..6).map(|k| at(2024, 5, 1) + TimeDelta::days(k)).collect();
    let rates: Vec<f64> = (0..6).map(|k| 100.0 * (-0.05 * k as f64).exp()).collect();

    // Act
    let mode: ModeOrExponent = "exponential".parse().expect("known mode");
    let res = fit(&stamps, &rates, &[], mode, &FitOptions::default()).expect("clean decline");

    // Assert
    assert!((res.model.initial_rate() - 100.0).abs() < 1e-6);
    assert!((res.model.initial_decline() - 0.05).abs() < 1e-6);
    assert_relative_eq!(res.r_squared, 1.0, epsilon = 1e-12);
}

#[test]
// Purpose
// -------
// Ensure fewer than two usable samples is reported, not fitted.
//
// Given
// -----
// - One positive rate plus a zero and a NaN.
//
// Expect
// ------
// - `InsufficientData { found: 1, required: 2 }`.
fn too_few_samples_is_insufficient_data() {
    // Arrange
    let stamps = vec![at(2024, 1, 1), at(2024, 2, 1), at(2024, 3, 1)];

    // Act
    let err = fit(&stamps, &[50.0, 0.0, f64::NAN], &[], Regime::Harmonic, &FitOptions::default())
        .expect_err("one usable sample");

    // Assert
    assert_eq!(err, DeclineError::InsufficientData { found: 1, required: 2 });
}

#[test]
// Purpose
// -------
// Check boundary policies nest and windows restrict calibration.
//
// Given
// -----
// - Daily index over January 2024; window Jan 10 – Jan 20 under each policy.
//
// Expect
// ------
// - Neither ⊆ Left, Right ⊆ Both with sizes 9, 10, 10, 11; a windowed fit
//   uses the Both count and references Jan 10.
fn window_policies_nest_and_restrict_calibration() {
    // Arrange
    let stamps: Vec<_> = (0..31).map(|k| at(2024, 1, 1) + TimeDelta::days(k)).collect();
    let index = TimeIndex::new(stamps.clone());
    let (lo, hi) = (
        NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date"),
        NaiveDate::from_ymd_opt(2024, 1, 20).expect("valid date"),
    );
    let mask = |p: Inclusive| index.window_mask(&TimeWindow::new(lo, hi, p).expect("ordered"));

    // Act
    let (both, left, right, neither) = (
        mask(Inclusive::Both),
        mask(Inclusive::Left),
        mask(Inclusive::Right),
        mask(Inclusive::Neither),
    );

    // Assert
    let count = |m: &[bool]| m.iter().filter(|&&x| x).count();
    assert_eq!((count(&neither), count(&left), count(&right), count(&both)), (9, 10, 10, 11));
    for i in 0..31 {
        assert!(!neither[i] || (left[i] && right[i]));
        assert!(!left[i] || both[i]);
        assert!(!right[i] || both[i]);
    }

    let rates: Vec<f64> = (0..31).map(|k| 400.0 * (-0.03 * k as f64).exp()).collect();
    let window = TimeWindow::new(lo, hi, Inclusive::Both).expect("ordered");
    let res = fit(&stamps, &rates, &[window], Regime::Exponential, &FitOptions::default())
        .expect("clean decline");
    assert_eq!(res.n, 11);
    assert_eq!(res.model.reference(), at(2024, 1, 10));
    assert_relative_eq!(res.model.initial_rate(), 400.0 * (-0.27f64).exp(), max_relative = 1e-10);
}

#[test]
// Purpose
// -------
// Verify percentile curves bracket the fit on noisy data.
//
// Given
// -----
// - Hyperbolic `b = 0.5` monthly history with ±5% deterministic scatter.
//
// Expect
// ------
// - `rate_P90(t) ≤ rate_P50(t) ≤ rate_P10(t)` at every forecast month;
//   P50 equals the fitted model.
fn percentile_curves_are_ordered() {
    // Arrange
    let truth = DeclineModel::new(Regime::Hyperbolic { b: 0.5 }, 800.0, 0.006, at(2019, 1, 1))
        .expect("valid model");
    let (stamps, clean) = monthly_history(&truth);
    let rates: Vec<f64> = clean
        .iter()
        .enumerate()
        .map(|(i, q)| q * [1.05, 0.97, 1.0, 0.95, 1.03][i % 5])
        .collect();
    let res = fit(&stamps, &rates, &[], 0.5, &FitOptions::default()).expect("noisy decline");

    // Act
    let p10 = res.percentile(10.0).expect("valid shift");
    let p50 = res.percentile(50.0).expect("valid shift");
    let p90 = res.percentile(90.0).expect("valid shift");

    // Assert
    assert_eq!(p50, res.model);
    let grid = DateSpec::range(at(2019, 1, 1), at(2030, 1, 1), Frequency::MonthStart(1));
    let opts = ForecastOptions::new(false, None).expect("valid options");
    let curve = |m: &DeclineModel| run(m, &grid, &opts).expect("finite forecast");
    let (c10, c50, c90) = (curve(&p10), curve(&p50), curve(&p90));
    for i in 0..c50.len() {
        assert!(c90.rate()[i] <= c50.rate()[i]);
        assert!(c50.rate()[i] <= c10.rate()[i]);
    }
}

#[test]
// Purpose
// -------
// Exercise refinement end to end and its effect on fit quality.
//
// Given
// -----
// - Harmonic monthly history with ±4% scatter; fits with and without refinement.
//
// Expect
// ------
// - Refined fit converges and its R² is at least the linear fit's.
fn refinement_does_not_worsen_fit() {
    // Arrange
    let truth =
        DeclineModel::new(Regime::Harmonic, 250.0, 0.01, at(2019, 1, 1)).expect("valid model");
    let (stamps, clean) = monthly_history(&truth);
    let rates: Vec<f64> =
        clean.iter().enumerate().map(|(i, q)| q * if i % 2 == 0 { 1.04 } else { 0.96 }).collect();

    // Act
    let linear = fit(&stamps, &rates, &[], 1.0, &FitOptions::default()).expect("linear fit");
    let refine_opts = FitOptions::new(None, Some(RefineOptions::default()));
    let refined = fit(&stamps, &rates, &[], 1.0, &refine_opts).expect("refined fit");

    // Assert
    assert!(refined.refined.is_some());
    assert!(refined.r_squared >= linear.r_squared - 1e-12);
    assert_eq!(refined.linear, linear.linear);
}

#[test]
// Purpose
// -------
// Verify batch fitting and forecasting keep entity order and apply the economic limit.
//
// Given
// -----
// - Three exponential wells with declines 0.001, 0.02, 0.002 per day;
//   a two-year monthly forecast with economic limit 20.
//
// Expect
// ------
// - Fit results in input order; forecast rows grouped in the same order;
//   the fast-declining well is masked from its first sub-limit month onward.
fn batch_pipeline_preserves_order_and_masks_tail() {
    // Arrange
    let wells = [("north", 0.001), ("east", 0.02), ("south", 0.002)];
    let entities: Vec<EntitySeries> = wells
        .iter()
        .map(|&(name, d)| {
            let truth = DeclineModel::new(Regime::Exponential, 300.0, d, at(2019, 1, 1))
                .expect("valid model");
            let (stamps, rates) = monthly_history(&truth);
            EntitySeries::new(name, stamps, rates)
        })
        .collect();

    // Act
    let fits = fit_batch(&entities, &[], Regime::Exponential.into(), &FitOptions::default());
    let models: Vec<(String, DeclineModel)> = fits
        .into_iter()
        .map(|(name, res)| (name, res.expect("clean decline").model))
        .collect();
    let spec = DateSpec::range(at(2022, 1, 1), at(2023, 12, 31), Frequency::MonthStart(1));
    let opts = ForecastOptions::new(true, Some(20.0)).expect("valid options");
    let batch = run_batch(&models, &spec, &opts).expect("finite forecasts");

    // Assert
    let names: Vec<&str> = models.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["north", "east", "south"]);
    assert_eq!(batch.len(), 3 * 24);
    assert!(batch.rows[..24].iter().all(|r| r.entity == "north"));
    assert!(batch.rows[24..48].iter().all(|r| r.entity == "east"));

    // East is at 300·e^(−0.02·1096) ≪ 20 by 2022: fully masked.
    assert!(batch.entity("east").all(|r| r.rate.is_nan() && r.cumulative.is_some_and(f64::is_nan)));
    // North stays above the limit throughout.
    assert!(batch.entity("north").all(|r| r.rate.is_finite() && r.rate >= 20.0));
    // South reaches the limit around day 1354 (September 2022).
    let south: Vec<f64> = batch.entity("south").map(|r| r.rate).collect();
    let first_nan = south.iter().position(|q| q.is_nan()).expect("south crosses the limit");
    assert!(first_nan > 0);
    assert!(south[..first_nan].iter().all(|&q| q >= 20.0));
    assert!(south[first_nan..].iter().all(|q| q.is_nan()));
}
