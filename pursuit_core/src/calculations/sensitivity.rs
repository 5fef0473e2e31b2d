//! # Sensitivity Analysis
//!
//! Re-runs the downstream pipeline with one input perturbed at a time, and
//! builds a rent x hard cost matrix of yield on cost.
//!
//! Steps are deltas, never absolute values:
//!
//! | Sweep | Step unit | Applied to |
//! |-------|-----------|------------|
//! | rent | $/sf/month | weighted average rent, as a proportional scale of gross potential rent |
//! | hard cost | $/nrsf | `hard_cost_per_nrsf` |
//! | land cost | $ | `land_cost` |
//!
//! The rent sweep scales the whole rent roll by
//! `(base_rent + step) / base_rent` instead of re-pricing each unit type. A
//! zero base rent leaves the scale at 1. Every point stays finite, including
//! near-zero rents and efficiency ratios.
//!
//! The base one-pager is never touched; each point threads its adjusted
//! value through the same stage functions [`super::calculate_all`] uses, so a
//! zero step reproduces the baseline exactly.
//!
//! ## Example
//!
//! ```rust
//! use pursuit_core::calculations::{calculate_all, hard_cost_sensitivity, CalculationInputs};
//! use pursuit_core::one_pager::{OnePager, UnitMixRow};
//!
//! let mut one_pager = OnePager::new("Base Case");
//! one_pager.unit_mix.push(UnitMixRow::per_sf("1BR", 100, 750.0, 2.40));
//! let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
//!
//! let rows = hard_cost_sensitivity(&inputs, &[-10.0, 0.0, 10.0]);
//! assert_eq!(rows[1].noi, calculate_all(&inputs).noi);
//! assert!(rows[2].yield_on_cost < rows[0].yield_on_cost);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::pipeline::{run_cost_side, run_revenue, CalculationInputs, CostSide};
use super::revenue::RevenueResult;
use super::safe_div;
use super::unit_mix::aggregate_unit_mix;
use crate::one_pager::SensitivitySteps;
use crate::settings::BaseCasePolicy;

/// One point of a one-dimensional sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRow {
    /// The delta applied
    pub step: f64,

    /// The perturbed input's absolute value (base + step)
    pub adjusted_value: f64,

    pub total_budget: f64,
    pub gross_potential_rent: f64,
    pub noi: f64,
    pub yield_on_cost: f64,
}

impl SensitivityRow {
    fn new(step: f64, adjusted_value: f64, revenue: &RevenueResult, cost: &CostSide) -> Self {
        SensitivityRow {
            step,
            adjusted_value,
            total_budget: cost.budget.total_budget,
            gross_potential_rent: revenue.gross_potential_rent,
            noi: cost.returns.noi,
            yield_on_cost: cost.returns.yield_on_cost,
        }
    }
}

/// Yield on cost over every (rent step, hard cost step) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityMatrix {
    pub rent_steps: Vec<f64>,
    pub hard_cost_steps: Vec<f64>,

    /// `values[i][j]` is the yield on cost at `rent_steps[i]` and
    /// `hard_cost_steps[j]`
    pub values: Vec<Vec<f64>>,

    /// Row of the base case, if one was found
    pub base_rent_index: Option<usize>,

    /// Column of the base case, if one was found
    pub base_hard_cost_index: Option<usize>,
}

impl SensitivityMatrix {
    /// The base case cell, when both axes have one.
    pub fn base_cell(&self) -> Option<(usize, usize)> {
        Some((self.base_rent_index?, self.base_hard_cost_index?))
    }

    pub fn get(&self, rent_index: usize, hard_cost_index: usize) -> Option<f64> {
        self.values.get(rent_index)?.get(hard_cost_index).copied()
    }
}

/// All three sweeps and the matrix, computed together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    pub rent: Vec<SensitivityRow>,
    pub hard_cost: Vec<SensitivityRow>,
    pub land_cost: Vec<SensitivityRow>,
    pub matrix: SensitivityMatrix,
}

/// Locate the base case in a step array.
///
/// Returns the index of the first exact `0` entry. Under
/// [`BaseCasePolicy::MidpointFallback`] an array without one falls back to
/// `len / 2`; under [`BaseCasePolicy::Strict`] it has no base case. An empty
/// array never has one.
pub fn find_base_index(steps: &[f64], policy: BaseCasePolicy) -> Option<usize> {
    if let Some(index) = steps.iter().position(|s| *s == 0.0) {
        return Some(index);
    }
    match policy {
        BaseCasePolicy::MidpointFallback if !steps.is_empty() => Some(steps.len() / 2),
        _ => None,
    }
}

/// Gross potential rent scaled by `(base_rent + step) / base_rent`.
///
/// A zero step or a zero base rent returns `gross_potential_rent` untouched.
/// Dividing first keeps a subnormal base rent from overflowing; a result that
/// still is not finite collapses to `0.0` like any other guarded ratio.
fn scaled_gross_potential_rent(gross_potential_rent: f64, base_rent_psf: f64, step: f64) -> f64 {
    if step == 0.0 || base_rent_psf == 0.0 {
        return gross_potential_rent;
    }
    let scaled = safe_div(gross_potential_rent, base_rent_psf) * (base_rent_psf + step);
    if scaled.is_finite() {
        scaled
    } else {
        0.0
    }
}

/// Sweep rent per square foot.
pub fn rent_sensitivity(inputs: &CalculationInputs<'_>, steps: &[f64]) -> Vec<SensitivityRow> {
    let a = inputs.assumptions;
    let unit_mix = aggregate_unit_mix(inputs.unit_mix, a.efficiency_ratio);
    let base_rent = unit_mix.weighted_avg_rent_psf;

    debug!(one_pager = %a.name, base_rent, steps = steps.len(), "rent sensitivity");
    steps
        .iter()
        .map(|&step| {
            let gpr = scaled_gross_potential_rent(unit_mix.gross_potential_rent, base_rent, step);
            let revenue = run_revenue(inputs, &unit_mix, gpr);
            let cost =
                run_cost_side(inputs, &unit_mix, &revenue, a.hard_cost_per_nrsf, a.land_cost);
            trace!(step, noi = cost.returns.noi, "rent point");
            SensitivityRow::new(step, base_rent + step, &revenue, &cost)
        })
        .collect()
}

/// Sweep hard cost per net rentable square foot.
pub fn hard_cost_sensitivity(
    inputs: &CalculationInputs<'_>,
    steps: &[f64],
) -> Vec<SensitivityRow> {
    let a = inputs.assumptions;
    let unit_mix = aggregate_unit_mix(inputs.unit_mix, a.efficiency_ratio);
    let revenue = run_revenue(inputs, &unit_mix, unit_mix.gross_potential_rent);

    debug!(
        one_pager = %a.name,
        base = a.hard_cost_per_nrsf,
        steps = steps.len(),
        "hard cost sensitivity"
    );
    steps
        .iter()
        .map(|&step| {
            let hard_cost_per_nrsf = a.hard_cost_per_nrsf + step;
            let cost = run_cost_side(inputs, &unit_mix, &revenue, hard_cost_per_nrsf, a.land_cost);
            trace!(step, noi = cost.returns.noi, "hard cost point");
            SensitivityRow::new(step, hard_cost_per_nrsf, &revenue, &cost)
        })
        .collect()
}

/// Sweep land cost.
pub fn land_cost_sensitivity(
    inputs: &CalculationInputs<'_>,
    steps: &[f64],
) -> Vec<SensitivityRow> {
    let a = inputs.assumptions;
    let unit_mix = aggregate_unit_mix(inputs.unit_mix, a.efficiency_ratio);
    let revenue = run_revenue(inputs, &unit_mix, unit_mix.gross_potential_rent);

    debug!(one_pager = %a.name, base = a.land_cost, steps = steps.len(), "land cost sensitivity");
    steps
        .iter()
        .map(|&step| {
            let land_cost = a.land_cost + step;
            let cost =
                run_cost_side(inputs, &unit_mix, &revenue, a.hard_cost_per_nrsf, land_cost);
            trace!(step, noi = cost.returns.noi, "land cost point");
            SensitivityRow::new(step, land_cost, &revenue, &cost)
        })
        .collect()
}

/// Yield on cost for every rent step crossed with every hard cost step.
pub fn sensitivity_matrix(
    inputs: &CalculationInputs<'_>,
    rent_steps: &[f64],
    hard_cost_steps: &[f64],
    policy: BaseCasePolicy,
) -> SensitivityMatrix {
    let a = inputs.assumptions;
    let unit_mix = aggregate_unit_mix(inputs.unit_mix, a.efficiency_ratio);
    let base_rent = unit_mix.weighted_avg_rent_psf;

    debug!(
        one_pager = %a.name,
        rows = rent_steps.len(),
        columns = hard_cost_steps.len(),
        "sensitivity matrix"
    );
    let values = rent_steps
        .iter()
        .map(|&rent_step| {
            let gpr =
                scaled_gross_potential_rent(unit_mix.gross_potential_rent, base_rent, rent_step);
            let revenue = run_revenue(inputs, &unit_mix, gpr);
            hard_cost_steps
                .iter()
                .map(|&hard_step| {
                    run_cost_side(
                        inputs,
                        &unit_mix,
                        &revenue,
                        a.hard_cost_per_nrsf + hard_step,
                        a.land_cost,
                    )
                    .returns
                    .yield_on_cost
                })
                .collect()
        })
        .collect();

    SensitivityMatrix {
        rent_steps: rent_steps.to_vec(),
        hard_cost_steps: hard_cost_steps.to_vec(),
        values,
        base_rent_index: find_base_index(rent_steps, policy),
        base_hard_cost_index: find_base_index(hard_cost_steps, policy),
    }
}

/// Run every sweep and the matrix with one set of step arrays.
pub fn run_sensitivity(
    inputs: &CalculationInputs<'_>,
    steps: &SensitivitySteps,
    policy: BaseCasePolicy,
) -> SensitivityAnalysis {
    SensitivityAnalysis {
        rent: rent_sensitivity(inputs, &steps.rent),
        hard_cost: hard_cost_sensitivity(inputs, &steps.hard_cost),
        land_cost: land_cost_sensitivity(inputs, &steps.land_cost),
        matrix: sensitivity_matrix(inputs, &steps.rent, &steps.hard_cost, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::pipeline::calculate_all;
    use crate::calculations::pipeline::tests::sample_one_pager;
    use crate::one_pager::{OnePager, UnitMixRow};
    use proptest::collection::vec as prop_vec;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};
    use proptest::sample::select;

    const RENT_STEPS: [f64; 7] = [-0.30, -0.20, -0.10, 0.0, 0.10, 0.20, 0.30];
    const HARD_STEPS: [f64; 5] = [-20.0, -10.0, 0.0, 10.0, 20.0];
    const LAND_STEPS: [f64; 3] = [-500_000.0, 0.0, 500_000.0];

    fn assert_finite_row(row: &SensitivityRow) {
        for (name, value) in [
            ("step", row.step),
            ("adjusted_value", row.adjusted_value),
            ("total_budget", row.total_budget),
            ("gross_potential_rent", row.gross_potential_rent),
            ("noi", row.noi),
            ("yield_on_cost", row.yield_on_cost),
        ] {
            assert!(value.is_finite(), "{name} was {value} at step {}", row.step);
        }
    }

    #[test]
    fn test_zero_step_reproduces_baseline() {
        let one_pager = sample_one_pager();
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let base = calculate_all(&inputs);

        for rows in [
            rent_sensitivity(&inputs, &RENT_STEPS),
            hard_cost_sensitivity(&inputs, &HARD_STEPS),
            land_cost_sensitivity(&inputs, &LAND_STEPS),
        ] {
            let zero = rows.iter().find(|r| r.step == 0.0).unwrap();
            assert_eq!(zero.noi, base.noi);
            assert_eq!(zero.total_budget, base.total_budget);
            assert_eq!(zero.yield_on_cost, base.yield_on_cost);
            assert_eq!(zero.gross_potential_rent, base.gross_potential_rent);
        }

        let matrix = sensitivity_matrix(&inputs, &RENT_STEPS, &HARD_STEPS, BaseCasePolicy::Strict);
        let (i, j) = matrix.base_cell().unwrap();
        assert_eq!((i, j), (3, 2));
        assert_eq!(matrix.values[i][j], base.yield_on_cost);
    }

    #[test]
    fn test_rent_sweep_scales_gross_potential_rent() {
        let one_pager = sample_one_pager();
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let base = calculate_all(&inputs);
        let rows = rent_sensitivity(&inputs, &[0.10]);

        let scale = (base.weighted_avg_rent_psf + 0.10) / base.weighted_avg_rent_psf;
        assert!((rows[0].gross_potential_rent - base.gross_potential_rent * scale).abs() < 1e-6);
        assert!((rows[0].adjusted_value - (base.weighted_avg_rent_psf + 0.10)).abs() < 1e-12);
        assert_eq!(rows[0].total_budget, base.total_budget);
        assert!(rows[0].noi > base.noi);
    }

    #[test]
    fn test_rent_sweep_with_zero_base_rent_is_noop() {
        let mut one_pager = sample_one_pager();
        one_pager.unit_mix.clear();
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let base = calculate_all(&inputs);

        for row in rent_sensitivity(&inputs, &RENT_STEPS) {
            assert_eq!(row.gross_potential_rent, 0.0);
            assert_eq!(row.noi, base.noi);
            assert_eq!(row.adjusted_value, row.step);
        }
    }

    #[test]
    fn test_rent_sweep_with_subnormal_base_rent_stays_finite() {
        let mut one_pager = sample_one_pager();
        one_pager.unit_mix = vec![UnitMixRow::per_sf("1BR", 10, 800.0, 1e-320)];
        assert!(one_pager.validate().is_ok());
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let base = calculate_all(&inputs);

        let rows = rent_sensitivity(&inputs, &[0.0, 0.10, -0.10]);
        assert_eq!(rows[0].gross_potential_rent, base.gross_potential_rent);
        assert_eq!(rows[0].noi, base.noi);
        for row in &rows {
            assert_finite_row(row);
        }

        let matrix =
            sensitivity_matrix(&inputs, &[0.0, 0.10], &[0.0, 10.0], BaseCasePolicy::Strict);
        assert!(matrix.values.iter().flatten().all(|v| v.is_finite()));
        assert_eq!(matrix.values[0][0], base.yield_on_cost);
    }

    #[test]
    fn test_hard_cost_sweep_moves_budget_not_revenue() {
        let one_pager = sample_one_pager();
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let rows = hard_cost_sensitivity(&inputs, &HARD_STEPS);

        assert_eq!(rows[0].adjusted_value, 230.0);
        assert_eq!(rows[4].adjusted_value, 270.0);
        for pair in rows.windows(2) {
            assert!(pair[1].total_budget > pair[0].total_budget);
            assert_eq!(pair[1].gross_potential_rent, pair[0].gross_potential_rent);
            // Higher hard cost raises assessed value and so property tax
            assert!(pair[1].noi < pair[0].noi);
            assert!(pair[1].yield_on_cost < pair[0].yield_on_cost);
        }
    }

    #[test]
    fn test_land_cost_sweep_adds_absolute_dollars() {
        let one_pager = sample_one_pager();
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let base = calculate_all(&inputs);
        let rows = land_cost_sensitivity(&inputs, &LAND_STEPS);

        assert_eq!(rows[0].adjusted_value, 2_500_000.0);
        assert_eq!(rows[2].adjusted_value, 3_500_000.0);
        assert!((rows[2].total_budget - (base.total_budget + 500_000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_sweeps_leave_one_pager_untouched() {
        let one_pager = sample_one_pager();
        let before = one_pager.clone();
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let _ = run_sensitivity(&inputs, &one_pager.sensitivity, BaseCasePolicy::Strict);
        assert_eq!(one_pager, before);
    }

    #[test]
    fn test_matrix_corner_combines_both_perturbations() {
        let one_pager = sample_one_pager();
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let matrix = sensitivity_matrix(&inputs, &RENT_STEPS, &HARD_STEPS, BaseCasePolicy::Strict);

        // Best case: highest rent, lowest hard cost
        let best = matrix.get(6, 0).unwrap();
        let worst = matrix.get(0, 4).unwrap();
        let base = matrix.get(3, 2).unwrap();
        assert!(best > base && base > worst);
        assert!(matrix.get(7, 0).is_none());
    }

    #[test]
    fn test_find_base_index() {
        assert_eq!(find_base_index(&[-1.0, 0.0, 1.0], BaseCasePolicy::Strict), Some(1));
        assert_eq!(find_base_index(&[-2.0, -1.0, 1.0, 2.0], BaseCasePolicy::Strict), None);
        assert_eq!(
            find_base_index(&[-2.0, -1.0, 1.0, 2.0], BaseCasePolicy::MidpointFallback),
            Some(2)
        );
        assert_eq!(find_base_index(&[], BaseCasePolicy::MidpointFallback), None);
        assert_eq!(find_base_index(&[-0.0, 1.0], BaseCasePolicy::Strict), Some(0));
    }

    #[test]
    fn test_matrix_without_zero_has_no_base_cell_under_strict() {
        let one_pager = OnePager::new("Empty");
        let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
        let matrix = sensitivity_matrix(
            &inputs,
            &[-0.1, 0.1],
            &[-10.0, 0.0, 10.0],
            BaseCasePolicy::Strict,
        );
        assert_eq!(matrix.base_rent_index, None);
        assert_eq!(matrix.base_hard_cost_index, Some(1));
        assert_eq!(matrix.base_cell(), None);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_matrix_shape_matches_steps(rent_len in 0usize..10, hard_len in 0usize..10) {
            let one_pager = sample_one_pager();
            let inputs = CalculationInputs::from_one_pager(&one_pager, 0.0);
            let rent: Vec<f64> = (0..rent_len).map(|i| i as f64 * 0.05 - 0.2).collect();
            let hard: Vec<f64> = (0..hard_len).map(|i| i as f64 * 5.0 - 20.0).collect();

            let matrix = sensitivity_matrix(&inputs, &rent, &hard, BaseCasePolicy::Strict);
            prop_assert_eq!(matrix.values.len(), rent_len);
            for row in &matrix.values {
                prop_assert_eq!(row.len(), hard_len);
            }
        }

        #[test]
        fn prop_sweeps_and_matrix_are_always_finite(
            efficiency in select(vec![0.0, 5e-324, 1e-310, 1e-300, 1e-9, 0.5, 0.85, 2.0]),
            rent_per_sf in select(vec![0.0, 5e-324, 1e-320, 1e-300, 1e-9, 0.01, 2.35, 40.0]),
            area in select(vec![0.0, 1e-310, 1e-300, 0.5, 750.0, 3_000.0]),
            whole_rent in select(vec![0.0, 1e-320, 1.0, 2_400.0]),
            units in 0u32..500,
            vacancy in 0.0f64..=1.0,
            site_area in select(vec![0.0, 1e-310, 87_120.0]),
            rent_steps in prop_vec(-1_000.0f64..1_000.0, 0..8),
            hard_steps in prop_vec(-1_000.0f64..1_000.0, 0..8),
            land_steps in prop_vec(-5.0e7f64..5.0e7, 0..6),
        ) {
            let mut one_pager = sample_one_pager();
            one_pager.efficiency_ratio = efficiency;
            one_pager.vacancy_rate = vacancy;
            one_pager.unit_mix = vec![
                UnitMixRow::per_sf("A", units, area, rent_per_sf),
                UnitMixRow::whole_dollar("B", units / 2, area, whole_rent),
            ];
            prop_assert!(one_pager.validate().is_ok());

            let inputs = CalculationInputs::from_one_pager(&one_pager, site_area);
            let steps = SensitivitySteps {
                rent: rent_steps,
                hard_cost: hard_steps,
                land_cost: land_steps,
            };
            let analysis = run_sensitivity(&inputs, &steps, BaseCasePolicy::MidpointFallback);

            let rows = analysis.rent.iter().chain(&analysis.hard_cost).chain(&analysis.land_cost);
            for row in rows {
                for value in [
                    row.adjusted_value,
                    row.total_budget,
                    row.gross_potential_rent,
                    row.noi,
                    row.yield_on_cost,
                ] {
                    prop_assert!(value.is_finite(), "{:?}", row);
                }
            }
            for cell in analysis.matrix.values.iter().flatten() {
                prop_assert!(cell.is_finite(), "matrix cell {}", cell);
            }
        }
    }
}
