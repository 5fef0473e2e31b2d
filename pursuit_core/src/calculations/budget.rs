//! # Development Budget
//!
//! Hard, land, and soft cost, plus per-unit and per-area normalizations.
//!
//! Soft cost comes from exactly one of two modes, chosen by
//! `use_detailed_soft_costs`:
//!
//! - percent mode: `soft_cost_pct x hard_cost`
//! - detailed mode: sum of the itemized soft-cost rows
//!
//! The unused mode's stored values never contribute.

use serde::{Deserialize, Serialize};

use super::safe_div;
use crate::one_pager::SoftCostDetailRow;

/// Input parameters for the budget stage.
#[derive(Debug, Clone, Copy)]
pub struct BudgetInput<'a> {
    pub hard_cost_per_nrsf: f64,
    pub total_nrsf: f64,
    pub total_gbsf: f64,
    pub land_cost: f64,
    pub soft_cost_pct: f64,
    pub use_detailed_soft_costs: bool,
    pub soft_cost_details: &'a [SoftCostDetailRow],
    pub total_units: u32,

    /// Site area in square feet, from the owning pursuit
    pub site_area_sf: f64,
}

/// Budget stage results.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetResult {
    pub hard_cost: f64,
    pub land_cost: f64,
    pub soft_cost: f64,
    pub total_budget: f64,
    pub cost_per_unit: f64,
    pub cost_per_nrsf: f64,
    pub cost_per_gbsf: f64,
    pub land_cost_per_unit: f64,

    /// Land cost per square foot of site area
    pub land_cost_per_site_sf: f64,
}

pub fn calculate_budget(input: &BudgetInput<'_>) -> BudgetResult {
    let hard_cost = input.hard_cost_per_nrsf * input.total_nrsf;

    let soft_cost = if input.use_detailed_soft_costs {
        input.soft_cost_details.iter().map(|row| row.amount).sum()
    } else {
        input.soft_cost_pct * hard_cost
    };

    let total_budget = hard_cost + input.land_cost + soft_cost;
    let units = f64::from(input.total_units);

    BudgetResult {
        hard_cost,
        land_cost: input.land_cost,
        soft_cost,
        total_budget,
        cost_per_unit: safe_div(total_budget, units),
        cost_per_nrsf: safe_div(total_budget, input.total_nrsf),
        cost_per_gbsf: safe_div(total_budget, input.total_gbsf),
        land_cost_per_unit: safe_div(input.land_cost, units),
        land_cost_per_site_sf: safe_div(input.land_cost, input.site_area_sf),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> Vec<SoftCostDetailRow> {
        vec![
            SoftCostDetailRow::new("Architecture", 150_000.0),
            SoftCostDetailRow::new("Permits", 50_000.0),
        ]
    }

    fn input(details: &[SoftCostDetailRow], detailed: bool) -> BudgetInput<'_> {
        BudgetInput {
            hard_cost_per_nrsf: 250.0,
            total_nrsf: 8000.0,
            total_gbsf: 10_000.0,
            land_cost: 500_000.0,
            soft_cost_pct: 0.30,
            use_detailed_soft_costs: detailed,
            soft_cost_details: details,
            total_units: 10,
            site_area_sf: 20_000.0,
        }
    }

    #[test]
    fn test_percent_mode() {
        let details = details();
        let result = calculate_budget(&input(&details, false));

        assert_eq!(result.hard_cost, 2_000_000.0);
        assert_eq!(result.soft_cost, 600_000.0);
        assert_eq!(result.total_budget, 3_100_000.0);
        assert_eq!(result.cost_per_unit, 310_000.0);
        assert_eq!(result.cost_per_nrsf, 387.5);
        assert_eq!(result.cost_per_gbsf, 310.0);
        assert_eq!(result.land_cost_per_unit, 50_000.0);
        assert_eq!(result.land_cost_per_site_sf, 25.0);
    }

    #[test]
    fn test_detailed_mode_ignores_percent() {
        let details = details();
        let result = calculate_budget(&input(&details, true));
        assert_eq!(result.soft_cost, 200_000.0);
        assert_eq!(result.total_budget, 2_700_000.0);
    }

    #[test]
    fn test_percent_mode_ignores_details() {
        let details = details();
        let mut with_details = input(&details, false);
        let without = calculate_budget(&with_details);
        with_details.soft_cost_details = &[];
        assert_eq!(calculate_budget(&with_details).soft_cost, without.soft_cost);
    }

    #[test]
    fn test_zero_denominators() {
        let result = calculate_budget(&BudgetInput {
            hard_cost_per_nrsf: 250.0,
            total_nrsf: 0.0,
            total_gbsf: 0.0,
            land_cost: 500_000.0,
            soft_cost_pct: 0.30,
            use_detailed_soft_costs: false,
            soft_cost_details: &[],
            total_units: 0,
            site_area_sf: 0.0,
        });
        assert_eq!(result.total_budget, 500_000.0);
        assert_eq!(result.cost_per_unit, 0.0);
        assert_eq!(result.cost_per_nrsf, 0.0);
        assert_eq!(result.cost_per_gbsf, 0.0);
        assert_eq!(result.land_cost_per_unit, 0.0);
        assert_eq!(result.land_cost_per_site_sf, 0.0);
    }
}
