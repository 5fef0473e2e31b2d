//! # Pro-Forma Calculations
//!
//! The underwriting pipeline. Every stage follows the same pattern:
//!
//! - `*Input` - Borrowed input parameters for one stage
//! - `*Result` - Stage results (JSON-serializable)
//! - `calculate_*(input) -> *Result` - Pure, total function
//!
//! Stages run in a fixed dependency order:
//!
//! ```text
//! unit_mix -> revenue -> budget -> property_tax -> opex -> returns
//! ```
//!
//! [`pipeline::calculate_all`] sequences them into one [`CalculationResults`]
//! record, and [`sensitivity`] re-runs the downstream stages under perturbed
//! rent, hard cost, and land cost.
//!
//! ## Zero Guard
//!
//! No stage returns an error. Any ratio with a zero denominator is `0.0`, so an
//! incomplete one-pager (no units entered yet) renders as zeros rather than
//! NaN or infinity. Negative results (a losing deal) are never clamped.

pub mod budget;
pub mod opex;
pub mod pipeline;
pub mod property_tax;
pub mod returns;
pub mod revenue;
pub mod sensitivity;
pub mod unit_mix;

pub use budget::{calculate_budget, BudgetInput, BudgetResult};
pub use opex::{calculate_opex, calculate_payroll_row, OpexInput, OpexResult};
pub use pipeline::{calculate_all, CalculationInputs, CalculationResults};
pub use property_tax::{calculate_property_tax, PropertyTaxInput, PropertyTaxResult};
pub use returns::{calculate_returns, ReturnsInput, ReturnsResult};
pub use revenue::{calculate_revenue, RevenueInput, RevenueResult};
pub use sensitivity::{
    find_base_index, hard_cost_sensitivity, land_cost_sensitivity, rent_sensitivity,
    run_sensitivity, sensitivity_matrix, SensitivityAnalysis, SensitivityMatrix, SensitivityRow,
};
pub use unit_mix::{aggregate_unit_mix, UnitMixResult, UnitMixRowResult};

/// Divide, returning `0.0` when the denominator is zero or the quotient is
/// not finite.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let quotient = numerator / denominator;
    if quotient.is_finite() {
        quotient
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 4.0), 2.5);
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(-10.0, 4.0), -2.5);
        assert_eq!(safe_div(f64::MAX, 1e-300), 0.0);
    }
}
