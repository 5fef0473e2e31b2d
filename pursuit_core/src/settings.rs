//! # Pursuit Settings
//!
//! Configuration stored on each [`crate::pursuit::Pursuit`]: the assumption
//! values new one-pagers start from, the default sensitivity step arrays, and
//! how the sensitivity matrix locates its base case.

use serde::{Deserialize, Serialize};

use crate::one_pager::{OnePager, OpexRates, SensitivitySteps};

/// How a step array's base-case (zero-perturbation) index is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseCasePolicy {
    /// Only an exact `0` entry is a base case; otherwise there is none
    #[default]
    Strict,
    /// Fall back to the array midpoint when no exact `0` entry exists
    MidpointFallback,
}

/// Settings shared by every one-pager in a pursuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitSettings {
    /// Assumptions copied into each new one-pager
    pub default_assumptions: DefaultAssumptions,

    /// Step arrays copied into each new one-pager
    pub default_steps: SensitivitySteps,

    pub base_case_policy: BaseCasePolicy,
}

impl Default for PursuitSettings {
    fn default() -> Self {
        PursuitSettings {
            default_assumptions: DefaultAssumptions::default(),
            default_steps: SensitivitySteps {
                rent: vec![-0.30, -0.20, -0.10, 0.0, 0.10, 0.20, 0.30],
                hard_cost: vec![-30.0, -20.0, -10.0, 0.0, 10.0, 20.0, 30.0],
                land_cost: vec![
                    -1_000_000.0,
                    -500_000.0,
                    -250_000.0,
                    0.0,
                    250_000.0,
                    500_000.0,
                    1_000_000.0,
                ],
            },
            base_case_policy: BaseCasePolicy::Strict,
        }
    }
}

impl PursuitSettings {
    /// Build a new, empty one-pager seeded from these settings.
    pub fn new_one_pager(&self, name: impl Into<String>) -> OnePager {
        let a = &self.default_assumptions;
        OnePager {
            name: name.into(),
            efficiency_ratio: a.efficiency_ratio,
            vacancy_rate: a.vacancy_rate,
            other_income_per_unit_month: a.other_income_per_unit_month,
            hard_cost_per_nrsf: a.hard_cost_per_nrsf,
            land_cost: 0.0,
            soft_cost_pct: a.soft_cost_pct,
            use_detailed_soft_costs: false,
            opex: a.opex,
            mgmt_fee_pct: a.mgmt_fee_pct,
            payroll_burden_pct: a.payroll_burden_pct,
            tax_assessed_pct_hard: a.tax_assessed_pct_hard,
            tax_assessed_pct_land: a.tax_assessed_pct_land,
            tax_assessed_pct_soft: a.tax_assessed_pct_soft,
            tax_mil_rate: a.tax_mil_rate,
            sensitivity: self.default_steps.clone(),
            unit_mix: Vec::new(),
            payroll: Vec::new(),
            soft_cost_details: Vec::new(),
        }
    }
}

/// Starting assumption values for new one-pagers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultAssumptions {
    pub efficiency_ratio: f64,
    pub vacancy_rate: f64,
    pub other_income_per_unit_month: f64,
    pub hard_cost_per_nrsf: f64,
    pub soft_cost_pct: f64,
    pub opex: OpexRates,
    pub mgmt_fee_pct: f64,
    pub payroll_burden_pct: f64,
    pub tax_assessed_pct_hard: f64,
    pub tax_assessed_pct_land: f64,
    pub tax_assessed_pct_soft: f64,
    pub tax_mil_rate: f64,
}

impl Default for DefaultAssumptions {
    fn default() -> Self {
        DefaultAssumptions {
            efficiency_ratio: 0.85,
            vacancy_rate: 0.05,
            other_income_per_unit_month: 50.0,
            hard_cost_per_nrsf: 250.0,
            soft_cost_pct: 0.30,
            opex: OpexRates {
                utilities: 600.0,
                repairs_maintenance: 500.0,
                contract_services: 400.0,
                marketing: 150.0,
                general_admin: 300.0,
                turnover: 250.0,
                misc: 100.0,
                insurance: 450.0,
            },
            mgmt_fee_pct: 0.03,
            payroll_burden_pct: 0.30,
            tax_assessed_pct_hard: 1.0,
            tax_assessed_pct_land: 1.0,
            tax_assessed_pct_soft: 0.0,
            tax_mil_rate: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_one_pager_copies_defaults() {
        let settings = PursuitSettings::default();
        let one_pager = settings.new_one_pager("Base Case");
        assert_eq!(one_pager.name, "Base Case");
        assert_eq!(one_pager.efficiency_ratio, 0.85);
        assert_eq!(one_pager.sensitivity, settings.default_steps);
        assert!(one_pager.validate().is_ok());
    }

    #[test]
    fn test_default_steps_have_base_case() {
        assert!(PursuitSettings::default().default_steps.require_base_case().is_ok());
    }

    #[test]
    fn test_policy_wire_name() {
        let json = serde_json::to_string(&BaseCasePolicy::MidpointFallback).unwrap();
        assert_eq!(json, "\"midpoint_fallback\"");
    }
}
