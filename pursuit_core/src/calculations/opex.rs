//! # Operating Expenses
//!
//! Total opex is the sum of:
//!
//! - eight flat per-unit categories (`rate x total_units`)
//! - payroll (employee lines loaded by bonus and burden, contract lines as-is)
//! - management fee (`mgmt_fee_pct x net_revenue`)
//! - property tax from [`super::property_tax`]
//!
//! ## Example
//!
//! ```rust
//! use pursuit_core::calculations::opex::calculate_payroll_row;
//! use pursuit_core::one_pager::PayrollRow;
//!
//! // 0.5 FTE at $60k, 10% bonus, 30% burden
//! let row = PayrollRow::employee("Maintenance Tech", 0.5, 60_000.0, 0.10);
//! let total = calculate_payroll_row(&row, 0.30);
//! assert!((total - 42_900.0).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use super::safe_div;
use crate::one_pager::{OpexRates, PayrollLineType, PayrollRow};

/// Input parameters for the operating expense stage.
#[derive(Debug, Clone, Copy)]
pub struct OpexInput<'a> {
    /// Per-unit annual rates
    pub rates: &'a OpexRates,
    pub total_units: u32,
    pub net_revenue: f64,
    pub payroll: &'a [PayrollRow],
    pub mgmt_fee_pct: f64,
    pub payroll_burden_pct: f64,

    /// Annual property tax, already calculated
    pub property_tax: f64,
}

/// Operating expense results (annual dollars).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OpexResult {
    pub utilities: f64,
    pub repairs_maintenance: f64,
    pub contract_services: f64,
    pub marketing: f64,
    pub general_admin: f64,
    pub turnover: f64,
    pub misc: f64,
    pub insurance: f64,
    pub payroll: f64,
    pub management_fee: f64,
    pub property_tax: f64,
    pub total_opex: f64,
    pub opex_per_unit: f64,

    /// `total_opex / net_revenue`
    pub opex_ratio: f64,
}

/// Annual cost of one payroll line.
///
/// Contract lines use `fixed_amount` directly. Employee lines use
/// `headcount x base x (1 + bonus) x (1 + burden)`.
pub fn calculate_payroll_row(row: &PayrollRow, payroll_burden_pct: f64) -> f64 {
    match row.line_type {
        PayrollLineType::Contract => row.fixed_amount,
        PayrollLineType::Employee => {
            let loaded_pay = row.base_compensation * (1.0 + row.bonus_pct);
            row.headcount * loaded_pay * (1.0 + payroll_burden_pct)
        }
    }
}

pub fn calculate_opex(input: &OpexInput<'_>) -> OpexResult {
    let units = f64::from(input.total_units);
    let rates = input.rates;

    let utilities = rates.utilities * units;
    let repairs_maintenance = rates.repairs_maintenance * units;
    let contract_services = rates.contract_services * units;
    let marketing = rates.marketing * units;
    let general_admin = rates.general_admin * units;
    let turnover = rates.turnover * units;
    let misc = rates.misc * units;
    let insurance = rates.insurance * units;

    let payroll: f64 = input
        .payroll
        .iter()
        .map(|row| calculate_payroll_row(row, input.payroll_burden_pct))
        .sum();
    let management_fee = input.mgmt_fee_pct * input.net_revenue;

    let total_opex = utilities
        + repairs_maintenance
        + contract_services
        + marketing
        + general_admin
        + turnover
        + misc
        + insurance
        + payroll
        + management_fee
        + input.property_tax;

    OpexResult {
        utilities,
        repairs_maintenance,
        contract_services,
        marketing,
        general_admin,
        turnover,
        misc,
        insurance,
        payroll,
        management_fee,
        property_tax: input.property_tax,
        total_opex,
        opex_per_unit: safe_div(total_opex, units),
        opex_ratio: safe_div(total_opex, input.net_revenue),
    }
}
