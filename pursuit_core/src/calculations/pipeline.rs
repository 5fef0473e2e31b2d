//! # Pipeline Orchestration
//!
//! [`calculate_all`] runs every stage in dependency order and flattens the
//! stage results into one [`CalculationResults`] record:
//!
//! ```text
//! unit mix -> revenue -> budget -> property tax -> opex -> returns
//! ```
//!
//! Nothing is cached here. The call is cheap and deterministic, so an editing
//! surface can recalculate on every change and persist the result itself.
//!
//! ## Example
//!
//! ```rust
//! use pursuit_core::calculations::{calculate_all, CalculationInputs};
//! use pursuit_core::one_pager::{OnePager, UnitMixRow};
//!
//! let mut one_pager = OnePager::new("Base Case");
//! one_pager.unit_mix.push(UnitMixRow::per_sf("1BR", 100, 750.0, 2.40));
//! one_pager.land_cost = 3_000_000.0;
//!
//! let results = calculate_all(&CalculationInputs::from_one_pager(&one_pager, 40_000.0));
//! println!("NOI: {:.0}  YOC: {:.2}%", results.noi, results.yield_on_cost * 100.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::budget::{calculate_budget, BudgetInput, BudgetResult};
use super::opex::{calculate_opex, OpexInput, OpexResult};
use super::property_tax::{calculate_property_tax, PropertyTaxInput, PropertyTaxResult};
use super::returns::{calculate_returns, ReturnsInput, ReturnsResult};
use super::revenue::{calculate_revenue, RevenueInput, RevenueResult};
use super::unit_mix::{aggregate_unit_mix, UnitMixResult};
use crate::one_pager::{OnePager, PayrollRow, SoftCostDetailRow, UnitMixRow};

/// Everything one evaluation reads, borrowed from the caller.
///
/// The row slices are authoritative; the row vectors stored on `assumptions`
/// are not read by the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct CalculationInputs<'a> {
    pub assumptions: &'a OnePager,
    pub unit_mix: &'a [UnitMixRow],
    pub payroll: &'a [PayrollRow],
    pub soft_cost_details: &'a [SoftCostDetailRow],

    /// Site area in square feet, from the owning pursuit
    pub site_area_sf: f64,
}

impl<'a> CalculationInputs<'a> {
    /// Use a one-pager's own row data.
    pub fn from_one_pager(one_pager: &'a OnePager, site_area_sf: f64) -> Self {
        CalculationInputs {
            assumptions: one_pager,
            unit_mix: &one_pager.unit_mix,
            payroll: &one_pager.payroll,
            soft_cost_details: &one_pager.soft_cost_details,
            site_area_sf,
        }
    }
}

/// Flat record of every derived value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalculationResults {
    // Unit mix
    pub total_units: u32,
    pub total_nrsf: f64,
    pub total_gbsf: f64,
    pub avg_unit_sf: f64,
    pub weighted_avg_rent_psf: f64,

    // Revenue
    pub gross_potential_rent: f64,
    pub other_income: f64,
    pub gross_potential_revenue: f64,
    pub vacancy_loss: f64,
    pub net_revenue: f64,

    // Budget
    pub hard_cost: f64,
    pub land_cost: f64,
    pub soft_cost: f64,
    pub total_budget: f64,
    pub cost_per_unit: f64,
    pub cost_per_nrsf: f64,
    pub cost_per_gbsf: f64,
    pub land_cost_per_unit: f64,
    pub land_cost_per_site_sf: f64,

    // Property tax
    pub assessed_value: f64,
    pub property_tax: f64,
    pub property_tax_per_unit: f64,

    // Operating expenses
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
    pub total_opex: f64,
    pub opex_per_unit: f64,
    pub opex_ratio: f64,

    // Returns
    pub noi: f64,
    pub noi_per_unit: f64,
    pub noi_per_nrsf: f64,
    pub yield_on_cost: f64,
}

impl CalculationResults {
    /// Every floating-point field as a name/value pair, in declaration order.
    pub fn numeric_fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("total_nrsf", self.total_nrsf),
            ("total_gbsf", self.total_gbsf),
            ("avg_unit_sf", self.avg_unit_sf),
            ("weighted_avg_rent_psf", self.weighted_avg_rent_psf),
            ("gross_potential_rent", self.gross_potential_rent),
            ("other_income", self.other_income),
            ("gross_potential_revenue", self.gross_potential_revenue),
            ("vacancy_loss", self.vacancy_loss),
            ("net_revenue", self.net_revenue),
            ("hard_cost", self.hard_cost),
            ("land_cost", self.land_cost),
            ("soft_cost", self.soft_cost),
            ("total_budget", self.total_budget),
            ("cost_per_unit", self.cost_per_unit),
            ("cost_per_nrsf", self.cost_per_nrsf),
            ("cost_per_gbsf", self.cost_per_gbsf),
            ("land_cost_per_unit", self.land_cost_per_unit),
            ("land_cost_per_site_sf", self.land_cost_per_site_sf),
            ("assessed_value", self.assessed_value),
            ("property_tax", self.property_tax),
            ("property_tax_per_unit", self.property_tax_per_unit),
            ("utilities", self.utilities),
            ("repairs_maintenance", self.repairs_maintenance),
            ("contract_services", self.contract_services),
            ("marketing", self.marketing),
            ("general_admin", self.general_admin),
            ("turnover", self.turnover),
            ("misc", self.misc),
            ("insurance", self.insurance),
            ("payroll", self.payroll),
            ("management_fee", self.management_fee),
            ("total_opex", self.total_opex),
            ("opex_per_unit", self.opex_per_unit),
            ("opex_ratio", self.opex_ratio),
            ("noi", self.noi),
            ("noi_per_unit", self.noi_per_unit),
            ("noi_per_nrsf", self.noi_per_nrsf),
            ("yield_on_cost", self.yield_on_cost),
        ]
    }

    fn from_stages(unit_mix: &UnitMixResult, revenue: &RevenueResult, cost: &CostSide) -> Self {
        let budget = &cost.budget;
        let tax = &cost.property_tax;
        let opex = &cost.opex;
        let returns = &cost.returns;

        CalculationResults {
            total_units: unit_mix.total_units,
            total_nrsf: unit_mix.total_nrsf,
            total_gbsf: unit_mix.total_gbsf,
            avg_unit_sf: unit_mix.avg_unit_sf,
            weighted_avg_rent_psf: unit_mix.weighted_avg_rent_psf,

            gross_potential_rent: revenue.gross_potential_rent,
            other_income: revenue.other_income,
            gross_potential_revenue: revenue.gross_potential_revenue,
            vacancy_loss: revenue.vacancy_loss,
            net_revenue: revenue.net_revenue,

            hard_cost: budget.hard_cost,
            land_cost: budget.land_cost,
            soft_cost: budget.soft_cost,
            total_budget: budget.total_budget,
            cost_per_unit: budget.cost_per_unit,
            cost_per_nrsf: budget.cost_per_nrsf,
            cost_per_gbsf: budget.cost_per_gbsf,
            land_cost_per_unit: budget.land_cost_per_unit,
            land_cost_per_site_sf: budget.land_cost_per_site_sf,

            assessed_value: tax.assessed_value,
            property_tax: tax.annual_tax,
            property_tax_per_unit: tax.tax_per_unit,

            utilities: opex.utilities,
            repairs_maintenance: opex.repairs_maintenance,
            contract_services: opex.contract_services,
            marketing: opex.marketing,
            general_admin: opex.general_admin,
            turnover: opex.turnover,
            misc: opex.misc,
            insurance: opex.insurance,
            payroll: opex.payroll,
            management_fee: opex.management_fee,
            total_opex: opex.total_opex,
            opex_per_unit: opex.opex_per_unit,
            opex_ratio: opex.opex_ratio,

            noi: returns.noi,
            noi_per_unit: returns.noi_per_unit,
            noi_per_nrsf: returns.noi_per_nrsf,
            yield_on_cost: returns.yield_on_cost,
        }
    }
}

/// Results of the stages downstream of revenue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CostSide {
    pub budget: BudgetResult,
    pub property_tax: PropertyTaxResult,
    pub opex: OpexResult,
    pub returns: ReturnsResult,
}

/// Revenue stage for a given gross potential rent.
pub(crate) fn run_revenue(
    inputs: &CalculationInputs<'_>,
    unit_mix: &UnitMixResult,
    gross_potential_rent: f64,
) -> RevenueResult {
    calculate_revenue(&RevenueInput {
        gross_potential_rent,
        other_income_per_unit_month: inputs.assumptions.other_income_per_unit_month,
        total_units: unit_mix.total_units,
        vacancy_rate: inputs.assumptions.vacancy_rate,
    })
}

/// Budget, property tax, opex, and returns for a given hard cost rate and
/// land cost. Sensitivity sweeps call this with perturbed values.
pub(crate) fn run_cost_side(
    inputs: &CalculationInputs<'_>,
    unit_mix: &UnitMixResult,
    revenue: &RevenueResult,
    hard_cost_per_nrsf: f64,
    land_cost: f64,
) -> CostSide {
    let a = inputs.assumptions;

    let budget = calculate_budget(&BudgetInput {
        hard_cost_per_nrsf,
        total_nrsf: unit_mix.total_nrsf,
        total_gbsf: unit_mix.total_gbsf,
        land_cost,
        soft_cost_pct: a.soft_cost_pct,
        use_detailed_soft_costs: a.use_detailed_soft_costs,
        soft_cost_details: inputs.soft_cost_details,
        total_units: unit_mix.total_units,
        site_area_sf: inputs.site_area_sf,
    });

    let property_tax = calculate_property_tax(&PropertyTaxInput {
        hard_cost: budget.hard_cost,
        land_cost: budget.land_cost,
        soft_cost: budget.soft_cost,
        assessed_pct_hard: a.tax_assessed_pct_hard,
        assessed_pct_land: a.tax_assessed_pct_land,
        assessed_pct_soft: a.tax_assessed_pct_soft,
        mil_rate: a.tax_mil_rate,
        total_units: unit_mix.total_units,
    });

    let opex = calculate_opex(&OpexInput {
        rates: &a.opex,
        total_units: unit_mix.total_units,
        net_revenue: revenue.net_revenue,
        payroll: inputs.payroll,
        mgmt_fee_pct: a.mgmt_fee_pct,
        payroll_burden_pct: a.payroll_burden_pct,
        property_tax: property_tax.annual_tax,
    });

    let returns = calculate_returns(&ReturnsInput {
        net_revenue: revenue.net_revenue,
        total_opex: opex.total_opex,
        total_budget: budget.total_budget,
        total_units: unit_mix.total_units,
        total_nrsf: unit_mix.total_nrsf,
    });

    CostSide {
        budget,
        property_tax,
        opex,
        returns,
    }
}

/// Run the full pipeline.
pub fn calculate_all(inputs: &CalculationInputs<'_>) -> CalculationResults {
    let a = inputs.assumptions;

    let unit_mix = aggregate_unit_mix(inputs.unit_mix, a.efficiency_ratio);
    let revenue = run_revenue(inputs, &unit_mix, unit_mix.gross_potential_rent);
    let cost = run_cost_side(inputs, &unit_mix, &revenue, a.hard_cost_per_nrsf, a.land_cost);

    let results = CalculationResults::from_stages(&unit_mix, &revenue, &cost);
    debug!(
        one_pager = %a.name,
        units = results.total_units,
        noi = results.noi,
        yield_on_cost = results.yield_on_cost,
        "calculated one-pager"
    );
    results
}
