//! # One-Pager Assumptions
//!
//! A one-pager is one named feasibility scenario for a pursuit. It holds the
//! owner-editable scalar assumptions plus the row data (unit mix, payroll,
//! itemized soft costs) that the calculation pipeline reads.
//!
//! The engine only ever borrows these records; it never mutates them.
//!
//! ## Conventions
//!
//! - Percentages are fractions (`0.05` = 5%).
//! - Per-unit operating expense rates are dollars per unit per year.
//! - Mill rate is dollars of tax per $1,000 of assessed value.
//!
//! ## Example
//!
//! ```rust
//! use pursuit_core::one_pager::{OnePager, UnitMixRow};
//!
//! let mut one_pager = OnePager::new("Base Case");
//! one_pager.unit_mix.push(UnitMixRow::per_sf("1BR", 10, 800.0, 2.00));
//! assert!(one_pager.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// How a unit-mix row's rent was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentInputMode {
    /// Rent entered as dollars per square foot per month
    #[default]
    PerSf,
    /// Rent entered as a whole monthly dollar amount
    WholeDollar,
}

/// One unit-type cohort in the unit mix.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitMixRow {
    /// Unit type label (e.g., "Studio", "2BR/2BA")
    pub unit_type: String,

    /// Number of units of this type. Rows with zero units are inert.
    pub unit_count: u32,

    /// Average unit size in square feet
    pub avg_unit_sf: f64,

    /// Which of the two rent fields is authoritative
    pub rent_input_mode: RentInputMode,

    /// Monthly rent per square foot (used when mode is `per_sf`)
    pub rent_per_sf: f64,

    /// Monthly rent in whole dollars (used when mode is `whole_dollar`)
    pub rent_whole_dollar: f64,

    pub sort_order: i32,
}

impl UnitMixRow {
    /// Create a row with rent entered per square foot.
    pub fn per_sf(
        unit_type: impl Into<String>,
        unit_count: u32,
        avg_unit_sf: f64,
        rent_per_sf: f64,
    ) -> Self {
        UnitMixRow {
            unit_type: unit_type.into(),
            unit_count,
            avg_unit_sf,
            rent_input_mode: RentInputMode::PerSf,
            rent_per_sf,
            ..Default::default()
        }
    }

    /// Create a row with rent entered as a whole monthly dollar amount.
    pub fn whole_dollar(
        unit_type: impl Into<String>,
        unit_count: u32,
        avg_unit_sf: f64,
        rent_whole_dollar: f64,
    ) -> Self {
        UnitMixRow {
            unit_type: unit_type.into(),
            unit_count,
            avg_unit_sf,
            rent_input_mode: RentInputMode::WholeDollar,
            rent_whole_dollar,
            ..Default::default()
        }
    }

    /// Whether this row participates in aggregation.
    pub fn is_active(&self) -> bool {
        self.unit_count > 0
    }

    /// Effective monthly rent for one unit, resolved from the input mode.
    pub fn monthly_rent(&self) -> f64 {
        match self.rent_input_mode {
            RentInputMode::PerSf => self.rent_per_sf * self.avg_unit_sf,
            RentInputMode::WholeDollar => self.rent_whole_dollar,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        let field = |name: &str| format!("unit_mix[{}].{}", self.unit_type, name);
        non_negative(&field("avg_unit_sf"), self.avg_unit_sf)?;
        non_negative(&field("rent_per_sf"), self.rent_per_sf)?;
        non_negative(&field("rent_whole_dollar"), self.rent_whole_dollar)?;
        Ok(())
    }
}

/// Payroll line type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollLineType {
    /// On-site staff: headcount x base pay, loaded by bonus and burden
    #[default]
    Employee,
    /// Outside contract: a fixed annual amount
    Contract,
}

/// One payroll line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollRow {
    /// Position or vendor label (e.g., "Community Manager")
    pub label: String,

    pub line_type: PayrollLineType,

    /// Full-time equivalents; fractional values are allowed (0.5 FTE)
    pub headcount: f64,

    /// Base annual compensation per FTE
    pub base_compensation: f64,

    /// Bonus as a fraction of base compensation
    pub bonus_pct: f64,

    /// Fixed annual amount for contract lines
    pub fixed_amount: f64,

    pub sort_order: i32,
}

impl PayrollRow {
    /// Create an employee line.
    pub fn employee(
        label: impl Into<String>,
        headcount: f64,
        base_compensation: f64,
        bonus_pct: f64,
    ) -> Self {
        PayrollRow {
            label: label.into(),
            line_type: PayrollLineType::Employee,
            headcount,
            base_compensation,
            bonus_pct,
            ..Default::default()
        }
    }

    /// Create a contract line.
    pub fn contract(label: impl Into<String>, fixed_amount: f64) -> Self {
        PayrollRow {
            label: label.into(),
            line_type: PayrollLineType::Contract,
            fixed_amount,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        let field = |name: &str| format!("payroll[{}].{}", self.label, name);
        match self.line_type {
            PayrollLineType::Employee => {
                non_negative(&field("headcount"), self.headcount)?;
                non_negative(&field("base_compensation"), self.base_compensation)?;
                non_negative(&field("bonus_pct"), self.bonus_pct)?;
            }
            PayrollLineType::Contract => {
                non_negative(&field("fixed_amount"), self.fixed_amount)?;
            }
        }
        Ok(())
    }
}

/// One itemized soft-cost line, used only in detailed soft-cost mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftCostDetailRow {
    pub label: String,
    pub amount: f64,
    pub sort_order: i32,
}

impl SoftCostDetailRow {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        SoftCostDetailRow {
            label: label.into(),
            amount,
            sort_order: 0,
        }
    }
}

/// Sensitivity step arrays. Steps are deltas applied to the base input,
/// never absolute values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivitySteps {
    /// Rent deltas in dollars per square foot per month
    pub rent: Vec<f64>,

    /// Hard cost deltas in dollars per net rentable square foot
    pub hard_cost: Vec<f64>,

    /// Land cost deltas in absolute dollars
    pub land_cost: Vec<f64>,
}

impl SensitivitySteps {
    /// Require an exact `0` entry in every step array.
    ///
    /// The sweeps themselves accept any arrays; callers that want a marked
    /// base case in every table check with this first.
    pub fn require_base_case(&self) -> CalcResult<()> {
        for (axis, steps) in [
            ("rent", &self.rent),
            ("hard_cost", &self.hard_cost),
            ("land_cost", &self.land_cost),
        ] {
            if !steps.iter().any(|s| *s == 0.0) {
                return Err(CalcError::missing_base_case(axis, steps));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.rent.is_empty() && self.hard_cost.is_empty() && self.land_cost.is_empty()
    }
}

/// Operating expense rates, dollars per unit per year.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpexRates {
    pub utilities: f64,
    pub repairs_maintenance: f64,
    pub contract_services: f64,
    pub marketing: f64,
    pub general_admin: f64,
    pub turnover: f64,
    pub misc: f64,
    pub insurance: f64,
}

impl OpexRates {
    /// Name/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("utilities", self.utilities),
            ("repairs_maintenance", self.repairs_maintenance),
            ("contract_services", self.contract_services),
            ("marketing", self.marketing),
            ("general_admin", self.general_admin),
            ("turnover", self.turnover),
            ("misc", self.misc),
            ("insurance", self.insurance),
        ]
    }
}

/// The full set of owner-editable assumptions for one scenario.
///
/// `Default` is the all-zero record with empty rows; use [`OnePager::new`]
/// or [`crate::settings::PursuitSettings::new_one_pager`] for typical values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OnePager {
    /// Scenario name (e.g., "Base Case", "Value Engineered")
    pub name: String,

    /// Net rentable / gross building area ratio
    pub efficiency_ratio: f64,

    /// Vacancy and credit loss as a fraction of gross potential revenue
    pub vacancy_rate: f64,

    /// Other income, dollars per unit per month
    pub other_income_per_unit_month: f64,

    /// Hard cost, dollars per net rentable square foot
    pub hard_cost_per_nrsf: f64,

    /// Land acquisition cost, dollars
    pub land_cost: f64,

    /// Soft cost as a fraction of hard cost (percent mode)
    pub soft_cost_pct: f64,

    /// When true, soft cost is the sum of `soft_cost_details`
    pub use_detailed_soft_costs: bool,

    pub opex: OpexRates,

    /// Management fee as a fraction of net revenue
    pub mgmt_fee_pct: f64,

    /// Payroll burden (taxes, benefits) as a fraction of loaded pay
    pub payroll_burden_pct: f64,

    /// Fraction of hard cost included in assessed value
    pub tax_assessed_pct_hard: f64,

    /// Fraction of land cost included in assessed value
    pub tax_assessed_pct_land: f64,

    /// Fraction of soft cost included in assessed value
    pub tax_assessed_pct_soft: f64,

    /// Tax per $1,000 of assessed value
    pub tax_mil_rate: f64,

    pub sensitivity: SensitivitySteps,

    pub unit_mix: Vec<UnitMixRow>,
    pub payroll: Vec<PayrollRow>,
    pub soft_cost_details: Vec<SoftCostDetailRow>,
}

impl OnePager {
    /// Create a one-pager with the default assumptions from
    /// [`crate::settings::PursuitSettings::default`].
    pub fn new(name: impl Into<String>) -> Self {
        crate::settings::PursuitSettings::default().new_one_pager(name)
    }

    /// Validate every assumption and row.
    ///
    /// The calculation pipeline accepts anything finite; this is the check an
    /// editing surface runs before trusting its numbers.
    pub fn validate(&self) -> CalcResult<()> {
        if !(0.0..=2.0).contains(&self.efficiency_ratio) {
            return Err(CalcError::invalid_input(
                "efficiency_ratio",
                self.efficiency_ratio.to_string(),
                "Efficiency ratio must be between 0 and 2",
            ));
        }
        fraction("vacancy_rate", self.vacancy_rate)?;
        non_negative("other_income_per_unit_month", self.other_income_per_unit_month)?;
        non_negative("hard_cost_per_nrsf", self.hard_cost_per_nrsf)?;
        non_negative("land_cost", self.land_cost)?;
        non_negative("soft_cost_pct", self.soft_cost_pct)?;
        for (name, rate) in self.opex.entries() {
            non_negative(&format!("opex.{name}"), rate)?;
        }
        fraction("mgmt_fee_pct", self.mgmt_fee_pct)?;
        non_negative("payroll_burden_pct", self.payroll_burden_pct)?;
        non_negative("tax_assessed_pct_hard", self.tax_assessed_pct_hard)?;
        non_negative("tax_assessed_pct_land", self.tax_assessed_pct_land)?;
        non_negative("tax_assessed_pct_soft", self.tax_assessed_pct_soft)?;
        non_negative("tax_mil_rate", self.tax_mil_rate)?;

        for (axis, steps) in [
            ("sensitivity.rent", &self.sensitivity.rent),
            ("sensitivity.hard_cost", &self.sensitivity.hard_cost),
            ("sensitivity.land_cost", &self.sensitivity.land_cost),
        ] {
            if let Some(bad) = steps.iter().find(|s| !s.is_finite()) {
                return Err(CalcError::invalid_input(axis, bad.to_string(), "Steps must be finite"));
            }
        }

        for row in &self.unit_mix {
            row.validate()?;
        }
        for row in &self.payroll {
            row.validate()?;
        }
        for row in &self.soft_cost_details {
            if !row.amount.is_finite() {
                return Err(CalcError::invalid_input(
                    format!("soft_cost_details[{}].amount", row.label),
                    row.amount.to_string(),
                    "Amount must be finite",
                ));
            }
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            "Value must be a finite, non-negative number",
        ));
    }
    Ok(())
}

fn fraction(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            "Value must be a fraction between 0 and 1",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rent_by_mode() {
        let per_sf = UnitMixRow::per_sf("1BR", 10, 800.0, 2.0);
        let whole = UnitMixRow::whole_dollar("1BR", 10, 800.0, 1600.0);
        assert_eq!(per_sf.monthly_rent(), 1600.0);
        assert_eq!(whole.monthly_rent(), 1600.0);
    }

    #[test]
    fn test_inactive_row() {
        let row = UnitMixRow::per_sf("3BR", 0, 1200.0, 1.8);
        assert!(!row.is_active());
    }

    #[test]
    fn test_default_is_all_zero() {
        let one_pager = OnePager::default();
        assert_eq!(one_pager.efficiency_ratio, 0.0);
        assert!(one_pager.unit_mix.is_empty());
        assert!(one_pager.sensitivity.is_empty());
        assert!(one_pager.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_vacancy_above_one() {
        let mut one_pager = OnePager::new("Test");
        one_pager.vacancy_rate = 1.5;
        let err = one_pager.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("vacancy_rate"));
    }

    #[test]
    fn test_validate_rejects_negative_row_values() {
        let mut one_pager = OnePager::new("Test");
        one_pager.unit_mix.push(UnitMixRow::per_sf("1BR", 4, -10.0, 2.0));
        assert!(one_pager.validate().is_err());

        one_pager.unit_mix.clear();
        one_pager.payroll.push(PayrollRow::contract("Landscaping", -1.0));
        assert!(one_pager.validate().is_err());
    }

    #[test]
    fn test_require_base_case() {
        let mut steps = SensitivitySteps {
            rent: vec![-0.1, 0.0, 0.1],
            hard_cost: vec![-10.0, 0.0, 10.0],
            land_cost: vec![0.0],
        };
        assert!(steps.require_base_case().is_ok());

        steps.hard_cost = vec![-10.0, 10.0];
        let err = steps.require_base_case().unwrap_err();
        assert_eq!(err, CalcError::missing_base_case("hard_cost", &[-10.0, 10.0]));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(serde_json::to_string(&RentInputMode::WholeDollar).unwrap(), "\"whole_dollar\"");
        assert_eq!(serde_json::to_string(&PayrollLineType::Contract).unwrap(), "\"contract\"");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "name": "Sketch", "unit_mix": [{ "unit_type": "S", "unit_count": 2 }] }"#;
        let one_pager: OnePager = serde_json::from_str(json).unwrap();
        assert_eq!(one_pager.unit_mix[0].rent_input_mode, RentInputMode::PerSf);
        assert_eq!(one_pager.vacancy_rate, 0.0);
    }
}
