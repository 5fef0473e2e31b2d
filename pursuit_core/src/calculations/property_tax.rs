//! # Property Tax
//!
//! Assessed value is a weighted sum of the three cost components; annual tax
//! applies the mill rate per $1,000 of assessed value.
//!
//! Runs before [`super::opex`], which carries the annual tax as one of its
//! components.

use serde::{Deserialize, Serialize};

use super::safe_div;

/// Input parameters for the property tax stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyTaxInput {
    pub hard_cost: f64,
    pub land_cost: f64,
    pub soft_cost: f64,
    pub assessed_pct_hard: f64,
    pub assessed_pct_land: f64,
    pub assessed_pct_soft: f64,

    /// Dollars of tax per $1,000 of assessed value
    pub mil_rate: f64,

    pub total_units: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyTaxResult {
    pub assessed_value: f64,
    pub annual_tax: f64,
    pub tax_per_unit: f64,
}

pub fn calculate_property_tax(input: &PropertyTaxInput) -> PropertyTaxResult {
    let assessed_value = input.hard_cost * input.assessed_pct_hard
        + input.land_cost * input.assessed_pct_land
        + input.soft_cost * input.assessed_pct_soft;
    let annual_tax = assessed_value * input.mil_rate / 1000.0;

    PropertyTaxResult {
        assessed_value,
        annual_tax,
        tax_per_unit: safe_div(annual_tax, f64::from(input.total_units)),
    }
}
