//! # Returns
//!
//! NOI and yield on cost. Both may be negative; nothing is floored.

use serde::{Deserialize, Serialize};

use super::safe_div;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnsInput {
    pub net_revenue: f64,
    pub total_opex: f64,
    pub total_budget: f64,
    pub total_units: u32,
    pub total_nrsf: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReturnsResult {
    /// Net operating income: `net_revenue - total_opex`
    pub noi: f64,
    pub noi_per_unit: f64,
    pub noi_per_nrsf: f64,

    /// `noi / total_budget`
    pub yield_on_cost: f64,
}

pub fn calculate_returns(input: &ReturnsInput) -> ReturnsResult {
    let noi = input.net_revenue - input.total_opex;

    ReturnsResult {
        noi,
        noi_per_unit: safe_div(noi, f64::from(input.total_units)),
        noi_per_nrsf: safe_div(noi, input.total_nrsf),
        yield_on_cost: safe_div(noi, input.total_budget),
    }
}
