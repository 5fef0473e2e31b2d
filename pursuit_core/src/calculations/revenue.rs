//! # Revenue
//!
//! Gross potential rent plus other income, less vacancy.
//!
//! Rates are not range-checked here; see [`crate::one_pager::OnePager::validate`].

use serde::{Deserialize, Serialize};

/// Input parameters for the revenue stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueInput {
    /// Annual gross potential rent from the unit mix
    pub gross_potential_rent: f64,

    /// Other income, dollars per unit per month
    pub other_income_per_unit_month: f64,

    pub total_units: u32,

    /// Vacancy as a fraction of gross potential revenue
    pub vacancy_rate: f64,
}

/// Revenue stage results (annual dollars).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RevenueResult {
    pub gross_potential_rent: f64,
    pub other_income: f64,

    /// Gross potential rent plus other income
    pub gross_potential_revenue: f64,

    pub vacancy_loss: f64,
    pub net_revenue: f64,
}

pub fn calculate_revenue(input: &RevenueInput) -> RevenueResult {
    let other_income = input.other_income_per_unit_month * f64::from(input.total_units) * 12.0;
    let gross_potential_revenue = input.gross_potential_rent + other_income;
    let vacancy_loss = gross_potential_revenue * input.vacancy_rate;

    RevenueResult {
        gross_potential_rent: input.gross_potential_rent,
        other_income,
        gross_potential_revenue,
        vacancy_loss,
        net_revenue: gross_potential_revenue - vacancy_loss,
    }
}
