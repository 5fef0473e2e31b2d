//! # Unit Mix Aggregation
//!
//! Reduces unit-type rows to building totals: unit count, net and gross
//! area, weighted averages, and gross potential rent.
//!
//! Only rows with `unit_count > 0` participate. Rows with zero area or zero
//! rent contribute zeros rather than failing.
//!
//! ## Example
//!
//! ```rust
//! use pursuit_core::calculations::unit_mix::aggregate_unit_mix;
//! use pursuit_core::one_pager::UnitMixRow;
//!
//! let rows = vec![UnitMixRow::per_sf("1BR", 10, 800.0, 2.00)];
//! let result = aggregate_unit_mix(&rows, 0.85);
//!
//! assert_eq!(result.total_nrsf, 8000.0);
//! assert_eq!(result.gross_potential_rent, 192_000.0);
//! ```

use serde::{Deserialize, Serialize};

use super::safe_div;
use crate::one_pager::UnitMixRow;

/// Derived values for one active unit-mix row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitMixRowResult {
    pub unit_type: String,
    pub unit_count: u32,

    /// `unit_count x avg_unit_sf`
    pub total_sf: f64,

    /// Effective monthly rent per unit, resolved from the rent input mode
    pub monthly_rent: f64,

    /// Effective monthly rent per square foot
    pub rent_per_sf: f64,

    /// `unit_count x monthly_rent x 12`
    pub annual_revenue: f64,
}

/// Unit mix totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitMixResult {
    /// Per-row results for active rows, in input order
    pub rows: Vec<UnitMixRowResult>,

    pub total_units: u32,

    /// Net rentable square feet
    pub total_nrsf: f64,

    /// Gross building square feet (`total_nrsf / efficiency_ratio`)
    pub total_gbsf: f64,

    pub avg_unit_sf: f64,

    /// Monthly rent per net rentable square foot, weighted by area
    pub weighted_avg_rent_psf: f64,

    /// Annual rent at 100% occupancy
    pub gross_potential_rent: f64,
}

/// Aggregate the unit mix.
pub fn aggregate_unit_mix(rows: &[UnitMixRow], efficiency_ratio: f64) -> UnitMixResult {
    let rows: Vec<UnitMixRowResult> = rows
        .iter()
        .filter(|row| row.is_active())
        .map(|row| {
            let count = f64::from(row.unit_count);
            let monthly_rent = row.monthly_rent();
            UnitMixRowResult {
                unit_type: row.unit_type.clone(),
                unit_count: row.unit_count,
                total_sf: count * row.avg_unit_sf,
                monthly_rent,
                rent_per_sf: safe_div(monthly_rent, row.avg_unit_sf),
                annual_revenue: count * monthly_rent * 12.0,
            }
        })
        .collect();

    let total_units: u32 = rows.iter().map(|r| r.unit_count).sum();
    let total_nrsf: f64 = rows.iter().map(|r| r.total_sf).sum();
    let gross_potential_rent: f64 = rows.iter().map(|r| r.annual_revenue).sum();

    let total_gbsf = if efficiency_ratio > 0.0 {
        safe_div(total_nrsf, efficiency_ratio)
    } else {
        0.0
    };

    UnitMixResult {
        total_units,
        total_nrsf,
        total_gbsf,
        avg_unit_sf: safe_div(total_nrsf, f64::from(total_units)),
        weighted_avg_rent_psf: safe_div(gross_potential_rent, total_nrsf) / 12.0,
        gross_potential_rent,
        rows,
    }
}
