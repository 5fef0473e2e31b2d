//! Plain-text report rendering. Rounding happens here and nowhere else.

use std::fmt;

use pursuit_core::calculations::{CalculationResults, SensitivityAnalysis, SensitivityRow};
use pursuit_core::one_pager::OnePager;
use pursuit_core::pursuit::Pursuit;

const RULE: &str = "═══════════════════════════════════════════════";

pub fn summary(pursuit: &Pursuit, one_pager: &OnePager, results: &CalculationResults) -> String {
    Summary {
        pursuit,
        one_pager,
        r: results,
    }
    .to_string()
}

pub fn sensitivity(one_pager: &OnePager, analysis: &SensitivityAnalysis) -> String {
    Sensitivity {
        one_pager,
        analysis,
    }
    .to_string()
}

fn money(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn pct(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

struct Summary<'a> {
    pursuit: &'a Pursuit,
    one_pager: &'a OnePager,
    r: &'a CalculationResults,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.r;
        writeln!(f, "{RULE}")?;
        writeln!(f, "  {} - {}", self.pursuit.meta.name, self.one_pager.name)?;
        writeln!(f, "  Stage: {}", self.pursuit.meta.stage)?;
        writeln!(f, "{RULE}")?;
        writeln!(f)?;
        writeln!(f, "Unit Mix:")?;
        writeln!(f, "  Units:            {}", r.total_units)?;
        writeln!(f, "  NRSF:             {:.0}", r.total_nrsf)?;
        writeln!(f, "  GBSF:             {:.0}", r.total_gbsf)?;
        writeln!(f, "  Avg unit:         {:.0} sf", r.avg_unit_sf)?;
        writeln!(f, "  Avg rent:         ${:.2}/sf", r.weighted_avg_rent_psf)?;
        writeln!(f)?;
        writeln!(f, "Revenue:")?;
        writeln!(f, "  GPR:              {}", money(r.gross_potential_rent))?;
        writeln!(f, "  Other income:     {}", money(r.other_income))?;
        writeln!(f, "  Vacancy:          {}", money(-r.vacancy_loss))?;
        writeln!(f, "  Net revenue:      {}", money(r.net_revenue))?;
        writeln!(f)?;
        writeln!(f, "Budget:")?;
        writeln!(f, "  Hard cost:        {}", money(r.hard_cost))?;
        writeln!(f, "  Land:             {}", money(r.land_cost))?;
        writeln!(f, "  Soft cost:        {}", money(r.soft_cost))?;
        writeln!(f, "  Total:            {}", money(r.total_budget))?;
        writeln!(f, "  Per unit:         {}", money(r.cost_per_unit))?;
        writeln!(f, "  Per NRSF:         {}", money(r.cost_per_nrsf))?;
        writeln!(f, "  Land per site sf: ${:.2}", r.land_cost_per_site_sf)?;
        writeln!(f)?;
        writeln!(f, "Operating Expenses:")?;
        for (label, value) in [
            ("Utilities", r.utilities),
            ("Repairs & maint.", r.repairs_maintenance),
            ("Contract services", r.contract_services),
            ("Marketing", r.marketing),
            ("G&A", r.general_admin),
            ("Turnover", r.turnover),
            ("Misc", r.misc),
            ("Insurance", r.insurance),
            ("Payroll", r.payroll),
            ("Management fee", r.management_fee),
            ("Property tax", r.property_tax),
        ] {
            writeln!(f, "  {label:<17} {}", money(value))?;
        }
        writeln!(f, "  {:<17} {}", "Total", money(r.total_opex))?;
        writeln!(f, "  {:<17} {}", "Opex ratio", pct(r.opex_ratio))?;
        writeln!(f)?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "  NOI:              {}", money(r.noi))?;
        writeln!(f, "  Yield on cost:    {}", pct(r.yield_on_cost))?;
        writeln!(f, "{RULE}")
    }
}

struct Sensitivity<'a> {
    one_pager: &'a OnePager,
    analysis: &'a SensitivityAnalysis,
}

fn sweep_table(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    value_label: &str,
    rows: &[SensitivityRow],
    value: impl Fn(f64) -> String,
) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(
        f,
        "  {:>12} {:>14} {:>16} {:>14} {:>8}",
        "Step", value_label, "Budget", "NOI", "YOC"
    )?;
    for row in rows {
        let marker = if row.step == 0.0 { "*" } else { " " };
        writeln!(
            f,
            "{marker} {:>12} {:>14} {:>16} {:>14} {:>8}",
            format!("{:+}", row.step),
            value(row.adjusted_value),
            money(row.total_budget),
            money(row.noi),
            pct(row.yield_on_cost),
        )?;
    }
    writeln!(f)
}

impl fmt::Display for Sensitivity<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        writeln!(f, "Sensitivity: {}", self.one_pager.name)?;
        writeln!(f)?;
        sweep_table(f, "Rent ($/sf/month)", "Rent", &a.rent, |v| format!("${v:.2}"))?;
        sweep_table(f, "Hard Cost ($/NRSF)", "Hard cost", &a.hard_cost, |v| format!("${v:.2}"))?;
        sweep_table(f, "Land Cost", "Land", &a.land_cost, money)?;

        let m = &a.matrix;
        writeln!(f, "Yield on Cost: rent step (rows) x hard cost step (columns)")?;
        write!(f, "  {:>8}", "")?;
        for step in &m.hard_cost_steps {
            write!(f, " {:>9}", format!("{step:+}"))?;
        }
        writeln!(f)?;
        for (i, row) in m.values.iter().enumerate() {
            write!(f, "  {:>8}", format!("{:+}", m.rent_steps[i]))?;
            for (j, yoc) in row.iter().enumerate() {
                let cell = if m.base_cell() == Some((i, j)) {
                    format!("[{}]", pct(*yoc))
                } else {
                    pct(*yoc)
                };
                write!(f, " {cell:>9}")?;
            }
            writeln!(f)?;
        }
        if m.base_cell().is_none() {
            writeln!(f, "  (no base case: a step array has no 0 entry)")?;
        }
        Ok(())
    }
}
