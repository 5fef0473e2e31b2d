//! # Pursuit Data Structures
//!
//! A `Pursuit` is one prospective development site. It owns the one-pagers
//! (feasibility scenarios) evaluated for that site, and stores the summary
//! columns list and report views show without recalculating.
//! Pursuits serialize to `.pursuit` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Pursuit
//! ├── meta: PursuitMetadata (version, name, address, stage, site area, timestamps)
//! ├── settings: PursuitSettings (default assumptions and sensitivity steps)
//! ├── one_pagers: HashMap<Uuid, OnePager>
//! ├── primary_one_pager: Option<Uuid>
//! └── summaries: HashMap<Uuid, OnePagerSummary> (cached by the caller)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pursuit_core::pursuit::Pursuit;
//! use pursuit_core::one_pager::UnitMixRow;
//!
//! let mut pursuit = Pursuit::new("Maple Street", "120 Maple St", 87_120.0);
//! let id = pursuit.new_one_pager("Base Case");
//!
//! pursuit
//!     .get_one_pager_mut(&id)
//!     .unwrap()
//!     .unit_mix
//!     .push(UnitMixRow::per_sf("1BR", 120, 725.0, 2.35));
//!
//! let summary = pursuit.refresh_summary(&id).unwrap();
//! assert_eq!(summary.total_units, 120);
//! ```

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculations::{
    calculate_all, run_sensitivity, CalculationInputs, CalculationResults, SensitivityAnalysis,
};
use crate::errors::{CalcError, CalcResult};
use crate::one_pager::OnePager;
use crate::settings::PursuitSettings;

/// Current schema version for .pursuit files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root pursuit container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pursuit {
    pub meta: PursuitMetadata,

    #[serde(default)]
    pub settings: PursuitSettings,

    /// All one-pagers, keyed by UUID
    pub one_pagers: HashMap<Uuid, OnePager>,

    /// The scenario list views report on
    pub primary_one_pager: Option<Uuid>,

    /// Cached results, refreshed explicitly with [`Pursuit::refresh_summary`]
    #[serde(default)]
    pub summaries: HashMap<Uuid, OnePagerSummary>,
}

impl Pursuit {
    /// Create a new pursuit with no one-pagers.
    ///
    /// # Arguments
    ///
    /// * `name` - Pursuit name (e.g., "Maple Street Apartments")
    /// * `address` - Street address of the site
    /// * `site_area_sf` - Site area in square feet
    pub fn new(name: impl Into<String>, address: impl Into<String>, site_area_sf: f64) -> Self {
        let now = Utc::now();
        Pursuit {
            meta: PursuitMetadata {
                version: SCHEMA_VERSION.to_string(),
                name: name.into(),
                address: address.into(),
                stage: PipelineStage::default(),
                site_area_sf,
                created: now,
                modified: now,
            },
            settings: PursuitSettings::default(),
            one_pagers: HashMap::new(),
            primary_one_pager: None,
            summaries: HashMap::new(),
        }
    }

    /// Add a one-pager. The first one added becomes the primary.
    ///
    /// Returns the UUID assigned to the one-pager.
    pub fn add_one_pager(&mut self, one_pager: OnePager) -> Uuid {
        let id = Uuid::new_v4();
        self.one_pagers.insert(id, one_pager);
        if self.primary_one_pager.is_none() {
            self.primary_one_pager = Some(id);
        }
        self.touch();
        id
    }

    /// Add a one-pager seeded from this pursuit's settings.
    pub fn new_one_pager(&mut self, name: impl Into<String>) -> Uuid {
        let one_pager = self.settings.new_one_pager(name);
        self.add_one_pager(one_pager)
    }

    /// Remove a one-pager and its cached summary.
    ///
    /// Removing the primary promotes the first remaining one-pager in
    /// [`Pursuit::one_pagers_sorted`] order.
    pub fn remove_one_pager(&mut self, id: &Uuid) -> Option<OnePager> {
        let removed = self.one_pagers.remove(id);
        if removed.is_some() {
            self.summaries.remove(id);
            if self.primary_one_pager == Some(*id) {
                let next = self.one_pagers_sorted().first().map(|(id, _)| *id);
                self.primary_one_pager = next;
            }
            self.touch();
        }
        removed
    }

    pub fn get_one_pager(&self, id: &Uuid) -> Option<&OnePager> {
        self.one_pagers.get(id)
    }

    /// Get a mutable reference to a one-pager.
    ///
    /// Marks the pursuit modified and drops the one-pager's cached summary,
    /// since the caller is about to change its inputs.
    pub fn get_one_pager_mut(&mut self, id: &Uuid) -> Option<&mut OnePager> {
        if self.one_pagers.contains_key(id) {
            self.summaries.remove(id);
            self.touch();
            self.one_pagers.get_mut(id)
        } else {
            None
        }
    }

    /// Resolve a one-pager by UUID string or by exact name.
    ///
    /// A name shared by several one-pagers is rejected; pass the UUID instead.
    pub fn find_one_pager(&self, key: &str) -> CalcResult<Uuid> {
        if let Ok(id) = Uuid::parse_str(key) {
            if self.one_pagers.contains_key(&id) {
                return Ok(id);
            }
        }
        let matches: Vec<Uuid> = self
            .one_pagers
            .iter()
            .filter(|(_, one_pager)| one_pager.name == key)
            .map(|(id, _)| *id)
            .collect();
        match matches.as_slice() {
            [] => Err(CalcError::not_found("OnePager", key)),
            [id] => Ok(*id),
            _ => Err(CalcError::invalid_input(
                "one_pager",
                key,
                format!("name matches {} one-pagers; use the UUID", matches.len()),
            )),
        }
    }

    /// The primary one-pager's id, or an error when the pursuit has none.
    pub fn primary_id(&self) -> CalcResult<Uuid> {
        self.primary_one_pager
            .filter(|id| self.one_pagers.contains_key(id))
            .ok_or_else(|| CalcError::missing_field("primary_one_pager"))
    }

    pub fn set_primary(&mut self, id: &Uuid) -> CalcResult<()> {
        if !self.one_pagers.contains_key(id) {
            return Err(CalcError::not_found("OnePager", id.to_string()));
        }
        self.primary_one_pager = Some(*id);
        self.touch();
        Ok(())
    }

    /// One-pagers sorted by name, ties broken by UUID.
    pub fn one_pagers_sorted(&self) -> Vec<(Uuid, &OnePager)> {
        let mut list: Vec<_> = self.one_pagers.iter().map(|(id, op)| (*id, op)).collect();
        list.sort_by(|a, b| a.1.name.cmp(&b.1.name).then(a.0.cmp(&b.0)));
        list
    }

    pub fn set_stage(&mut self, stage: PipelineStage) {
        self.meta.stage = stage;
        self.touch();
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Run the pipeline for one one-pager against this pursuit's site area.
    pub fn calculate(&self, id: &Uuid) -> CalcResult<CalculationResults> {
        let one_pager = self.lookup(id)?;
        Ok(calculate_all(&CalculationInputs::from_one_pager(
            one_pager,
            self.meta.site_area_sf,
        )))
    }

    /// Run every sensitivity sweep for one one-pager, using its own step
    /// arrays and this pursuit's base-case policy.
    pub fn sensitivity(&self, id: &Uuid) -> CalcResult<SensitivityAnalysis> {
        let one_pager = self.lookup(id)?;
        let inputs = CalculationInputs::from_one_pager(one_pager, self.meta.site_area_sf);
        Ok(run_sensitivity(
            &inputs,
            &one_pager.sensitivity,
            self.settings.base_case_policy,
        ))
    }

    /// Recalculate a one-pager and store its summary columns.
    pub fn refresh_summary(&mut self, id: &Uuid) -> CalcResult<&OnePagerSummary> {
        let results = self.calculate(id)?;
        let summary = OnePagerSummary::from_results(&results);
        debug!(pursuit = %self.meta.name, one_pager = %id, noi = summary.noi, "refreshed summary");
        self.summaries.insert(*id, summary);
        Ok(&self.summaries[id])
    }

    /// The cached summary of the primary one-pager, if one has been stored.
    pub fn primary_summary(&self) -> Option<&OnePagerSummary> {
        self.summaries.get(&self.primary_one_pager?)
    }

    fn lookup(&self, id: &Uuid) -> CalcResult<&OnePager> {
        self.one_pagers
            .get(id)
            .ok_or_else(|| CalcError::not_found("OnePager", id.to_string()))
    }

    pub fn one_pager_count(&self) -> usize {
        self.one_pagers.len()
    }
}

impl Default for Pursuit {
    fn default() -> Self {
        Pursuit::new("", "", 0.0)
    }
}

/// Pursuit metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PursuitMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub name: String,
    pub address: String,
    pub stage: PipelineStage,

    /// Site area in square feet
    pub site_area_sf: f64,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Where a pursuit sits in the development pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    Prospect,
    Screening,
    Underwriting,
    LoiSubmitted,
    UnderContract,
    Closed,
    Dead,
}

impl PipelineStage {
    /// Whether the pursuit is still being worked.
    pub fn is_active(&self) -> bool {
        !matches!(self, PipelineStage::Closed | PipelineStage::Dead)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Prospect => "Prospect",
            PipelineStage::Screening => "Screening",
            PipelineStage::Underwriting => "Underwriting",
            PipelineStage::LoiSubmitted => "LOI Submitted",
            PipelineStage::UnderContract => "Under Contract",
            PipelineStage::Closed => "Closed",
            PipelineStage::Dead => "Dead",
        };
        f.write_str(label)
    }
}

/// Summary columns persisted alongside a one-pager for list and report views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnePagerSummary {
    pub total_units: u32,
    pub total_budget: f64,
    pub cost_per_unit: f64,
    pub net_revenue: f64,
    pub noi: f64,
    pub yield_on_cost: f64,
    pub calculated_at: DateTime<Utc>,
}

impl OnePagerSummary {
    pub fn from_results(results: &CalculationResults) -> Self {
        OnePagerSummary {
            total_units: results.total_units,
            total_budget: results.total_budget,
            cost_per_unit: results.cost_per_unit,
            net_revenue: results.net_revenue,
            noi: results.noi,
            yield_on_cost: results.yield_on_cost,
            calculated_at: Utc::now(),
        }
    }
}
